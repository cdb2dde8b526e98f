use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;

use crate::config::PlacementConfig;
use crate::workflows::placement::router;
use crate::workflows::placement::service::PlacementService;

fn tenant_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-tenant-id", HeaderValue::from_static(TENANT));
    headers
}

fn student_request(method: &str, uri: &str, student: &str, body: Option<&Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-tenant-id", TENANT)
        .header("x-student-id", student);
    match body {
        Some(body) => builder
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body).expect("serialize")))
            .expect("request builds"),
        None => builder.body(Body::empty()).expect("request builds"),
    }
}

#[tokio::test]
async fn missing_tenant_header_is_bad_request() {
    let (service, _) = build_service();
    let response = router_with_service(service)
        .oneshot(
            Request::get("/placements/companies")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_status(&response, StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "tenant scope is required");
}

#[tokio::test]
async fn create_company_route_returns_created_then_conflict() {
    let (service, _) = build_service();
    let router = router_with_service(service);
    let body = serde_json::to_value(new_company("Acme Systems")).expect("serialize company");

    let response = router
        .clone()
        .oneshot(json_request("POST", "/placements/companies", &body))
        .await
        .expect("route executes");
    assert_status(&response, StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["name"], "Acme Systems");
    assert_eq!(payload["jobRoles"][0]["isActive"], true);

    let response = router
        .oneshot(json_request("POST", "/placements/companies", &body))
        .await
        .expect("route executes");
    assert_status(&response, StatusCode::CONFLICT);
}

#[tokio::test]
async fn company_payload_accepts_legacy_field_names() {
    let (service, _) = build_service();
    let body = json!({
        "companyName": "Legacy Corp",
        "companyType": "Service",
        "industry": "Consulting",
        "contactDetails": { "hrEmail": "talent@legacy.example" },
        "jobRoles": [{ "title": "Analyst" }],
        "eligibilityCriteria": { "minimumCGPA": 6.0, "maxBacklogs": 2 },
        "visitDetails": { "maxApplications": 40 }
    });

    let response = router_with_service(service)
        .oneshot(json_request("POST", "/placements/companies", &body))
        .await
        .expect("route executes");

    assert_status(&response, StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["eligibility"]["minimumGpa"], 6.0);
    assert_eq!(payload["visit"]["maxApplications"], 40);
}

#[tokio::test]
async fn apply_route_requires_student_identity() {
    let (service, _) = build_service();
    let company = register_company(&service, new_company("Acme Systems"));
    let body = serde_json::to_value(request_for(&company)).expect("serialize request");

    let response = router_with_service(service)
        .oneshot(json_request("POST", "/placements/apply", &body))
        .await
        .expect("route executes");

    assert_status(&response, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn apply_route_maps_policy_failures() {
    let (service, _) = build_service();
    let mut input = new_company("Acme Systems");
    input.visit.max_applications = Some(1);
    let company = register_company(&service, input);
    let router = router_with_service(service);
    let body = serde_json::to_value(request_for(&company)).expect("serialize request");

    let response = router
        .clone()
        .oneshot(student_request("POST", "/placements/apply", "stu-1", Some(&body)))
        .await
        .expect("route executes");
    assert_status(&response, StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["overallStatus"], "Applied");
    assert_eq!(payload["studentId"], "stu-1");

    let response = router
        .clone()
        .oneshot(student_request("POST", "/placements/apply", "stu-1", Some(&body)))
        .await
        .expect("route executes");
    assert_status(&response, StatusCode::CONFLICT);

    let response = router
        .clone()
        .oneshot(student_request("POST", "/placements/apply", "stu-2", Some(&body)))
        .await
        .expect("route executes");
    assert_status(&response, StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "Application limit reached for this company");

    let response = router
        .oneshot(student_request("POST", "/placements/apply", "stu-3", Some(&body)))
        .await
        .expect("route executes");
    assert_status(&response, StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "Minimum GPA required: 7");
}

#[tokio::test]
async fn status_route_records_rounds_and_offer_route_requires_selection() {
    let (service, _) = build_service();
    let company = register_company(&service, new_company("Acme Systems"));
    let record = apply_as(&service, "stu-1", &company);
    let router = router_with_service(service);
    let status_uri = format!("/placements/applications/{}/status", record.id.0);
    let offer_uri = format!("/placements/applications/{}/offer", record.id.0);

    let response = router
        .clone()
        .oneshot(json_request(
            "PATCH",
            &status_uri,
            &json!({ "roundName": "Test", "status": "Cleared", "score": 78 }),
        ))
        .await
        .expect("route executes");
    assert_status(&response, StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["overallStatus"], "Selected");
    assert_eq!(payload["selectionProcess"][0]["roundName"], "Test");

    let response = router
        .clone()
        .oneshot(json_request(
            "PATCH",
            &status_uri,
            &json!({ "roundName": "Interview", "status": "Scheduled", "roundType": "Technical" }),
        ))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload["overallStatus"], "In Process");

    let offer = json!({
        "salary": 800000,
        "joiningDate": (chrono::Utc::now().date_naive() + chrono::Duration::days(30)).to_string(),
        "designation": "Associate Engineer"
    });
    let response = router
        .clone()
        .oneshot(json_request("POST", &offer_uri, &offer))
        .await
        .expect("route executes");
    assert_status(&response, StatusCode::CONFLICT);

    router
        .clone()
        .oneshot(json_request(
            "PATCH",
            &status_uri,
            &json!({ "roundName": "Interview", "status": "Cleared" }),
        ))
        .await
        .expect("route executes");
    let response = router
        .oneshot(json_request("POST", &offer_uri, &offer))
        .await
        .expect("route executes");
    assert_status(&response, StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["offerDetails"]["offerStatus"], "Pending");
    assert_eq!(payload["offerDetails"]["salary"]["total"], 800000.0);
}

#[tokio::test]
async fn stage_route_rejects_backwards_moves() {
    let (service, _) = build_service();
    let company = register_company(&service, new_company("Acme Systems"));
    let record = apply_as(&service, "stu-1", &company);
    let router = router_with_service(service);
    let uri = format!("/placements/applications/{}/stage", record.id.0);

    let response = router
        .clone()
        .oneshot(json_request("PATCH", &uri, &json!({ "stage": "Shortlisted" })))
        .await
        .expect("route executes");
    assert_status(&response, StatusCode::OK);

    let response = router
        .oneshot(json_request("PATCH", &uri, &json!({ "stage": "Under Review" })))
        .await
        .expect("route executes");
    assert_status(&response, StatusCode::CONFLICT);
}

#[tokio::test]
async fn withdraw_route_accepts_empty_body() {
    let (service, _) = build_service();
    let company = register_company(&service, new_company("Acme Systems"));
    let record = apply_as(&service, "stu-1", &company);
    let uri = format!("/placements/applications/{}/withdraw", record.id.0);

    let response = router_with_service(service)
        .oneshot(student_request("POST", &uri, "stu-1", None))
        .await
        .expect("route executes");

    assert_status(&response, StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["overallStatus"], "Withdrawn");
}

#[tokio::test]
async fn staff_withdraw_route_needs_no_student_identity() {
    let (service, _) = build_service();
    let company = register_company(&service, new_company("Acme Systems"));
    let record = apply_as(&service, "stu-1", &company);
    let router = router_with_service(service);
    let uri = format!("/placements/applications/{}/withdraw/staff", record.id.0);

    let response = router
        .clone()
        .oneshot(json_request("POST", &uri, &json!({ "reason": "no-show" })))
        .await
        .expect("route executes");
    assert_status(&response, StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["overallStatus"], "Withdrawn");
    assert_eq!(payload["withdrawalReason"], "no-show");

    let response = router
        .oneshot(json_request("POST", &uri, &json!({})))
        .await
        .expect("route executes");
    assert_status(&response, StatusCode::CONFLICT);
}

#[tokio::test]
async fn eligibility_route_previews_for_the_caller() {
    let (service, _) = build_service();
    let company = register_company(&service, new_company("Acme Systems"));
    let router = router_with_service(service);
    let uri = format!("/placements/companies/{}/eligibility", company.id.0);

    let response = router
        .clone()
        .oneshot(student_request("GET", &uri, "stu-3", None))
        .await
        .expect("route executes");
    assert_status(&response, StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["eligible"], false);
    assert_eq!(payload["reason"], "Minimum GPA required: 7");

    let response = router
        .clone()
        .oneshot(student_request("GET", &uri, "stu-1", None))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload["eligible"], true);

    let response = router
        .oneshot(json_request("GET", &uri, &json!({})))
        .await
        .expect("route executes");
    assert_status(&response, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn offer_route_accepts_fractional_salary() {
    let (service, _) = build_service();
    let company = register_company(&service, new_company("Acme Systems"));
    let record = selected_application(&service, &company);
    let uri = format!("/placements/applications/{}/offer", record.id.0);

    let offer = json!({
        "salary": { "base": 7.5, "variable": 0.5 },
        "joiningDate": (chrono::Utc::now().date_naive() + chrono::Duration::days(30)).to_string(),
        "designation": "Graduate Engineer"
    });
    let response = router_with_service(service)
        .oneshot(json_request("POST", &uri, &offer))
        .await
        .expect("route executes");

    assert_status(&response, StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["offerDetails"]["salary"]["base"], 7.5);
    assert_eq!(payload["offerDetails"]["salary"]["total"], 8.0);
}

#[tokio::test]
async fn my_applications_lists_only_the_callers_records() {
    let (service, _) = build_service();
    let company = register_company(&service, new_company("Acme Systems"));
    let other = register_company(&service, new_company("Globex"));
    apply_as(&service, "stu-1", &company);
    apply_as(&service, "stu-1", &other);
    apply_as(&service, "stu-2", &company);

    let response = router_with_service(service)
        .oneshot(student_request(
            "GET",
            "/placements/applications/mine",
            "stu-1",
            None,
        ))
        .await
        .expect("route executes");

    assert_status(&response, StatusCode::OK);
    let payload = read_json_body(response).await;
    let applications = payload.as_array().expect("array");
    assert_eq!(applications.len(), 2);
    assert!(applications
        .iter()
        .all(|application| application["studentId"] == "stu-1"));
}

#[tokio::test]
async fn unknown_application_is_not_found() {
    let (service, _) = build_service();

    let response = router::application_handler(
        State(service),
        tenant_headers(),
        Path("app-missing".to_string()),
    )
    .await;

    assert_status(&response, StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "Application not found");
}

#[tokio::test]
async fn repository_failure_is_opaque() {
    let unavailable = Arc::new(UnavailableRepository);
    let service = Arc::new(PlacementService::new(
        unavailable.clone(),
        unavailable,
        PlacementConfig::default(),
    ));

    let response = router::stats_handler(State(service), tenant_headers()).await;

    assert_status(&response, StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert_eq!(payload, json!({ "error": "Server error" }));
}

#[tokio::test]
async fn eligible_students_and_dashboard_routes_respond() {
    let (service, _) = build_service();
    let company = register_company(&service, new_company("Acme Systems"));
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(json_request(
            "GET",
            &format!("/placements/companies/{}/eligible-students", company.id.0),
            &Value::Null,
        ))
        .await
        .expect("route executes");
    assert_status(&response, StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["totalEligible"], 2);
    assert_eq!(payload["eligibleStudents"][0]["id"], "stu-1");

    let response = router
        .oneshot(json_request("GET", "/placements/dashboard", &Value::Null))
        .await
        .expect("route executes");
    assert_status(&response, StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["totalCompanies"], 1);
}
