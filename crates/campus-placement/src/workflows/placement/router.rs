use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::application::ApplicationRequest;
use super::capacity::CapacityError;
use super::domain::{ApplicationId, CompanyId, CompanyUpdate, NewCompany, StudentId};
use super::offer::{OfferError, OfferTerms};
use super::repository::{PlacementRepository, RepositoryError, StudentDirectory};
use super::selection::{OverallStatus, RoundUpdate, SelectionError};
use super::service::{CompanyQuery, PlacementService, PlacementServiceError};
use super::tenant::TenantScope;

pub const TENANT_HEADER: &str = "x-tenant-id";
pub const STUDENT_HEADER: &str = "x-student-id";

type Shared<R, D> = State<Arc<PlacementService<R, D>>>;

/// Router exposing company, application, offer and analytics endpoints.
pub fn placement_router<R, D>(service: Arc<PlacementService<R, D>>) -> Router
where
    R: PlacementRepository + 'static,
    D: StudentDirectory + 'static,
{
    Router::new()
        .route(
            "/placements/companies",
            post(create_company_handler::<R, D>).get(list_companies_handler::<R, D>),
        )
        .route(
            "/placements/companies/:company_id",
            patch(update_company_handler::<R, D>).delete(deactivate_company_handler::<R, D>),
        )
        .route(
            "/placements/companies/:company_id/eligible-students",
            get(eligible_students_handler::<R, D>),
        )
        .route(
            "/placements/companies/:company_id/eligibility",
            get(eligibility_handler::<R, D>),
        )
        .route("/placements/apply", post(apply_handler::<R, D>))
        .route(
            "/placements/applications/mine",
            get(my_applications_handler::<R, D>),
        )
        .route(
            "/placements/applications/:application_id",
            get(application_handler::<R, D>),
        )
        .route(
            "/placements/applications/:application_id/status",
            patch(record_round_handler::<R, D>),
        )
        .route(
            "/placements/applications/:application_id/stage",
            patch(stage_handler::<R, D>),
        )
        .route(
            "/placements/applications/:application_id/withdraw",
            post(withdraw_handler::<R, D>),
        )
        .route(
            "/placements/applications/:application_id/withdraw/staff",
            post(staff_withdraw_handler::<R, D>),
        )
        .route(
            "/placements/applications/:application_id/offer",
            post(create_offer_handler::<R, D>),
        )
        .route(
            "/placements/applications/:application_id/offer/accept",
            post(accept_offer_handler::<R, D>),
        )
        .route(
            "/placements/applications/:application_id/offer/reject",
            post(reject_offer_handler::<R, D>),
        )
        .route(
            "/placements/applications/:application_id/offer/expire",
            post(expire_offer_handler::<R, D>),
        )
        .route("/placements/stats", get(stats_handler::<R, D>))
        .route("/placements/dashboard", get(dashboard_handler::<R, D>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct StageChange {
    stage: OverallStatus,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReasonBody {
    #[serde(default)]
    reason: Option<String>,
}

/// Resolve the tenant scope from the request headers.
pub(crate) fn tenant_scope(headers: &HeaderMap) -> Result<TenantScope, Response> {
    let raw = headers
        .get(TENANT_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    TenantScope::new(raw).map_err(|err| {
        let payload = json!({ "error": err.to_string() });
        (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
    })
}

fn student_identity(headers: &HeaderMap) -> Result<StudentId, Response> {
    headers
        .get(STUDENT_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| StudentId(value.to_string()))
        .ok_or_else(|| {
            let payload = json!({ "error": "student identity is required" });
            (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
        })
}

fn scoped_student(headers: &HeaderMap) -> Result<(TenantScope, StudentId), Response> {
    Ok((tenant_scope(headers)?, student_identity(headers)?))
}

fn respond<T: serde::Serialize>(
    status: StatusCode,
    result: Result<T, PlacementServiceError>,
) -> Response {
    match result {
        Ok(body) => (status, axum::Json(body)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn create_company_handler<R, D>(
    State(service): Shared<R, D>,
    headers: HeaderMap,
    axum::Json(input): axum::Json<NewCompany>,
) -> Response
where
    R: PlacementRepository + 'static,
    D: StudentDirectory + 'static,
{
    let scope = match tenant_scope(&headers) {
        Ok(scope) => scope,
        Err(response) => return response,
    };
    respond(StatusCode::CREATED, service.create_company(&scope, input))
}

pub(crate) async fn list_companies_handler<R, D>(
    State(service): Shared<R, D>,
    headers: HeaderMap,
    Query(query): Query<CompanyQuery>,
) -> Response
where
    R: PlacementRepository + 'static,
    D: StudentDirectory + 'static,
{
    let scope = match tenant_scope(&headers) {
        Ok(scope) => scope,
        Err(response) => return response,
    };
    respond(StatusCode::OK, service.list_companies(&scope, query))
}

pub(crate) async fn update_company_handler<R, D>(
    State(service): Shared<R, D>,
    headers: HeaderMap,
    Path(company_id): Path<String>,
    axum::Json(update): axum::Json<CompanyUpdate>,
) -> Response
where
    R: PlacementRepository + 'static,
    D: StudentDirectory + 'static,
{
    let scope = match tenant_scope(&headers) {
        Ok(scope) => scope,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        service.update_company(&scope, &CompanyId(company_id), update),
    )
}

pub(crate) async fn deactivate_company_handler<R, D>(
    State(service): Shared<R, D>,
    headers: HeaderMap,
    Path(company_id): Path<String>,
) -> Response
where
    R: PlacementRepository + 'static,
    D: StudentDirectory + 'static,
{
    let scope = match tenant_scope(&headers) {
        Ok(scope) => scope,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        service.deactivate_company(&scope, &CompanyId(company_id)),
    )
}

pub(crate) async fn eligible_students_handler<R, D>(
    State(service): Shared<R, D>,
    headers: HeaderMap,
    Path(company_id): Path<String>,
) -> Response
where
    R: PlacementRepository + 'static,
    D: StudentDirectory + 'static,
{
    let scope = match tenant_scope(&headers) {
        Ok(scope) => scope,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        service.eligible_students(&scope, &CompanyId(company_id)),
    )
}

/// Eligibility preview for the calling student. Nothing is stored.
pub(crate) async fn eligibility_handler<R, D>(
    State(service): Shared<R, D>,
    headers: HeaderMap,
    Path(company_id): Path<String>,
) -> Response
where
    R: PlacementRepository + 'static,
    D: StudentDirectory + 'static,
{
    let (scope, student) = match scoped_student(&headers) {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        service.check_eligibility(&scope, &CompanyId(company_id), &student),
    )
}

pub(crate) async fn apply_handler<R, D>(
    State(service): Shared<R, D>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<ApplicationRequest>,
) -> Response
where
    R: PlacementRepository + 'static,
    D: StudentDirectory + 'static,
{
    let (scope, student) = match scoped_student(&headers) {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    respond(StatusCode::CREATED, service.apply(&scope, &student, request))
}

pub(crate) async fn my_applications_handler<R, D>(
    State(service): Shared<R, D>,
    headers: HeaderMap,
) -> Response
where
    R: PlacementRepository + 'static,
    D: StudentDirectory + 'static,
{
    let (scope, student) = match scoped_student(&headers) {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        service.student_applications(&scope, &student),
    )
}

pub(crate) async fn application_handler<R, D>(
    State(service): Shared<R, D>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Response
where
    R: PlacementRepository + 'static,
    D: StudentDirectory + 'static,
{
    let scope = match tenant_scope(&headers) {
        Ok(scope) => scope,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        service.get_application(&scope, &ApplicationId(application_id)),
    )
}

pub(crate) async fn record_round_handler<R, D>(
    State(service): Shared<R, D>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    axum::Json(update): axum::Json<RoundUpdate>,
) -> Response
where
    R: PlacementRepository + 'static,
    D: StudentDirectory + 'static,
{
    let scope = match tenant_scope(&headers) {
        Ok(scope) => scope,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        service.record_round(&scope, &ApplicationId(application_id), update),
    )
}

pub(crate) async fn stage_handler<R, D>(
    State(service): Shared<R, D>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    axum::Json(change): axum::Json<StageChange>,
) -> Response
where
    R: PlacementRepository + 'static,
    D: StudentDirectory + 'static,
{
    let scope = match tenant_scope(&headers) {
        Ok(scope) => scope,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        service.advance_stage(&scope, &ApplicationId(application_id), change.stage),
    )
}

pub(crate) async fn withdraw_handler<R, D>(
    State(service): Shared<R, D>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    body: Option<axum::Json<ReasonBody>>,
) -> Response
where
    R: PlacementRepository + 'static,
    D: StudentDirectory + 'static,
{
    let (scope, student) = match scoped_student(&headers) {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    let reason = body.and_then(|axum::Json(body)| body.reason);
    respond(
        StatusCode::OK,
        service.withdraw(&scope, &ApplicationId(application_id), &student, reason),
    )
}

pub(crate) async fn staff_withdraw_handler<R, D>(
    State(service): Shared<R, D>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    body: Option<axum::Json<ReasonBody>>,
) -> Response
where
    R: PlacementRepository + 'static,
    D: StudentDirectory + 'static,
{
    let scope = match tenant_scope(&headers) {
        Ok(scope) => scope,
        Err(response) => return response,
    };
    let reason = body.and_then(|axum::Json(body)| body.reason);
    respond(
        StatusCode::OK,
        service.withdraw_by_staff(&scope, &ApplicationId(application_id), reason),
    )
}

pub(crate) async fn create_offer_handler<R, D>(
    State(service): Shared<R, D>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    axum::Json(terms): axum::Json<OfferTerms>,
) -> Response
where
    R: PlacementRepository + 'static,
    D: StudentDirectory + 'static,
{
    let scope = match tenant_scope(&headers) {
        Ok(scope) => scope,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        service.create_offer(&scope, &ApplicationId(application_id), terms),
    )
}

pub(crate) async fn accept_offer_handler<R, D>(
    State(service): Shared<R, D>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Response
where
    R: PlacementRepository + 'static,
    D: StudentDirectory + 'static,
{
    let (scope, student) = match scoped_student(&headers) {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        service.accept_offer(&scope, &ApplicationId(application_id), &student),
    )
}

pub(crate) async fn reject_offer_handler<R, D>(
    State(service): Shared<R, D>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    body: Option<axum::Json<ReasonBody>>,
) -> Response
where
    R: PlacementRepository + 'static,
    D: StudentDirectory + 'static,
{
    let (scope, student) = match scoped_student(&headers) {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    let reason = body.and_then(|axum::Json(body)| body.reason);
    respond(
        StatusCode::OK,
        service.reject_offer(&scope, &ApplicationId(application_id), &student, reason),
    )
}

pub(crate) async fn expire_offer_handler<R, D>(
    State(service): Shared<R, D>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Response
where
    R: PlacementRepository + 'static,
    D: StudentDirectory + 'static,
{
    let scope = match tenant_scope(&headers) {
        Ok(scope) => scope,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        service.expire_offer(&scope, &ApplicationId(application_id)),
    )
}

pub(crate) async fn stats_handler<R, D>(
    State(service): Shared<R, D>,
    headers: HeaderMap,
) -> Response
where
    R: PlacementRepository + 'static,
    D: StudentDirectory + 'static,
{
    let scope = match tenant_scope(&headers) {
        Ok(scope) => scope,
        Err(response) => return response,
    };
    respond(StatusCode::OK, service.stats(&scope))
}

pub(crate) async fn dashboard_handler<R, D>(
    State(service): Shared<R, D>,
    headers: HeaderMap,
) -> Response
where
    R: PlacementRepository + 'static,
    D: StudentDirectory + 'static,
{
    let scope = match tenant_scope(&headers) {
        Ok(scope) => scope,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        service.dashboard(&scope, Utc::now().date_naive()),
    )
}

impl PlacementServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PlacementServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            PlacementServiceError::CompanyExists => StatusCode::CONFLICT,
            PlacementServiceError::CompanyNotFound
            | PlacementServiceError::CompanyUnavailable
            | PlacementServiceError::JobRoleUnavailable
            | PlacementServiceError::StudentNotFound
            | PlacementServiceError::ApplicationNotFound => StatusCode::NOT_FOUND,
            PlacementServiceError::RegistrationClosed(_)
            | PlacementServiceError::Ineligible(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PlacementServiceError::Selection(SelectionError::MissingRoundName) => {
                StatusCode::BAD_REQUEST
            }
            PlacementServiceError::Selection(_) => StatusCode::CONFLICT,
            PlacementServiceError::Offer(
                OfferError::MissingDesignation
                | OfferError::InvalidSalary
                | OfferError::JoiningBeforeOffer(_),
            ) => StatusCode::BAD_REQUEST,
            PlacementServiceError::Offer(_) => StatusCode::CONFLICT,
            PlacementServiceError::Repository(err) => match err {
                RepositoryError::DuplicateApplication => StatusCode::CONFLICT,
                RepositoryError::Capacity(CapacityError::LimitReached { .. }) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                RepositoryError::Capacity(CapacityError::BelowCurrent { .. }) => {
                    StatusCode::BAD_REQUEST
                }
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Capacity(CapacityError::CounterOverflow)
                | RepositoryError::Conflict
                | RepositoryError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for PlacementServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "placement request failed");
            "Server error".to_string()
        } else {
            self.to_string()
        };

        let payload = json!({ "error": message });
        (status, axum::Json(payload)).into_response()
    }
}
