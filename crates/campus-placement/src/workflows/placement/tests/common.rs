use std::collections::BTreeSet;
use std::sync::Arc;

use axum::http::{Request, StatusCode};
use axum::response::Response;
use chrono::{Duration, Utc};
use serde_json::Value;

use crate::config::PlacementConfig;
use crate::workflows::placement::application::{ApplicationRecord, ApplicationRequest};
use crate::workflows::placement::capacity::CapacityGuard;
use crate::workflows::placement::domain::{
    ApplicationId, Company, CompanyId, ContactDetails, CourseId, DepartmentId,
    EligibilityCriteria, NewCompany, NewJobRole, StudentId, StudentRecord, VisitDetails,
};
use crate::workflows::placement::memory::InMemoryPlacementStore;
use crate::workflows::placement::offer::{OfferTerms, SalaryInput};
use crate::workflows::placement::repository::{
    ApplicationFilter, PlacementRepository, RepositoryError, StudentDirectory,
};
use crate::workflows::placement::selection::{RoundStatus, RoundUpdate};
use crate::workflows::placement::service::PlacementService;
use crate::workflows::placement::tenant::TenantScope;
use crate::workflows::placement::placement_router;

pub(super) type MemoryService = PlacementService<InMemoryPlacementStore, InMemoryPlacementStore>;

pub(super) const TENANT: &str = "north-campus";

pub(super) fn scope() -> TenantScope {
    TenantScope::new(TENANT).expect("valid tenant")
}

pub(super) fn other_scope() -> TenantScope {
    TenantScope::new("south-campus").expect("valid tenant")
}

pub(super) fn student(id: &str, gpa: f32) -> StudentRecord {
    StudentRecord {
        id: StudentId(id.to_string()),
        name: format!("Student {id}"),
        email: format!("{id}@example.edu"),
        phone: None,
        course_id: CourseId("btech".to_string()),
        department_id: DepartmentId("cse".to_string()),
        current_semester: Some(7),
        graduation_year: Some(2026),
        gpa,
        backlogs: Vec::new(),
        is_active: true,
    }
}

pub(super) fn with_backlogs(mut record: StudentRecord, count: usize) -> StudentRecord {
    record.backlogs = (1..=count).map(|n| format!("Subject {n}")).collect();
    record
}

pub(super) fn criteria(minimum_gpa: Option<f32>, max_backlogs: Option<u32>) -> EligibilityCriteria {
    EligibilityCriteria {
        minimum_gpa,
        max_backlogs,
        ..EligibilityCriteria::default()
    }
}

pub(super) fn course_set(ids: &[&str]) -> BTreeSet<CourseId> {
    ids.iter().map(|id| CourseId(id.to_string())).collect()
}

pub(super) fn new_company(name: &str) -> NewCompany {
    NewCompany {
        name: name.to_string(),
        company_type: "Product".to_string(),
        industry: "Software".to_string(),
        company_size: Some("1000+".to_string()),
        contact: ContactDetails {
            hr_name: Some("Priya Menon".to_string()),
            hr_email: "hr@example.com".to_string(),
            phone: None,
        },
        job_roles: vec![NewJobRole {
            title: "Graduate Engineer".to_string(),
            description: None,
            openings: Some(10),
            package: Some(1_200_000.0),
        }],
        eligibility: criteria(Some(7.0), Some(0)),
        visit: VisitDetails {
            visit_date: Some(Utc::now().date_naive() + Duration::days(14)),
            registration_deadline: Some(Utc::now().date_naive() + Duration::days(7)),
            rounds: vec!["Test".to_string(), "Interview".to_string()],
            max_applications: None,
            current_applications: 0,
        },
    }
}

pub(super) fn build_service() -> (Arc<MemoryService>, Arc<InMemoryPlacementStore>) {
    build_service_with(PlacementConfig::default())
}

pub(super) fn build_service_with(
    config: PlacementConfig,
) -> (Arc<MemoryService>, Arc<InMemoryPlacementStore>) {
    let store = Arc::new(InMemoryPlacementStore::new());
    store
        .seed_students(
            &scope(),
            vec![
                student("stu-1", 8.4),
                student("stu-2", 7.6),
                student("stu-3", 6.5),
                with_backlogs(student("stu-4", 9.1), 1),
            ],
        )
        .expect("seed students");
    let service = Arc::new(PlacementService::new(store.clone(), store.clone(), config));
    (service, store)
}

pub(super) fn register_company(service: &MemoryService, input: NewCompany) -> Company {
    service
        .create_company(&scope(), input)
        .expect("company registered")
}

pub(super) fn request_for(company: &Company) -> ApplicationRequest {
    ApplicationRequest {
        company_id: company.id.0.clone(),
        job_role_id: company.job_roles[0].id.0.clone(),
        ..ApplicationRequest::default()
    }
}

pub(super) fn apply_as(
    service: &MemoryService,
    student_id: &str,
    company: &Company,
) -> ApplicationRecord {
    service
        .apply(
            &scope(),
            &StudentId(student_id.to_string()),
            request_for(company),
        )
        .expect("application accepted")
}

pub(super) fn round(name: &str, status: RoundStatus) -> RoundUpdate {
    RoundUpdate::new(name, status)
}

pub(super) fn offer_terms(base: f64) -> OfferTerms {
    OfferTerms {
        salary: SalaryInput::Breakdown {
            base,
            variable: 100_000.0,
        },
        joining_date: Utc::now().date_naive() + Duration::days(60),
        location: Some("Bengaluru".to_string()),
        designation: "Software Engineer".to_string(),
    }
}

/// Walks an application through two cleared rounds.
pub(super) fn selected_application(service: &MemoryService, company: &Company) -> ApplicationRecord {
    let record = apply_as(service, "stu-1", company);
    service
        .record_round(&scope(), &record.id, round("Test", RoundStatus::Cleared))
        .expect("test round");
    service
        .record_round(&scope(), &record.id, round("Interview", RoundStatus::Cleared))
        .expect("interview round")
}

/// Repository whose storage is always unreachable.
pub(super) struct UnavailableRepository;

impl PlacementRepository for UnavailableRepository {
    fn insert_company(
        &self,
        _scope: &TenantScope,
        _company: Company,
    ) -> Result<Company, RepositoryError> {
        Err(unavailable())
    }

    fn update_company(
        &self,
        _scope: &TenantScope,
        _company: Company,
        _guard: &CapacityGuard,
    ) -> Result<Company, RepositoryError> {
        Err(unavailable())
    }

    fn fetch_company(
        &self,
        _scope: &TenantScope,
        _id: &CompanyId,
    ) -> Result<Option<Company>, RepositoryError> {
        Err(unavailable())
    }

    fn companies(&self, _scope: &TenantScope) -> Result<Vec<Company>, RepositoryError> {
        Err(unavailable())
    }

    fn create_application(
        &self,
        _scope: &TenantScope,
        _record: ApplicationRecord,
        _guard: &CapacityGuard,
    ) -> Result<ApplicationRecord, RepositoryError> {
        Err(unavailable())
    }

    fn update_application<E, F>(
        &self,
        _scope: &TenantScope,
        _id: &ApplicationId,
        _change: F,
    ) -> Result<Result<ApplicationRecord, E>, RepositoryError>
    where
        F: FnOnce(&mut ApplicationRecord) -> Result<(), E>,
    {
        Err(unavailable())
    }

    fn fetch_application(
        &self,
        _scope: &TenantScope,
        _id: &ApplicationId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(unavailable())
    }

    fn applications(
        &self,
        _scope: &TenantScope,
        _filter: &ApplicationFilter,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Err(unavailable())
    }
}

impl StudentDirectory for UnavailableRepository {
    fn fetch_student(
        &self,
        _scope: &TenantScope,
        _id: &StudentId,
    ) -> Result<Option<StudentRecord>, RepositoryError> {
        Err(unavailable())
    }

    fn active_students(&self, _scope: &TenantScope) -> Result<Vec<StudentRecord>, RepositoryError> {
        Err(unavailable())
    }
}

fn unavailable() -> RepositoryError {
    RepositoryError::Unavailable("connection refused".to_string())
}

pub(super) fn router_with_service(service: Arc<MemoryService>) -> axum::Router {
    placement_router(service)
}

pub(super) fn json_request(method: &str, uri: &str, body: &Value) -> Request<axum::body::Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .header("x-tenant-id", TENANT)
        .body(axum::body::Body::from(
            serde_json::to_vec(body).expect("serialize body"),
        ))
        .expect("request builds")
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
