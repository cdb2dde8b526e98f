use super::application::ApplicationRecord;
use super::capacity::{CapacityError, CapacityGuard};
use super::domain::{ApplicationId, Company, CompanyId, StudentId, StudentRecord};
use super::tenant::TenantScope;

/// Narrowing applied by [`PlacementRepository::applications`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationFilter {
    pub student_id: Option<StudentId>,
    pub company_id: Option<CompanyId>,
}

impl ApplicationFilter {
    pub fn for_student(student_id: StudentId) -> Self {
        Self {
            student_id: Some(student_id),
            company_id: None,
        }
    }

    pub fn for_company(company_id: CompanyId) -> Self {
        Self {
            student_id: None,
            company_id: Some(company_id),
        }
    }

    pub fn matches(&self, record: &ApplicationRecord) -> bool {
        self.student_id
            .as_ref()
            .map_or(true, |id| &record.student_id == id)
            && self
                .company_id
                .as_ref()
                .map_or(true, |id| &record.company_id == id)
    }
}

/// Storage for companies and applications. Every call is tenant scoped.
pub trait PlacementRepository: Send + Sync {
    /// Fails with `Conflict` when the tenant already has a company of that name.
    fn insert_company(
        &self,
        scope: &TenantScope,
        company: Company,
    ) -> Result<Company, RepositoryError>;

    /// Replace a company. The stored application counter is kept, and the
    /// new cap is validated against it with `guard`.
    fn update_company(
        &self,
        scope: &TenantScope,
        company: Company,
        guard: &CapacityGuard,
    ) -> Result<Company, RepositoryError>;

    fn fetch_company(
        &self,
        scope: &TenantScope,
        id: &CompanyId,
    ) -> Result<Option<Company>, RepositoryError>;

    fn companies(&self, scope: &TenantScope) -> Result<Vec<Company>, RepositoryError>;

    /// Persist a new application and count it against the company cap.
    ///
    /// Implementations must run the duplicate check, `guard.reserve`, the
    /// insert, and the counter write as one atomic step.
    fn create_application(
        &self,
        scope: &TenantScope,
        record: ApplicationRecord,
        guard: &CapacityGuard,
    ) -> Result<ApplicationRecord, RepositoryError>;

    /// Run `change` against the stored application and persist the result
    /// as one atomic step. Nothing is written when `change` fails; its error
    /// comes back as the inner result.
    fn update_application<E, F>(
        &self,
        scope: &TenantScope,
        id: &ApplicationId,
        change: F,
    ) -> Result<Result<ApplicationRecord, E>, RepositoryError>
    where
        F: FnOnce(&mut ApplicationRecord) -> Result<(), E>;

    fn fetch_application(
        &self,
        scope: &TenantScope,
        id: &ApplicationId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError>;

    fn applications(
        &self,
        scope: &TenantScope,
        filter: &ApplicationFilter,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError>;
}

/// Read-only view of the student-management subsystem.
pub trait StudentDirectory: Send + Sync {
    fn fetch_student(
        &self,
        scope: &TenantScope,
        id: &StudentId,
    ) -> Result<Option<StudentRecord>, RepositoryError>;

    fn active_students(&self, scope: &TenantScope) -> Result<Vec<StudentRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("You have already applied to this company")]
    DuplicateApplication,
    #[error(transparent)]
    Capacity(#[from] CapacityError),
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
