use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::analytics::{self, PlacementDashboard, PlacementStats};
use super::application::{ApplicationRecord, ApplicationRequest, StudentSnapshot};
use super::capacity::CapacityGuard;
use super::domain::{
    ApplicationId, Company, CompanyId, CompanyStatus, CompanyUpdate, EligibilityCriteria, JobRole,
    JobRoleId, NewCompany, StudentId, StudentRecord,
};
use super::eligibility::{self, EligibilityEvaluator, EligibilityFailure, EligibilityOutcome};
use super::offer::{OfferError, OfferTerms};
use super::repository::{ApplicationFilter, PlacementRepository, RepositoryError, StudentDirectory};
use super::selection::{OverallStatus, RoundUpdate, SelectionError, SelectionProcess};
use super::tenant::TenantScope;
use crate::config::PlacementConfig;

static COMPANY_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static JOB_ROLE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_company_id() -> CompanyId {
    let id = COMPANY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CompanyId(format!("cmp-{id:06}"))
}

fn next_job_role_id() -> JobRoleId {
    let id = JOB_ROLE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    JobRoleId(format!("role-{id:06}"))
}

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// Filters and paging for company listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyQuery {
    pub status: Option<CompanyStatus>,
    pub industry: Option<String>,
    pub company_type: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current: usize,
    pub pages: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPage {
    pub companies: Vec<Company>,
    pub pagination: Pagination,
}

/// Students who currently satisfy a company's criteria and have not applied.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibleStudents {
    pub eligible_students: Vec<StudentRecord>,
    pub total_eligible: usize,
    pub already_applied: usize,
}

/// Service composing the evaluator, capacity guard, state machine and offers.
pub struct PlacementService<R, D> {
    repository: Arc<R>,
    directory: Arc<D>,
    evaluator: EligibilityEvaluator,
    capacity: CapacityGuard,
    config: PlacementConfig,
}

impl<R, D> PlacementService<R, D>
where
    R: PlacementRepository + 'static,
    D: StudentDirectory + 'static,
{
    pub fn new(repository: Arc<R>, directory: Arc<D>, config: PlacementConfig) -> Self {
        Self {
            repository,
            directory,
            evaluator: EligibilityEvaluator::new(config.strict_eligibility),
            capacity: CapacityGuard,
            config,
        }
    }

    pub fn create_company(
        &self,
        scope: &TenantScope,
        input: NewCompany,
    ) -> Result<Company, PlacementServiceError> {
        if input.name.trim().is_empty()
            || input.company_type.trim().is_empty()
            || input.industry.trim().is_empty()
            || input.contact.hr_email.trim().is_empty()
        {
            return Err(PlacementServiceError::Validation(
                "Company name, type, industry, and HR email are required".to_string(),
            ));
        }
        validate_criteria(&input.eligibility)?;
        if input.job_roles.iter().any(|role| role.title.trim().is_empty()) {
            return Err(PlacementServiceError::Validation(
                "every job role needs a title".to_string(),
            ));
        }

        let job_roles = input
            .job_roles
            .into_iter()
            .map(|role| JobRole {
                id: next_job_role_id(),
                title: role.title.trim().to_string(),
                description: role.description,
                openings: role.openings,
                package: role.package,
                is_active: true,
            })
            .collect();

        let mut visit = input.visit;
        visit.current_applications = 0;

        let company = Company {
            id: next_company_id(),
            tenant: scope.tenant().clone(),
            name: input.name.trim().to_string(),
            company_type: input.company_type.trim().to_string(),
            industry: input.industry.trim().to_string(),
            company_size: input.company_size,
            contact: input.contact,
            job_roles,
            eligibility: input.eligibility,
            visit,
            status: CompanyStatus::Active,
            is_active: true,
            created_at: Utc::now(),
        };

        let stored = self
            .repository
            .insert_company(scope, company)
            .map_err(|err| match err {
                RepositoryError::Conflict => PlacementServiceError::CompanyExists,
                other => self.internal(scope, "insert company", other),
            })?;

        info!(tenant = %scope.tenant(), company = %stored.id.0, name = %stored.name, "placement company registered");
        Ok(stored)
    }

    pub fn update_company(
        &self,
        scope: &TenantScope,
        company_id: &CompanyId,
        update: CompanyUpdate,
    ) -> Result<Company, PlacementServiceError> {
        let mut company = self.company(scope, company_id)?;

        if let Some(status) = update.status {
            company.status = status;
        }
        if let Some(criteria) = update.eligibility {
            validate_criteria(&criteria)?;
            company.eligibility = criteria;
        }
        if update.clear_max_applications {
            company.visit.max_applications = None;
        } else if let Some(max) = update.max_applications {
            company.visit.max_applications = Some(max);
        }
        if let Some(deadline) = update.registration_deadline {
            company.visit.registration_deadline = Some(deadline);
        }
        if let Some(visit_date) = update.visit_date {
            company.visit.visit_date = Some(visit_date);
        }
        for (role_id, active) in update.job_roles_active {
            let role = company
                .job_roles
                .iter_mut()
                .find(|role| role.id == role_id)
                .ok_or(PlacementServiceError::JobRoleUnavailable)?;
            role.is_active = active;
        }

        self.repository
            .update_company(scope, company, &self.capacity)
            .map_err(|err| self.repository_error(scope, "update company", err))
    }

    /// Soft-delete: the company stays on record for existing applications.
    pub fn deactivate_company(
        &self,
        scope: &TenantScope,
        company_id: &CompanyId,
    ) -> Result<Company, PlacementServiceError> {
        let mut company = self.company(scope, company_id)?;
        company.is_active = false;
        company.status = CompanyStatus::Inactive;

        let stored = self
            .repository
            .update_company(scope, company, &self.capacity)
            .map_err(|err| self.repository_error(scope, "deactivate company", err))?;
        info!(tenant = %scope.tenant(), company = %stored.id.0, "placement company deactivated");
        Ok(stored)
    }

    /// Active companies, newest first, one page at a time.
    pub fn list_companies(
        &self,
        scope: &TenantScope,
        query: CompanyQuery,
    ) -> Result<CompanyPage, PlacementServiceError> {
        let mut companies: Vec<Company> = self
            .repository
            .companies(scope)
            .map_err(|err| self.internal(scope, "list companies", err))?
            .into_iter()
            .filter(|company| company.is_active)
            .filter(|company| query.status.map_or(true, |status| company.status == status))
            .filter(|company| {
                query
                    .industry
                    .as_deref()
                    .map_or(true, |industry| company.industry.eq_ignore_ascii_case(industry))
            })
            .filter(|company| {
                query
                    .company_type
                    .as_deref()
                    .map_or(true, |kind| company.company_type.eq_ignore_ascii_case(kind))
            })
            .collect();
        companies.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let limit = query
            .limit
            .unwrap_or(self.config.default_page_size)
            .clamp(1, self.config.max_page_size());
        let page = query.page.unwrap_or(1).max(1);
        let total = companies.len();
        let pages = total.div_ceil(limit);

        let companies = companies
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        Ok(CompanyPage {
            companies,
            pagination: Pagination {
                current: page,
                pages,
                total,
            },
        })
    }

    /// Submit an application: validation, student and company lookups,
    /// eligibility, then the atomic uniqueness/capacity/insert step.
    pub fn apply(
        &self,
        scope: &TenantScope,
        student_id: &StudentId,
        request: ApplicationRequest,
    ) -> Result<ApplicationRecord, PlacementServiceError> {
        let company_id = request.company_id.trim();
        let job_role_id = request.job_role_id.trim();
        if company_id.is_empty() || job_role_id.is_empty() {
            return Err(PlacementServiceError::Validation(
                "Company ID and job role ID are required".to_string(),
            ));
        }
        let company_id = CompanyId(company_id.to_string());
        let job_role_id = JobRoleId(job_role_id.to_string());

        let student = self.student(scope, student_id)?;

        let company = self
            .repository
            .fetch_company(scope, &company_id)
            .map_err(|err| self.internal(scope, "fetch company", err))?
            .filter(Company::accepts_applications)
            .ok_or(PlacementServiceError::CompanyUnavailable)?;

        if !company
            .job_role(&job_role_id)
            .is_some_and(|role| role.is_active)
        {
            return Err(PlacementServiceError::JobRoleUnavailable);
        }

        let today = Utc::now().date_naive();
        if !company.registration_open_on(today) {
            if let Some(deadline) = company.visit.registration_deadline {
                warn!(tenant = %scope.tenant(), company = %company.id.0, "application after registration deadline");
                return Err(PlacementServiceError::RegistrationClosed(deadline));
            }
        }

        if let Err(failure) = self.evaluator.check_submission(&company.eligibility, &student) {
            warn!(
                tenant = %scope.tenant(),
                company = %company.id.0,
                student = %student.id.0,
                reason = %failure,
                "ineligible placement application"
            );
            return Err(failure.into());
        }

        debug!(
            tenant = %scope.tenant(),
            company = %company.id.0,
            remaining = ?self.capacity.remaining(&company.visit),
            "capacity before submission"
        );

        let record = ApplicationRecord {
            id: next_application_id(),
            tenant: scope.tenant().clone(),
            student_id: student.id.clone(),
            company_id: company.id.clone(),
            job_role_id,
            applied_at: Utc::now(),
            student: StudentSnapshot::capture(&student, request.student_details),
            selection: SelectionProcess::default(),
            overall_status: OverallStatus::Applied,
            offer: None,
            withdrawal_reason: None,
        };

        let stored = self
            .repository
            .create_application(scope, record, &self.capacity)
            .map_err(|err| self.repository_error(scope, "create application", err))?;

        info!(
            tenant = %scope.tenant(),
            application = %stored.id.0,
            company = %stored.company_id.0,
            student = %stored.student_id.0,
            "placement application submitted"
        );
        Ok(stored)
    }

    /// Evaluate a student against a company without applying.
    pub fn check_eligibility(
        &self,
        scope: &TenantScope,
        company_id: &CompanyId,
        student_id: &StudentId,
    ) -> Result<EligibilityOutcome, PlacementServiceError> {
        let company = self.company(scope, company_id)?;
        let student = self.student(scope, student_id)?;
        Ok(eligibility::evaluate(
            &company.eligibility,
            &student,
            self.evaluator.submission_mode(),
        ))
    }

    /// The student's own applications, most recent first.
    pub fn student_applications(
        &self,
        scope: &TenantScope,
        student_id: &StudentId,
    ) -> Result<Vec<ApplicationRecord>, PlacementServiceError> {
        let student = self.student(scope, student_id)?;
        let mut applications = self
            .repository
            .applications(scope, &ApplicationFilter::for_student(student.id))
            .map_err(|err| self.internal(scope, "list student applications", err))?;
        applications.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        Ok(applications)
    }

    pub fn get_application(
        &self,
        scope: &TenantScope,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, PlacementServiceError> {
        self.repository
            .fetch_application(scope, application_id)
            .map_err(|err| self.internal(scope, "fetch application", err))?
            .ok_or(PlacementServiceError::ApplicationNotFound)
    }

    /// Record a round result and persist the re-derived overall status.
    pub fn record_round(
        &self,
        scope: &TenantScope,
        application_id: &ApplicationId,
        update: RoundUpdate,
    ) -> Result<ApplicationRecord, PlacementServiceError> {
        let round_name = update.round_name.clone();
        let mut previous = None;

        let record = self.modify_application(scope, application_id, "record round", |record| {
            previous = Some(record.overall_status);
            record.record_round(update, Utc::now())?;
            Ok(())
        })?;

        info!(
            tenant = %scope.tenant(),
            application = %record.id.0,
            round = %round_name,
            from = previous.map(OverallStatus::label).unwrap_or_default(),
            to = record.overall_status.label(),
            "selection round recorded"
        );
        Ok(record)
    }

    pub fn advance_stage(
        &self,
        scope: &TenantScope,
        application_id: &ApplicationId,
        stage: OverallStatus,
    ) -> Result<ApplicationRecord, PlacementServiceError> {
        self.modify_application(scope, application_id, "advance stage", |record| {
            Ok(record.advance_stage(stage)?)
        })
    }

    /// Student withdrawal. Other students' applications read as not found.
    pub fn withdraw(
        &self,
        scope: &TenantScope,
        application_id: &ApplicationId,
        student_id: &StudentId,
        reason: Option<String>,
    ) -> Result<ApplicationRecord, PlacementServiceError> {
        self.withdraw_as(scope, application_id, Some(student_id), reason)
    }

    /// Withdrawal by placement staff, e.g. for a no-show. No ownership check.
    pub fn withdraw_by_staff(
        &self,
        scope: &TenantScope,
        application_id: &ApplicationId,
        reason: Option<String>,
    ) -> Result<ApplicationRecord, PlacementServiceError> {
        self.withdraw_as(scope, application_id, None, reason)
    }

    fn withdraw_as(
        &self,
        scope: &TenantScope,
        application_id: &ApplicationId,
        owner: Option<&StudentId>,
        reason: Option<String>,
    ) -> Result<ApplicationRecord, PlacementServiceError> {
        let record = self.modify_application(scope, application_id, "withdraw application", |record| {
            if let Some(student_id) = owner {
                ensure_owner(record, student_id)?;
            }
            Ok(record.withdraw(reason)?)
        })?;
        info!(
            tenant = %scope.tenant(),
            application = %record.id.0,
            by_staff = owner.is_none(),
            "placement application withdrawn"
        );
        Ok(record)
    }

    pub fn create_offer(
        &self,
        scope: &TenantScope,
        application_id: &ApplicationId,
        terms: OfferTerms,
    ) -> Result<ApplicationRecord, PlacementServiceError> {
        let mut total = 0.0;
        let record = self.modify_application(scope, application_id, "create offer", |record| {
            total = record.issue_offer(terms, Utc::now())?.salary.total;
            Ok(())
        })?;
        info!(
            tenant = %scope.tenant(),
            application = %record.id.0,
            salary_total = total,
            "placement offer issued"
        );
        Ok(record)
    }

    pub fn accept_offer(
        &self,
        scope: &TenantScope,
        application_id: &ApplicationId,
        student_id: &StudentId,
    ) -> Result<ApplicationRecord, PlacementServiceError> {
        let record = self.modify_application(scope, application_id, "accept offer", |record| {
            ensure_owner(record, student_id)?;
            record.accept_offer(Utc::now())?;
            Ok(())
        })?;
        info!(tenant = %scope.tenant(), application = %record.id.0, "placement offer accepted");
        Ok(record)
    }

    pub fn reject_offer(
        &self,
        scope: &TenantScope,
        application_id: &ApplicationId,
        student_id: &StudentId,
        reason: Option<String>,
    ) -> Result<ApplicationRecord, PlacementServiceError> {
        self.modify_application(scope, application_id, "reject offer", |record| {
            ensure_owner(record, student_id)?;
            record.reject_offer(reason)?;
            Ok(())
        })
    }

    pub fn expire_offer(
        &self,
        scope: &TenantScope,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, PlacementServiceError> {
        self.modify_application(scope, application_id, "expire offer", |record| {
            record.expire_offer()?;
            Ok(())
        })
    }

    /// Re-run the listing criteria over active students, excluding applicants.
    pub fn eligible_students(
        &self,
        scope: &TenantScope,
        company_id: &CompanyId,
    ) -> Result<EligibleStudents, PlacementServiceError> {
        let company = self.company(scope, company_id)?;
        let applied: HashSet<StudentId> = self
            .repository
            .applications(scope, &ApplicationFilter::for_company(company.id.clone()))
            .map_err(|err| self.internal(scope, "list company applications", err))?
            .into_iter()
            .map(|record| record.student_id)
            .collect();

        let mut eligible_students: Vec<StudentRecord> = self
            .directory
            .active_students(scope)
            .map_err(|err| self.internal(scope, "list active students", err))?
            .into_iter()
            .filter(|student| self.evaluator.is_listable(&company.eligibility, student))
            .filter(|student| !applied.contains(&student.id))
            .collect();
        eligible_students.sort_by(|a, b| b.gpa.total_cmp(&a.gpa).then(a.id.cmp(&b.id)));

        Ok(EligibleStudents {
            total_eligible: eligible_students.len(),
            already_applied: applied.len(),
            eligible_students,
        })
    }

    pub fn stats(&self, scope: &TenantScope) -> Result<PlacementStats, PlacementServiceError> {
        let (companies, applications, students) = self.snapshot(scope)?;
        Ok(analytics::placement_stats(
            &companies,
            &applications,
            &students,
        ))
    }

    pub fn dashboard(
        &self,
        scope: &TenantScope,
        today: NaiveDate,
    ) -> Result<PlacementDashboard, PlacementServiceError> {
        let (companies, applications, students) = self.snapshot(scope)?;
        Ok(analytics::placement_dashboard(
            &companies,
            &applications,
            &students,
            today,
        ))
    }

    fn snapshot(
        &self,
        scope: &TenantScope,
    ) -> Result<(Vec<Company>, Vec<ApplicationRecord>, Vec<StudentRecord>), PlacementServiceError>
    {
        let companies = self
            .repository
            .companies(scope)
            .map_err(|err| self.internal(scope, "list companies", err))?;
        let applications = self
            .repository
            .applications(scope, &ApplicationFilter::default())
            .map_err(|err| self.internal(scope, "list applications", err))?;
        let students = self
            .directory
            .active_students(scope)
            .map_err(|err| self.internal(scope, "list active students", err))?;
        Ok((companies, applications, students))
    }

    fn company(
        &self,
        scope: &TenantScope,
        company_id: &CompanyId,
    ) -> Result<Company, PlacementServiceError> {
        self.repository
            .fetch_company(scope, company_id)
            .map_err(|err| self.internal(scope, "fetch company", err))?
            .ok_or(PlacementServiceError::CompanyNotFound)
    }

    fn student(
        &self,
        scope: &TenantScope,
        student_id: &StudentId,
    ) -> Result<StudentRecord, PlacementServiceError> {
        self.directory
            .fetch_student(scope, student_id)
            .map_err(|err| self.internal(scope, "fetch student", err))?
            .ok_or(PlacementServiceError::StudentNotFound)
    }

    /// Apply `change` atomically inside the repository's write path.
    fn modify_application<F>(
        &self,
        scope: &TenantScope,
        application_id: &ApplicationId,
        action: &'static str,
        change: F,
    ) -> Result<ApplicationRecord, PlacementServiceError>
    where
        F: FnOnce(&mut ApplicationRecord) -> Result<(), PlacementServiceError>,
    {
        match self.repository.update_application(scope, application_id, change) {
            Ok(result) => result,
            Err(RepositoryError::NotFound) => Err(PlacementServiceError::ApplicationNotFound),
            Err(err) => Err(self.repository_error(scope, action, err)),
        }
    }

    /// Keep policy outcomes (duplicates, caps, not found) and log the rest.
    fn repository_error(
        &self,
        scope: &TenantScope,
        action: &'static str,
        err: RepositoryError,
    ) -> PlacementServiceError {
        match err {
            RepositoryError::Unavailable(_) | RepositoryError::Conflict => {
                self.internal(scope, action, err)
            }
            RepositoryError::DuplicateApplication | RepositoryError::Capacity(_) => {
                warn!(tenant = %scope.tenant(), action, reason = %err, "placement request refused");
                PlacementServiceError::Repository(err)
            }
            RepositoryError::NotFound => PlacementServiceError::Repository(err),
        }
    }

    fn internal(
        &self,
        scope: &TenantScope,
        action: &'static str,
        err: RepositoryError,
    ) -> PlacementServiceError {
        error!(tenant = %scope.tenant(), action, error = %err, "placement repository failure");
        PlacementServiceError::Repository(err)
    }
}

/// Other students' applications read as not found.
fn ensure_owner(
    record: &ApplicationRecord,
    student_id: &StudentId,
) -> Result<(), PlacementServiceError> {
    if &record.student_id != student_id {
        return Err(PlacementServiceError::ApplicationNotFound);
    }
    Ok(())
}

fn validate_criteria(criteria: &EligibilityCriteria) -> Result<(), PlacementServiceError> {
    if let Some(minimum) = criteria.minimum_gpa {
        if !minimum.is_finite() || !(0.0..=10.0).contains(&minimum) {
            return Err(PlacementServiceError::Validation(
                "minimum GPA must be between 0 and 10".to_string(),
            ));
        }
    }
    Ok(())
}

/// Error raised by the placement service.
#[derive(Debug, thiserror::Error)]
pub enum PlacementServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("Company already exists")]
    CompanyExists,
    #[error("Company not found")]
    CompanyNotFound,
    #[error("Company not found or inactive")]
    CompanyUnavailable,
    #[error("Job role not found or inactive")]
    JobRoleUnavailable,
    #[error("Student record not found")]
    StudentNotFound,
    #[error("Application not found")]
    ApplicationNotFound,
    #[error("Registration deadline has passed")]
    RegistrationClosed(NaiveDate),
    #[error(transparent)]
    Ineligible(#[from] EligibilityFailure),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Offer(#[from] OfferError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
