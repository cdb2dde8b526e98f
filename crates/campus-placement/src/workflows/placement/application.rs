use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationId, CompanyId, CourseId, DepartmentId, JobRoleId, StudentId, StudentRecord,
};
use super::offer::{Offer, OfferStatus};
use super::selection::{OverallStatus, RoundChange, RoundUpdate, SelectionError, SelectionProcess};
use super::tenant::TenantId;

/// Student-supplied part of a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentDetailsInput {
    pub skills: Vec<String>,
    pub resume: Option<String>,
    pub portfolio_url: Option<String>,
}

/// Body of `POST /placements/apply`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationRequest {
    pub company_id: String,
    pub job_role_id: String,
    pub student_details: StudentDetailsInput,
}

/// Copy of the student's profile taken at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSnapshot {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub course_id: CourseId,
    pub department_id: DepartmentId,
    pub current_semester: Option<u8>,
    pub gpa: f32,
    pub backlog_count: usize,
    pub skills: Vec<String>,
    pub resume: Option<String>,
    pub portfolio_url: Option<String>,
}

impl StudentSnapshot {
    pub fn capture(student: &StudentRecord, details: StudentDetailsInput) -> Self {
        Self {
            name: student.name.clone(),
            email: student.email.clone(),
            phone: student.phone.clone(),
            course_id: student.course_id.clone(),
            department_id: student.department_id.clone(),
            current_semester: student.current_semester,
            gpa: student.gpa,
            backlog_count: student.backlog_count(),
            skills: details.skills,
            resume: details.resume,
            portfolio_url: details.portfolio_url,
        }
    }
}

/// One student's application to one company for one job role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub tenant: TenantId,
    pub student_id: StudentId,
    pub company_id: CompanyId,
    pub job_role_id: JobRoleId,
    pub applied_at: DateTime<Utc>,
    pub student: StudentSnapshot,
    #[serde(rename = "selectionProcess")]
    pub selection: SelectionProcess,
    pub overall_status: OverallStatus,
    #[serde(rename = "offerDetails")]
    pub offer: Option<Offer>,
    pub withdrawal_reason: Option<String>,
}

impl ApplicationRecord {
    /// Record a round result and re-derive the overall status.
    pub fn record_round(
        &mut self,
        update: RoundUpdate,
        at: DateTime<Utc>,
    ) -> Result<RoundChange, SelectionError> {
        if update.round_name.trim().is_empty() {
            return Err(SelectionError::MissingRoundName);
        }
        if self.overall_status.is_closed() {
            return Err(SelectionError::Closed(self.overall_status));
        }
        if self.offer.is_some() {
            return Err(SelectionError::OfferOutstanding);
        }

        let change = self.selection.record(update, at);
        self.overall_status = self.reconciled_status();
        Ok(change)
    }

    /// Move between pre-round stages (`Applied → Under Review → Shortlisted`).
    pub fn advance_stage(&mut self, stage: OverallStatus) -> Result<(), SelectionError> {
        let allowed = self.selection.is_empty()
            && self.overall_status.is_pre_round()
            && matches!(
                (self.overall_status, stage),
                (OverallStatus::Applied, OverallStatus::UnderReview)
                    | (OverallStatus::Applied, OverallStatus::Shortlisted)
                    | (OverallStatus::UnderReview, OverallStatus::Shortlisted)
            );

        if !allowed {
            return Err(SelectionError::InvalidStage {
                from: self.overall_status,
                to: stage,
            });
        }

        self.overall_status = stage;
        Ok(())
    }

    pub fn withdraw(&mut self, reason: Option<String>) -> Result<(), SelectionError> {
        if self.overall_status.is_closed() {
            return Err(SelectionError::Closed(self.overall_status));
        }
        if self.offer.as_ref().is_some_and(|offer| {
            matches!(offer.status, OfferStatus::Pending | OfferStatus::Accepted)
        }) {
            return Err(SelectionError::OfferOutstanding);
        }

        self.overall_status = OverallStatus::Withdrawn;
        self.withdrawal_reason = reason;
        Ok(())
    }

    /// Status implied by the stored rounds, or the current pre-round stage.
    pub fn reconciled_status(&self) -> OverallStatus {
        if self.overall_status == OverallStatus::Withdrawn {
            return OverallStatus::Withdrawn;
        }
        self.selection
            .derived_status()
            .unwrap_or(self.overall_status)
    }

    /// Placed: selected and the offer was accepted.
    pub fn is_placed(&self) -> bool {
        self.overall_status == OverallStatus::Selected
            && self
                .offer
                .as_ref()
                .is_some_and(|offer| offer.status == OfferStatus::Accepted)
    }

    pub fn summary_view(&self) -> ApplicationSummaryView {
        ApplicationSummaryView {
            application_id: self.id.clone(),
            student_name: self.student.name.clone(),
            company_id: self.company_id.clone(),
            job_role_id: self.job_role_id.clone(),
            overall_status: self.overall_status,
            status_label: self.overall_status.label(),
            applied_at: self.applied_at,
            rounds_recorded: self.selection.len(),
        }
    }
}

/// Compact row used by dashboards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSummaryView {
    pub application_id: ApplicationId,
    pub student_name: String,
    pub company_id: CompanyId,
    pub job_role_id: JobRoleId,
    pub overall_status: OverallStatus,
    pub status_label: &'static str,
    pub applied_at: DateTime<Utc>,
    pub rounds_recorded: usize,
}
