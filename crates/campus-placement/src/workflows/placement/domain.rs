use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::tenant::TenantId;

/// Identifier wrapper for recruiting companies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompanyId(pub String);

/// Identifier wrapper for a job role offered by a company.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobRoleId(pub String);

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudentId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CourseId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DepartmentId(pub String);

/// Thresholds a student must satisfy before applying. Unset fields are not checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EligibilityCriteria {
    #[serde(alias = "minimumGPA", alias = "minimumCGPA")]
    pub minimum_gpa: Option<f32>,
    pub max_backlogs: Option<u32>,
    pub allowed_courses: BTreeSet<CourseId>,
    pub allowed_departments: BTreeSet<DepartmentId>,
    pub allowed_graduation_years: BTreeSet<u16>,
}

/// Campus visit logistics, including the application cap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisitDetails {
    pub visit_date: Option<NaiveDate>,
    pub registration_deadline: Option<NaiveDate>,
    /// Advisory round template; recorded rounds are not checked against it.
    pub rounds: Vec<String>,
    pub max_applications: Option<u32>,
    pub current_applications: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactDetails {
    pub hr_name: Option<String>,
    pub hr_email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRole {
    pub id: JobRoleId,
    pub title: String,
    pub description: Option<String>,
    pub openings: Option<u32>,
    /// Annual package advertised for the role, e.g. `7.5` for 7.5 LPA.
    pub package: Option<f64>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompanyStatus {
    #[default]
    Active,
    Inactive,
    Completed,
}

impl CompanyStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CompanyStatus::Active => "Active",
            CompanyStatus::Inactive => "Inactive",
            CompanyStatus::Completed => "Completed",
        }
    }
}

/// A recruiting organization visiting campus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: CompanyId,
    pub tenant: TenantId,
    pub name: String,
    pub company_type: String,
    pub industry: String,
    pub company_size: Option<String>,
    pub contact: ContactDetails,
    pub job_roles: Vec<JobRole>,
    pub eligibility: EligibilityCriteria,
    pub visit: VisitDetails,
    pub status: CompanyStatus,
    /// Soft-delete flag; companies are never removed while applications reference them.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Company {
    pub fn job_role(&self, id: &JobRoleId) -> Option<&JobRole> {
        self.job_roles.iter().find(|role| &role.id == id)
    }

    /// Open for new applications: not soft-deleted and in the `Active` status.
    pub fn accepts_applications(&self) -> bool {
        self.is_active && self.status == CompanyStatus::Active
    }

    pub fn registration_open_on(&self, today: NaiveDate) -> bool {
        self.visit
            .registration_deadline
            .map_or(true, |deadline| today <= deadline)
    }
}

/// Staff-supplied payload for registering a company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewCompany {
    #[serde(alias = "companyName")]
    pub name: String,
    pub company_type: String,
    pub industry: String,
    pub company_size: Option<String>,
    #[serde(alias = "contactDetails")]
    pub contact: ContactDetails,
    pub job_roles: Vec<NewJobRole>,
    #[serde(alias = "eligibilityCriteria")]
    pub eligibility: EligibilityCriteria,
    #[serde(alias = "visitDetails")]
    pub visit: VisitDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewJobRole {
    pub title: String,
    pub description: Option<String>,
    pub openings: Option<u32>,
    pub package: Option<f64>,
}

/// Partial update applied by staff. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyUpdate {
    pub status: Option<CompanyStatus>,
    pub eligibility: Option<EligibilityCriteria>,
    pub max_applications: Option<u32>,
    /// Set to remove an existing cap.
    pub clear_max_applications: bool,
    pub registration_deadline: Option<NaiveDate>,
    pub visit_date: Option<NaiveDate>,
    pub job_roles_active: BTreeMap<JobRoleId, bool>,
}

/// Academic record owned by the student-management subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub course_id: CourseId,
    pub department_id: DepartmentId,
    pub current_semester: Option<u8>,
    pub graduation_year: Option<u16>,
    /// Cumulative GPA on a 0-10 scale.
    pub gpa: f32,
    /// Unresolved backlog subjects.
    pub backlogs: Vec<String>,
    pub is_active: bool,
}

impl StudentRecord {
    pub fn backlog_count(&self) -> usize {
        self.backlogs.len()
    }
}
