//! Campus placement pipeline: eligibility, application intake with capacity
//! limits, selection rounds, and offers. Every storage call is scoped by a
//! [`TenantScope`].

pub mod analytics;
pub mod application;
pub mod capacity;
pub mod domain;
pub mod eligibility;
pub mod memory;
pub mod offer;
pub mod repository;
pub mod roster;
pub mod router;
pub mod selection;
pub mod service;
pub mod tenant;

#[cfg(test)]
mod tests;

pub use analytics::{PlacementDashboard, PlacementStats};
pub use application::{ApplicationRecord, ApplicationRequest, StudentDetailsInput, StudentSnapshot};
pub use capacity::{CapacityError, CapacityGuard};
pub use domain::{
    ApplicationId, Company, CompanyId, CompanyStatus, CompanyUpdate, ContactDetails, CourseId,
    DepartmentId, EligibilityCriteria, JobRole, JobRoleId, NewCompany, NewJobRole, StudentId,
    StudentRecord, VisitDetails,
};
pub use eligibility::{
    EligibilityEvaluator, EligibilityFailure, EligibilityOutcome, EvaluationMode,
};
pub use memory::InMemoryPlacementStore;
pub use offer::{Offer, OfferError, OfferStatus, OfferTerms, Salary, SalaryInput};
pub use repository::{
    ApplicationFilter, PlacementRepository, RepositoryError, StudentDirectory,
};
pub use roster::{RosterImportError, StudentRosterImporter};
pub use router::placement_router;
pub use selection::{
    derive_overall_status, OverallStatus, RoundStatus, RoundType, RoundUpdate, SelectionError,
    SelectionProcess, SelectionRound,
};
pub use service::{
    CompanyPage, CompanyQuery, EligibleStudents, PlacementService, PlacementServiceError,
};
pub use tenant::{TenantError, TenantId, TenantScope};
