mod rules;

use serde::{Deserialize, Serialize};

use super::domain::{EligibilityCriteria, StudentRecord};

/// Which criteria apply. Submission keeps the historical GPA, backlog and
/// course checks; listing also applies department and graduation year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluationMode {
    Submission,
    Listing,
}

/// First criterion a student failed. Messages are shown to students as-is.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EligibilityFailure {
    #[error("Minimum GPA required: {minimum}")]
    GpaBelowMinimum { minimum: f32, actual: f32 },
    #[error("Maximum {allowed} backlogs allowed")]
    TooManyBacklogs { allowed: u32, actual: usize },
    #[error("Your course is not eligible for this placement")]
    CourseNotAllowed,
    #[error("Your department is not eligible for this placement")]
    DepartmentNotAllowed,
    #[error("Your graduation year is not eligible for this placement")]
    GraduationYearNotAllowed { year: Option<u16> },
}

/// Serializable pass/fail verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityOutcome {
    pub eligible: bool,
    pub reason: Option<String>,
}

impl From<Result<(), EligibilityFailure>> for EligibilityOutcome {
    fn from(result: Result<(), EligibilityFailure>) -> Self {
        match result {
            Ok(()) => Self {
                eligible: true,
                reason: None,
            },
            Err(failure) => Self {
                eligible: false,
                reason: Some(failure.to_string()),
            },
        }
    }
}

/// Pure check of a student against a company's criteria. Stops at the first failure.
pub fn check(
    criteria: &EligibilityCriteria,
    student: &StudentRecord,
    mode: EvaluationMode,
) -> Result<(), EligibilityFailure> {
    rules::minimum_gpa(criteria, student)?;
    rules::max_backlogs(criteria, student)?;
    rules::allowed_course(criteria, student)?;

    if mode == EvaluationMode::Listing {
        rules::allowed_department(criteria, student)?;
        rules::allowed_graduation_year(criteria, student)?;
    }

    Ok(())
}

pub fn evaluate(
    criteria: &EligibilityCriteria,
    student: &StudentRecord,
    mode: EvaluationMode,
) -> EligibilityOutcome {
    check(criteria, student, mode).into()
}

/// Stateless evaluator carrying the submission strictness setting.
#[derive(Debug, Clone, Copy, Default)]
pub struct EligibilityEvaluator {
    strict_submission: bool,
}

impl EligibilityEvaluator {
    pub fn new(strict_submission: bool) -> Self {
        Self { strict_submission }
    }

    pub fn submission_mode(&self) -> EvaluationMode {
        if self.strict_submission {
            EvaluationMode::Listing
        } else {
            EvaluationMode::Submission
        }
    }

    pub fn check_submission(
        &self,
        criteria: &EligibilityCriteria,
        student: &StudentRecord,
    ) -> Result<(), EligibilityFailure> {
        check(criteria, student, self.submission_mode())
    }

    pub fn is_listable(&self, criteria: &EligibilityCriteria, student: &StudentRecord) -> bool {
        check(criteria, student, EvaluationMode::Listing).is_ok()
    }
}
