use super::super::domain::{EligibilityCriteria, StudentRecord};
use super::EligibilityFailure;

pub(super) fn minimum_gpa(
    criteria: &EligibilityCriteria,
    student: &StudentRecord,
) -> Result<(), EligibilityFailure> {
    match criteria.minimum_gpa {
        Some(minimum) if student.gpa < minimum => Err(EligibilityFailure::GpaBelowMinimum {
            minimum,
            actual: student.gpa,
        }),
        _ => Ok(()),
    }
}

// A cap of zero is still a cap.
pub(super) fn max_backlogs(
    criteria: &EligibilityCriteria,
    student: &StudentRecord,
) -> Result<(), EligibilityFailure> {
    match criteria.max_backlogs {
        Some(allowed) if student.backlog_count() > allowed as usize => {
            Err(EligibilityFailure::TooManyBacklogs {
                allowed,
                actual: student.backlog_count(),
            })
        }
        _ => Ok(()),
    }
}

pub(super) fn allowed_course(
    criteria: &EligibilityCriteria,
    student: &StudentRecord,
) -> Result<(), EligibilityFailure> {
    if criteria.allowed_courses.is_empty()
        || criteria.allowed_courses.contains(&student.course_id)
    {
        Ok(())
    } else {
        Err(EligibilityFailure::CourseNotAllowed)
    }
}

pub(super) fn allowed_department(
    criteria: &EligibilityCriteria,
    student: &StudentRecord,
) -> Result<(), EligibilityFailure> {
    if criteria.allowed_departments.is_empty()
        || criteria.allowed_departments.contains(&student.department_id)
    {
        Ok(())
    } else {
        Err(EligibilityFailure::DepartmentNotAllowed)
    }
}

pub(super) fn allowed_graduation_year(
    criteria: &EligibilityCriteria,
    student: &StudentRecord,
) -> Result<(), EligibilityFailure> {
    if criteria.allowed_graduation_years.is_empty() {
        return Ok(());
    }

    match student.graduation_year {
        Some(year) if criteria.allowed_graduation_years.contains(&year) => Ok(()),
        year => Err(EligibilityFailure::GraduationYearNotAllowed { year }),
    }
}
