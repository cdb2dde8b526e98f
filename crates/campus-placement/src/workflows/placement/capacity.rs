use super::domain::VisitDetails;

/// Per-company application cap.
///
/// The guard itself holds no state: the counter lives on
/// [`VisitDetails::current_applications`], and repositories must call
/// [`CapacityGuard::reserve`] inside the same critical section as the
/// duplicate check and the insert.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapacityGuard;

impl CapacityGuard {
    pub fn admit(&self, visit: &VisitDetails) -> Result<(), CapacityError> {
        match visit.max_applications {
            Some(max) if visit.current_applications >= max => {
                Err(CapacityError::LimitReached { max })
            }
            _ => Ok(()),
        }
    }

    /// Admit and count one new application, returning the new count.
    pub fn reserve(&self, visit: &mut VisitDetails) -> Result<u32, CapacityError> {
        self.admit(visit)?;
        let next = visit
            .current_applications
            .checked_add(1)
            .ok_or(CapacityError::CounterOverflow)?;
        visit.current_applications = next;
        Ok(next)
    }

    /// Validate a new cap against the applications already received.
    pub fn validate_cap(&self, max: Option<u32>, current: u32) -> Result<(), CapacityError> {
        match max {
            Some(max) if max < current => Err(CapacityError::BelowCurrent { max, current }),
            _ => Ok(()),
        }
    }

    pub fn remaining(&self, visit: &VisitDetails) -> Option<u32> {
        visit
            .max_applications
            .map(|max| max.saturating_sub(visit.current_applications))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapacityError {
    #[error("Application limit reached for this company")]
    LimitReached { max: u32 },
    #[error("cannot lower the application cap to {max}: {current} applications already received")]
    BelowCurrent { max: u32, current: u32 },
    #[error("application counter overflow")]
    CounterOverflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visit(max: Option<u32>, current: u32) -> VisitDetails {
        VisitDetails {
            max_applications: max,
            current_applications: current,
            ..VisitDetails::default()
        }
    }

    #[test]
    fn uncapped_companies_always_admit() {
        let mut details = visit(None, 10_000);
        assert_eq!(CapacityGuard.reserve(&mut details), Ok(10_001));
        assert_eq!(CapacityGuard.remaining(&details), None);
    }

    #[test]
    fn reserve_stops_at_the_cap() {
        let mut details = visit(Some(2), 0);
        assert_eq!(CapacityGuard.reserve(&mut details), Ok(1));
        assert_eq!(CapacityGuard.reserve(&mut details), Ok(2));
        assert_eq!(
            CapacityGuard.reserve(&mut details),
            Err(CapacityError::LimitReached { max: 2 })
        );
        assert_eq!(details.current_applications, 2);
        assert_eq!(CapacityGuard.remaining(&details), Some(0));
    }

    #[test]
    fn zero_cap_admits_nobody() {
        let details = visit(Some(0), 0);
        assert!(CapacityGuard.admit(&details).is_err());
    }

    #[test]
    fn cap_cannot_drop_below_received_applications() {
        assert_eq!(
            CapacityGuard.validate_cap(Some(3), 5),
            Err(CapacityError::BelowCurrent { max: 3, current: 5 })
        );
        assert!(CapacityGuard.validate_cap(Some(5), 5).is_ok());
        assert!(CapacityGuard.validate_cap(None, 5).is_ok());
    }
}
