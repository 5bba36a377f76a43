//! Error types.

use thiserror::Error;

use crate::models::Cohort;
use crate::validation::ValidationError;

/// Errors surfaced before or while setting up a search.
///
/// The search itself never fails: not reaching feasibility within the
/// generation budget is a normal outcome reported by the result.
#[derive(Debug, Error)]
pub enum TimetableError {
    /// The reference data failed validation.
    #[error("invalid reference data ({} problems): {}", .0.len(), join_errors(.0))]
    InvalidData(Vec<ValidationError>),

    /// An evolution parameter is out of range.
    #[error("invalid evolution config: {0}")]
    InvalidConfig(String),

    /// A cohort could not be placed even after retrying from scratch.
    #[error("cohort {cohort} could not be placed after {attempts} attempts")]
    CohortUnplaceable { cohort: Cohort, attempts: usize },
}

impl From<Vec<ValidationError>> for TimetableError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::InvalidData(errors)
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, TimetableError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_input;
    use crate::models::WeekCalendar;

    #[test]
    fn test_invalid_data_message() {
        let errors = validate_input(&[], &[], &WeekCalendar::new()).unwrap_err();
        let err = TimetableError::from(errors);
        let message = err.to_string();
        assert!(message.starts_with("invalid reference data (8 problems)"));
        assert!(message.contains("EmptyCohort"));
    }

    #[test]
    fn test_unplaceable_message() {
        let err = TimetableError::CohortUnplaceable {
            cohort: 3,
            attempts: 10,
        };
        assert_eq!(err.to_string(), "cohort 3 could not be placed after 10 attempts");
    }
}
