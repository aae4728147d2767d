//! Solver error taxonomy.
//!
//! Every variant is recoverable and reportable. Exhausted retry budgets
//! inside the operators are not errors; they surface as residual penalty.

use thiserror::Error;

use crate::validation::ValidationError;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SolverError>;

/// Errors returned by [`Solver::run`](crate::solver::Solver::run).
#[derive(Debug, Error)]
pub enum SolverError {
    /// No theory-course schedules exist for the requested period.
    #[error("no theory schedules found for the requested period")]
    NoTheoryData,

    /// No active shift or no active lab room is available.
    #[error("no active shifts or rooms available")]
    NoShiftsOrRooms,

    /// The evolution loop finished without ever evaluating a chromosome.
    #[error("no solution found")]
    NoSolutionFound,

    /// Structural problems in the loaded data.
    #[error("invalid solver input: {}", summarize(.0))]
    InvalidInput(Vec<ValidationError>),

    /// The domain data loader failed.
    #[error("domain data loader failed: {0}")]
    Loader(#[source] Box<dyn std::error::Error + Send + Sync>),
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            SolverError::NoTheoryData.to_string(),
            "no theory schedules found for the requested period"
        );
        assert_eq!(
            SolverError::NoShiftsOrRooms.to_string(),
            "no active shifts or rooms available"
        );
        assert_eq!(SolverError::NoSolutionFound.to_string(), "no solution found");
    }

    #[test]
    fn test_invalid_input_joins_messages() {
        let err = SolverError::InvalidInput(vec![
            ValidationError::new(ValidationErrorKind::DuplicateId, "Duplicate room ID: R1"),
            ValidationError::new(ValidationErrorKind::EmptyTask, "Task 'P1' has zero copies"),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid solver input: Duplicate room ID: R1; Task 'P1' has zero copies"
        );
    }

    #[test]
    fn test_loader_error_keeps_source() {
        let io = std::io::Error::other("connection refused");
        let err = SolverError::Loader(Box::new(io));
        assert!(err.to_string().contains("connection refused"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
