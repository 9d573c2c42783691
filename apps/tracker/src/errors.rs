use serde::Serialize;
use thiserror::Error;

use crate::models::{ColumnId, JobId};
use crate::optimistic::operation::Phase;
use crate::optimistic::remote::RemoteError;
use crate::validation::ValidationErrors;

/// Failure of one controller operation, handed back to the UI as a value.
///
/// `Validation`, `JobNotFound` and `ColumnNotFound` are raised before any
/// prediction is applied. `Remote` is raised after the prediction has been
/// compensated, so the board is already back to its pre-operation shape.
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Job application not found: {0}")]
    JobNotFound(JobId),

    #[error("Column not found: {0}")]
    ColumnNotFound(ColumnId),

    #[error("{0}")]
    Remote(#[from] RemoteError),

    #[error("Invalid operation transition: {from:?} -> {to:?}")]
    InvalidTransition { from: Phase, to: Phase },
}

pub type MutationResult<T> = Result<T, MutationError>;

/// What the UI renders for a failed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub code: &'static str,
    pub message: String,
}

impl MutationError {
    /// True when an optimistic prediction was applied and then rolled back.
    pub fn was_compensated(&self) -> bool {
        matches!(self, MutationError::Remote(_))
    }

    pub fn code(&self) -> &'static str {
        match self {
            MutationError::Validation(_) => "VALIDATION_ERROR",
            MutationError::JobNotFound(_) | MutationError::ColumnNotFound(_) => "NOT_FOUND",
            MutationError::Remote(RemoteError::Unauthorized) => "UNAUTHORIZED",
            MutationError::Remote(RemoteError::Timeout(_)) => "TIMEOUT",
            MutationError::Remote(_) => "REMOTE_ERROR",
            MutationError::InvalidTransition { .. } => "INTERNAL_ERROR",
        }
    }

    /// User-facing text. Internal faults are logged and replaced with a
    /// generic message.
    pub fn message(&self) -> String {
        match self {
            MutationError::Validation(errors) => errors.to_string(),
            MutationError::InvalidTransition { .. } => {
                tracing::error!("Internal error: {self}");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code(),
            message: self.message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;

    #[test]
    fn test_remote_failure_message_is_passed_through() {
        let err = MutationError::from(RemoteError::Unauthorized);
        let report = err.report();
        assert_eq!(report.code, "UNAUTHORIZED");
        assert_eq!(report.message, "Unauthorized");
        assert!(err.was_compensated());
    }

    #[test]
    fn test_validation_report_lists_rules() {
        let err = MutationError::from(ValidationErrors(vec![
            ValidationError::Required { field: "Position" },
            ValidationError::InvalidUrl,
        ]));
        let report = err.report();
        assert_eq!(report.code, "VALIDATION_ERROR");
        assert!(report.message.starts_with("Position is required; "));
        assert!(!err.was_compensated());
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let err = MutationError::InvalidTransition {
            from: Phase::Settled,
            to: Phase::Confirmed,
        };
        assert_eq!(err.report().message, "An internal error occurred");
    }
}
