//! Unified error handling for Kiln Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Kiln Core operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KilnError {
    /// Errors from the domain layer (model invariants, unreadable sources).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Errors from the application layer (preconditions, I/O).
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// Unexpected internal errors (bugs).
    #[error("internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl KilnError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Internal { .. } => vec!["This appears to be a bug in Kiln".into()],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Conflict => ErrorCategory::Conflict,
                crate::domain::ErrorCategory::Unparsable => ErrorCategory::Unparsable,
            },
            Self::Application(e) => e.category(),
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Refused before any write: bad project root, existing target,
    /// missing controller, invalid name.
    pub fn is_precondition(&self) -> bool {
        match self {
            Self::Application(e) => e.is_precondition(),
            Self::Domain(DomainError::InvalidIdentifier { .. }) => true,
            _ => false,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Conflict,
    Unparsable,
    NotFound,
    Internal,
}

/// Convenient result type alias.
pub type KilnResult<T> = Result<T, KilnError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn preconditions_are_flagged() {
        let exists: KilnError = ApplicationError::TargetExists {
            what: "entity".into(),
            path: PathBuf::from("module/Blog/src/Blog/Entity/User.php"),
        }
        .into();
        assert!(exists.is_precondition());
        assert_eq!(exists.category(), ErrorCategory::Validation);

        let bad_name: KilnError = DomainError::InvalidIdentifier {
            value: "9x".into(),
            reason: "must start with a letter or underscore".into(),
        }
        .into();
        assert!(bad_name.is_precondition());

        let io: KilnError = ApplicationError::filesystem("x", "denied").into();
        assert!(!io.is_precondition());
        assert_eq!(io.category(), ErrorCategory::Internal);
    }
}
