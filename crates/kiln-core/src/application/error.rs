//! Application layer errors.
//!
//! These errors represent failures in orchestration, not business logic.
//! Business logic errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// The target directory is not a scaffoldable project.
    #[error("{path} does not contain a module/ directory and config/application.config.php")]
    InvalidProjectRoot { path: PathBuf },

    /// A file or directory the command would create is already present.
    #[error("{what} already exists at {path}")]
    TargetExists { what: String, path: PathBuf },

    /// Editing a controller that was never generated.
    #[error("controller '{controller}' not found at {path}")]
    ControllerNotFound { controller: String, path: PathBuf },

    /// Filesystem operation failed.
    #[error("filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Config file missing, unreadable or not a literal array.
    #[error("cannot load configuration {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    /// Writing the patched config failed after the backup was taken.
    #[error("cannot write configuration {path} (backup kept at {backup}): {reason}")]
    ConfigWrite {
        path: PathBuf,
        backup: PathBuf,
        reason: String,
    },

    /// Shared state of an in-memory adapter was poisoned.
    #[error("adapter state lock poisoned")]
    StoreLockError,

    /// Neither the latest nor the cached skeleton could be fetched.
    #[error("no project skeleton available: {reason}")]
    SkeletonUnavailable { reason: String },

    /// The skeleton archive could not be unpacked.
    #[error("cannot extract skeleton {archive}: {reason}")]
    ExtractionFailed { archive: PathBuf, reason: String },

    /// Copying the extracted skeleton into place failed.
    #[error("cannot copy {from} to {to}: {reason}")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        reason: String,
    },
}

impl ApplicationError {
    pub fn filesystem(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::FilesystemError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidProjectRoot { path } => vec![
                format!("{} is not a project root", path.display()),
                "Run the command from the project directory or pass --path".into(),
                "Create a project first: kiln create project <PATH>".into(),
            ],
            Self::TargetExists { path, .. } => vec![
                format!("Remove or rename {} to generate it again", path.display()),
                "Use the action command to extend an existing controller".into(),
            ],
            Self::ControllerNotFound { controller, .. } => vec![
                format!("Generate it first: kiln create controller {controller} --module <M>"),
                "Check the --module and --controller spelling".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::ConfigLoad { path, .. } => vec![
                format!("Check that {} exists and returns an array literal", path.display()),
            ],
            Self::ConfigWrite { backup, .. } => vec![
                format!("The original configuration is preserved in {}", backup.display()),
                "Restore it by hand before retrying".into(),
            ],
            Self::SkeletonUnavailable { .. } => vec![
                "Pass --skeleton <DIR> or set skeleton.path in the kiln configuration".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidProjectRoot { .. } | Self::TargetExists { .. } => ErrorCategory::Validation,
            Self::ControllerNotFound { .. } | Self::SkeletonUnavailable { .. } => {
                ErrorCategory::NotFound
            }
            Self::ConfigLoad { .. } | Self::ConfigWrite { .. } => ErrorCategory::Conflict,
            Self::FilesystemError { .. }
            | Self::StoreLockError
            | Self::ExtractionFailed { .. }
            | Self::CopyFailed { .. } => ErrorCategory::Internal,
        }
    }

    /// Refusals raised before anything is written.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::InvalidProjectRoot { .. }
                | Self::TargetExists { .. }
                | Self::ControllerNotFound { .. }
        )
    }
}
