//! CLI error type, exit codes and the stderr error block.
//!
//! Core errors pass through unchanged and keep their own suggestions; the
//! CLI adds input, configuration and I/O failures plus the summary raised
//! when a scaffolding run had failed stages.

use std::error::Error;

use owo_colors::OwoColorize;
use thiserror::Error;

use kiln_core::error::KilnError;

pub use kiln_core::error::ErrorCategory as CoreCategory;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input that clap could not catch.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ── Config errors ──────────────────────────────────────────────────────
    /// A configuration file could not be read, parsed, or written.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ── Core errors ────────────────────────────────────────────────────────
    /// An error propagated from `kiln-core`.
    #[error(transparent)]
    Core(#[from] KilnError),

    /// A scaffolding run finished with failed stages. Each one has already
    /// been reported.
    #[error("{failed} of {total} stages failed")]
    StagesFailed { failed: usize, total: usize },

    // ── System errors ──────────────────────────────────────────────────────
    /// An I/O operation failed.
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { message, .. } => vec![
                format!("Check your input: {}", message),
                "Use --help for usage information".into(),
            ],

            Self::ConfigError { message, .. } => vec![
                format!("Configuration issue: {}", message),
                "Print the active file with 'kiln config path'".into(),
                "Use 'kiln init --force' to recreate a default config".into(),
            ],

            Self::Core(core_err) => core_err.suggestions(),

            Self::StagesFailed { .. } => vec![
                "Completed stages were kept; nothing was rolled back".into(),
                "Fix the failures above and generate the missing parts individually".into(),
            ],

            Self::IoError { message, .. } => vec![
                format!("I/O operation failed: {}", message),
                "Check file permissions".into(),
            ],
        }
    }

    /// Get the error category for styling and exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } => ErrorCategory::UserError,
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::Core(core) => match core.category() {
                CoreCategory::Validation | CoreCategory::Conflict | CoreCategory::Unparsable => {
                    ErrorCategory::UserError
                }
                CoreCategory::NotFound => ErrorCategory::NotFound,
                CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::StagesFailed { .. } | Self::IoError { .. } => ErrorCategory::Internal,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// | Category      | Code |
    /// |---------------|------|
    /// | User error    |  2   |
    /// | Not found     |  3   |
    /// | Configuration |  4   |
    /// | Internal      |  1   |
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::UserError => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::Internal => 1,
        }
    }

    /// Render the error block written to stderr.
    ///
    /// The cause chain is shown only with `verbose`; `color` adds ANSI styling.
    pub fn render(&self, verbose: bool, color: bool) -> String {
        let mut out = format!(
            "\n{} {}\n",
            paint(color, "\u{2717} Error:", |t| t.red().bold().to_string()),
            paint(color, &self.to_string(), |t| t.red().to_string()),
        );

        if verbose {
            let mut cause = self.source();
            while let Some(err) = cause {
                out.push_str(&format!(
                    "  {}\n",
                    paint(color, &format!("caused by: {err}"), |t| t.dimmed().to_string())
                ));
                cause = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str(&format!(
                "\n{}\n",
                paint(color, "Suggestions:", |t| t.yellow().bold().to_string())
            ));
            for suggestion in &suggestions {
                out.push_str(&format!("  - {suggestion}\n"));
            }
        }

        if !verbose && self.source().is_some() {
            out.push_str(&format!(
                "\n{}\n",
                paint(color, "Run again with -v to see the cause.", |t| t.dimmed().to_string())
            ));
        }

        out
    }

    /// Record the error in the tracing log.
    pub fn log(&self) {
        let category = self.category();
        let code = self.exit_code();
        match category {
            ErrorCategory::UserError | ErrorCategory::NotFound => {
                tracing::warn!(?category, code, error = %self, "command refused")
            }
            ErrorCategory::Configuration | ErrorCategory::Internal => {
                tracing::error!(?category, code, error = %self, "command failed")
            }
        }
        if let Some(cause) = self.source() {
            tracing::debug!(%cause, "error cause");
        }
    }
}

fn paint(color: bool, text: &str, style: fn(&str) -> String) -> String {
    if color { style(text) } else { text.to_owned() }
}

/// Error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// User input error (validation, invalid arguments).
    UserError,
    /// Resource not found.
    NotFound,
    /// Configuration error.
    Configuration,
    /// Internal/system error.
    Internal,
}

// ── IntoCli trait ─────────────────────────────────────────────────────────────

/// Converts foreign results into [`CliResult`] with a context message.
///
/// Core errors convert through `From` and need no context.
pub trait IntoCli<T> {
    /// Convert to `CliResult` attaching a human-readable context message.
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IntoCli<T> for Result<T, std::io::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::IoError {
            message: f().into(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::application::ApplicationError;
    use kiln_core::domain::DomainError;
    use std::io;
    use std::path::PathBuf;

    fn core(err: impl Into<KilnError>) -> CliError {
        CliError::Core(err.into())
    }

    // ── exit codes ────────────────────────────────────────────────────────

    #[test]
    fn preconditions_are_user_errors() {
        let exists = core(ApplicationError::TargetExists {
            what: "entity User".into(),
            path: PathBuf::from("module/Blog/src/Blog/Entity/User.php"),
        });
        assert_eq!(exists.exit_code(), 2);

        let name = core(DomainError::InvalidIdentifier {
            value: "9lives".into(),
            reason: "must start with a letter or underscore".into(),
        });
        assert_eq!(name.exit_code(), 2);
    }

    #[test]
    fn missing_controller_is_not_found() {
        let err = core(ApplicationError::ControllerNotFound {
            controller: "PostController".into(),
            path: PathBuf::from("x"),
        });
        assert_eq!(err.exit_code(), 3);
        assert!(err.suggestions().iter().any(|s| s.contains("kiln create controller")));
    }

    #[test]
    fn exit_code_configuration() {
        assert_eq!(
            CliError::ConfigError {
                message: "x".into(),
                source: None
            }
            .exit_code(),
            4
        );
    }

    #[test]
    fn failed_stages_exit_with_one() {
        assert_eq!(CliError::StagesFailed { failed: 1, total: 5 }.exit_code(), 1);
    }

    #[test]
    fn exit_code_internal() {
        assert_eq!(
            CliError::IoError {
                message: "x".into(),
                source: io::Error::other("e"),
            }
            .exit_code(),
            1
        );
    }

    // ── format ────────────────────────────────────────────────────────────

    #[test]
    fn plain_render_lists_suggestions() {
        let err = core(ApplicationError::InvalidProjectRoot {
            path: PathBuf::from("/tmp/x"),
        });
        let s = err.render(false, false);
        assert!(s.contains("Error: /tmp/x does not contain a module/ directory"));
        assert!(s.contains("  - Run the command from the project directory or pass --path"));
        assert!(!s.contains('\u{1b}'));
    }

    #[test]
    fn cause_is_shown_only_when_verbose() {
        let err = CliError::ConfigError {
            message: "bad file".into(),
            source: Some(Box::new(io::Error::other("unexpected token"))),
        };
        assert!(err.render(true, false).contains("caused by: unexpected token"));

        let terse = err.render(false, false);
        assert!(!terse.contains("unexpected token"));
        assert!(terse.contains("-v"));
    }

    // ── IntoCli ───────────────────────────────────────────────────────────

    #[test]
    fn into_cli_io_error() {
        let result: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
        let cli: CliResult<()> = result.with_cli_context(|| "reading config");
        assert!(matches!(cli, Err(CliError::IoError { .. })));
    }
}
