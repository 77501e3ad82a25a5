// ============================================================================
// domain/errors.rs - COMPREHENSIVE ERROR DOMAIN
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (reported per stage, kept in reports)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Construction Errors (fail fast, before anything is rendered)
    // ========================================================================
    #[error("invalid identifier '{value}': {reason}")]
    InvalidIdentifier { value: String, reason: String },

    #[error("class '{class}' declares {kind} '{name}' more than once")]
    DuplicateMember {
        class: String,
        kind: MemberKind,
        name: String,
    },

    #[error("class '{class}' imports '{import}' more than once")]
    DuplicateImport { class: String, import: String },

    #[error("invalid doc-block: {reason}")]
    InvalidDocBlock { reason: String },

    // ========================================================================
    // Merge Errors (per member, the model is left untouched)
    // ========================================================================
    #[error("{kind} '{name}' already exists in class '{class}'")]
    MemberAlreadyExists {
        class: String,
        kind: MemberKind,
        name: String,
    },

    #[error("import '{import}' already exists in class '{class}'")]
    ImportAlreadyExists { class: String, import: String },

    #[error("import '{import}' clashes with '{existing}': class '{class}' already uses the name '{local}'")]
    ImportNameConflict {
        class: String,
        import: String,
        existing: String,
        local: String,
    },

    // ========================================================================
    // Reader Errors
    // ========================================================================
    #[error("unparsable source: {reason}")]
    UnparsableSource { reason: String },

    #[error("unparsable configuration literal: {reason}")]
    UnparsableConfig { reason: String },

    // ========================================================================
    // Config Tree Errors
    // ========================================================================
    #[error("cannot insert at '{path}': '{conflict}' holds a scalar, not a nested array")]
    ConfigTypeConflict { path: String, conflict: String },

    #[error("invalid key path '{path}': {reason}")]
    InvalidKeyPath { path: String, reason: String },
}

impl DomainError {
    pub(crate) fn unparsable(reason: impl Into<String>) -> Self {
        Self::UnparsableSource {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_identifier(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidIdentifier { value, .. } => vec![
                format!("'{}' cannot be used as a class, module or member name", value),
                "Use letters, digits and underscores, starting with a letter".into(),
            ],
            Self::MemberAlreadyExists { kind, name, .. } => vec![
                format!("The {} '{}' is already declared; nothing was written", kind, name),
                "Pick a different name or edit the existing member by hand".into(),
            ],
            Self::ImportNameConflict { existing, local, .. } => vec![
                format!("'{}' already refers to {}; nothing was written", local, existing),
                "Alias the existing import or rename the local class by hand".into(),
            ],
            Self::UnparsableSource { reason } => vec![
                format!("Reader stopped at: {}", reason),
                "Only files shaped like kiln output can be edited in place".into(),
                "Move hand-written comments into doc-blocks or method bodies".into(),
            ],
            Self::UnparsableConfig { .. } => vec![
                "The configuration file must be `<?php return array(...);`".into(),
                "Check the file for syntax errors".into(),
            ],
            Self::ConfigTypeConflict { conflict, .. } => vec![
                format!("'{}' is a scalar in the existing configuration", conflict),
                "Convert it to an array by hand before patching".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidIdentifier { .. }
            | Self::InvalidDocBlock { .. }
            | Self::InvalidKeyPath { .. } => ErrorCategory::Validation,
            Self::MemberAlreadyExists { .. }
            | Self::ImportAlreadyExists { .. }
            | Self::ImportNameConflict { .. }
            | Self::DuplicateMember { .. }
            | Self::DuplicateImport { .. }
            | Self::ConfigTypeConflict { .. } => ErrorCategory::Conflict,
            Self::UnparsableSource { .. } | Self::UnparsableConfig { .. } => {
                ErrorCategory::Unparsable
            }
        }
    }
}

/// Kind of class member, used to scope name uniqueness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Constant,
    Property,
    Method,
}

impl std::fmt::Display for MemberKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Constant => "constant",
            Self::Property => "property",
            Self::Method => "method",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Conflict,
    Unparsable,
}
