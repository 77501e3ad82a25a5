//! Domain value objects: Visibility, ClassModifier, ArtifactKind.
//!
//! # Design
//!
//! Pure value types: `Copy`, compared by value, no identity.
//! This file's only job is to define the types, their source keywords, and
//! their `FromStr` parsers.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Visibility ───────────────────────────────────────────────────────────────

/// Member visibility, rendered verbatim as its keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" | "var" => Ok(Self::Public),
            "protected" => Ok(Self::Protected),
            "private" => Ok(Self::Private),
            other => Err(DomainError::invalid_identifier(
                other,
                "not a visibility keyword",
            )),
        }
    }
}

// ── ClassModifier ────────────────────────────────────────────────────────────

/// Optional class-level modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassModifier {
    Abstract,
    Final,
}

impl ClassModifier {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Abstract => "abstract",
            Self::Final => "final",
        }
    }
}

impl fmt::Display for ClassModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ArtifactKind ─────────────────────────────────────────────────────────────

/// The class families a module is scaffolded with.
///
/// Each kind owns a sub-namespace and a directory under
/// `module/{Module}/src/{Module}/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Entity,
    Repository,
    Service,
    Controller,
}

impl ArtifactKind {
    /// Directory and namespace segment (`Entity`, `Repository`, ...).
    pub const fn segment(&self) -> &'static str {
        match self {
            Self::Entity => "Entity",
            Self::Repository => "Repository",
            Self::Service => "Service",
            Self::Controller => "Controller",
        }
    }

    /// Suffix appended to the class name. Entities carry none.
    pub const fn class_suffix(&self) -> &'static str {
        match self {
            Self::Entity => "",
            Self::Repository => "Repository",
            Self::Service => "Service",
            Self::Controller => "Controller",
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Repository => "repository",
            Self::Service => "service",
            Self::Controller => "controller",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_keywords() {
        assert_eq!(Visibility::from_str("PRIVATE").unwrap(), Visibility::Private);
        assert_eq!(Visibility::from_str("var").unwrap(), Visibility::Public);
        assert!(Visibility::from_str("internal").is_err());
        assert_eq!(Visibility::Protected.to_string(), "protected");
    }

    #[test]
    fn artifact_kind_naming() {
        assert_eq!(ArtifactKind::Entity.class_suffix(), "");
        assert_eq!(ArtifactKind::Controller.segment(), "Controller");
        assert_eq!(ArtifactKind::Service.to_string(), "service");
    }
}
