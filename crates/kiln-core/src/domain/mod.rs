//! Core domain layer for Kiln.
//!
//! Pure logic: the class artifact model, its textual form (writer and
//! structural reader), the merger, config trees and the fixed generators.
//! Nothing in here touches the filesystem or logs; the application layer
//! does both through ports.
//!
//! - **No I/O**: source text in, models out, and back
//! - **Immutable aggregates**: `ClassArtifact` changes only through
//!   [`merge::ArtifactMerger`], which returns a new value
//! - **Fail at construction**: invalid models cannot be built

pub mod entities;
pub mod error;
pub mod generators;
pub mod merge;
pub mod syntax;
pub mod value_objects;

pub use entities::{
    Body, ClassArtifact, ClassBuilder, ClassRef, ConfigKey, ConfigTree, ConfigValue, Constant,
    DocBlock, FileArtifact, Import, KeyPath, Method, Parameter, ProjectLayout, Property,
    QualifiedName,
};
pub use error::{DomainError, ErrorCategory, MemberKind};
pub use generators::{ArtifactNames, ModuleName};
pub use merge::{ArtifactMerger, MergePlan};
pub use syntax::{
    read_class, read_config, render_class, render_config_file, render_config_source, render_file,
};
pub use value_objects::{ArtifactKind, ClassModifier, Visibility};
