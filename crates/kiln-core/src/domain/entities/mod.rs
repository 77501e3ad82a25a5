pub mod class_artifact;
pub mod common;
pub mod config_tree;
pub mod project_layout;

pub use crate::domain::DomainError;
pub use class_artifact::{
    Body, ClassArtifact, ClassBuilder, ClassRef, Constant, DocBlock, FileArtifact, Import, Method,
    Parameter, Property,
};
pub use common::QualifiedName;
pub use config_tree::{ConfigKey, ConfigTree, ConfigValue, KeyPath};
pub use project_layout::ProjectLayout;
