//! Application layer for Kiln.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (ScaffoldService, ProjectService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business logic itself. All business rules live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    ArtifactService, ConfigPatcher, PatchOutcome, ProjectService, ScaffoldReport,
    ScaffoldRequest, ScaffoldService, Stage, StageOutcome, StageReport,
};

// Re-export port traits (for adapter implementation)
pub use ports::{
    ArchiveExtractor, DirectoryCopier, Filesystem, Reporter, Severity, SkeletonProvider,
};

pub use error::ApplicationError;
