//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "scaffold an entity" or "add an action".

pub mod artifact_service;
pub mod config_patcher;
pub mod project_service;
pub mod scaffold_service;

pub use artifact_service::ArtifactService;
pub use config_patcher::{ConfigPatcher, PatchOutcome};
pub use project_service::ProjectService;
pub use scaffold_service::{
    ScaffoldReport, ScaffoldRequest, ScaffoldService, Stage, StageOutcome, StageReport,
};
