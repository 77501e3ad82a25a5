//! Kiln Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for Kiln, a
//! scaffolder for Zend Framework 2 style PHP modules, following hexagonal
//! (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             kiln-cli (CLI)              │
//! │       (Implements Driving Ports)        │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │          Application Services           │
//! │  (ScaffoldService, ProjectService, ...) │
//! │         Orchestrates Use Cases          │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │       Application Ports (Traits)        │
//! │  (Filesystem, Reporter, Skeletons, ...) │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     kiln-adapters (Infrastructure)      │
//! │ (LocalFilesystem, MemoryFilesystem, ..) │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │ (ClassArtifact, ConfigTree, Generators) │
//! │        No External Dependencies         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kiln_core::prelude::*;
//!
//! // Adapters are injected by the caller.
//! let service = ScaffoldService::new(filesystem, reporter);
//! let report = service.full(&ScaffoldRequest::new(".", "Blog", "post"))?;
//! assert!(report.is_success());
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ArtifactService, ConfigPatcher, PatchOutcome, ProjectService, ScaffoldReport,
        ScaffoldRequest, ScaffoldService, Stage, StageOutcome, StageReport,
        ports::{
            ArchiveExtractor, DirectoryCopier, Filesystem, Reporter, Severity, SkeletonProvider,
        },
    };
    pub use crate::domain::{
        ArtifactKind, ArtifactNames, ClassArtifact, ConfigTree, ConfigValue, FileArtifact,
        KeyPath, Method, ModuleName, ProjectLayout, QualifiedName, Visibility,
    };
    pub use crate::error::{ErrorCategory, KilnError, KilnResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
