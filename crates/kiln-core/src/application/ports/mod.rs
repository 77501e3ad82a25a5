//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `kiln-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: file reads, writes and copies
//!   - `Reporter`: per-stage progress messages
//!   - `SkeletonProvider`, `ArchiveExtractor`, `DirectoryCopier`: project creation
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{
    ArchiveExtractor, DirectoryCopier, Filesystem, Reporter, Severity, SkeletonProvider,
};

#[cfg(test)]
pub use output::{
    MockArchiveExtractor, MockDirectoryCopier, MockFilesystem, MockReporter, MockSkeletonProvider,
};
