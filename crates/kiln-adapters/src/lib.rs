//! Infrastructure adapters for Kiln.
//!
//! This crate implements the ports defined in `kiln-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod filesystem;
pub mod reporter;
pub mod skeleton;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use reporter::{CollectingReporter, TracingReporter};
pub use skeleton::{DirectoryExtractor, LocalSkeletonProvider, WalkdirCopier};
