//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `kiln-adapters` crate provides implementations.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::KilnResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `kiln_adapters::filesystem::LocalFilesystem` (production)
/// - `kiln_adapters::filesystem::MemoryFilesystem` (testing)
///
/// Each call is a single scoped operation; no handles outlive it.
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> KilnResult<String>;

    /// Write (create or truncate) a file. Parent directories must exist.
    fn write_file(&self, path: &Path, content: &str) -> KilnResult<()>;

    /// Byte-for-byte copy of a single file.
    fn copy_file(&self, from: &Path, to: &Path) -> KilnResult<()>;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> KilnResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> KilnResult<()>;
}

/// How a progress message should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// Port for user-facing progress messages, one per stage outcome.
#[cfg_attr(test, mockall::automock)]
pub trait Reporter: Send + Sync {
    fn report(&self, message: &str, severity: Severity);
}

/// Port locating a project skeleton package.
#[cfg_attr(test, mockall::automock)]
pub trait SkeletonProvider: Send + Sync {
    /// The most recent skeleton package.
    fn fetch_latest(&self) -> KilnResult<PathBuf>;

    /// A previously cached package, used when the latest is unavailable.
    fn fetch_cached_fallback(&self) -> KilnResult<PathBuf>;
}

/// Port unpacking a skeleton package.
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveExtractor: Send + Sync {
    /// Unpack `archive` under `staging`; returns the skeleton root inside it.
    fn extract(&self, archive: &Path, staging: &Path) -> KilnResult<PathBuf>;
}

/// Port copying a directory tree.
#[cfg_attr(test, mockall::automock)]
pub trait DirectoryCopier: Send + Sync {
    /// Copy everything under `from` into `to`, creating `to`.
    fn copy_dir(&self, from: &Path, to: &Path) -> KilnResult<()>;
}
