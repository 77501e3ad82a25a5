//! Unpacks a directory package into the staging area.

use std::path::{Path, PathBuf};

use tracing::instrument;

use kiln_core::{
    application::{ApplicationError, ports::ArchiveExtractor},
    error::{KilnError, KilnResult},
};

use super::copy::copy_tree;

/// Treats a skeleton package as an unpacked directory.
///
/// The package is staged under `staging/<package name>`. A package whose
/// only entry is a directory (the usual `Name-master/` wrapper) resolves to
/// that inner directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryExtractor;

impl DirectoryExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveExtractor for DirectoryExtractor {
    #[instrument(skip(self))]
    fn extract(&self, archive: &Path, staging: &Path) -> KilnResult<PathBuf> {
        let failed = |reason: String| -> KilnError {
            ApplicationError::ExtractionFailed {
                archive: archive.to_path_buf(),
                reason,
            }
            .into()
        };
        if !archive.is_dir() {
            return Err(failed("not a skeleton directory".into()));
        }
        let name = archive
            .file_name()
            .ok_or_else(|| failed("package has no name".into()))?;
        let root = staging.join(name);
        copy_tree(archive, &root).map_err(|e| failed(e.to_string()))?;
        single_child_dir(&root).map_err(|e| failed(e.to_string()))
    }
}

fn single_child_dir(root: &Path) -> std::io::Result<PathBuf> {
    let entries = std::fs::read_dir(root)?.collect::<Result<Vec<_>, _>>()?;
    if let [only] = entries.as_slice() {
        if only.file_type()?.is_dir() {
            return Ok(only.path());
        }
    }
    Ok(root.to_path_buf())
}
