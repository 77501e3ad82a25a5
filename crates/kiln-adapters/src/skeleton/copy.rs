//! Recursive directory copy over `walkdir`.

use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use kiln_core::{
    application::{ApplicationError, ports::DirectoryCopier},
    error::{KilnError, KilnResult},
};

/// Copies a directory tree file by file; symlinks are followed.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkdirCopier;

impl WalkdirCopier {
    pub fn new() -> Self {
        Self
    }
}

impl DirectoryCopier for WalkdirCopier {
    fn copy_dir(&self, from: &Path, to: &Path) -> KilnResult<()> {
        copy_tree(from, to)
    }
}

pub(crate) fn copy_tree(from: &Path, to: &Path) -> KilnResult<()> {
    let failed = |reason: String| -> KilnError {
        ApplicationError::CopyFailed {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            reason,
        }
        .into()
    };

    let mut files = 0usize;
    for entry in WalkDir::new(from).follow_links(true) {
        let entry = entry.map_err(|e| failed(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| failed(e.to_string()))?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| failed(e.to_string()))?;
        } else {
            std::fs::copy(entry.path(), &target)
                .map_err(|e| failed(format!("{}: {e}", entry.path().display())))?;
            files += 1;
        }
    }
    debug!(files, from = %from.display(), to = %to.display(), "Directory copied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_nested_tree() {
        let src = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(src.path().join("config/autoload")).unwrap();
        std::fs::create_dir_all(src.path().join("module")).unwrap();
        std::fs::write(src.path().join("config/application.config.php"), "<?php").unwrap();
        std::fs::write(src.path().join("config/autoload/global.php"), "<?php").unwrap();

        let dst = tempfile::tempdir().unwrap();
        let target = dst.path().join("project");
        WalkdirCopier::new().copy_dir(src.path(), &target).unwrap();

        assert!(target.join("module").is_dir());
        assert_eq!(
            std::fs::read_to_string(target.join("config/autoload/global.php")).unwrap(),
            "<?php"
        );
    }

    #[test]
    fn missing_source_is_copy_failed() {
        let dst = tempfile::tempdir().unwrap();
        let err = WalkdirCopier::new()
            .copy_dir(&dst.path().join("nope"), &dst.path().join("out"))
            .unwrap_err();
        assert!(matches!(
            err,
            KilnError::Application(ApplicationError::CopyFailed { .. })
        ));
    }
}
