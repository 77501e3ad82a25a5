//! Config Patcher - merges one entry into a `return array(...);` file.
//!
//! The original is copied byte-for-byte to `<stem>.old` before the new
//! content is written. There is no rollback: if the write fails the backup
//! stays and the error names it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    application::{ApplicationError, ports::Filesystem},
    domain::{ConfigTree, ConfigValue, KeyPath, ProjectLayout, read_config, render_config_file},
    error::KilnResult,
};

/// Result of a patch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The entry was already present; no file was touched.
    Unchanged,
    Patched { backup: PathBuf, config: PathBuf },
}

pub struct ConfigPatcher {
    filesystem: Arc<dyn Filesystem>,
}

impl ConfigPatcher {
    pub fn new(filesystem: Arc<dyn Filesystem>) -> Self {
        Self { filesystem }
    }

    /// Set `key` to `value` unless the key is already present.
    #[instrument(skip_all, fields(config = %path.display(), key = %key))]
    pub fn patch(&self, path: &Path, key: &KeyPath, value: ConfigValue) -> KilnResult<PatchOutcome> {
        let mut tree = self.load(path)?;
        if !tree.insert_path(key, value)? {
            info!("Key already present");
            return Ok(PatchOutcome::Unchanged);
        }
        self.commit(path, &tree)
    }

    /// Push `value` onto the sequence at `key` unless an equal value is there.
    #[instrument(skip_all, fields(config = %path.display(), key = %key))]
    pub fn append(&self, path: &Path, key: &KeyPath, value: ConfigValue) -> KilnResult<PatchOutcome> {
        let mut tree = self.load(path)?;
        if !tree.append_unique(key, value)? {
            info!("Value already present");
            return Ok(PatchOutcome::Unchanged);
        }
        self.commit(path, &tree)
    }

    fn load(&self, path: &Path) -> KilnResult<ConfigTree> {
        let load_error = |reason: String| ApplicationError::ConfigLoad {
            path: path.to_path_buf(),
            reason,
        };
        let source = self
            .filesystem
            .read_to_string(path)
            .map_err(|e| load_error(e.to_string()))?;
        Ok(read_config(&source).map_err(|e| load_error(e.to_string()))?)
    }

    fn commit(&self, path: &Path, tree: &ConfigTree) -> KilnResult<PatchOutcome> {
        let backup = ProjectLayout::backup_path(path);
        self.filesystem.copy_file(path, &backup)?;

        let backup_name = backup
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.filesystem
            .write_file(path, &render_config_file(tree, &backup_name))
            .map_err(|e| ApplicationError::ConfigWrite {
                path: path.to_path_buf(),
                backup: backup.clone(),
                reason: e.to_string(),
            })?;

        info!(backup = %backup.display(), "Configuration patched");
        Ok(PatchOutcome::Patched {
            backup,
            config: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockFilesystem;
    use crate::error::KilnError;
    use mockall::Sequence;

    const CONFIG: &str = "<?php\nreturn array(\n    'controllers' => array(\n        'invokables' => array(),\n    ),\n);\n";

    fn key() -> KeyPath {
        KeyPath::new(["controllers", "invokables", "Blog\\Controller\\Post"]).unwrap()
    }

    fn value() -> ConfigValue {
        ConfigValue::string("Blog\\Controller\\PostController")
    }

    #[test]
    fn backs_up_before_writing() {
        let mut seq = Sequence::new();
        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string().returning(|_| Ok(CONFIG.to_string()));
        fs.expect_copy_file()
            .withf(|from, to| from == Path::new("module.config.php") && to == Path::new("module.config.old"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        fs.expect_write_file()
            .withf(|_, content| {
                content.contains("stored in module.config.old")
                    && content.contains("'Blog\\\\Controller\\\\Post' => 'Blog\\\\Controller\\\\PostController',")
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let patcher = ConfigPatcher::new(Arc::new(fs));
        let outcome = patcher.patch(Path::new("module.config.php"), &key(), value()).unwrap();
        assert_eq!(
            outcome,
            PatchOutcome::Patched {
                backup: PathBuf::from("module.config.old"),
                config: PathBuf::from("module.config.php"),
            }
        );
    }

    #[test]
    fn present_key_touches_nothing() {
        let existing = "<?php return array('controllers' => array('invokables' => array('Blog\\Controller\\Post' => 'X')));";
        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string().returning(move |_| Ok(existing.to_string()));
        fs.expect_copy_file().never();
        fs.expect_write_file().never();

        let patcher = ConfigPatcher::new(Arc::new(fs));
        let outcome = patcher.patch(Path::new("c.php"), &key(), value()).unwrap();
        assert_eq!(outcome, PatchOutcome::Unchanged);
    }

    #[test]
    fn missing_file_is_config_load() {
        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string()
            .returning(|p| Err(ApplicationError::filesystem(p, "not found").into()));

        let patcher = ConfigPatcher::new(Arc::new(fs));
        let err = patcher.patch(Path::new("c.php"), &key(), value()).unwrap_err();
        assert!(matches!(err, KilnError::Application(ApplicationError::ConfigLoad { .. })));
    }

    #[test]
    fn write_failure_keeps_backup_and_reports_it() {
        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string().returning(|_| Ok(CONFIG.to_string()));
        fs.expect_copy_file().returning(|_, _| Ok(()));
        fs.expect_write_file()
            .returning(|p, _| Err(ApplicationError::filesystem(p, "disk full").into()));

        let patcher = ConfigPatcher::new(Arc::new(fs));
        let err = patcher.patch(Path::new("module.config.php"), &key(), value()).unwrap_err();
        match err {
            KilnError::Application(ApplicationError::ConfigWrite { backup, .. }) => {
                assert_eq!(backup, PathBuf::from("module.config.old"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn append_is_idempotent() {
        let app = "<?php return array('modules' => array('Application', 'Blog'));";
        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string().returning(move |_| Ok(app.to_string()));
        fs.expect_copy_file().never();
        fs.expect_write_file().never();

        let patcher = ConfigPatcher::new(Arc::new(fs));
        let outcome = patcher
            .append(
                Path::new("application.config.php"),
                &KeyPath::new(["modules"]).unwrap(),
                ConfigValue::string("Blog"),
            )
            .unwrap();
        assert_eq!(outcome, PatchOutcome::Unchanged);
    }
}
