//! In-memory filesystem adapter for testing.

use std::{
    collections::{BTreeMap, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use kiln_core::{
    application::{ApplicationError, ports::Filesystem},
    error::KilnResult,
};

/// In-memory filesystem for testing.
///
/// Clones share the same state, so a test can keep one handle and give
/// another to a service.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, String>,
    directories: HashSet<PathBuf>,
    failing_writes: HashSet<PathBuf>,
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file, creating its parent directories.
    pub fn with_file(self, path: impl AsRef<Path>, content: &str) -> Self {
        let path = path.as_ref();
        if let Ok(mut inner) = self.inner.write() {
            if let Some(parent) = path.parent() {
                inner.add_dirs(parent);
            }
            inner.files.insert(path.to_path_buf(), content.to_string());
        }
        self
    }

    /// Seed an empty directory.
    pub fn with_dir(self, path: impl AsRef<Path>) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.add_dirs(path.as_ref());
        }
        self
    }

    /// Make every later write to `path` fail.
    pub fn fail_writes_to(&self, path: impl AsRef<Path>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.failing_writes.insert(path.as_ref().to_path_buf());
        }
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: impl AsRef<Path>) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path.as_ref()).cloned()
    }

    /// List all files, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn read(&self) -> KilnResult<RwLockReadGuard<'_, MemoryFilesystemInner>> {
        Ok(self.inner.read().map_err(|_| ApplicationError::StoreLockError)?)
    }

    fn write(&self) -> KilnResult<RwLockWriteGuard<'_, MemoryFilesystemInner>> {
        Ok(self.inner.write().map_err(|_| ApplicationError::StoreLockError)?)
    }
}

impl MemoryFilesystemInner {
    fn add_dirs(&mut self, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            self.directories.insert(current.clone());
        }
    }

    fn store(&mut self, path: &Path, content: String) -> KilnResult<()> {
        if self.failing_writes.contains(path) {
            return Err(ApplicationError::filesystem(path, "write refused").into());
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !self.directories.contains(parent) {
                return Err(
                    ApplicationError::filesystem(path, "Parent directory does not exist").into(),
                );
            }
        }
        self.files.insert(path.to_path_buf(), content);
        Ok(())
    }
}

impl Filesystem for MemoryFilesystem {
    fn read_to_string(&self, path: &Path) -> KilnResult<String> {
        self.read()?
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| ApplicationError::filesystem(path, "No such file").into())
    }

    fn write_file(&self, path: &Path, content: &str) -> KilnResult<()> {
        self.write()?.store(path, content.to_string())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> KilnResult<()> {
        let mut inner = self.write()?;
        let content = inner
            .files
            .get(from)
            .cloned()
            .ok_or_else(|| ApplicationError::filesystem(from, "No such file"))?;
        inner.store(to, content)
    }

    fn create_dir_all(&self, path: &Path) -> KilnResult<()> {
        self.write()?.add_dirs(path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn remove_dir_all(&self, path: &Path) -> KilnResult<()> {
        let mut inner = self.write()?;
        inner.directories.retain(|p| !p.starts_with(path));
        inner.files.retain(|p, _| !p.starts_with(path));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_requires_parent() {
        let fs = MemoryFilesystem::new();
        assert!(fs.write_file(Path::new("a/b.php"), "x").is_err());
        fs.create_dir_all(Path::new("a")).unwrap();
        fs.write_file(Path::new("a/b.php"), "x").unwrap();
        assert_eq!(fs.read_file("a/b.php").as_deref(), Some("x"));
    }

    #[test]
    fn injected_failure_blocks_write_but_not_copy_source() {
        let fs = MemoryFilesystem::new().with_file("c/app.php", "<?php");
        fs.fail_writes_to("c/app.php");
        assert!(fs.write_file(Path::new("c/app.php"), "new").is_err());
        fs.copy_file(Path::new("c/app.php"), Path::new("c/app.old")).unwrap();
        assert_eq!(fs.read_file("c/app.old").as_deref(), Some("<?php"));
    }

    #[test]
    fn remove_dir_all_drops_subtree() {
        let fs = MemoryFilesystem::new()
            .with_file("stage/x/a.txt", "a")
            .with_file("keep/b.txt", "b");
        fs.remove_dir_all(Path::new("stage")).unwrap();
        assert!(!fs.exists(Path::new("stage")));
        assert!(!fs.exists(Path::new("stage/x")));
        assert_eq!(fs.list_files(), vec![PathBuf::from("keep/b.txt")]);
    }
}
