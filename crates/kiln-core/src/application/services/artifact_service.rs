//! Artifact Service - class files on disk.
//!
//! Creates new class files and edits existing ones through the
//! read → merge → render → write cycle.

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::{
    application::{ApplicationError, ports::Filesystem},
    domain::{
        ArtifactMerger, ClassArtifact, FileArtifact, MergePlan, Method, QualifiedName, read_class,
        render_class, render_file,
    },
    error::KilnResult,
};

pub struct ArtifactService {
    filesystem: Arc<dyn Filesystem>,
}

impl ArtifactService {
    pub fn new(filesystem: Arc<dyn Filesystem>) -> Self {
        Self { filesystem }
    }

    /// Read the class `qualified` from `path`.
    pub fn read(&self, path: &Path, qualified: &QualifiedName) -> KilnResult<FileArtifact> {
        let source = self.filesystem.read_to_string(path)?;
        Ok(read_class(&source, qualified)?)
    }

    /// Write a freshly generated class. Refuses to overwrite.
    #[instrument(skip_all, fields(class = %class.qualified_name(), path = %path.display()))]
    pub fn create(&self, path: &Path, class: &ClassArtifact) -> KilnResult<()> {
        if self.filesystem.exists(path) {
            return Err(ApplicationError::TargetExists {
                what: format!("class {}", class.qualified_name()),
                path: path.to_path_buf(),
            }
            .into());
        }
        if let Some(parent) = path.parent() {
            self.filesystem.create_dir_all(parent)?;
        }
        self.filesystem.write_file(path, &render_class(class))?;
        info!("Class written");
        Ok(())
    }

    /// Append `method` to the class stored at `path`, applying `plan`.
    ///
    /// Nothing is written when the merge fails.
    #[instrument(skip_all, fields(class = %qualified, method = %method.name))]
    pub fn add_method(
        &self,
        path: &Path,
        qualified: &QualifiedName,
        method: Method,
        plan: &MergePlan,
    ) -> KilnResult<ClassArtifact> {
        let file = self.read(path, qualified)?;
        debug!(
            methods = file.class().methods().len(),
            "Existing class read"
        );
        let merged = ArtifactMerger::add_method_with(file.class(), method, plan)?;
        self.filesystem
            .write_file(path, &render_file(&file.with_class(merged.clone())))?;
        info!("Method merged");
        Ok(merged)
    }
}
