use std::path::{Path, PathBuf};

use crate::domain::entities::common::camel_to_dash;
use crate::domain::value_objects::ArtifactKind;

/// Path conventions of a scaffolded project. Pure path arithmetic, no I/O.
///
/// ```text
/// {root}/
/// ├── config/application.config.php
/// └── module/{M}/
///     ├── Module.php
///     ├── config/module.config.php
///     ├── src/{M}/{Kind}/{Name}.php
///     └── view/{m-dashed}/
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn modules_dir(&self) -> PathBuf {
        self.root.join("module")
    }

    pub fn application_config(&self) -> PathBuf {
        self.root.join("config").join("application.config.php")
    }

    pub fn module_dir(&self, module: &str) -> PathBuf {
        self.modules_dir().join(module)
    }

    pub fn module_class(&self, module: &str) -> PathBuf {
        self.module_dir(module).join("Module.php")
    }

    pub fn module_config(&self, module: &str) -> PathBuf {
        self.module_dir(module).join("config").join("module.config.php")
    }

    pub fn view_dir(&self, module: &str) -> PathBuf {
        self.module_dir(module).join("view").join(camel_to_dash(module))
    }

    /// `module/{M}/src/{M}/{Kind}/{class_name}.php`
    pub fn class_file(&self, module: &str, kind: ArtifactKind, class_name: &str) -> PathBuf {
        self.module_dir(module)
            .join("src")
            .join(module)
            .join(kind.segment())
            .join(format!("{class_name}.php"))
    }

    /// Sibling backup: `module.config.php` becomes `module.config.old`.
    pub fn backup_path(path: &Path) -> PathBuf {
        path.with_extension("old")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_file_follows_module_convention() {
        let layout = ProjectLayout::new("/srv/app");
        assert_eq!(
            layout.class_file("Blog", ArtifactKind::Repository, "PostRepository"),
            PathBuf::from("/srv/app/module/Blog/src/Blog/Repository/PostRepository.php")
        );
    }

    #[test]
    fn config_paths() {
        let layout = ProjectLayout::new("app");
        assert_eq!(
            layout.module_config("Blog"),
            PathBuf::from("app/module/Blog/config/module.config.php")
        );
        assert_eq!(
            layout.application_config(),
            PathBuf::from("app/config/application.config.php")
        );
        assert_eq!(layout.view_dir("BlogPost"), PathBuf::from("app/module/BlogPost/view/blog-post"));
    }

    #[test]
    fn backup_replaces_last_extension() {
        assert_eq!(
            ProjectLayout::backup_path(Path::new("a/module.config.php")),
            PathBuf::from("a/module.config.old")
        );
    }
}
