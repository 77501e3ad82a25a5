//! Applies additions to an existing class without touching what is there.
//!
//! Every operation borrows the input and returns a new artifact, so a failed
//! merge leaves the caller's model exactly as it was.

use crate::domain::entities::{ClassArtifact, ClassRef, Constant, Import, Method, Property};
use crate::domain::error::{DomainError, MemberKind};

/// Imports and parent a merged member depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergePlan {
    pub imports: Vec<Import>,
    pub parent: Option<String>,
}

impl MergePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_import(mut self, import: Import) -> Self {
        self.imports.push(import);
        self
    }

    pub fn require_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

pub struct ArtifactMerger;

impl ArtifactMerger {
    pub fn add_method(class: &ClassArtifact, method: Method) -> Result<ClassArtifact, DomainError> {
        method.validate()?;
        Self::ensure_absent(class, MemberKind::Method, &method.name)?;
        let mut merged = class.clone();
        merged.push_method(method);
        Ok(merged)
    }

    pub fn add_property(class: &ClassArtifact, property: Property) -> Result<ClassArtifact, DomainError> {
        property.validate()?;
        Self::ensure_absent(class, MemberKind::Property, &property.name)?;
        let mut merged = class.clone();
        merged.push_property(property);
        Ok(merged)
    }

    pub fn add_constant(class: &ClassArtifact, constant: Constant) -> Result<ClassArtifact, DomainError> {
        constant.validate()?;
        Self::ensure_absent(class, MemberKind::Constant, &constant.name)?;
        let mut merged = class.clone();
        merged.push_constant(constant);
        Ok(merged)
    }

    /// Strict: an import with the same fully-qualified name is an error.
    pub fn add_import(class: &ClassArtifact, import: Import) -> Result<ClassArtifact, DomainError> {
        if class.has_import(&import.name) {
            return Err(DomainError::ImportAlreadyExists {
                class: class.qualified_name().to_string(),
                import: import.name.to_string(),
            });
        }
        Self::ensure_name_free(class, &import)?;
        let mut merged = class.clone();
        merged.push_import(import);
        Ok(merged)
    }

    /// Idempotent: a present import is left as is. A different class
    /// already imported under the same local name is a conflict.
    pub fn ensure_import(class: &ClassArtifact, import: Import) -> Result<ClassArtifact, DomainError> {
        if class.has_import(&import.name) {
            return Ok(class.clone());
        }
        Self::ensure_name_free(class, &import)?;
        let mut merged = class.clone();
        merged.push_import(import);
        Ok(merged)
    }

    /// Sets or replaces the parent class. Setting the current parent again
    /// is a no-op.
    pub fn set_parent(class: &ClassArtifact, parent: &str) -> Result<ClassArtifact, DomainError> {
        let parent = ClassRef::new(parent)?;
        let mut merged = class.clone();
        if class.parent() != Some(&parent) {
            merged.replace_parent(parent);
        }
        Ok(merged)
    }

    /// Append `method`, then apply the plan's imports and parent.
    pub fn add_method_with(
        class: &ClassArtifact,
        method: Method,
        plan: &MergePlan,
    ) -> Result<ClassArtifact, DomainError> {
        let mut merged = Self::add_method(class, method)?;
        for import in &plan.imports {
            merged = Self::ensure_import(&merged, import.clone())?;
        }
        if let Some(parent) = &plan.parent {
            merged = Self::set_parent(&merged, parent)?;
        }
        Ok(merged)
    }

    /// PHP compares imported names case-insensitively.
    fn ensure_name_free(class: &ClassArtifact, import: &Import) -> Result<(), DomainError> {
        let local = import.local_name();
        match class
            .imports()
            .iter()
            .find(|existing| existing.local_name().eq_ignore_ascii_case(local))
        {
            Some(existing) => Err(DomainError::ImportNameConflict {
                class: class.qualified_name().to_string(),
                import: import.name.to_string(),
                existing: existing.name.to_string(),
                local: local.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn ensure_absent(class: &ClassArtifact, kind: MemberKind, name: &str) -> Result<(), DomainError> {
        if class.has_member(kind, name) {
            return Err(DomainError::MemberAlreadyExists {
                class: class.qualified_name().to_string(),
                kind,
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Visibility;
    use pretty_assertions::assert_eq;

    fn controller() -> ClassArtifact {
        ClassArtifact::builder("PostController")
            .namespace("Blog\\Controller")
            .method(Method::new("getList", Visibility::Public).with_body("return 1;"))
            .build()
            .unwrap()
    }

    #[test]
    fn add_method_appends_and_keeps_input() {
        let original = controller();
        let merged =
            ArtifactMerger::add_method(&original, Method::new("indexAction", Visibility::Public)).unwrap();

        assert_eq!(original.methods().len(), 1);
        let names: Vec<&str> = merged.methods().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["getList", "indexAction"]);
    }

    #[test]
    fn existing_member_is_rejected() {
        let original = controller();
        let err = ArtifactMerger::add_method(&original, Method::new("getList", Visibility::Private))
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::MemberAlreadyExists {
                class: "Blog\\Controller\\PostController".into(),
                kind: MemberKind::Method,
                name: "getList".into(),
            }
        );
    }

    #[test]
    fn kinds_do_not_collide() {
        let merged =
            ArtifactMerger::add_property(&controller(), Property::new("getList", Visibility::Private));
        assert!(merged.is_ok());
        let merged = ArtifactMerger::add_constant(&merged.unwrap(), Constant::new("getList", "1"));
        assert!(merged.is_ok());
    }

    #[test]
    fn import_strict_and_idempotent() {
        let import = Import::new("Zend\\View\\Model\\JsonModel").unwrap();
        let once = ArtifactMerger::add_import(&controller(), import.clone()).unwrap();
        assert!(matches!(
            ArtifactMerger::add_import(&once, import.clone()),
            Err(DomainError::ImportAlreadyExists { .. })
        ));
        let twice = ArtifactMerger::ensure_import(&once, import).unwrap();
        assert_eq!(twice, once);
    }

    #[test]
    fn import_reusing_a_local_name_is_a_conflict() {
        let local = ArtifactMerger::add_import(&controller(), Import::new("App\\View\\JsonModel").unwrap())
            .unwrap();
        let zend = Import::new("Zend\\View\\Model\\JsonModel").unwrap();

        let err = ArtifactMerger::ensure_import(&local, zend.clone()).unwrap_err();
        assert_eq!(
            err,
            DomainError::ImportNameConflict {
                class: "Blog\\Controller\\PostController".into(),
                import: "Zend\\View\\Model\\JsonModel".into(),
                existing: "App\\View\\JsonModel".into(),
                local: "JsonModel".into(),
            }
        );
        assert!(ArtifactMerger::add_import(&local, zend.clone()).is_err());

        let plan = MergePlan::new().require_import(zend);
        let merged = ArtifactMerger::add_method_with(
            &local,
            Method::new("listAction", Visibility::Public),
            &plan,
        );
        assert!(matches!(merged, Err(DomainError::ImportNameConflict { .. })));

        let aliased = Import::aliased("Zend\\View\\Model\\JsonModel", "ZendJson").unwrap();
        assert!(ArtifactMerger::ensure_import(&local, aliased).is_ok());
    }

    #[test]
    fn set_parent_is_idempotent_and_replaces() {
        let with_parent = ArtifactMerger::set_parent(&controller(), "AbstractActionController").unwrap();
        let again = ArtifactMerger::set_parent(&with_parent, "AbstractActionController").unwrap();
        assert_eq!(again, with_parent);

        let replaced = ArtifactMerger::set_parent(&with_parent, "AbstractRestfulController").unwrap();
        assert_eq!(replaced.parent().unwrap().as_str(), "AbstractRestfulController");
    }

    #[test]
    fn add_method_with_plan() {
        let plan = MergePlan::new()
            .require_import(Import::new("Zend\\View\\Model\\JsonModel").unwrap())
            .require_import(Import::new("Zend\\View\\Model\\JsonModel").unwrap())
            .require_parent("AbstractRestfulController");

        let merged = ArtifactMerger::add_method_with(
            &controller(),
            Method::new("listAction", Visibility::Public).with_body("return new JsonModel([]);"),
            &plan,
        )
        .unwrap();

        assert_eq!(merged.imports().len(), 1);
        assert_eq!(merged.parent().unwrap().as_str(), "AbstractRestfulController");
        assert!(merged.method("listAction").is_some());
    }

    #[test]
    fn invalid_member_name_is_rejected() {
        let err = ArtifactMerger::add_method(&controller(), Method::new("list-action", Visibility::Public));
        assert!(matches!(err, Err(DomainError::InvalidIdentifier { .. })));
    }
}
