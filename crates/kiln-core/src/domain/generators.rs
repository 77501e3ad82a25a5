//! Fixed class and config templates for a module's artifacts.
//!
//! Every generator is a pure function from validated names to a model; the
//! orchestrator decides which ones run and where their output goes.

use crate::domain::entities::common::{camel_to_dash, lcfirst, ucfirst, validate_identifier};
use crate::domain::entities::{
    ClassArtifact, ConfigKey, ConfigTree, ConfigValue, Import, KeyPath, Method, Parameter, Property,
    QualifiedName,
};
use crate::domain::error::DomainError;
use crate::domain::merge::MergePlan;
use crate::domain::value_objects::{ArtifactKind, Visibility};

const ENTITY_REPOSITORY: &str = "Doctrine\\ORM\\EntityRepository";
const ENTITY_MANAGER: &str = "Doctrine\\ORM\\EntityManager";
const ORM_MAPPING: &str = "Doctrine\\ORM\\Mapping";
const RESTFUL_CONTROLLER: &str = "Zend\\Mvc\\Controller\\AbstractRestfulController";
const JSON_MODEL: &str = "Zend\\View\\Model\\JsonModel";
const NOT_IMPLEMENTED: &str = "return $this->getResponse()->setStatusCode(501);";

/// Validated module name (`{M}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleName(String);

impl ModuleName {
    pub fn new(raw: &str) -> Result<Self, DomainError> {
        let name = ucfirst(raw.trim());
        validate_identifier(&name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// View directory name: `BlogPost` -> `blog-post`.
    pub fn dashed(&self) -> String {
        camel_to_dash(&self.0)
    }
}

impl std::fmt::Display for ModuleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derived names for one entity inside one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    module: ModuleName,
    lower: String,
    upper: String,
}

impl ArtifactNames {
    pub fn new(module: &str, entity: &str) -> Result<Self, DomainError> {
        let module = ModuleName::new(module)?;
        let entity = entity.trim();
        validate_identifier(entity)?;
        Ok(Self {
            module,
            lower: lcfirst(entity),
            upper: ucfirst(entity),
        })
    }

    pub fn module(&self) -> &ModuleName {
        &self.module
    }

    /// `{u}`: used for property and accessor names.
    pub fn lower(&self) -> &str {
        &self.lower
    }

    /// `{U}`: used for class names.
    pub fn upper(&self) -> &str {
        &self.upper
    }

    /// `PostRepository`, `PostController`, `Post` for entities.
    pub fn class_name(&self, kind: ArtifactKind) -> String {
        format!("{}{}", self.upper, kind.class_suffix())
    }

    /// `Blog\Repository`
    pub fn namespace(&self, kind: ArtifactKind) -> String {
        format!("{}\\{}", self.module, kind.segment())
    }

    /// `Blog\Repository\PostRepository`
    pub fn qualified(&self, kind: ArtifactKind) -> Result<QualifiedName, DomainError> {
        QualifiedName::parse(&format!("{}\\{}", self.namespace(kind), self.class_name(kind)))
    }

    /// Controller alias registered in `controllers.invokables`: `Blog\Controller\Post`.
    pub fn controller_alias(&self) -> String {
        format!("{}\\{}", self.namespace(ArtifactKind::Controller), self.upper)
    }
}

// ── Class generators ─────────────────────────────────────────────────────────

pub fn entity(names: &ArtifactNames, with_repository: bool) -> Result<ClassArtifact, DomainError> {
    let doc = if with_repository {
        format!(
            "@ORM\\Entity(repositoryClass=\"{}\")",
            names.qualified(ArtifactKind::Repository)?
        )
    } else {
        "@ORM\\Entity".to_string()
    };

    ClassArtifact::builder(names.class_name(ArtifactKind::Entity))
        .namespace(names.namespace(ArtifactKind::Entity))
        .import(Import::aliased(ORM_MAPPING, "ORM")?)
        .doc(&doc)
        .property(Property::new("id", Visibility::Private))
        .method(Method::new("getId", Visibility::Public).with_body("return $this->id;"))
        .method(
            Method::new("setId", Visibility::Public)
                .with_parameters(["id"])
                .with_body("$this->id = $id;"),
        )
        .build()
}

pub fn repository(names: &ArtifactNames) -> Result<ClassArtifact, DomainError> {
    ClassArtifact::builder(names.class_name(ArtifactKind::Repository))
        .namespace(names.namespace(ArtifactKind::Repository))
        .import(Import::new(ENTITY_REPOSITORY)?)
        .extends("EntityRepository")
        .build()
}

pub fn service(names: &ArtifactNames) -> Result<ClassArtifact, DomainError> {
    let repository = format!("{}Repository", names.lower());
    let body = format!(
        "$this->entityManager = $entityManager;\n$this->{repository} = $entityManager->getRepository({}::class);",
        names.upper()
    );

    ClassArtifact::builder(names.class_name(ArtifactKind::Service))
        .namespace(names.namespace(ArtifactKind::Service))
        .import(Import::new(&names.qualified(ArtifactKind::Entity)?.to_string())?)
        .import(Import::new(ENTITY_MANAGER)?)
        .property(Property::new("entityManager", Visibility::Private))
        .property(Property::new(repository, Visibility::Private))
        .method(
            Method::new("__construct", Visibility::Public)
                .with_parameter(Parameter::new("entityManager").typed("EntityManager"))
                .with_body(body),
        )
        .build()
}

/// REST controller answering 501 on every verb. With `with_service` it also
/// gets a lazily resolved handle on the entity's service.
pub fn controller(names: &ArtifactNames, with_service: bool) -> Result<ClassArtifact, DomainError> {
    let mut builder = ClassArtifact::builder(names.class_name(ArtifactKind::Controller))
        .namespace(names.namespace(ArtifactKind::Controller))
        .import(Import::new(RESTFUL_CONTROLLER)?)
        .import(Import::new(JSON_MODEL)?)
        .extends("AbstractRestfulController")
        .method(Method::new("getList", Visibility::Public).with_body(NOT_IMPLEMENTED))
        .method(
            Method::new("get", Visibility::Public)
                .with_parameters(["id"])
                .with_body(NOT_IMPLEMENTED),
        )
        .method(
            Method::new("create", Visibility::Public)
                .with_parameters(["data"])
                .with_body(NOT_IMPLEMENTED),
        )
        .method(
            Method::new("update", Visibility::Public)
                .with_parameters(["id", "data"])
                .with_body(NOT_IMPLEMENTED),
        );

    // The accessor follows the REST stubs.
    if with_service {
        let service_class = names.class_name(ArtifactKind::Service);
        let field = format!("{}Service", names.lower());
        let body = format!(
            "if (!$this->{field}) {{\n    $this->{field} = $this->getServiceLocator()->get({service_class}::class);\n}}\n\nreturn $this->{field};"
        );
        builder = builder
            .import(Import::new(&names.qualified(ArtifactKind::Service)?.to_string())?)
            .property(Property::new(field, Visibility::Private))
            .method(
                Method::new(format!("get{}", service_class), Visibility::Public).with_body(body),
            );
    }

    builder.build()
}

/// `{a}Action()` plus what it needs from its controller.
pub fn action(name: &str) -> Result<(Method, MergePlan), DomainError> {
    let name = name.trim();
    validate_identifier(name)?;
    let method = Method::new(format!("{}Action", lcfirst(name)), Visibility::Public)
        .with_body("return new JsonModel([]);");
    let plan = MergePlan::new()
        .require_import(Import::new(RESTFUL_CONTROLLER)?)
        .require_import(Import::new(JSON_MODEL)?)
        .require_parent("AbstractRestfulController");
    Ok((method, plan))
}

/// `{M}\Module`, the module's bootstrap class.
pub fn module_class(module: &ModuleName) -> Result<ClassArtifact, DomainError> {
    ClassArtifact::builder("Module")
        .namespace(module.as_str())
        .method(
            Method::new("getConfig", Visibility::Public)
                .with_body("return include __DIR__ . '/config/module.config.php';"),
        )
        .method(
            Method::new("getServiceConfig", Visibility::Public)
                .with_body("return include __DIR__ . '/config/services.config.php';"),
        )
        .method(Method::new("getAutoloaderConfig", Visibility::Public).with_body(
            "return array(\n    'Zend\\Loader\\StandardAutoloader' => array(\n        'namespaces' => array(\n            __NAMESPACE__ => __DIR__ . '/src/' . __NAMESPACE__,\n        ),\n    ),\n);",
        ))
        .build()
}

// ── Config generators ────────────────────────────────────────────────────────

fn name(key: &str) -> ConfigKey {
    ConfigKey::Name(key.to_string())
}

/// Initial `module.config.php`.
pub fn module_config(module: &ModuleName) -> ConfigTree {
    ConfigTree::new()
        .with(
            name("controllers"),
            ConfigTree::new().with(name("invokables"), ConfigTree::new()),
        )
        .with(
            name("view_manager"),
            ConfigTree::new().with(
                name("template_path_stack"),
                ConfigTree::new().with(
                    name(&module.dashed()),
                    ConfigValue::Raw("__DIR__ . '/../view'".to_string()),
                ),
            ),
        )
}

/// Initial `services.config.php`.
pub fn services_config() -> ConfigTree {
    ConfigTree::new().with(name("factories"), ConfigTree::new())
}

/// Entry registering the entity's controller as an invokable.
pub fn controller_registration(names: &ArtifactNames) -> Result<(KeyPath, ConfigValue), DomainError> {
    let path = KeyPath::new(["controllers", "invokables", names.controller_alias().as_str()])?;
    let target = names.qualified(ArtifactKind::Controller)?.to_string();
    Ok((path, ConfigValue::String(target)))
}

/// Entry adding the module to `modules` in the application config.
pub fn module_registration(module: &ModuleName) -> Result<(KeyPath, ConfigValue), DomainError> {
    Ok((KeyPath::new(["modules"])?, ConfigValue::string(module.as_str())))
}
