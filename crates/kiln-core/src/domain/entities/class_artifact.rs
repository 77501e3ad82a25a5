//! The class artifact aggregate: an in-memory model of one PHP class file.
//!
//! ## Structure
//!
//! ```text
//! FileArtifact
//! ├── header: Option<DocBlock>          file-level banner
//! └── ClassArtifact (Aggregate Root)
//!     ├── namespace, name, modifier
//!     ├── doc: Option<DocBlock>
//!     ├── parent: Option<ClassRef>       at most one, enforced by type
//!     ├── interfaces: Vec<ClassRef>
//!     ├── imports: Vec<Import>           unique by fully-qualified name
//!     ├── constants: Vec<Constant>       ┐
//!     ├── properties: Vec<Property>      ├ unique by name within each kind
//!     └── methods: Vec<Method>           ┘
//! ```
//!
//! ## Invariants
//!
//! All invariants are checked by [`ClassBuilder::build`]. A `ClassArtifact`
//! that exists is valid; the only way to change one afterwards is through
//! [`crate::domain::merge::ArtifactMerger`], which re-checks the invariant it
//! could break and returns a new value.
//!
//! Doc-blocks and method bodies are *normalized* on construction so that a
//! model survives a render/read cycle unchanged: trailing whitespace is
//! trimmed, blank edge lines are dropped, and bodies lose their common
//! indentation. A body read from source that is not already in rendered
//! layout is kept [`Body::verbatim`] instead, so string literals spanning
//! lines are never re-indented.

use std::collections::HashSet;

use crate::domain::{
    entities::common::{QualifiedName, validate_identifier},
    error::{DomainError, MemberKind},
    value_objects::{ClassModifier, Visibility},
};

// ── Text blobs ───────────────────────────────────────────────────────────────

/// Doc-block content without the `/**`, ` * ` and `*/` decoration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocBlock(String);

impl DocBlock {
    pub fn new(text: impl AsRef<str>) -> Self {
        Self(normalize(text.as_ref(), false))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.0.lines()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.0.contains("*/") {
            return Err(DomainError::InvalidDocBlock {
                reason: "text contains the comment terminator '*/'".into(),
            });
        }
        Ok(())
    }
}

/// Opaque method body. Never parsed beyond brace matching.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Body {
    text: String,
    verbatim: bool,
}

impl Body {
    /// Normalized body: the writer re-indents it.
    pub fn new(text: impl AsRef<str>) -> Self {
        Self {
            text: normalize(text.as_ref(), true),
            verbatim: false,
        }
    }

    /// Everything between the braces exactly as written, including the
    /// leading newline and the indentation before `}`. Rendered untouched.
    pub fn verbatim(raw: impl Into<String>) -> Self {
        Self {
            text: raw.into(),
            verbatim: true,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_verbatim(&self) -> bool {
        self.verbatim
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }
}

fn normalize(text: &str, dedent: bool) -> String {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let first = lines.iter().position(|l| !l.is_empty());
    let last = lines.iter().rposition(|l| !l.is_empty());
    let (Some(first), Some(last)) = (first, last) else {
        return String::new();
    };
    let lines = &lines[first..=last];

    let indent = if dedent {
        common_indent(lines)
    } else {
        ""
    };

    lines
        .iter()
        .map(|l| l.strip_prefix(indent).unwrap_or(l))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Longest whitespace prefix shared by every non-empty line.
pub(crate) fn common_indent<'a>(lines: &[&'a str]) -> &'a str {
    let mut common: Option<&'a str> = None;
    for line in lines.iter().filter(|l| !l.is_empty()) {
        let ws = &line[..line.len() - line.trim_start_matches([' ', '\t']).len()];
        common = Some(match common {
            None => ws,
            Some(prev) => {
                let shared = prev
                    .bytes()
                    .zip(ws.bytes())
                    .take_while(|(a, b)| a == b)
                    .count();
                &prev[..shared]
            }
        });
    }
    common.unwrap_or("")
}

// ── References and imports ───────────────────────────────────────────────────

/// A class reference as written in source (`EntityRepository`, `\Exception`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassRef(String);

impl ClassRef {
    pub fn new(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        QualifiedName::parse(&raw)?;
        Ok(Self(raw.trim().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClassRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A `use` statement. Identity is the fully-qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub name: QualifiedName,
    pub alias: Option<String>,
}

impl Import {
    pub fn new(name: &str) -> Result<Self, DomainError> {
        Ok(Self {
            name: QualifiedName::parse(name)?,
            alias: None,
        })
    }

    pub fn aliased(name: &str, alias: &str) -> Result<Self, DomainError> {
        validate_identifier(alias)?;
        Ok(Self {
            name: QualifiedName::parse(name)?,
            alias: Some(alias.to_string()),
        })
    }

    /// Name the class is known by inside the importing file.
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or_else(|| self.name.short_name())
    }
}

// ── Members ──────────────────────────────────────────────────────────────────

/// One method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub type_hint: Option<String>,
    /// Default value as raw source (`null`, `array()`, `'x'`).
    pub default: Option<String>,
    pub by_reference: bool,
    pub variadic: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_hint: None,
            default: None,
            by_reference: false,
            variadic: false,
        }
    }

    pub fn typed(mut self, hint: impl Into<String>) -> Self {
        self.type_hint = Some(hint.into());
        self
    }

    pub fn with_default(mut self, raw: impl Into<String>) -> Self {
        self.default = Some(raw.into());
        self
    }

    pub fn by_reference(mut self) -> Self {
        self.by_reference = true;
        self
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }
}

/// Class constant (`const STATUS = 1;`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant {
    pub name: String,
    pub value: String,
    pub doc: Option<DocBlock>,
}

impl Constant {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into().trim().to_string(),
            doc: None,
        }
    }

    pub fn with_doc(mut self, text: &str) -> Self {
        self.doc = Some(DocBlock::new(text));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub default: Option<String>,
    pub doc: Option<DocBlock>,
}

impl Property {
    pub fn new(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            visibility,
            is_static: false,
            default: None,
            doc: None,
        }
    }

    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_default(mut self, raw: impl Into<String>) -> Self {
        self.default = Some(raw.into().trim().to_string());
        self
    }

    pub fn with_doc(mut self, text: &str) -> Self {
        self.doc = Some(DocBlock::new(text));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
    pub body: Body,
    pub doc: Option<DocBlock>,
}

impl Method {
    pub fn new(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            visibility,
            is_static: false,
            parameters: Vec::new(),
            return_type: None,
            body: Body::default(),
            doc: None,
        }
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Shorthand for untyped parameters: `.with_parameters(["id", "data"])`.
    pub fn with_parameters<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters
            .extend(names.into_iter().map(|n| Parameter::new(n)));
        self
    }

    pub fn with_body(mut self, body: impl AsRef<str>) -> Self {
        self.body = Body::new(body);
        self
    }

    pub fn returning(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_doc(mut self, text: &str) -> Self {
        self.doc = Some(DocBlock::new(text));
        self
    }

    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        validate_identifier(&self.name)?;
        for parameter in &self.parameters {
            validate_identifier(&parameter.name)?;
        }
        validate_doc(self.doc.as_ref())
    }
}

impl Property {
    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        validate_identifier(&self.name)?;
        validate_doc(self.doc.as_ref())
    }
}

impl Constant {
    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        validate_identifier(&self.name)?;
        validate_doc(self.doc.as_ref())
    }
}

fn validate_doc(doc: Option<&DocBlock>) -> Result<(), DomainError> {
    doc.map_or(Ok(()), DocBlock::validate)
}

// ── Aggregate root ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassArtifact {
    namespace: Option<QualifiedName>,
    name: String,
    modifier: Option<ClassModifier>,
    doc: Option<DocBlock>,
    parent: Option<ClassRef>,
    interfaces: Vec<ClassRef>,
    imports: Vec<Import>,
    constants: Vec<Constant>,
    properties: Vec<Property>,
    methods: Vec<Method>,
}

impl ClassArtifact {
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder::new(name)
    }

    pub fn namespace(&self) -> Option<&QualifiedName> {
        self.namespace.as_ref()
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn modifier(&self) -> Option<ClassModifier> {
        self.modifier
    }
    pub fn doc(&self) -> Option<&DocBlock> {
        self.doc.as_ref()
    }
    pub fn parent(&self) -> Option<&ClassRef> {
        self.parent.as_ref()
    }
    pub fn interfaces(&self) -> &[ClassRef] {
        &self.interfaces
    }
    pub fn imports(&self) -> &[Import] {
        &self.imports
    }
    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// `Namespace\Name`.
    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::join(self.namespace.as_ref(), &self.name)
            .unwrap_or_else(|_| unreachable!("class name validated by ClassBuilder::build"))
    }

    pub fn has_import(&self, name: &QualifiedName) -> bool {
        self.imports.iter().any(|i| &i.name == name)
    }

    pub fn has_member(&self, kind: MemberKind, name: &str) -> bool {
        match kind {
            MemberKind::Constant => self.constants.iter().any(|c| c.name == name),
            MemberKind::Property => self.properties.iter().any(|p| p.name == name),
            MemberKind::Method => self.methods.iter().any(|m| m.name == name),
        }
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    // Mutation is crate-private; the merger is the only caller.

    pub(crate) fn push_import(&mut self, import: Import) {
        self.imports.push(import);
    }
    pub(crate) fn push_constant(&mut self, constant: Constant) {
        self.constants.push(constant);
    }
    pub(crate) fn push_property(&mut self, property: Property) {
        self.properties.push(property);
    }
    pub(crate) fn push_method(&mut self, method: Method) {
        self.methods.push(method);
    }
    pub(crate) fn replace_parent(&mut self, parent: ClassRef) {
        self.parent = Some(parent);
    }
}

/// Builder for [`ClassArtifact`]. All validation happens in [`Self::build`].
#[derive(Debug, Clone)]
pub struct ClassBuilder {
    namespace: Option<String>,
    name: String,
    modifier: Option<ClassModifier>,
    doc: Option<DocBlock>,
    parent: Option<String>,
    interfaces: Vec<String>,
    imports: Vec<Import>,
    constants: Vec<Constant>,
    properties: Vec<Property>,
    methods: Vec<Method>,
}

impl ClassBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
            modifier: None,
            doc: None,
            parent: None,
            interfaces: Vec::new(),
            imports: Vec::new(),
            constants: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// The reader collects imports before it reaches the class name.
    pub(crate) fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn modifier(mut self, modifier: ClassModifier) -> Self {
        self.modifier = Some(modifier);
        self
    }

    pub fn doc(mut self, text: &str) -> Self {
        self.doc = Some(DocBlock::new(text));
        self
    }

    pub fn doc_block(mut self, doc: Option<DocBlock>) -> Self {
        self.doc = doc;
        self
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn import(mut self, import: Import) -> Self {
        self.imports.push(import);
        self
    }

    pub fn constant(mut self, constant: Constant) -> Self {
        self.constants.push(constant);
        self
    }

    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Validate and build the artifact.
    ///
    /// # Errors
    /// - `InvalidIdentifier`: bad class, namespace, parent, or member name
    /// - `DuplicateImport`: two imports share a fully-qualified name
    /// - `DuplicateMember`: two members of one kind share a name
    /// - `InvalidDocBlock`: a doc-block contains `*/`
    pub fn build(self) -> Result<ClassArtifact, DomainError> {
        validate_identifier(&self.name)?;
        let namespace = self
            .namespace
            .as_deref()
            .map(QualifiedName::parse)
            .transpose()?;
        let class = QualifiedName::join(namespace.as_ref(), &self.name)?.to_string();

        validate_doc(self.doc.as_ref())?;
        let parent = self.parent.map(ClassRef::new).transpose()?;
        let interfaces = self
            .interfaces
            .into_iter()
            .map(ClassRef::new)
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::new();
        for import in &self.imports {
            if !seen.insert(import.name.to_string()) {
                return Err(DomainError::DuplicateImport {
                    class,
                    import: import.name.to_string(),
                });
            }
        }

        for constant in &self.constants {
            constant.validate()?;
        }
        for property in &self.properties {
            property.validate()?;
        }
        for method in &self.methods {
            method.validate()?;
        }
        check_unique(&class, MemberKind::Constant, self.constants.iter().map(|c| &c.name))?;
        check_unique(&class, MemberKind::Property, self.properties.iter().map(|p| &p.name))?;
        check_unique(&class, MemberKind::Method, self.methods.iter().map(|m| &m.name))?;

        Ok(ClassArtifact {
            namespace,
            name: self.name,
            modifier: self.modifier,
            doc: self.doc,
            parent,
            interfaces,
            imports: self.imports,
            constants: self.constants,
            properties: self.properties,
            methods: self.methods,
        })
    }
}

fn check_unique<'a>(
    class: &str,
    kind: MemberKind,
    names: impl Iterator<Item = &'a String>,
) -> Result<(), DomainError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(DomainError::DuplicateMember {
                class: class.to_string(),
                kind,
                name: name.clone(),
            });
        }
    }
    Ok(())
}

// ── File wrapper ─────────────────────────────────────────────────────────────

/// One class file: the class plus an optional file-level doc-block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileArtifact {
    header: Option<DocBlock>,
    class: ClassArtifact,
}

impl FileArtifact {
    pub fn new(class: ClassArtifact) -> Self {
        Self {
            header: None,
            class,
        }
    }

    pub fn with_header(mut self, header: Option<DocBlock>) -> Self {
        self.header = header;
        self
    }

    pub fn header(&self) -> Option<&DocBlock> {
        self.header.as_ref()
    }

    pub fn class(&self) -> &ClassArtifact {
        &self.class
    }

    /// Same header, different class. Used after a merge.
    pub fn with_class(&self, class: ClassArtifact) -> Self {
        Self {
            header: self.header.clone(),
            class,
        }
    }
}
