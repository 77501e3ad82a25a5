//! Structural reader: reconstructs a [`FileArtifact`] from source text.
//!
//! This is deliberately not a general parser. It recognizes the shape the
//! writer produces, plus the common hand-written variations of it (single
//! line doc-blocks, `var` properties, omitted visibility, comments inside
//! method bodies). Anything it cannot represent in the model is rejected
//! with `UnparsableSource` so that a later rewrite never loses content.

use crate::domain::entities::{
    Body, ClassArtifact, ClassBuilder, Constant, DocBlock, FileArtifact, Import, Method, Parameter,
    Property, QualifiedName,
};
use crate::domain::error::DomainError;
use crate::domain::syntax::class_writer::framed_body;
use crate::domain::syntax::lexer::{Token, TokenKind, tokenize};
use crate::domain::value_objects::{ClassModifier, Visibility};

/// Read the single class declared in `source`.
///
/// # Errors
/// `UnparsableSource` when the file uses a construct outside the model or
/// declares a class other than `expected`.
pub fn read_class(source: &str, expected: &QualifiedName) -> Result<FileArtifact, DomainError> {
    let tokens = tokenize(source)?;
    let mut reader = Reader {
        src: source,
        tokens,
        pos: 1,
    };
    let file = reader.file()?;

    let found = file.class().qualified_name();
    if &found != expected {
        return Err(DomainError::unparsable(format!(
            "file declares class '{found}', expected '{expected}'"
        )));
    }
    Ok(file)
}

struct Reader<'a> {
    src: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
}

/// Modifiers collected in front of a class member.
#[derive(Default)]
struct Modifiers {
    visibility: Option<Visibility>,
    is_static: bool,
    any: bool,
}

impl<'a> Reader<'a> {
    // ── Cursor ───────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Result<Token<'a>, DomainError> {
        let token = self
            .peek()
            .ok_or_else(|| DomainError::unparsable("unexpected end of file"))?;
        self.pos += 1;
        Ok(token)
    }

    fn expect_punct(&mut self, c: char) -> Result<Token<'a>, DomainError> {
        let token = self.next()?;
        if !token.is_punct(c) {
            return Err(unexpected(&token, &format!("'{c}'")));
        }
        Ok(token)
    }

    fn expect_word(&mut self) -> Result<&'a str, DomainError> {
        let token = self.next()?;
        if token.kind != TokenKind::Word {
            return Err(unexpected(&token, "a name"));
        }
        Ok(token.text)
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.peek().is_some_and(|t| t.is_punct(c)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    // ── File level ───────────────────────────────────────────────────────────

    fn file(&mut self) -> Result<FileArtifact, DomainError> {
        let mut header: Option<DocBlock> = None;
        let mut pending: Option<Token<'a>> = None;
        let mut namespace: Option<String> = None;
        let mut imports: Vec<Import> = Vec::new();

        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::DocComment => {
                    if let Some(doc) = pending.replace(token) {
                        header = Some(promote_header(header, doc)?);
                    }
                }
                TokenKind::Comment => return Err(comment_error()),
                TokenKind::Word if token.is_keyword("namespace") => {
                    if namespace.is_some() || !imports.is_empty() {
                        return Err(DomainError::unparsable("more than one namespace declaration"));
                    }
                    if let Some(doc) = pending.take() {
                        header = Some(promote_header(header, doc)?);
                    }
                    let name = self.next()?;
                    if name.is_punct('{') || name.kind != TokenKind::Word {
                        return Err(DomainError::unparsable("braced namespace blocks are not supported"));
                    }
                    if self.peek().is_some_and(|t| t.is_punct('{')) {
                        return Err(DomainError::unparsable("braced namespace blocks are not supported"));
                    }
                    self.expect_punct(';')?;
                    namespace = Some(name.text.to_string());
                }
                TokenKind::Word if token.is_keyword("use") => {
                    if let Some(doc) = pending.take() {
                        header = Some(promote_header(header, doc)?);
                    }
                    self.use_statement(&mut imports)?;
                }
                TokenKind::Word
                    if token.is_keyword("class")
                        || token.is_keyword("abstract")
                        || token.is_keyword("final") =>
                {
                    let doc = match pending.take() {
                        Some(doc) if self.blank_line_between(&doc, &token) => {
                            header = Some(promote_header(header, doc)?);
                            None
                        }
                        Some(doc) => Some(doc_text(doc.text)),
                        None => None,
                    };
                    let mut builder = ClassArtifact::builder("");
                    if let Some(ns) = &namespace {
                        builder = builder.namespace(ns);
                    }
                    for import in imports.drain(..) {
                        builder = builder.import(import);
                    }
                    let class = self.class(token, builder.doc_block(doc))?;
                    self.trailer()?;
                    return Ok(FileArtifact::new(class).with_header(header));
                }
                TokenKind::Word
                    if token.is_keyword("interface")
                        || token.is_keyword("trait")
                        || token.is_keyword("enum") =>
                {
                    return Err(DomainError::unparsable(format!(
                        "{} declarations are not supported",
                        token.text.to_ascii_lowercase()
                    )));
                }
                _ => return Err(unexpected(&token, "a namespace, use or class declaration")),
            }
        }
    }

    fn use_statement(&mut self, imports: &mut Vec<Import>) -> Result<(), DomainError> {
        loop {
            let name = self.next()?;
            if name.is_keyword("function") || name.is_keyword("const") {
                return Err(DomainError::unparsable(format!(
                    "'use {}' imports are not supported",
                    name.text.to_ascii_lowercase()
                )));
            }
            if name.kind != TokenKind::Word {
                return Err(unexpected(&name, "an imported name"));
            }
            if name.text.ends_with('\\') || self.peek().is_some_and(|t| t.is_punct('{')) {
                return Err(DomainError::unparsable("group use declarations are not supported"));
            }
            let import = if self.peek().is_some_and(|t| t.is_keyword("as")) {
                self.pos += 1;
                let alias = self.expect_word()?;
                Import::aliased(name.text, alias)?
            } else {
                Import::new(name.text)?
            };
            imports.push(import);

            if self.eat_punct(',') {
                continue;
            }
            self.expect_punct(';')?;
            return Ok(());
        }
    }

    /// Whether the source between two tokens holds an empty line.
    fn blank_line_between(&self, first: &Token<'_>, second: &Token<'_>) -> bool {
        self.src[first.end..second.start].matches('\n').count() > 1
    }

    /// After the class body only a closing tag may follow.
    fn trailer(&mut self) -> Result<(), DomainError> {
        match self.peek() {
            None => Ok(()),
            Some(t) if t.kind == TokenKind::CloseTag => Ok(()),
            Some(t) if t.is_keyword("class") || t.is_keyword("abstract") || t.is_keyword("final") => {
                Err(DomainError::unparsable("more than one class declared in the file"))
            }
            Some(t) if t.kind == TokenKind::Comment => Err(comment_error()),
            Some(t) => Err(unexpected(&t, "end of file")),
        }
    }

    // ── Class level ──────────────────────────────────────────────────────────

    fn class(&mut self, first: Token<'a>, builder: ClassBuilder) -> Result<ClassArtifact, DomainError> {
        let mut builder = builder;
        let mut keyword = first;
        if first.is_keyword("abstract") {
            builder = builder.modifier(ClassModifier::Abstract);
            keyword = self.next()?;
        } else if first.is_keyword("final") {
            builder = builder.modifier(ClassModifier::Final);
            keyword = self.next()?;
        }
        if !keyword.is_keyword("class") {
            return Err(unexpected(&keyword, "'class'"));
        }

        let mut builder = builder.renamed(self.expect_word()?);

        if self.peek().is_some_and(|t| t.is_keyword("extends")) {
            self.pos += 1;
            builder = builder.extends(self.expect_word()?);
        }
        if self.peek().is_some_and(|t| t.is_keyword("implements")) {
            self.pos += 1;
            loop {
                builder = builder.implements(self.expect_word()?);
                if !self.eat_punct(',') {
                    break;
                }
            }
        }
        self.expect_punct('{')?;

        let mut pending_doc: Option<DocBlock> = None;
        let mut modifiers = Modifiers::default();
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::Punct('}') if !modifiers.any && pending_doc.is_none() => break,
                TokenKind::DocComment if !modifiers.any => {
                    if pending_doc.replace(doc_text(token.text)).is_some() {
                        return Err(DomainError::unparsable("two doc-blocks in front of one member"));
                    }
                }
                TokenKind::Comment => return Err(comment_error()),
                TokenKind::Variable => {
                    builder = builder.property(self.property(token, &modifiers, pending_doc.take())?);
                    modifiers = Modifiers::default();
                }
                TokenKind::Word => {
                    let word = token.text.to_ascii_lowercase();
                    match word.as_str() {
                        "public" | "protected" | "private" | "var" => {
                            if modifiers.visibility.is_some() {
                                return Err(unexpected(&token, "a single visibility"));
                            }
                            modifiers.visibility = Some(word.parse()?);
                            modifiers.any = true;
                        }
                        "static" => {
                            modifiers.is_static = true;
                            modifiers.any = true;
                        }
                        "function" => {
                            builder = builder.method(self.method(&modifiers, pending_doc.take())?);
                            modifiers = Modifiers::default();
                        }
                        "const" => {
                            if modifiers.any {
                                return Err(DomainError::unparsable(
                                    "modifiers on class constants are not supported",
                                ));
                            }
                            builder = builder.constant(self.constant(pending_doc.take())?);
                        }
                        "abstract" => {
                            return Err(DomainError::unparsable("abstract methods are not supported"));
                        }
                        "use" => {
                            return Err(DomainError::unparsable("trait use inside a class is not supported"));
                        }
                        _ => {
                            return Err(DomainError::unparsable(format!(
                                "unsupported class member starting with '{}'",
                                token.text
                            )));
                        }
                    }
                }
                _ => return Err(unexpected(&token, "a class member")),
            }
        }

        builder.build()
    }

    fn property(
        &mut self,
        variable: Token<'a>,
        modifiers: &Modifiers,
        doc: Option<DocBlock>,
    ) -> Result<Property, DomainError> {
        if !modifiers.any {
            return Err(unexpected(&variable, "a visibility keyword before the property"));
        }
        let mut property = Property::new(&variable.text[1..], modifiers.visibility.unwrap_or_default());
        property.is_static = modifiers.is_static;
        property.doc = doc;

        if self.eat_punct('=') {
            let (raw, end) = self.raw_until(&[';', ','])?;
            property = property.with_default(raw);
            if end.is_punct(',') {
                return Err(DomainError::unparsable(
                    "multiple properties in one declaration are not supported",
                ));
            }
        } else {
            let end = self.next()?;
            if end.is_punct(',') {
                return Err(DomainError::unparsable(
                    "multiple properties in one declaration are not supported",
                ));
            }
            if !end.is_punct(';') {
                return Err(unexpected(&end, "';'"));
            }
        }
        Ok(property)
    }

    fn constant(&mut self, doc: Option<DocBlock>) -> Result<Constant, DomainError> {
        let name = self.expect_word()?;
        self.expect_punct('=')?;
        let (raw, end) = self.raw_until(&[';', ','])?;
        if end.is_punct(',') {
            return Err(DomainError::unparsable(
                "multiple constants in one declaration are not supported",
            ));
        }
        let mut constant = Constant::new(name, raw);
        constant.doc = doc;
        Ok(constant)
    }

    fn method(&mut self, modifiers: &Modifiers, doc: Option<DocBlock>) -> Result<Method, DomainError> {
        if self.peek().is_some_and(|t| t.is_punct('&')) {
            return Err(DomainError::unparsable("methods returning by reference are not supported"));
        }
        let name = self.expect_word()?;
        let mut method = Method::new(name, modifiers.visibility.unwrap_or_default());
        method.is_static = modifiers.is_static;
        method.doc = doc;

        self.expect_punct('(')?;
        if !self.eat_punct(')') {
            loop {
                let (parameter, end) = self.parameter()?;
                method.parameters.push(parameter);
                if end.is_punct(')') {
                    break;
                }
            }
        }

        if self.eat_punct(':') {
            let (raw, _) = self.raw_until_open_brace()?;
            method.return_type = Some(raw.to_string());
        } else {
            match self.next()? {
                t if t.is_punct('{') => {}
                t if t.is_punct(';') => {
                    return Err(DomainError::unparsable(format!(
                        "method '{}' has no body",
                        method.name
                    )));
                }
                t => return Err(unexpected(&t, "'{'")),
            }
        }

        let open = self.tokens[self.pos - 1];
        let close = self.matching_brace()?;
        method.body = source_body(&self.src[open.end..close.start]);
        Ok(method)
    }

    /// One parameter up to and including its terminating `,` or `)`.
    fn parameter(&mut self) -> Result<(Parameter, Token<'a>), DomainError> {
        let mut hint: Option<(usize, usize)> = None;
        let mut by_reference = false;
        let mut variadic = false;

        let variable = loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::Variable => break token,
                TokenKind::Ellipsis => variadic = true,
                TokenKind::Punct('&') => by_reference = true,
                TokenKind::Word
                    if ["public", "protected", "private", "readonly"]
                        .iter()
                        .any(|k| token.is_keyword(k)) =>
                {
                    return Err(DomainError::unparsable("promoted constructor parameters are not supported"));
                }
                TokenKind::Word | TokenKind::Punct('?' | '|') if !by_reference && !variadic => {
                    hint = Some(match hint {
                        Some((start, _)) => (start, token.end),
                        None => (token.start, token.end),
                    });
                }
                _ => return Err(unexpected(&token, "a parameter")),
            }
        };

        let mut parameter = Parameter::new(&variable.text[1..]);
        parameter.type_hint = hint.map(|(s, e)| self.src[s..e].to_string());
        parameter.by_reference = by_reference;
        parameter.variadic = variadic;

        let end = if self.eat_punct('=') {
            let (raw, end) = self.raw_until(&[',', ')'])?;
            parameter.default = Some(raw.to_string());
            end
        } else {
            let end = self.next()?;
            if !(end.is_punct(',') || end.is_punct(')')) {
                return Err(unexpected(&end, "',' or ')'"));
            }
            end
        };
        Ok((parameter, end))
    }

    // ── Raw slices ───────────────────────────────────────────────────────────

    /// Consume tokens up to a depth-0 terminator; returns the trimmed raw
    /// text before it and the terminator itself.
    fn raw_until(&mut self, terminators: &[char]) -> Result<(&'a str, Token<'a>), DomainError> {
        let start = self.peek().map_or(self.src.len(), |t| t.start);
        let mut depth = 0usize;
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::Punct(c) if depth == 0 && terminators.contains(&c) => {
                    let raw = self.src[start..token.start].trim();
                    if raw.is_empty() {
                        return Err(unexpected(&token, "a value"));
                    }
                    return Ok((raw, token));
                }
                TokenKind::Punct('(' | '[' | '{') => depth += 1,
                TokenKind::Punct(')' | ']' | '}') => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| DomainError::unparsable("unbalanced delimiters"))?;
                }
                TokenKind::Comment | TokenKind::DocComment => return Err(comment_error()),
                _ => {}
            }
        }
    }

    /// Return type text up to the body's opening brace (consumed).
    fn raw_until_open_brace(&mut self) -> Result<(&'a str, Token<'a>), DomainError> {
        let start = self.peek().map_or(self.src.len(), |t| t.start);
        loop {
            let token = self.next()?;
            if token.is_punct('{') {
                return Ok((self.src[start..token.start].trim(), token));
            }
            if token.is_punct(';') {
                return Err(DomainError::unparsable("method has no body"));
            }
        }
    }

    /// The `}` matching an already consumed `{`.
    fn matching_brace(&mut self) -> Result<Token<'a>, DomainError> {
        let mut depth = 1usize;
        while let Some(token) = self.peek() {
            self.pos += 1;
            if token.is_punct('{') {
                depth += 1;
            } else if token.is_punct('}') {
                depth -= 1;
                if depth == 0 {
                    return Ok(token);
                }
            }
        }
        Err(DomainError::unparsable("unbalanced braces in method body"))
    }
}

/// Normalized when the writer would reproduce `raw` byte for byte,
/// verbatim otherwise.
fn source_body(raw: &str) -> Body {
    let body = Body::new(raw);
    if framed_body(&body) == raw {
        body
    } else {
        Body::verbatim(raw)
    }
}

fn promote_header(current: Option<DocBlock>, doc: Token<'_>) -> Result<DocBlock, DomainError> {
    if current.is_some() {
        return Err(DomainError::unparsable("stray doc-block outside the class"));
    }
    Ok(doc_text(doc.text))
}

/// Strip `/**`, `*/` and the leading ` * ` of each line.
fn doc_text(raw: &str) -> DocBlock {
    let inner = raw
        .strip_prefix("/**")
        .and_then(|s| s.strip_suffix("*/"))
        .unwrap_or(raw);
    let lines: Vec<&str> = inner
        .lines()
        .map(|line| {
            let line = line.trim_start();
            let line = line.strip_prefix('*').unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line)
        })
        .collect();
    DocBlock::new(lines.join("\n"))
}

fn comment_error() -> DomainError {
    DomainError::unparsable("comments outside method bodies are not supported; use a doc-block")
}

fn unexpected(token: &Token<'_>, wanted: &str) -> DomainError {
    DomainError::unparsable(format!(
        "expected {wanted}, found '{}' at byte {}",
        token.text, token.start
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::MemberKind;
    use crate::domain::syntax::class_writer::render_file;
    use pretty_assertions::assert_eq;

    fn qn(s: &str) -> QualifiedName {
        QualifiedName::parse(s).unwrap()
    }

    fn unparsable(src: &str, expected: &str) -> String {
        match read_class(src, &qn(expected)) {
            Err(DomainError::UnparsableSource { reason }) => reason,
            other => panic!("expected UnparsableSource, got {other:?}"),
        }
    }

    // ---------------------------------------------------------------------
    // Round trip
    // ---------------------------------------------------------------------

    #[test]
    fn round_trips_writer_output() {
        let class = ClassArtifact::builder("PostController")
            .namespace("Blog\\Controller")
            .import(Import::new("Zend\\Mvc\\Controller\\AbstractRestfulController").unwrap())
            .import(Import::aliased("Zend\\View\\Model\\JsonModel", "Json").unwrap())
            .doc("REST endpoints\n\n@author kiln")
            .modifier(ClassModifier::Final)
            .extends("AbstractRestfulController")
            .implements("\\Countable")
            .constant(Constant::new("LIMIT", "'a;b'").with_doc("max"))
            .property(Property::new("service", Visibility::Private))
            .property(Property::new("cache", Visibility::Protected).as_static().with_default("array(1, 2)"))
            .method(
                Method::new("get", Visibility::Public)
                    .with_parameter(Parameter::new("id").typed("?int").with_default("null"))
                    .with_parameter(Parameter::new("rest").variadic())
                    .returning("JsonModel")
                    .with_doc("Fetch one")
                    .with_body("// comment with } brace\nif ($id) {\n    return new Json(['id' => $id]);\n}\n\nreturn '}';"),
            )
            .method(Method::new("count", Visibility::Public).returning("int").with_body("return 0;"))
            .build()
            .unwrap();
        let file = FileArtifact::new(class).with_header(Some(DocBlock::new("Header line")));

        let text = render_file(&file);
        let back = read_class(&text, &qn("Blog\\Controller\\PostController")).unwrap();
        assert_eq!(back, file);
    }

    #[test]
    fn header_without_namespace_is_told_apart_by_blank_line() {
        let class = ClassArtifact::builder("Plain").build().unwrap();
        let file = FileArtifact::new(class).with_header(Some(DocBlock::new("banner")));
        let back = read_class(&render_file(&file), &qn("Plain")).unwrap();
        assert_eq!(back, file);
    }

    // ---------------------------------------------------------------------
    // Hand-written variations
    // ---------------------------------------------------------------------

    #[test]
    fn reads_hand_written_variations() {
        let src = r#"<?php
namespace Blog\Entity;
use Doctrine\ORM\Mapping as ORM, Foo\Bar;
/** @ORM\Entity */
class Post {
    var $title;
    static $count = 0;
    /** @var int */
    private $id = -1;
    function getTitle() { return $this->title; }
}
?>
"#;
        let file = read_class(src, &qn("Blog\\Entity\\Post")).unwrap();
        let class = file.class();
        assert!(file.header().is_none());
        assert_eq!(class.doc().unwrap().as_str(), "@ORM\\Entity");
        assert_eq!(class.imports().len(), 2);
        assert_eq!(class.imports()[0].local_name(), "ORM");
        assert_eq!(class.properties()[0].visibility, Visibility::Public);
        assert!(class.properties()[1].is_static);
        assert_eq!(class.properties()[2].default.as_deref(), Some("-1"));
        let body = &class.method("getTitle").unwrap().body;
        assert!(body.is_verbatim());
        assert_eq!(body.as_str(), " return $this->title; ");
        assert_eq!(class.method("getTitle").unwrap().visibility, Visibility::Public);
    }

    #[test]
    fn parameters_with_complex_defaults() {
        let src = "<?php\nclass A\n{\n    public function f(array &$a = array(1, [2, 3]), $b = 'x,)')\n    {\n    }\n}\n";
        let class = read_class(src, &qn("A")).unwrap().class().clone();
        let params = &class.methods()[0].parameters;
        assert_eq!(params.len(), 2);
        assert!(params[0].by_reference);
        assert_eq!(params[0].type_hint.as_deref(), Some("array"));
        assert_eq!(params[0].default.as_deref(), Some("array(1, [2, 3])"));
        assert_eq!(params[1].default.as_deref(), Some("'x,)'"));
    }

    // ---------------------------------------------------------------------
    // Rejections
    // ---------------------------------------------------------------------

    #[test]
    fn rejects_comments_outside_bodies() {
        let reason = unparsable("<?php\nclass A\n{\n    // note\n    public $x;\n}\n", "A");
        assert!(reason.contains("comments"));
        unparsable("<?php\n// top\nclass A\n{\n}\n", "A");
    }

    #[test]
    fn rejects_unsupported_constructs() {
        unparsable("<?php\ninterface A\n{\n}\n", "A");
        unparsable("<?php\ntrait A\n{\n}\n", "A");
        unparsable("<?php\nclass A\n{\n    use T;\n}\n", "A");
        unparsable("<?php\nabstract class A\n{\n    abstract public function f();\n}\n", "A");
        unparsable("<?php\nnamespace X {\nclass A\n{\n}\n}\n", "X\\A");
        unparsable("<?php\nuse function foo\\bar;\nclass A\n{\n}\n", "A");
        unparsable("<?php\nuse Foo\\{Bar, Baz};\nclass A\n{\n}\n", "A");
        unparsable("<?php\nclass A\n{\n    public $a, $b;\n}\n", "A");
        unparsable("<?php\nclass A\n{\n}\nclass B\n{\n}\n", "A");
        unparsable("<?php\nclass A\n{\n    public function f()\n    {\n        if (1) {\n    }\n}\n", "A");
        unparsable("<?php\nclass A\n{\n    public function f() { $s = <<<EOT\nx\nEOT;\n    }\n}\n", "A");
    }

    #[test]
    fn rejects_class_name_mismatch() {
        let reason = unparsable("<?php\nnamespace Blog;\nclass Post\n{\n}\n", "Blog\\User");
        assert!(reason.contains("Blog\\Post"));
    }

    #[test]
    fn duplicate_methods_surface_as_duplicate_member() {
        let src = "<?php\nclass A\n{\n    public function f() {}\n    public function f() {}\n}\n";
        assert!(matches!(
            read_class(src, &qn("A")),
            Err(DomainError::DuplicateMember { kind: MemberKind::Method, .. })
        ));
    }
}
