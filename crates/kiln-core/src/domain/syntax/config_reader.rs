//! Reader for `<?php return array(...);` configuration files.
//!
//! Scalars become typed values, nested arrays become trees, and any other
//! expression (`__DIR__ . '/view'`, `Foo::class`, function calls) is kept
//! verbatim as a raw value. Comments are dropped; the patcher keeps a
//! byte-for-byte backup of the original.

use crate::domain::entities::{ConfigKey, ConfigTree, ConfigValue};
use crate::domain::error::DomainError;
use crate::domain::syntax::lexer::{Token, TokenKind, tokenize};

/// Parse a configuration file into its tree.
///
/// # Errors
/// `UnparsableConfig` when the file is not a single `return` of an array literal.
pub fn read_config(source: &str) -> Result<ConfigTree, DomainError> {
    let tokens: Vec<Token<'_>> = tokenize(source)
        .map_err(|e| config_error(e.to_string()))?
        .into_iter()
        .filter(|t| !matches!(t.kind, TokenKind::Comment | TokenKind::DocComment))
        .collect();

    let mut parser = Parser {
        src: source,
        tokens,
        pos: 1,
    };

    let keyword = parser.next()?;
    if !keyword.is_keyword("return") {
        return Err(config_error(format!(
            "expected 'return' as the only statement, found '{}'",
            keyword.text
        )));
    }
    let value = parser.value(&[';'])?;
    parser.expect(';')?;
    match parser.peek() {
        None => {}
        Some(t) if t.kind == TokenKind::CloseTag => {}
        Some(t) => {
            return Err(config_error(format!("unexpected '{}' after return statement", t.text)));
        }
    }

    match value {
        ConfigValue::Tree(tree) => Ok(tree),
        _ => Err(config_error("the returned value is not an array literal")),
    }
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Result<Token<'a>, DomainError> {
        let token = self
            .peek()
            .ok_or_else(|| config_error("unexpected end of file"))?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, c: char) -> Result<(), DomainError> {
        let token = self.next()?;
        if token.is_punct(c) {
            Ok(())
        } else {
            Err(config_error(format!("expected '{c}', found '{}'", token.text)))
        }
    }

    fn at_terminator(&self, terminators: &[char]) -> bool {
        match self.peek() {
            Some(t) if t.kind == TokenKind::Arrow => true,
            Some(t) => {
                matches!(t.kind, TokenKind::Punct(c) if c == ',' || c == ';' || terminators.contains(&c))
            }
            None => true,
        }
    }

    /// One value, ending before `,`, `=>` or one of `terminators` at depth 0.
    fn value(&mut self, terminators: &[char]) -> Result<ConfigValue, DomainError> {
        let start = self.pos;
        if let Some(value) = self.literal()? {
            if self.at_terminator(terminators) {
                return Ok(value);
            }
        }
        self.pos = start;
        self.raw(terminators)
    }

    /// A self-contained literal, or `None` if the tokens start something else.
    fn literal(&mut self) -> Result<Option<ConfigValue>, DomainError> {
        let token = self.next()?;
        let value = match token.kind {
            TokenKind::Word if token.is_keyword("array") && self.peek().is_some_and(|t| t.is_punct('(')) => {
                self.pos += 1;
                ConfigValue::Tree(self.entries(')')?)
            }
            TokenKind::Punct('[') => ConfigValue::Tree(self.entries(']')?),
            TokenKind::Word if token.is_keyword("null") => ConfigValue::Null,
            TokenKind::Word if token.is_keyword("true") => ConfigValue::Bool(true),
            TokenKind::Word if token.is_keyword("false") => ConfigValue::Bool(false),
            TokenKind::Str => match unquote(token.text) {
                Some(s) => ConfigValue::String(s),
                None => return Ok(None),
            },
            TokenKind::Number => match number(token.text, false) {
                Some(v) => v,
                None => return Ok(None),
            },
            TokenKind::Punct('-') => match self.peek() {
                Some(n) if n.kind == TokenKind::Number && n.start == token.end => {
                    self.pos += 1;
                    match number(n.text, true) {
                        Some(v) => v,
                        None => return Ok(None),
                    }
                }
                _ => return Ok(None),
            },
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    /// Entries of an array literal up to and including `close`.
    fn entries(&mut self, close: char) -> Result<ConfigTree, DomainError> {
        let mut tree = ConfigTree::new();
        loop {
            if self.peek().is_some_and(|t| t.is_punct(close)) {
                self.pos += 1;
                return Ok(tree);
            }
            let first = self.value(&[close])?;
            if self.peek().is_some_and(|t| t.kind == TokenKind::Arrow) {
                self.pos += 1;
                let key = to_key(first)?;
                let value = self.value(&[close])?;
                tree.insert(key, value);
            } else {
                tree.push(first);
            }

            let sep = self.next()?;
            if sep.is_punct(close) {
                return Ok(tree);
            }
            if !sep.is_punct(',') {
                return Err(config_error(format!("expected ',' or '{close}', found '{}'", sep.text)));
            }
        }
    }

    /// Verbatim expression text up to the next depth-0 terminator.
    fn raw(&mut self, terminators: &[char]) -> Result<ConfigValue, DomainError> {
        let start = self.peek().map_or(self.src.len(), |t| t.start);
        let mut end = start;
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            if depth == 0 && self.at_terminator(terminators) {
                break;
            }
            match token.kind {
                TokenKind::Punct('(' | '[' | '{') => depth += 1,
                TokenKind::Punct(')' | ']' | '}') => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| config_error("unbalanced delimiters"))?;
                }
                TokenKind::OpenTag | TokenKind::CloseTag => {
                    return Err(config_error("unexpected PHP tag inside the array"));
                }
                _ => {}
            }
            end = token.end;
            self.pos += 1;
        }
        if end == start {
            return Err(config_error("expected a value"));
        }
        Ok(ConfigValue::Raw(self.src[start..end].to_string()))
    }
}

fn to_key(value: ConfigValue) -> Result<ConfigKey, DomainError> {
    Ok(match value {
        ConfigValue::Int(i) => ConfigKey::Index(i),
        ConfigValue::String(s) => ConfigKey::from_segment(&s),
        ConfigValue::Raw(expr) => ConfigKey::Expr(expr),
        ConfigValue::Null => ConfigKey::Expr("null".into()),
        ConfigValue::Bool(b) => ConfigKey::Expr(b.to_string()),
        ConfigValue::Float(f) => ConfigKey::Expr(format!("{f:?}")),
        ConfigValue::Tree(_) => return Err(config_error("an array cannot be used as a key")),
    })
}

/// Decode a string literal; `None` for double-quoted strings that
/// interpolate or use escapes beyond `\\` and `\"`.
fn unquote(text: &str) -> Option<String> {
    let quote = text.chars().next()?;
    let inner = &text[1..text.len() - 1];
    if quote == '"' && inner.contains('$') {
        return None;
    }
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(next) if next == '\\' || next == quote => out.push(next),
            Some(_) if quote == '"' => return None,
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    Some(out)
}

/// Decimal ints and floats. Other notations are kept raw.
fn number(text: &str, negative: bool) -> Option<ConfigValue> {
    let signed = if negative { format!("-{text}") } else { text.to_string() };
    if text.bytes().all(|b| b.is_ascii_digit()) {
        if text.len() > 1 && text.starts_with('0') {
            return None;
        }
        return signed.parse().ok().map(ConfigValue::Int);
    }
    if text.contains('.') && text.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return signed.parse().ok().map(ConfigValue::Float);
    }
    None
}

fn config_error(reason: impl Into<String>) -> DomainError {
    DomainError::UnparsableConfig {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::KeyPath;
    use crate::domain::syntax::config_writer::render_config_file;

    const MODULE_CONFIG: &str = r#"<?php
// Module configuration
return array(
    'controllers' => array(
        'invokables' => array(
            'Blog\Controller\Index' => 'Blog\Controller\IndexController',
        ),
    ),
    'view_manager' => [
        'template_path_stack' => [
            'blog' => __DIR__ . '/../view',
        ],
    ],
    'options' => array('debug' => true, 'ttl' => -30, 'ratio' => 0.5, 'none' => null),
    'listeners' => array('First', 'Second',),
    Foo::class => "plain \"text\"",
);
"#;

    #[test]
    fn reads_module_config() {
        let tree = read_config(MODULE_CONFIG).unwrap();

        let path = KeyPath::new(["controllers", "invokables", "Blog\\Controller\\Index"]).unwrap();
        assert_eq!(
            tree.get(&path),
            Some(&ConfigValue::string("Blog\\Controller\\IndexController"))
        );

        let stack = KeyPath::new(["view_manager", "template_path_stack", "blog"]).unwrap();
        assert_eq!(tree.get(&stack), Some(&ConfigValue::Raw("__DIR__ . '/../view'".into())));

        assert_eq!(tree.get(&KeyPath::parse_dotted("options.ttl").unwrap()), Some(&ConfigValue::Int(-30)));
        assert_eq!(tree.get(&KeyPath::parse_dotted("options.ratio").unwrap()), Some(&ConfigValue::Float(0.5)));
        assert_eq!(tree.get(&KeyPath::parse_dotted("options.none").unwrap()), Some(&ConfigValue::Null));

        let listeners = tree.get(&KeyPath::parse_dotted("listeners").unwrap()).unwrap();
        assert!(listeners.as_tree().unwrap().is_sequence());

        let last = tree.iter().last().unwrap();
        assert_eq!(last.0, &ConfigKey::Expr("Foo::class".into()));
        assert_eq!(last.1, &ConfigValue::string("plain \"text\""));
    }

    #[test]
    fn reserialized_file_reads_back_equal() {
        let tree = read_config(MODULE_CONFIG).unwrap();
        let text = render_config_file(&tree, "module.config.old");
        assert_eq!(read_config(&text).unwrap(), tree);
    }

    #[test]
    fn interpolated_strings_stay_raw() {
        let tree = read_config("<?php return array('a' => \"$x/y\", 'b' => \"tab\\t\");").unwrap();
        assert_eq!(tree.get(&KeyPath::parse_dotted("a").unwrap()), Some(&ConfigValue::Raw("\"$x/y\"".into())));
        assert_eq!(tree.get(&KeyPath::parse_dotted("b").unwrap()), Some(&ConfigValue::Raw("\"tab\\t\"".into())));
    }

    #[test]
    fn numeric_string_keys_become_indexes() {
        let tree = read_config("<?php return array('0' => 'a', '01' => 'b');").unwrap();
        let keys: Vec<&ConfigKey> = tree.keys().collect();
        assert_eq!(keys, [&ConfigKey::Index(0), &ConfigKey::Name("01".into())]);
    }

    #[test]
    fn rejects_non_array_files() {
        assert!(matches!(read_config("<?php return 5;"), Err(DomainError::UnparsableConfig { .. })));
        assert!(read_config("<?php $a = 1; return array();").is_err());
        assert!(read_config("<?php return array('a' => 1;").is_err());
        assert!(read_config("<?php return array(); echo 1;").is_err());
        assert!(read_config("not php").is_err());
    }
}
