//! Token scanner for class and configuration files.
//!
//! Only what the structural reader needs is distinguished. Strings and
//! comments are whole tokens, so delimiters inside them never count toward
//! brace matching. Every token keeps its byte span for slicing raw text.

use crate::domain::entities::common::{is_ident_continue, is_ident_start};
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    OpenTag,
    CloseTag,
    /// Identifier or name, backslashes included (`Doctrine\ORM\Mapping`).
    Word,
    Variable,
    Str,
    Number,
    DocComment,
    Comment,
    /// `=>`
    Arrow,
    /// `::`
    DoubleColon,
    /// `...`
    Ellipsis,
    Punct(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

impl Token<'_> {
    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }

    /// Case-insensitive keyword check.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Word && self.text.eq_ignore_ascii_case(keyword)
    }
}

pub(crate) fn tokenize(src: &str) -> Result<Vec<Token<'_>>, DomainError> {
    Lexer { src, pos: 0 }.run()
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn run(mut self) -> Result<Vec<Token<'a>>, DomainError> {
        let mut tokens = Vec::new();

        let lead = self.src.trim_start_matches('\u{feff}');
        self.pos = self.src.len() - lead.len();
        self.skip_whitespace();
        if !self.rest().starts_with("<?php") {
            return Err(DomainError::unparsable("file must start with '<?php'"));
        }
        tokens.push(self.take(TokenKind::OpenTag, 5));

        loop {
            self.skip_whitespace();
            let Some(c) = self.peek() else { break };
            let rest = self.rest();

            let token = if rest.starts_with("?>") {
                let token = self.take(TokenKind::CloseTag, 2);
                if !self.rest().trim().is_empty() {
                    return Err(DomainError::unparsable("content after closing '?>' tag"));
                }
                self.pos = self.src.len();
                token
            } else if rest.starts_with("<<<") {
                return Err(DomainError::unparsable("heredoc and nowdoc strings are not supported"));
            } else if rest.starts_with("/**") && !rest.starts_with("/**/") {
                self.block_comment(TokenKind::DocComment)?
            } else if rest.starts_with("/*") {
                self.block_comment(TokenKind::Comment)?
            } else if rest.starts_with("//") || c == '#' {
                self.line_comment()
            } else if c == '\'' || c == '"' {
                self.string(c)?
            } else if c == '$' && rest[1..].chars().next().is_some_and(is_ident_start) {
                let len = 1 + ident_len(&rest[1..]);
                self.take(TokenKind::Variable, len)
            } else if is_ident_start(c) || c == '\\' {
                let len = rest
                    .char_indices()
                    .find(|(_, ch)| !(is_ident_continue(*ch) || *ch == '\\'))
                    .map_or(rest.len(), |(i, _)| i);
                self.take(TokenKind::Word, len)
            } else if c.is_ascii_digit() {
                let len = rest
                    .char_indices()
                    .find(|(_, ch)| !(ch.is_ascii_alphanumeric() || *ch == '_' || *ch == '.'))
                    .map_or(rest.len(), |(i, _)| i);
                self.take(TokenKind::Number, len)
            } else if rest.starts_with("=>") {
                self.take(TokenKind::Arrow, 2)
            } else if rest.starts_with("::") {
                self.take(TokenKind::DoubleColon, 2)
            } else if rest.starts_with("...") {
                self.take(TokenKind::Ellipsis, 3)
            } else {
                self.take(TokenKind::Punct(c), c.len_utf8())
            };
            tokens.push(token);
        }

        Ok(tokens)
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn take(&mut self, kind: TokenKind, len: usize) -> Token<'a> {
        let start = self.pos;
        self.pos += len;
        Token {
            kind,
            text: &self.src[start..self.pos],
            start,
            end: self.pos,
        }
    }

    fn block_comment(&mut self, kind: TokenKind) -> Result<Token<'a>, DomainError> {
        let close = self.rest()[2..]
            .find("*/")
            .ok_or_else(|| DomainError::unparsable("unterminated comment"))?;
        Ok(self.take(kind, close + 4))
    }

    fn line_comment(&mut self) -> Token<'a> {
        let len = self.rest().find('\n').unwrap_or(self.rest().len());
        self.take(TokenKind::Comment, len)
    }

    fn string(&mut self, quote: char) -> Result<Token<'a>, DomainError> {
        let mut escaped = false;
        for (i, c) in self.rest().char_indices().skip(1) {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                return Ok(self.take(TokenKind::Str, i + 1));
            }
        }
        Err(DomainError::unparsable("unterminated string literal"))
    }
}

fn ident_len(s: &str) -> usize {
    s.char_indices()
        .find(|(_, c)| !is_ident_continue(*c))
        .map_or(s.len(), |(i, _)| i)
}
