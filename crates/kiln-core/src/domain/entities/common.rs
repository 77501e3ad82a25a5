use super::DomainError;
use std::fmt;

/// A backslash-separated PHP name such as `Blog\Controller\UserController`.
///
/// Invariant: at least one segment, every segment a valid identifier.
/// A leading `\` is accepted and dropped on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName(Vec<String>);

impl QualifiedName {
    /// Fallible constructor from source text.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim().trim_start_matches('\\');
        if trimmed.is_empty() {
            return Err(DomainError::invalid_identifier(raw, "name is empty"));
        }
        let segments = trimmed
            .split('\\')
            .map(|segment| validate_identifier(segment).map(|()| segment.to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(segments))
    }

    /// Build `namespace\name`, or just `name` when there is no namespace.
    pub fn join(namespace: Option<&QualifiedName>, name: &str) -> Result<Self, DomainError> {
        validate_identifier(name)?;
        let mut segments = namespace.map(|ns| ns.0.clone()).unwrap_or_default();
        segments.push(name.to_string());
        Ok(Self(segments))
    }

    /// Last segment (the short class name).
    pub fn short_name(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or("")
    }

    /// Everything but the last segment, if any.
    pub fn namespace(&self) -> Option<QualifiedName> {
        (self.0.len() > 1).then(|| Self(self.0[..self.0.len() - 1].to_vec()))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("\\"))
    }
}

/// Check a single PHP identifier segment.
pub fn validate_identifier(value: &str) -> Result<(), DomainError> {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return Err(DomainError::invalid_identifier(value, "name is empty"));
    };
    if !is_ident_start(first) {
        return Err(DomainError::invalid_identifier(
            value,
            "must start with a letter or underscore",
        ));
    }
    if let Some(bad) = chars.find(|c| !is_ident_continue(*c)) {
        return Err(DomainError::invalid_identifier(
            value,
            format!("unexpected character '{bad}'"),
        ));
    }
    Ok(())
}

pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

pub(crate) fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

/// Upper-case the first character (`user` -> `User`).
pub fn ucfirst(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-case the first character (`BlogPost` -> `blogPost`).
pub fn lcfirst(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert `BlogPost` to `blog-post`, the view-path convention for modules.
pub fn camel_to_dash(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    for (i, c) in value.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
