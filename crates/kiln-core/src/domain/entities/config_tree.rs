//! Ordered key/value configuration tree, as stored in `return array(...);` files.

use std::fmt;

use indexmap::IndexMap;

use crate::domain::error::DomainError;

/// Key of one config entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    Index(i64),
    Name(String),
    /// Non-literal key kept verbatim (`Foo::class`, `__NAMESPACE__`).
    Expr(String),
}

impl ConfigKey {
    /// Canonical decimal integers address `Index` keys, anything else a `Name`.
    pub fn from_segment(segment: &str) -> Self {
        if is_canonical_int(segment) {
            if let Ok(i) = segment.parse() {
                return Self::Index(i);
            }
        }
        Self::Name(segment.to_string())
    }
}

fn is_canonical_int(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    match digits.as_bytes() {
        [] => false,
        [b'0'] => s == "0",
        [first, rest @ ..] => {
            (b'1'..=b'9').contains(first) && rest.iter().all(u8::is_ascii_digit)
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Name(n) => f.write_str(n),
            Self::Expr(e) => f.write_str(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Expression kept verbatim (`__DIR__ . '/../view'`).
    Raw(String),
    Tree(ConfigTree),
}

impl ConfigValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn as_tree(&self) -> Option<&ConfigTree> {
        match self {
            Self::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<ConfigTree> for ConfigValue {
    fn from(tree: ConfigTree) -> Self {
        Self::Tree(tree)
    }
}

/// Address of a nested entry: `controllers` / `invokables` / `Blog\Controller\User`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath(Vec<ConfigKey>);

impl KeyPath {
    pub fn new<I, S>(segments: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: Vec<ConfigKey> = segments
            .into_iter()
            .map(|s| ConfigKey::from_segment(s.as_ref()))
            .collect();
        if keys.is_empty() {
            return Err(DomainError::InvalidKeyPath {
                path: String::new(),
                reason: "at least one segment is required".into(),
            });
        }
        Ok(Self(keys))
    }

    /// `view_manager.template_path_stack`; empty segments are rejected.
    pub fn parse_dotted(raw: &str) -> Result<Self, DomainError> {
        if raw.split('.').any(str::is_empty) {
            return Err(DomainError::InvalidKeyPath {
                path: raw.to_string(),
                reason: "empty segment".into(),
            });
        }
        Self::new(raw.split('.'))
    }

    pub fn keys(&self) -> &[ConfigKey] {
        &self.0
    }

    fn prefix(&self, len: usize) -> String {
        Self(self.0[..len].to_vec()).to_string()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

/// Insertion-ordered mapping. A tree whose keys are exactly `0..n` is a sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigTree {
    entries: IndexMap<ConfigKey, ConfigValue>,
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a top-level entry.
    pub fn with(mut self, key: ConfigKey, value: impl Into<ConfigValue>) -> Self {
        self.entries.insert(key, value.into());
        self
    }

    pub fn insert(&mut self, key: ConfigKey, value: ConfigValue) {
        self.entries.insert(key, value);
    }

    /// Append with the next free integer index.
    pub fn push(&mut self, value: ConfigValue) {
        let next = self
            .entries
            .keys()
            .filter_map(|k| match k {
                ConfigKey::Index(i) => Some(*i + 1),
                _ => None,
            })
            .max()
            .unwrap_or(0)
            .max(0);
        self.entries.insert(ConfigKey::Index(next), value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConfigKey, &ConfigValue)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ConfigKey> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &ConfigValue> {
        self.entries.values()
    }

    /// Keys are exactly `0, 1, ..., n-1` in order. The empty tree counts.
    pub fn is_sequence(&self) -> bool {
        self.entries
            .keys()
            .enumerate()
            .all(|(i, k)| matches!(k, ConfigKey::Index(idx) if usize::try_from(*idx) == Ok(i)))
    }

    pub fn get(&self, path: &KeyPath) -> Option<&ConfigValue> {
        let (last, parents) = path.0.split_last()?;
        let mut tree = self;
        for key in parents {
            tree = tree.entries.get(key)?.as_tree()?;
        }
        tree.entries.get(last)
    }

    pub fn contains(&self, path: &KeyPath) -> bool {
        self.get(path).is_some()
    }

    /// Insert `value` at `path`, creating intermediate trees as needed.
    ///
    /// Returns `false` without modifying anything when the path already
    /// holds a value. New keys go after all existing keys of their parent.
    ///
    /// # Errors
    /// `ConfigTypeConflict` when an ancestor on the path is a scalar.
    pub fn insert_path(&mut self, path: &KeyPath, value: ConfigValue) -> Result<bool, DomainError> {
        if self.contains(path) {
            return Ok(false);
        }
        let (last, parents) = path.0.split_last().ok_or_else(|| DomainError::InvalidKeyPath {
            path: path.to_string(),
            reason: "empty path".into(),
        })?;
        let parent = self.descend_mut(path, parents.len())?;
        parent.entries.insert(last.clone(), value);
        Ok(true)
    }

    /// Push `value` onto the sequence at `path` unless an equal value is
    /// already present. Missing trees along the way are created.
    pub fn append_unique(&mut self, path: &KeyPath, value: ConfigValue) -> Result<bool, DomainError> {
        let target = self.descend_mut(path, path.0.len())?;
        if target.values().any(|existing| existing == &value) {
            return Ok(false);
        }
        target.push(value);
        Ok(true)
    }

    /// Walk the first `depth` keys of `path`, creating empty trees for
    /// missing keys.
    fn descend_mut(&mut self, path: &KeyPath, depth: usize) -> Result<&mut ConfigTree, DomainError> {
        let mut tree = self;
        for (i, key) in path.0[..depth].iter().enumerate() {
            let slot = tree
                .entries
                .entry(key.clone())
                .or_insert_with(|| ConfigValue::Tree(ConfigTree::new()));
            tree = match slot {
                ConfigValue::Tree(child) => child,
                _ => {
                    return Err(DomainError::ConfigTypeConflict {
                        path: path.to_string(),
                        conflict: path.prefix(i + 1),
                    });
                }
            };
        }
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> ConfigKey {
        ConfigKey::Name(s.into())
    }

    fn sample() -> ConfigTree {
        ConfigTree::new()
            .with(
                name("controllers"),
                ConfigTree::new().with(
                    name("invokables"),
                    ConfigTree::new().with(
                        name("Blog\\Controller\\Post"),
                        ConfigValue::string("Blog\\Controller\\PostController"),
                    ),
                ),
            )
            .with(name("debug"), ConfigValue::Bool(true))
    }

    #[test]
    fn segments_map_to_index_or_name() {
        assert_eq!(ConfigKey::from_segment("0"), ConfigKey::Index(0));
        assert_eq!(ConfigKey::from_segment("42"), ConfigKey::Index(42));
        assert_eq!(ConfigKey::from_segment("-3"), ConfigKey::Index(-3));
        assert_eq!(ConfigKey::from_segment("007"), name("007"));
        assert_eq!(ConfigKey::from_segment("-0"), name("-0"));
        assert_eq!(ConfigKey::from_segment("1e3"), name("1e3"));
    }

    #[test]
    fn get_nested_value() {
        let tree = sample();
        let path = KeyPath::new(["controllers", "invokables", "Blog\\Controller\\Post"]).unwrap();
        assert_eq!(
            tree.get(&path).and_then(ConfigValue::as_str),
            Some("Blog\\Controller\\PostController")
        );
        assert!(!tree.contains(&KeyPath::parse_dotted("controllers.factories").unwrap()));
    }

    #[test]
    fn insert_existing_path_is_unchanged() {
        let mut tree = sample();
        let before = tree.clone();
        let path = KeyPath::parse_dotted("debug").unwrap();
        assert!(!tree.insert_path(&path, ConfigValue::Bool(false)).unwrap());
        assert_eq!(tree, before);
    }

    #[test]
    fn insert_creates_intermediate_trees_in_order() {
        let mut tree = sample();
        let path = KeyPath::new(["controllers", "factories", "X"]).unwrap();
        assert!(tree.insert_path(&path, ConfigValue::string("Y")).unwrap());

        let controllers = tree.get(&KeyPath::new(["controllers"]).unwrap()).unwrap();
        let keys: Vec<String> = controllers.as_tree().unwrap().keys().map(ToString::to_string).collect();
        assert_eq!(keys, ["invokables", "factories"]);
    }

    #[test]
    fn insert_under_scalar_conflicts() {
        let mut tree = sample();
        let path = KeyPath::new(["debug", "level"]).unwrap();
        let err = tree.insert_path(&path, ConfigValue::Int(1)).unwrap_err();
        assert_eq!(
            err,
            DomainError::ConfigTypeConflict {
                path: "debug.level".into(),
                conflict: "debug".into(),
            }
        );
    }

    #[test]
    fn append_unique_pushes_once() {
        let mut tree = ConfigTree::new().with(
            name("modules"),
            ConfigTree::new().with(ConfigKey::Index(0), ConfigValue::string("Application")),
        );
        let path = KeyPath::new(["modules"]).unwrap();

        assert!(tree.append_unique(&path, ConfigValue::string("Blog")).unwrap());
        assert!(!tree.append_unique(&path, ConfigValue::string("Blog")).unwrap());

        let modules = tree.get(&path).unwrap().as_tree().unwrap();
        assert!(modules.is_sequence());
        assert_eq!(modules.len(), 2);
    }

    #[test]
    fn sequence_detection() {
        assert!(ConfigTree::new().is_sequence());
        let gap = ConfigTree::new().with(ConfigKey::Index(1), ConfigValue::Null);
        assert!(!gap.is_sequence());
        assert!(!sample().is_sequence());
    }

    #[test]
    fn empty_key_paths_are_rejected() {
        assert!(KeyPath::new(Vec::<String>::new()).is_err());
        assert!(KeyPath::parse_dotted("a..b").is_err());
    }
}
