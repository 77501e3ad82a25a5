use std::fmt::Write;

use crate::domain::entities::{ConfigKey, ConfigTree, ConfigValue};

/// Render a whole configuration file: generated header plus `return <literal>;`.
///
/// `backup_name` is the file name of the copy kept next to the original.
pub fn render_config_file(tree: &ConfigTree, backup_name: &str) -> String {
    format!(
        "<?php\n/**\n * Configuration file generated by Kiln\n * The previous configuration file is stored in {backup_name}\n */\n\nreturn {};\n",
        render_config_literal(tree)
    )
}

/// A fresh configuration file with no backup to point at.
pub fn render_config_source(tree: &ConfigTree) -> String {
    format!("<?php\n\nreturn {};\n", render_config_literal(tree))
}

/// `array(...)` literal, 4-space indentation, one entry per line.
pub fn render_config_literal(tree: &ConfigTree) -> String {
    let mut out = String::new();
    write_tree(&mut out, tree, 0);
    out
}

fn write_tree(out: &mut String, tree: &ConfigTree, depth: usize) {
    if tree.is_empty() {
        out.push_str("array()");
        return;
    }
    let sequence = tree.is_sequence();
    let indent = "    ".repeat(depth + 1);

    out.push_str("array(\n");
    for (key, value) in tree.iter() {
        out.push_str(&indent);
        if !sequence {
            write_key(out, key);
            out.push_str(" => ");
        }
        write_value(out, value, depth + 1);
        out.push_str(",\n");
    }
    out.push_str(&"    ".repeat(depth));
    out.push(')');
}

fn write_key(out: &mut String, key: &ConfigKey) {
    match key {
        ConfigKey::Index(i) => {
            let _ = write!(out, "{i}");
        }
        ConfigKey::Name(name) => quote(out, name),
        ConfigKey::Expr(expr) => out.push_str(expr),
    }
}

fn write_value(out: &mut String, value: &ConfigValue, depth: usize) {
    match value {
        ConfigValue::Null => out.push_str("null"),
        ConfigValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        ConfigValue::Int(i) => {
            let _ = write!(out, "{i}");
        }
        ConfigValue::Float(f) => {
            let _ = write!(out, "{f:?}");
        }
        ConfigValue::String(s) => quote(out, s),
        ConfigValue::Raw(expr) => out.push_str(expr),
        ConfigValue::Tree(tree) => write_tree(out, tree, depth),
    }
}

/// Single-quoted literal; only `\` and `'` need escaping.
fn quote(out: &mut String, s: &str) {
    out.push('\'');
    for c in s.chars() {
        if c == '\\' || c == '\'' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_nested_tree() {
        let tree = ConfigTree::new()
            .with(
                ConfigKey::Name("controllers".into()),
                ConfigTree::new().with(ConfigKey::Name("invokables".into()), ConfigTree::new()),
            )
            .with(
                ConfigKey::Name("modules".into()),
                ConfigTree::new()
                    .with(ConfigKey::Index(0), ConfigValue::string("Application"))
                    .with(ConfigKey::Index(1), ConfigValue::string("Blog")),
            )
            .with(ConfigKey::Name("path".into()), ConfigValue::Raw("__DIR__ . '/../view'".into()))
            .with(ConfigKey::Index(7), ConfigValue::Float(1.0))
            .with(ConfigKey::Expr("Foo::class".into()), ConfigValue::Null);

        let expected = r"array(
    'controllers' => array(
        'invokables' => array(),
    ),
    'modules' => array(
        'Application',
        'Blog',
    ),
    'path' => __DIR__ . '/../view',
    7 => 1.0,
    Foo::class => null,
)";
        assert_eq!(render_config_literal(&tree), expected);
    }

    #[test]
    fn escapes_quotes_and_backslashes() {
        let tree = ConfigTree::new().with(
            ConfigKey::Name("Blog\\Controller\\Post".into()),
            ConfigValue::string("it's"),
        );
        assert_eq!(
            render_config_literal(&tree),
            "array(\n    'Blog\\\\Controller\\\\Post' => 'it\\'s',\n)"
        );
    }

    #[test]
    fn fresh_file_has_no_header() {
        let tree = ConfigTree::new().with(ConfigKey::Name("factories".into()), ConfigTree::new());
        assert_eq!(
            render_config_source(&tree),
            "<?php\n\nreturn array(\n    'factories' => array(),\n);\n"
        );
    }

    #[test]
    fn file_header_names_backup() {
        let text = render_config_file(&ConfigTree::new(), "module.config.old");
        assert_eq!(
            text,
            "<?php\n/**\n * Configuration file generated by Kiln\n * The previous configuration file is stored in module.config.old\n */\n\nreturn array();\n"
        );
    }
}
