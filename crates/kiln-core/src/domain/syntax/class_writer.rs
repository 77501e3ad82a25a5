//! Deterministic serializer for class artifacts.

use std::fmt::Write;

use crate::domain::entities::{
    Body, ClassArtifact, Constant, DocBlock, FileArtifact, Method, Parameter, Property,
};

const INDENT: &str = "    ";

/// Render a class as a complete source file without a file header.
pub fn render_class(class: &ClassArtifact) -> String {
    render(None, class)
}

/// Render a file artifact: optional header, then the class.
pub fn render_file(file: &FileArtifact) -> String {
    render(file.header(), file.class())
}

fn render(header: Option<&DocBlock>, class: &ClassArtifact) -> String {
    let mut out = String::from("<?php\n\n");

    if let Some(header) = header {
        write_doc(&mut out, header, "");
        out.push('\n');
    }

    if let Some(namespace) = class.namespace() {
        let _ = writeln!(out, "namespace {namespace};\n");
    }

    if !class.imports().is_empty() {
        for import in class.imports() {
            match &import.alias {
                Some(alias) => {
                    let _ = writeln!(out, "use {} as {alias};", import.name);
                }
                None => {
                    let _ = writeln!(out, "use {};", import.name);
                }
            }
        }
        out.push('\n');
    }

    if let Some(doc) = class.doc() {
        write_doc(&mut out, doc, "");
    }

    if let Some(modifier) = class.modifier() {
        let _ = write!(out, "{modifier} ");
    }
    let _ = write!(out, "class {}", class.name());
    if let Some(parent) = class.parent() {
        let _ = write!(out, " extends {parent}");
    }
    if !class.interfaces().is_empty() {
        let list: Vec<&str> = class.interfaces().iter().map(|i| i.as_str()).collect();
        let _ = write!(out, " implements {}", list.join(", "));
    }
    out.push_str("\n{\n");

    let members: Vec<String> = class
        .constants()
        .iter()
        .map(render_constant)
        .chain(class.properties().iter().map(render_property))
        .chain(class.methods().iter().map(render_method))
        .collect();
    out.push_str(&members.join("\n"));

    out.push_str("}\n");
    out
}

fn write_doc(out: &mut String, doc: &DocBlock, indent: &str) {
    let _ = writeln!(out, "{indent}/**");
    for line in doc.lines() {
        if line.is_empty() {
            let _ = writeln!(out, "{indent} *");
        } else {
            let _ = writeln!(out, "{indent} * {line}");
        }
    }
    let _ = writeln!(out, "{indent} */");
}

fn render_constant(constant: &Constant) -> String {
    let mut out = String::new();
    if let Some(doc) = &constant.doc {
        write_doc(&mut out, doc, INDENT);
    }
    let _ = writeln!(out, "{INDENT}const {} = {};", constant.name, constant.value);
    out
}

fn render_property(property: &Property) -> String {
    let mut out = String::new();
    if let Some(doc) = &property.doc {
        write_doc(&mut out, doc, INDENT);
    }
    let _ = write!(out, "{INDENT}{}", property.visibility);
    if property.is_static {
        out.push_str(" static");
    }
    let _ = write!(out, " ${}", property.name);
    if let Some(default) = &property.default {
        let _ = write!(out, " = {default}");
    }
    out.push_str(";\n");
    out
}

fn render_method(method: &Method) -> String {
    let mut out = String::new();
    if let Some(doc) = &method.doc {
        write_doc(&mut out, doc, INDENT);
    }
    let _ = write!(out, "{INDENT}{}", method.visibility);
    if method.is_static {
        out.push_str(" static");
    }
    let params: Vec<String> = method.parameters.iter().map(render_parameter).collect();
    let _ = write!(out, " function {}({})", method.name, params.join(", "));
    if let Some(ret) = &method.return_type {
        let _ = write!(out, ": {ret}");
    }
    let _ = write!(out, "\n{INDENT}{{");
    out.push_str(&framed_body(&method.body));
    out.push_str("}\n");
    out
}

/// Text emitted between a method's braces.
pub(crate) fn framed_body(body: &Body) -> String {
    if body.is_verbatim() {
        return body.as_str().to_owned();
    }
    let mut out = String::from("\n");
    for line in body.lines() {
        if line.is_empty() {
            out.push('\n');
        } else {
            let _ = writeln!(out, "{INDENT}{INDENT}{line}");
        }
    }
    out.push_str(INDENT);
    out
}

fn render_parameter(parameter: &Parameter) -> String {
    let mut out = String::new();
    if let Some(hint) = &parameter.type_hint {
        let _ = write!(out, "{hint} ");
    }
    if parameter.by_reference {
        out.push('&');
    }
    if parameter.variadic {
        out.push_str("...");
    }
    let _ = write!(out, "${}", parameter.name);
    if let Some(default) = &parameter.default {
        let _ = write!(out, " = {default}");
    }
    out
}
