//! XML text output
//!
//! Values escape only `&`; anything else is written as stored. Attribute
//! values additionally escape `"` and `<` so the output stays readable by
//! [`Reader`](crate::xml::Reader).

use crate::xml::node::{Node, NodeKind};

/// Declaration written before every document
pub const DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8" ?>"#;

/// Output formatting
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteOptions {
    /// Newline plus one tab per depth before each opening tag and before a
    /// section's closing tag
    pub pretty: bool,
    /// Prefix the output with [`DECLARATION`]
    pub declaration: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self::pretty()
    }
}

impl WriteOptions {
    pub const fn pretty() -> Self {
        Self {
            pretty: true,
            declaration: true,
        }
    }

    pub const fn compact() -> Self {
        Self {
            pretty: false,
            declaration: true,
        }
    }
}

/// Serialize top-level nodes as a document
pub fn write_document(nodes: &[Node], options: WriteOptions) -> String {
    let mut output = String::new();
    if options.declaration {
        output.push_str(DECLARATION);
    }
    for node in nodes {
        write_node(node, 0, options, &mut output);
    }
    output
}

/// Serialize a single node at the given depth
pub fn write_node(node: &Node, depth: usize, options: WriteOptions, output: &mut String) {
    if options.pretty {
        line_break(depth, output);
    }

    output.push('<');
    output.push_str(node.key());
    for (name, value) in node.attributes() {
        output.push(' ');
        output.push_str(name);
        output.push_str("=\"");
        output.push_str(&escape_attribute(value));
        output.push('"');
    }
    output.push('>');

    match node.kind() {
        NodeKind::Leaf(value) => output.push_str(&escape_value(value)),
        NodeKind::Section(children) => {
            for child in children {
                write_node(child, depth + 1, options, output);
            }
            if options.pretty {
                line_break(depth, output);
            }
        }
    }

    output.push_str("</");
    output.push_str(node.key());
    output.push('>');
}

fn line_break(depth: usize, output: &mut String) {
    output.push('\n');
    for _ in 0..depth {
        output.push('\t');
    }
}

fn escape_value(input: &str) -> String {
    input.replace('&', "&amp;")
}

fn escape_attribute(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}
