//! Emitter: VTree → renderer-facing output.
//!
//! `OutputNode` is the only shape renderers see: tag name, ordered children
//! and attach nodes, classes, inline style, text and roles. Geometry and
//! size specs stay internal. `emit_outline` prints the same tree as an
//! indented text outline for logs and snapshot tests.

use crate::model::{SizeSpec, TextContent, VNode, VTree};
use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// One node of the finalized layout tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputNode {
    pub tag_name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub class_list: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub style: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub role: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<OutputText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OutputNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attach_nodes: Vec<OutputNode>,
}

/// A literal string, or inline spans each carrying their own classes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutputText {
    Literal(String),
    Spans(Vec<OutputNode>),
}

/// Build the output tree below `tree.root`.
#[must_use]
pub fn emit_tree(tree: &VTree) -> OutputNode {
    emit_node(tree, tree.root)
}

fn emit_node(tree: &VTree, idx: NodeIndex) -> OutputNode {
    let mut out = output_for(&tree[idx]);
    out.children = tree.children(idx).into_iter().map(|c| emit_node(tree, c)).collect();
    out.attach_nodes = tree
        .attach_nodes(idx)
        .into_iter()
        .map(|a| emit_node(tree, a))
        .collect();
    out
}

fn output_for(node: &VNode) -> OutputNode {
    OutputNode {
        tag_name: node.tag.tag_name(),
        id: node.id.as_ref().map(|id| id.as_str().to_string()),
        class_list: node.class_list.to_vec(),
        style: node.style.clone(),
        role: node.role.iter().map(|r| r.as_str()).collect(),
        text_content: node.text.as_ref().map(|t| match t {
            TextContent::Literal(s) => OutputText::Literal(s.clone()),
            TextContent::Spans(spans) => OutputText::Spans(spans.iter().map(output_for).collect()),
        }),
        src: node.src.clone(),
        children: Vec::new(),
        attach_nodes: Vec::new(),
    }
}

// ─── Outline ─────────────────────────────────────────────────────────────

/// Indented one-line-per-node rendering. Attach nodes are prefixed `@`.
#[must_use]
pub fn emit_outline(tree: &VTree) -> String {
    let mut out = String::with_capacity(1024);
    outline_node(&mut out, tree, tree.root, 0, false);
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn spec_char(spec: Option<SizeSpec>) -> char {
    match spec {
        Some(SizeSpec::Fixed) => 'F',
        Some(SizeSpec::Auto) => 'A',
        Some(SizeSpec::Constrained) => 'C',
        None => '?',
    }
}

fn outline_node(out: &mut String, tree: &VTree, idx: NodeIndex, depth: usize, attached: bool) {
    let node = &tree[idx];
    indent(out, depth);
    if attached {
        out.push('@');
    }
    out.push_str(node.tag.tag_name());
    match &node.id {
        Some(id) => {
            let _ = write!(out, "#{id}");
        }
        None => out.push('~'),
    }
    for role in node.role.iter() {
        let _ = write!(out, " ({})", role.as_str());
    }
    if let Some(dir) = node.direction {
        let _ = write!(out, " {}", dir.as_str());
    }
    let _ = write!(out, " {}{}", spec_char(node.width_spec), spec_char(node.height_spec));
    if !node.class_list.is_empty() {
        let classes: Vec<&str> = node.class_list.iter().collect();
        let _ = write!(out, " .{}", classes.join("."));
    }
    if let Some(text) = &node.text {
        let _ = write!(out, " {:?}", text.plain());
    }
    out.push('\n');

    for child in tree.children(idx) {
        outline_node(out, tree, child, depth + 1, false);
    }
    for attach in tree.attach_nodes(idx) {
        outline_node(out, tree, attach, depth + 1, true);
    }
}
