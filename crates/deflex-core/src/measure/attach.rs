//! Absolute positioning of attach nodes against their owner's box.

use super::align::Margins;
use crate::geometry::approx_eq;
use crate::model::{Direction, SizeSpec, VTree};
use crate::style::px;
use petgraph::graph::NodeIndex;

const AXES: [Direction; 2] = [Direction::Row, Direction::Column];

/// The owner becomes the containing block of its attach nodes.
pub fn mark_owner(tree: &mut VTree, owner: NodeIndex) {
    let positioned = tree
        .attach_nodes(owner)
        .iter()
        .any(|&a| !tree[a].role.is_chrome());
    if positioned {
        tree[owner].class_list.push("relative");
    }
}

/// Specs for an attach node: spanning the owner is `Constrained`, leaves
/// are `Fixed`, anything else sizes to its content.
pub fn prepare(tree: &mut VTree, owner: NodeIndex, attach: NodeIndex) {
    let outer = tree[owner].bounds;
    let node = &mut tree[attach];
    let leaf = node.direction.is_none();
    for axis in AXES {
        if node.spec(axis).is_some() {
            continue;
        }
        let m = Margins::between(&node.bounds, &outer, axis);
        let spec = if approx_eq(m.start, 0) && approx_eq(m.end, 0) {
            SizeSpec::Constrained
        } else if leaf {
            SizeSpec::Fixed
        } else {
            SizeSpec::Auto
        };
        node.set_spec(axis, spec);
    }
}

fn offset(prop: &str, v: i32) -> String {
    if v == 0 { format!("{prop}-0") } else { format!("{prop}-{}", px(v)) }
}

/// Position tokens, once the attach node's own specs are final.
pub fn position(tree: &mut VTree, owner: NodeIndex, attach: NodeIndex) {
    let outer = tree[owner].bounds;
    let node = &mut tree[attach];
    let mut tokens = vec!["absolute".to_string()];

    for axis in AXES {
        let (start, end, translate, size) = match axis {
            Direction::Row => ("left", "right", "-translate-x-1/2", "w"),
            Direction::Column => ("top", "bottom", "-translate-y-1/2", "h"),
        };
        let m = Margins::between(&node.bounds, &outer, axis);
        let spec = node.spec(axis);
        match spec {
            Some(SizeSpec::Constrained) => {
                tokens.push(offset(start, m.start));
                tokens.push(offset(end, m.end));
            }
            Some(SizeSpec::Fixed) if m.is_symmetric() && m.start != 0 => {
                tokens.push(format!("{start}-1/2"));
                tokens.push(translate.to_string());
            }
            _ if m.start <= m.end => tokens.push(offset(start, m.start)),
            _ => tokens.push(offset(end, m.end)),
        }
        if spec == Some(SizeSpec::Fixed) {
            tokens.push(format!("{size}-{}", px(node.bounds.extent(axis))));
        }
    }
    log::trace!("attach: {} {}", node.label(), tokens.join(" "));
    node.class_list.extend(tokens);
}
