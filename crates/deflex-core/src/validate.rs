//! Internal-consistency checks between passes.
//!
//! Unlike diagnostics these are fatal: a violation means a heuristic left
//! the tree in a state later passes can't handle, so the conversion stops
//! with the offending node instead of emitting a half-resolved layout.

use crate::error::{ConvertError, Result};
use crate::geometry::{intrudes, strictly_contains};
use crate::model::{Direction, VTree};
use petgraph::graph::NodeIndex;

// ─── Public API ───────────────────────────────────────────────────────────

/// Direction and sibling-geometry rules, after the tree builder.
pub fn validate_structure(tree: &VTree) -> Result<()> {
    for idx in tree.descendants(tree.root) {
        check_direction(tree, idx)?;
        check_siblings(tree, idx)?;
    }
    Ok(())
}

/// Every node has both size specs, after the measure engine.
pub fn validate_specs(tree: &VTree) -> Result<()> {
    for idx in tree.descendants(tree.root) {
        let node = &tree[idx];
        for (axis, spec) in [("width", node.width_spec), ("height", node.height_spec)] {
            if spec.is_none() {
                return Err(ConvertError::invariant(
                    node.label(),
                    format!("{axis} spec left unresolved"),
                ));
            }
        }
    }
    Ok(())
}

// ─── Rules ────────────────────────────────────────────────────────────────

fn check_direction(tree: &VTree, idx: NodeIndex) -> Result<()> {
    let node = &tree[idx];
    match (tree.is_leaf(idx), node.direction) {
        (false, None) => Err(ConvertError::invariant(node.label(), "container without a direction")),
        (true, Some(dir)) => Err(ConvertError::invariant(
            node.label(),
            format!("leaf with direction {}", dir.as_str()),
        )),
        _ => Ok(()),
    }
}

fn check_siblings(tree: &VTree, parent: NodeIndex) -> Result<()> {
    let children = tree.children(parent);
    for (i, &a) in children.iter().enumerate() {
        for &b in &children[i + 1..] {
            let (ab, bb) = (tree[a].bounds, tree[b].bounds);
            if strictly_contains(&ab, &bb) || strictly_contains(&bb, &ab) {
                return Err(ConvertError::invariant(
                    tree[a].label(),
                    format!("sibling {} is nested by geometry", tree[b].label()),
                ));
            }
            let (small, large) = if ab.area() <= bb.area() { (ab, bb) } else { (bb, ab) };
            if intrudes(&small, &large, Direction::Row) && intrudes(&small, &large, Direction::Column) {
                return Err(ConvertError::invariant(
                    tree[a].label(),
                    format!("overlaps sibling {} past the attach threshold", tree[b].label()),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::DesignId;
    use crate::model::{Bounds, SizeSpec, Tag, VNode};

    fn node(id: &str, bounds: Bounds) -> VNode {
        VNode::new(Some(DesignId::new(id)), 0, Tag::View, bounds)
    }

    fn message(err: ConvertError) -> (String, String) {
        match err {
            ConvertError::Invariant { node, message } => (node, message),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn container_needs_direction() {
        let mut tree = VTree::new(node("page", Bounds::new(0, 0, 100, 100)));
        let root = tree.root;
        tree.add_child(root, node("a", Bounds::new(0, 0, 10, 10)));
        let (at, msg) = message(validate_structure(&tree).unwrap_err());
        assert_eq!(at, "#page");
        assert_eq!(msg, "container without a direction");

        tree[root].direction = Some(Direction::Column);
        assert!(validate_structure(&tree).is_ok());
    }

    #[test]
    fn leaf_must_not_have_direction() {
        let mut leaf = node("leaf", Bounds::new(0, 0, 10, 10));
        leaf.direction = Some(Direction::Row);
        let tree = VTree::new(leaf);
        let (_, msg) = message(validate_structure(&tree).unwrap_err());
        assert_eq!(msg, "leaf with direction row");
    }

    #[test]
    fn nested_or_overlapping_siblings_fail() {
        let mut page = node("page", Bounds::new(0, 0, 400, 400));
        page.direction = Some(Direction::Column);
        let mut tree = VTree::new(page);
        let root = tree.root;
        tree.add_child(root, node("big", Bounds::new(0, 0, 200, 200)));
        let small = tree.add_child(root, node("small", Bounds::new(10, 10, 20, 20)));
        assert!(validate_structure(&tree).is_err());

        tree.remove(small);
        tree.add_child(root, node("deep", Bounds::new(150, 150, 100, 100)));
        assert!(validate_structure(&tree).is_ok());
        tree.add_child(root, node("deeper", Bounds::new(20, 170, 40, 40)));
        let (_, msg) = message(validate_structure(&tree).unwrap_err());
        assert!(msg.contains("past the attach threshold"), "{msg}");
    }

    #[test]
    fn unresolved_spec_fails() {
        let mut page = node("page", Bounds::new(0, 0, 400, 400));
        page.width_spec = Some(SizeSpec::Constrained);
        let mut tree = VTree::new(page);
        let (_, msg) = message(validate_specs(&tree).unwrap_err());
        assert_eq!(msg, "height spec left unresolved");
        let root = tree.root;
        tree[root].height_spec = Some(SizeSpec::Auto);
        assert!(validate_specs(&tree).is_ok());
    }
}
