//! Tree builder: raw sibling sets → flex containers.
//!
//! Runs per node, top-down. Each node's sibling set is normalized before
//! recursing into the result, so generated wrappers are normalized too:
//!
//! 1. `merge`: fold wrappers with the parent's exact box
//! 2. `missing`: rebuild nesting and attach overlapping strays
//! 3. `list`: tables and repeating runs, row pass then column pass
//! 4. `flex`: choose the flex axis and group bands

pub mod flex;
pub mod list;
pub mod merge;
pub mod missing;

use crate::context::BuildContext;
use crate::geometry::union_bounds;
use crate::model::{Bounds, Role, VNode, VTree};
use petgraph::graph::NodeIndex;

/// Normalize the whole tree below the root.
pub fn build_tree(tree: &mut VTree, ctx: &mut BuildContext) {
    let root = tree.root;
    build_node(tree, root, ctx);
    log::debug!("tree: {} nodes after building", tree.node_count());
}

fn build_node(tree: &mut VTree, idx: NodeIndex, ctx: &mut BuildContext) {
    if tree[idx].is_content_leaf() {
        return;
    }
    if !is_preset(&tree[idx]) {
        merge::merge_redundant(tree, idx, ctx);
        missing::build_missing_nodes(tree, idx, ctx);
        list::build_list_nodes(tree, idx, ctx);
        flex::build_flex_box(tree, idx, ctx);
    }
    for child in tree.children(idx) {
        build_node(tree, child, ctx);
    }
    for attach in tree.attach_nodes(idx) {
        build_node(tree, attach, ctx);
    }
}

/// List and table containers are laid out by list detection already.
fn is_preset(node: &VNode) -> bool {
    node.role.is_list() || node.role.contains(Role::TableRow)
}

// ─── Wrapper helpers ─────────────────────────────────────────────────────

pub(crate) fn members_bounds(tree: &VTree, members: &[NodeIndex]) -> Bounds {
    let boxes: Vec<Bounds> = members.iter().map(|&m| tree[m].bounds).collect();
    union_bounds(&boxes).unwrap_or_default()
}

/// Insert `node` as the new owner of `members` (which leave their owner).
/// The wrapper itself has no owner yet.
pub(crate) fn new_wrapper(tree: &mut VTree, members: &[NodeIndex], node: VNode) -> NodeIndex {
    let wrapper = tree.insert(node);
    tree.set_children(wrapper, members);
    wrapper
}

/// Rebuild `parent`'s children from the `before` snapshot: `consumed` nodes
/// drop out and `replacement` takes the place of the first of them.
pub(crate) fn replace_in_parent(
    tree: &mut VTree,
    parent: NodeIndex,
    before: &[NodeIndex],
    consumed: &[NodeIndex],
    replacement: NodeIndex,
) {
    let mut order = Vec::with_capacity(before.len());
    let mut placed = false;
    for &c in before {
        if consumed.contains(&c) {
            if !placed {
                order.push(replacement);
                placed = true;
            }
        } else {
            order.push(c);
        }
    }
    if !placed {
        order.push(replacement);
    }
    tree.set_children(parent, &order);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::id::DesignId;
    use crate::model::{Direction, Tag};

    fn leaf(id: &str, bounds: Bounds) -> VNode {
        VNode::new(Some(DesignId::new(id)), 0, Tag::View, bounds)
    }

    #[test]
    fn replace_keeps_position() {
        let mut tree = VTree::new(leaf("p", Bounds::new(0, 0, 100, 100)));
        let root = tree.root;
        let a = tree.add_child(root, leaf("a", Bounds::new(0, 0, 10, 10)));
        let b = tree.add_child(root, leaf("b", Bounds::new(20, 0, 10, 10)));
        let c = tree.add_child(root, leaf("c", Bounds::new(40, 0, 10, 10)));
        let before = tree.children(root);

        let bounds = members_bounds(&tree, &[b, c]);
        assert_eq!((bounds.left(), bounds.right()), (20, 50));
        let w = new_wrapper(&mut tree, &[b, c], VNode::generated(9, bounds, Direction::Row));
        replace_in_parent(&mut tree, root, &before, &[b, c], w);
        assert_eq!(tree.children(root), vec![a, w]);
        assert_eq!(tree.children(w), vec![b, c]);
    }

    #[test]
    fn builds_row_of_two_cards() {
        let config = BuildConfig::default();
        let mut ctx = BuildContext::new(&config);
        let mut tree = VTree::new(leaf("page", Bounds::new(0, 0, 400, 400)));
        let root = tree.root;
        let left = tree.add_child(root, leaf("left", Bounds::new(0, 0, 190, 100)));
        let right = tree.add_child(root, leaf("right", Bounds::new(210, 0, 190, 100)));
        let t = tree.add_child(root, VNode::new(None, 0, Tag::Text, Bounds::new(10, 10, 50, 20)));

        build_tree(&mut tree, &mut ctx);
        assert_eq!(tree[root].direction, Some(Direction::Row));
        assert_eq!(tree.children(root), vec![left, right]);
        assert_eq!(tree.children(left), vec![t]);
        assert_eq!(tree[left].direction, Some(Direction::Column));
        assert_eq!(tree[right].direction, None);
    }
}
