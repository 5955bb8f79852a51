//! Redundant wrapper folding.

use crate::context::BuildContext;
use crate::geometry::same_box;
use crate::model::{Role, VTree};
use petgraph::graph::NodeIndex;

/// Background-ish token prefixes; the upper layer's replace the lower's.
const PAINT_PREFIXES: [&str; 4] = ["bg-", "from-", "via-", "to-"];

/// Fold every child whose box equals `parent`'s into `parent`, until none is
/// left. Content leaves are never folded. Returns the number folded.
pub fn merge_redundant(tree: &mut VTree, parent: NodeIndex, ctx: &mut BuildContext) -> usize {
    let mut folded = 0;
    loop {
        let parent_box = tree[parent].bounds;
        let next = tree.children(parent).into_iter().find(|&c| {
            let child = &tree[c];
            !child.is_content_leaf()
                && !child.role.is_list()
                && same_box(&child.bounds, &parent_box)
        });
        let Some(child) = next else { break };
        log::trace!("merge: {} into {}", tree[child].label(), tree[parent].label());
        fold_into(tree, parent, child);
        folded += 1;
    }
    if folded > 0 {
        ctx.info(tree[parent].id.as_ref(), "merge", format!("{folded} redundant wrappers folded"));
    }
    folded
}

/// Fold `source` into `target`: style, roles and members move over and
/// `source` is removed. When `source` is a child of `target` its members
/// take its place in the child order; otherwise they are appended.
pub(crate) fn fold_into(tree: &mut VTree, target: NodeIndex, source: NodeIndex) {
    absorb_style(tree, target, source);

    let members = tree.children(source);
    let mut order = Vec::new();
    let mut spliced = false;
    for c in tree.children(target) {
        if c == source {
            order.extend(members.iter().copied());
            spliced = true;
        } else {
            order.push(c);
        }
    }
    if !spliced {
        order.extend(members);
    }
    tree.set_children(target, &order);
    for attach in tree.attach_nodes(source) {
        tree.push_attach(target, attach);
    }
    tree.remove(source);
}

fn absorb_style(tree: &mut VTree, target: NodeIndex, source: NodeIndex) {
    let src = tree[source].clone();
    let dst = &mut tree[target];

    let src_paints = src
        .class_list
        .iter()
        .any(|t| PAINT_PREFIXES.iter().any(|p| t.starts_with(p)));
    if src_paints {
        for prefix in PAINT_PREFIXES {
            dst.class_list.remove_prefix(prefix);
        }
        dst.style.remove("background-image");
    }
    dst.class_list.extend(src.class_list.iter());
    dst.style.extend(src.style);

    for role in src.role.iter().filter(|r| *r != Role::Divider) {
        dst.role.insert(role);
    }
    if dst.id.is_none() {
        dst.id = src.id;
    }
    dst.direction = dst.direction.or(src.direction);
    dst.width_spec = dst.width_spec.or(src.width_spec);
    dst.height_spec = dst.height_spec.or(src.height_spec);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::id::DesignId;
    use crate::model::{Bounds, Tag, VNode};

    fn view(id: &str, index: u32, bounds: Bounds) -> VNode {
        VNode::new(Some(DesignId::new(id)), index, Tag::View, bounds)
    }

    #[test]
    fn folds_nested_equal_wrappers() {
        let config = BuildConfig::default();
        let mut ctx = BuildContext::new(&config);
        let full = Bounds::new(0, 0, 200, 100);
        let mut tree = VTree::new(view("card", 0, full));
        let root = tree.root;
        let mut bg = view("bg", 1, full);
        bg.class_list.push("bg-[hsla(0,0%,100%,1)]");
        let bg = tree.add_child(root, bg);
        let inner = tree.add_child(bg, view("inner", 2, Bounds::new(0, 0, 201, 100)));
        let leaf = tree.add_child(inner, view("icon", 3, Bounds::new(10, 10, 20, 20)));
        let sibling = tree.add_child(root, view("side", 4, Bounds::new(150, 10, 20, 20)));

        assert_eq!(merge_redundant(&mut tree, root, &mut ctx), 2);
        assert_eq!(tree.children(root), vec![leaf, sibling]);
        assert!(tree[root].class_list.contains("bg-[hsla(0,0%,100%,1)]"));
        assert!(tree[root].id.as_ref().is_some_and(|id| id.matches("card")));
    }

    #[test]
    fn merge_is_idempotent() {
        let config = BuildConfig::default();
        let mut ctx = BuildContext::new(&config);
        let full = Bounds::new(0, 0, 100, 100);
        let mut tree = VTree::new(view("a", 0, full));
        let root = tree.root;
        let b = tree.add_child(root, view("b", 1, full));
        tree.add_child(b, view("c", 2, Bounds::new(0, 0, 10, 10)));

        merge_redundant(&mut tree, root, &mut ctx);
        let snapshot = tree.descendants(root);
        assert_eq!(merge_redundant(&mut tree, root, &mut ctx), 0);
        assert_eq!(tree.descendants(root), snapshot);
    }

    #[test]
    fn upper_background_wins() {
        let config = BuildConfig::default();
        let mut ctx = BuildContext::new(&config);
        let full = Bounds::new(0, 0, 100, 100);
        let mut outer = view("outer", 0, full);
        outer.class_list.push("bg-red");
        let mut tree = VTree::new(outer);
        let root = tree.root;
        let mut upper = view("upper", 1, full);
        upper.class_list.push("bg-blue");
        tree.add_child(root, upper);

        merge_redundant(&mut tree, root, &mut ctx);
        assert!(tree[root].class_list.contains("bg-blue"));
        assert!(!tree[root].class_list.contains("bg-red"));
    }

    #[test]
    fn content_leaves_are_not_folded() {
        let config = BuildConfig::default();
        let mut ctx = BuildContext::new(&config);
        let full = Bounds::new(0, 0, 100, 20);
        let mut tree = VTree::new(view("btn", 0, full));
        let root = tree.root;
        tree.add_child(root, VNode::new(None, 1, Tag::Text, full));
        assert_eq!(merge_redundant(&mut tree, root, &mut ctx), 0);
    }
}
