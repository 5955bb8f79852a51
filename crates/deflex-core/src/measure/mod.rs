//! Measure engine: size modes, alignment, justification and absolute
//! positioning over the built tree.
//!
//! One depth-first pass resolves both directions of the size dependency:
//! a node fixes its children's specs from its own (top-down) before
//! recursing, then collapses its own `Auto` axes once every child is
//! resolved (bottom-up). Alignment, justification and size classes run
//! after that, when every child's final spec is known.

pub mod align;
pub mod attach;
pub mod justify;
pub mod size;

use crate::context::BuildContext;
use crate::geometry::approx_eq;
use crate::model::{Direction, Role, VTree};
use petgraph::graph::NodeIndex;

pub fn measure_tree(tree: &mut VTree, ctx: &mut BuildContext) {
    let root = tree.root;
    measure_node(tree, root, ctx);
    log::debug!("measure: {} nodes resolved", tree.node_count());
}

fn measure_node(tree: &mut VTree, idx: NodeIndex, ctx: &mut BuildContext) {
    size::prepare_children(tree, idx, ctx);
    for child in tree.children(idx) {
        measure_node(tree, child, ctx);
    }
    size::collapse_auto(tree, idx);

    if let Some(dir) = tree[idx].direction {
        let node = &mut tree[idx];
        node.class_list.push("flex");
        node.class_list.push(match dir {
            Direction::Row => "flex-row",
            Direction::Column => "flex-col",
        });
        if !node.role.contains(Role::ListWrap) {
            align::align_children(tree, idx);
            justify::justify_children(tree, idx, ctx);
        }
        size::size_classes(tree, idx);
        mark_button(tree, idx);
    }

    let attach_nodes = tree.attach_nodes(idx);
    if !attach_nodes.is_empty() {
        attach::mark_owner(tree, idx);
    }
    for attach_node in attach_nodes {
        let chrome = tree[attach_node].role.is_chrome();
        if !chrome {
            attach::prepare(tree, idx, attach_node);
        }
        measure_node(tree, attach_node, ctx);
        if !chrome {
            attach::position(tree, idx, attach_node);
        }
    }
}

/// A painted box holding exactly one centered line of text.
fn mark_button(tree: &mut VTree, idx: NodeIndex) {
    let children = tree.children(idx);
    let [only] = children.as_slice() else { return };
    let (node, child) = (&tree[idx], &tree[*only]);
    if node.is_generated() || !node.has_visual_style() || !child.is_text() || child.text_multi_line {
        return;
    }
    let (outer, inner) = (node.bounds, child.bounds);
    let centered = [Direction::Row, Direction::Column].into_iter().all(|axis| {
        approx_eq(
            inner.start(axis) - outer.start(axis),
            outer.end(axis) - inner.end(axis),
        )
    });
    if centered {
        log::trace!("measure: {} is a button", node.label());
        tree[idx].role.insert(Role::Btn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::id::DesignId;
    use crate::model::{Bounds, SizeSpec, Tag, VNode};

    #[test]
    fn centered_label_on_fill_is_a_button() {
        let config = BuildConfig::default();
        let mut ctx = BuildContext::new(&config);
        let mut page = VNode::new(None, 0, Tag::View, Bounds::new(0, 0, 400, 400));
        page.role.insert(Role::Page);
        page.width_spec = Some(SizeSpec::Constrained);
        page.height_spec = Some(SizeSpec::Auto);
        page.direction = Some(Direction::Column);
        let mut tree = VTree::new(page);
        let root = tree.root;

        let mut btn = VNode::new(Some(DesignId::new("cta")), 1, Tag::View, Bounds::new(100, 0, 200, 48));
        btn.class_list.push("bg-[hsla(210,100%,50%,1)]");
        btn.direction = Some(Direction::Column);
        let btn = tree.add_child(root, btn);
        let mut label = VNode::new(None, 2, Tag::Text, Bounds::new(160, 14, 80, 20));
        label.height_spec = Some(SizeSpec::Fixed);
        tree.add_child(btn, label);

        measure_tree(&mut tree, &mut ctx);
        assert!(tree[btn].role.contains(Role::Btn));
        assert!(tree[btn].class_list.contains("items-center"));
        assert!(tree[btn].class_list.contains("justify-center"));
    }
}
