//! Stray sibling reassignment.
//!
//! Design groups rarely match visual nesting: a card background and the
//! text on it are usually siblings. This pass rebuilds nesting from
//! geometry, in three steps over one sibling set:
//!
//! 1. equal boxes collapse into one node,
//! 2. contained nodes move into their smallest container,
//! 3. nodes that only overlap become attach nodes of what they sit on.

use super::merge::fold_into;
use crate::config::BORDER_STRIP_THICKNESS;
use crate::context::BuildContext;
use crate::geometry::{approx_eq, best_container, intrudes, overlaps, same_box};
use crate::model::{Bounds, Direction, Role, Tag, VTree};
use petgraph::graph::NodeIndex;

pub fn build_missing_nodes(tree: &mut VTree, parent: NodeIndex, ctx: &mut BuildContext) {
    collapse_equal_boxes(tree, parent, ctx);
    nest_contained(tree, parent, ctx);
    attach_overlapping(tree, parent, ctx);
}

// ─── Equal boxes ─────────────────────────────────────────────────────────

fn collapse_equal_boxes(tree: &mut VTree, parent: NodeIndex, ctx: &mut BuildContext) {
    loop {
        let children = tree.children(parent);
        let pair = children.iter().enumerate().find_map(|(i, &a)| {
            children[i + 1..]
                .iter()
                .find(|&&b| same_box(&tree[a].bounds, &tree[b].bounds))
                .map(|&b| (a, b))
        });
        let Some((lower, upper)) = pair else { break };

        match (tree[lower].is_content_leaf(), tree[upper].is_content_leaf()) {
            (false, false) => {
                log::trace!("missing: fold equal box {} into {}", tree[upper].label(), tree[lower].label());
                fold_into(tree, lower, upper);
            }
            (false, true) => tree.push_child(lower, upper),
            (true, false) => tree.push_child(upper, lower),
            (true, true) => {
                if tree[lower].is_image() {
                    promote_image(tree, lower);
                    tree.push_child(lower, upper);
                } else if tree[upper].is_image() {
                    promote_image(tree, upper);
                    tree.push_child(upper, lower);
                } else {
                    ctx.info(
                        tree[upper].id.as_ref(),
                        "stacked-content",
                        format!("stacked on {}, positioned absolutely", tree[lower].label()),
                    );
                    tree.push_attach(parent, upper);
                }
            }
        }
    }
}

// ─── Containment ─────────────────────────────────────────────────────────

fn nest_contained(tree: &mut VTree, parent: NodeIndex, ctx: &mut BuildContext) {
    let children = tree.children(parent);
    let boxes: Vec<Bounds> = children.iter().map(|&c| tree[c].bounds).collect();
    // Assignments come from one snapshot; strict containment can't cycle.
    let hosts: Vec<Option<usize>> = boxes.iter().map(|b| best_container(b, &boxes)).collect();

    for (i, host) in hosts.into_iter().enumerate() {
        let Some(h) = host else { continue };
        let (node, host) = (children[i], children[h]);
        if tree[host].is_text() || tree[host].role.contains(Role::Divider) {
            ctx.info(
                tree[node].id.as_ref(),
                "inside-leaf",
                format!("inside leaf {}, positioned absolutely", tree[host].label()),
            );
            tree.push_attach(parent, node);
            continue;
        }
        if tree[host].is_image() {
            promote_image(tree, host);
        }
        log::trace!("missing: {} into {}", tree[node].label(), tree[host].label());
        tree.push_child(host, node);
    }
}

/// An image that hosts other nodes becomes a view painting the image.
pub(crate) fn promote_image(tree: &mut VTree, idx: NodeIndex) {
    let node = &mut tree[idx];
    node.tag = Tag::View;
    if let Some(src) = node.src.take() {
        node.style.insert("background-image".into(), format!("url({src})"));
        node.class_list.extend(["bg-cover", "bg-no-repeat"]);
    }
}

// ─── Overlap ─────────────────────────────────────────────────────────────

fn attach_overlapping(tree: &mut VTree, parent: NodeIndex, ctx: &mut BuildContext) {
    let siblings = tree.children(parent);
    let paint_order = |idx: NodeIndex| siblings.iter().position(|&s| s == idx).unwrap_or(usize::MAX);

    // Smallest first; among equal areas the upper layer moves.
    let mut order = siblings.clone();
    order.sort_by_key(|&n| (tree[n].bounds.area(), std::cmp::Reverse(paint_order(n))));

    for n in order {
        if tree.parent(n) != Some(parent) {
            continue;
        }
        let nb = tree[n].bounds;
        let overlapping: Vec<NodeIndex> = tree
            .children(parent)
            .into_iter()
            .filter(|&m| m != n && overlaps(&nb, &tree[m].bounds))
            .collect();
        if overlapping.is_empty() {
            continue;
        }

        let below = |m: NodeIndex| {
            let mb = tree[m].bounds;
            mb.area() > nb.area() || (mb.area() == nb.area() && paint_order(m) < paint_order(n))
        };
        let intruded: Vec<NodeIndex> = overlapping
            .iter()
            .copied()
            .filter(|&m| {
                below(m)
                    && intrudes(&nb, &tree[m].bounds, Direction::Row)
                    && intrudes(&nb, &tree[m].bounds, Direction::Column)
            })
            .collect();
        let host = intruded
            .iter()
            .copied()
            .filter(|&m| can_host(tree, m))
            .min_by_key(|&m| tree[m].bounds.area());

        if let Some(host) = host {
            if tree[host].is_image() {
                promote_image(tree, host);
            }
            log::trace!("missing: {} attached to {}", tree[n].label(), tree[host].label());
            tree.push_attach(host, n);
        } else if !intruded.is_empty() {
            ctx.info(
                tree[n].id.as_ref(),
                "overlap-leaf",
                "overlaps a leaf, positioned absolutely".into(),
            );
            tree.push_attach(parent, n);
        } else if let Some(&edge_host) = overlapping
            .iter()
            .find(|&&m| can_host(tree, m) && is_edge_strip(&nb, &tree[m].bounds))
        {
            tree[n].role.insert(Role::Border);
            log::trace!("missing: {} is a border of {}", tree[n].label(), tree[edge_host].label());
            tree.push_attach(edge_host, n);
        }
    }
}

fn can_host(tree: &VTree, idx: NodeIndex) -> bool {
    let node = &tree[idx];
    !node.is_text() && !node.role.contains(Role::Divider) && !node.role.contains(Role::Border)
}

/// A thin strip lying along one edge of `host`.
fn is_edge_strip(strip: &Bounds, host: &Bounds) -> bool {
    let horizontal = strip.height() <= BORDER_STRIP_THICKNESS;
    let vertical = strip.width() <= BORDER_STRIP_THICKNESS;
    (horizontal && (approx_eq(strip.top(), host.top()) || approx_eq(strip.bottom(), host.bottom())))
        || (vertical && (approx_eq(strip.left(), host.left()) || approx_eq(strip.right(), host.right())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::id::DesignId;
    use crate::model::VNode;

    fn node(id: &str, tag: Tag, bounds: Bounds) -> VNode {
        VNode::new(Some(DesignId::new(id)), 0, tag, bounds)
    }

    fn page() -> VTree {
        VTree::new(node("page", Tag::View, Bounds::new(0, 0, 400, 800)))
    }

    fn run(tree: &mut VTree) {
        let config = BuildConfig::default();
        let mut ctx = BuildContext::new(&config);
        let root = tree.root;
        build_missing_nodes(tree, root, &mut ctx);
    }

    #[test]
    fn text_on_card_background_nests() {
        let mut tree = page();
        let root = tree.root;
        let card = tree.add_child(root, node("card", Tag::View, Bounds::new(0, 0, 300, 100)));
        let title = tree.add_child(root, node("title", Tag::Text, Bounds::new(10, 10, 100, 20)));
        let other = tree.add_child(root, node("other", Tag::View, Bounds::new(0, 200, 300, 100)));
        run(&mut tree);
        assert_eq!(tree.children(root), vec![card, other]);
        assert_eq!(tree.children(card), vec![title]);
    }

    #[test]
    fn smallest_container_wins_and_chains() {
        let mut tree = page();
        let root = tree.root;
        let outer = tree.add_child(root, node("outer", Tag::View, Bounds::new(0, 0, 300, 300)));
        let middle = tree.add_child(root, node("middle", Tag::View, Bounds::new(10, 10, 100, 100)));
        let dot = tree.add_child(root, node("dot", Tag::View, Bounds::new(20, 20, 10, 10)));
        run(&mut tree);
        assert_eq!(tree.children(root), vec![outer]);
        assert_eq!(tree.children(outer), vec![middle]);
        assert_eq!(tree.children(middle), vec![dot]);
    }

    #[test]
    fn equal_container_and_text_nest() {
        let mut tree = page();
        let root = tree.root;
        let b = Bounds::new(0, 0, 120, 40);
        let bg = tree.add_child(root, node("bg", Tag::View, b));
        let label = tree.add_child(root, node("label", Tag::Text, b));
        run(&mut tree);
        assert_eq!(tree.children(root), vec![bg]);
        assert_eq!(tree.children(bg), vec![label]);
    }

    #[test]
    fn node_inside_text_is_attached_to_parent() {
        let mut tree = page();
        let root = tree.root;
        let text = tree.add_child(root, node("para", Tag::Text, Bounds::new(0, 0, 300, 60)));
        let icon = tree.add_child(root, node("icon", Tag::View, Bounds::new(10, 10, 16, 16)));
        run(&mut tree);
        assert_eq!(tree.children(root), vec![text]);
        assert_eq!(tree.attach_nodes(root), vec![icon]);
    }

    #[test]
    fn image_host_becomes_background_view() {
        let mut tree = page();
        let root = tree.root;
        let mut banner = node("banner", Tag::Image, Bounds::new(0, 0, 400, 200));
        banner.src = Some("banner.png".into());
        let banner = tree.add_child(root, banner);
        let caption = tree.add_child(root, node("caption", Tag::Text, Bounds::new(20, 150, 200, 30)));
        run(&mut tree);
        assert_eq!(tree.children(banner), vec![caption]);
        assert_eq!(tree[banner].tag, Tag::View);
        assert_eq!(
            tree[banner].style.get("background-image").map(String::as_str),
            Some("url(banner.png)")
        );
    }

    #[test]
    fn intruding_badge_attaches_to_card() {
        let mut tree = page();
        let root = tree.root;
        let card = tree.add_child(root, node("card", Tag::View, Bounds::new(0, 0, 200, 200)));
        let badge = tree.add_child(root, node("badge", Tag::View, Bounds::new(185, -5, 20, 20)));
        run(&mut tree);
        assert_eq!(tree.children(root), vec![card]);
        assert_eq!(tree.attach_nodes(card), vec![badge]);
    }

    #[test]
    fn shallow_overlap_stays_in_flow() {
        let mut tree = page();
        let root = tree.root;
        let a = tree.add_child(root, node("a", Tag::View, Bounds::new(0, 0, 100, 100)));
        let b = tree.add_child(root, node("b", Tag::View, Bounds::new(95, 0, 100, 100)));
        run(&mut tree);
        assert_eq!(tree.children(root), vec![a, b]);
        assert!(tree.attach_nodes(a).is_empty());
    }

    #[test]
    fn edge_strip_becomes_border() {
        let mut tree = page();
        let root = tree.root;
        let card = tree.add_child(root, node("card", Tag::View, Bounds::new(0, 0, 200, 100)));
        let line = tree.add_child(root, node("line", Tag::View, Bounds::new(0, 98, 400, 2)));
        run(&mut tree);
        assert_eq!(tree.attach_nodes(card), vec![line]);
        assert!(tree[line].role.contains(Role::Border));
    }
}
