//! Flex-axis decision.
//!
//! A sibling set is partitioned into bands along a candidate axis: the
//! sibling with the largest extent on that axis is the pivot, and everything
//! its span covers joins its band. Bands stack along the axis; a band with
//! several members becomes a generated wrapper laid out on the cross axis.
//! Column is tried first, Row once as a fallback. If neither axis works the
//! smallest offending node leaves flow.

use super::{members_bounds, new_wrapper};
use crate::config::TOLERANCE;
use crate::context::BuildContext;
use crate::geometry::{contained_within, overlap, overlaps};
use crate::model::{Direction, SizeSpec, VNode, VTree};
use petgraph::graph::NodeIndex;

type Band = Vec<NodeIndex>;

pub fn build_flex_box(tree: &mut VTree, parent: NodeIndex, ctx: &mut BuildContext) {
    let mut flow = tree.children(parent);
    if flow.is_empty() {
        tree[parent].direction = None;
        return;
    }
    let preferred = tree[parent].direction.unwrap_or(Direction::Column);

    while flow.len() > 1 {
        if let Some((axis, bands)) = choose_axis(tree, &flow, preferred) {
            apply_bands(tree, parent, axis, bands, ctx);
            collapse_single_wrapper(tree, parent);
            return;
        }
        let Some(offender) = smallest_offender(tree, &flow) else {
            break;
        };
        ctx.warn(
            tree[offender].id.as_ref(),
            "flex-demote",
            format!(
                "no flex axis separates {}, positioned absolutely",
                tree[offender].label()
            ),
        );
        tree.push_attach(parent, offender);
        flow.retain(|&n| n != offender);
    }
    tree[parent].direction = Some(preferred);
    collapse_single_wrapper(tree, parent);
}

fn choose_axis(tree: &VTree, flow: &[NodeIndex], preferred: Direction) -> Option<(Direction, Vec<Band>)> {
    for axis in [preferred, preferred.cross()] {
        match partition(tree, flow, axis) {
            Some(bands) if bands.len() > 1 => {
                log::trace!("flex: {} bands on {}", bands.len(), axis.as_str());
                return Some((axis, bands));
            }
            // One band holding everything means the siblings sit side by side.
            _ => continue,
        }
    }
    None
}

/// Bands along `axis`, or `None` when they can't be stacked cleanly.
fn partition(tree: &VTree, flow: &[NodeIndex], axis: Direction) -> Option<Vec<Band>> {
    let bands = raw_bands(tree, flow, axis);
    if !disjoint(tree, &bands, axis) {
        return None;
    }
    let cross = axis.cross();
    let separable = bands.iter().filter(|b| b.len() > 1).all(|band| {
        let inner = raw_bands(tree, band, cross);
        inner.len() > 1 && disjoint(tree, &inner, cross)
    });
    separable.then_some(bands)
}

/// Pivot partition, bands sorted by their start on `axis`.
fn raw_bands(tree: &VTree, nodes: &[NodeIndex], axis: Direction) -> Vec<Band> {
    let mut remaining = nodes.to_vec();
    let mut bands: Vec<Band> = Vec::new();
    while !remaining.is_empty() {
        // Largest extent; ties keep the earlier sibling.
        let pivot = remaining
            .iter()
            .copied()
            .fold(None, |best: Option<NodeIndex>, n| match best {
                Some(b) if tree[b].bounds.extent(axis) >= tree[n].bounds.extent(axis) => Some(b),
                _ => Some(n),
            });
        let Some(pivot) = pivot else { break };
        let pb = tree[pivot].bounds;
        let (band, rest): (Band, Band) = remaining.into_iter().partition(|&n| {
            let nb = tree[n].bounds;
            n == pivot || contained_within(&nb, &pb, axis) || overlap(&nb, &pb, axis) * 2 > nb.extent(axis)
        });
        bands.push(band);
        remaining = rest;
    }
    bands.sort_by_key(|band| span(tree, band, axis).0);
    bands
}

fn span(tree: &VTree, band: &[NodeIndex], axis: Direction) -> (i32, i32) {
    let b = members_bounds(tree, band);
    (b.start(axis), b.end(axis))
}

fn disjoint(tree: &VTree, bands: &[Band], axis: Direction) -> bool {
    bands.windows(2).all(|w| {
        let a = members_bounds(tree, &w[0]);
        let b = members_bounds(tree, &w[1]);
        overlap(&a, &b, axis) <= TOLERANCE
    })
}

fn apply_bands(
    tree: &mut VTree,
    parent: NodeIndex,
    axis: Direction,
    bands: Vec<Band>,
    ctx: &mut BuildContext,
) {
    let cross = axis.cross();
    let mut order = Vec::with_capacity(bands.len());
    for mut band in bands {
        if band.len() == 1 {
            order.extend(band);
            continue;
        }
        band.sort_by_key(|&n| tree[n].bounds.start(cross));
        let bounds = members_bounds(tree, &band);
        let wrapper = VNode::generated(ctx.next_index(), bounds, cross);
        order.push(new_wrapper(tree, &band, wrapper));
    }
    tree.set_children(parent, &order);
    tree[parent].direction = Some(axis);
}

/// A lone generated child adds nothing: its members move up a level.
fn collapse_single_wrapper(tree: &mut VTree, parent: NodeIndex) {
    let children = tree.children(parent);
    let [only] = children.as_slice() else { return };
    let child = &tree[*only];
    let fixed = child.width_spec == Some(SizeSpec::Fixed) || child.height_spec == Some(SizeSpec::Fixed);
    if !child.is_generated()
        || child.direction.is_none()
        || child.is_content_leaf()
        || !child.role.is_empty()
        || fixed
    {
        return;
    }
    let only = *only;
    tree[parent].direction = tree[only].direction;
    let members = tree.children(only);
    tree.set_children(parent, &members);
    for attach in tree.attach_nodes(only) {
        tree.push_attach(parent, attach);
    }
    tree.remove(only);
}

/// The smallest node overlapping another; any smallest node otherwise.
/// Equal areas pick the later sibling.
fn smallest_offender(tree: &VTree, flow: &[NodeIndex]) -> Option<NodeIndex> {
    let overlapping: Vec<NodeIndex> = flow
        .iter()
        .copied()
        .filter(|&a| flow.iter().any(|&b| a != b && overlaps(&tree[a].bounds, &tree[b].bounds)))
        .collect();
    let pool = if overlapping.is_empty() { flow.to_vec() } else { overlapping };
    pool.iter()
        .enumerate()
        .min_by_key(|&(i, &n)| (tree[n].bounds.area(), std::cmp::Reverse(i)))
        .map(|(_, &n)| n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::id::DesignId;
    use crate::model::{Bounds, Tag};

    fn node(id: &str, tag: Tag, bounds: Bounds) -> VNode {
        VNode::new(Some(DesignId::new(id)), 0, tag, bounds)
    }

    fn setup(boxes: &[(&str, Tag, Bounds)]) -> (VTree, Vec<NodeIndex>) {
        let mut tree = VTree::new(node("parent", Tag::View, Bounds::new(0, 0, 400, 400)));
        let root = tree.root;
        let ids = boxes
            .iter()
            .map(|&(id, tag, b)| tree.add_child(root, node(id, tag, b)))
            .collect();
        (tree, ids)
    }

    fn run(tree: &mut VTree) -> Vec<crate::context::Diagnostic> {
        let config = BuildConfig::default();
        let mut ctx = BuildContext::new(&config);
        let root = tree.root;
        build_flex_box(tree, root, &mut ctx);
        ctx.into_diagnostics()
    }

    #[test]
    fn stacked_blocks_form_a_column() {
        let (mut tree, ids) = setup(&[
            ("c", Tag::View, Bounds::new(0, 200, 400, 50)),
            ("a", Tag::View, Bounds::new(0, 0, 400, 80)),
            ("b", Tag::View, Bounds::new(0, 100, 400, 80)),
        ]);
        run(&mut tree);
        assert_eq!(tree[tree.root].direction, Some(Direction::Column));
        assert_eq!(tree.children(tree.root), vec![ids[1], ids[2], ids[0]]);
    }

    #[test]
    fn lone_unnamed_text_is_kept() {
        let mut tree = VTree::new(node("card", Tag::View, Bounds::new(0, 0, 190, 100)));
        let root = tree.root;
        let label = tree.add_child(root, VNode::new(None, 1, Tag::Text, Bounds::new(10, 10, 50, 20)));
        run(&mut tree);
        assert_eq!(tree[root].direction, Some(Direction::Column));
        assert_eq!(tree.children(root), vec![label]);
    }

    #[test]
    fn side_by_side_flips_to_row() {
        let (mut tree, ids) = setup(&[
            ("right", Tag::View, Bounds::new(120, 0, 100, 50)),
            ("left", Tag::View, Bounds::new(0, 0, 100, 50)),
        ]);
        run(&mut tree);
        assert_eq!(tree[tree.root].direction, Some(Direction::Row));
        assert_eq!(tree.children(tree.root), vec![ids[1], ids[0]]);
    }

    #[test]
    fn media_object_groups_text_column() {
        let (mut tree, ids) = setup(&[
            ("img", Tag::Image, Bounds::new(0, 0, 100, 100)),
            ("t1", Tag::Text, Bounds::new(120, 10, 200, 20)),
            ("t2", Tag::Text, Bounds::new(120, 50, 150, 20)),
        ]);
        run(&mut tree);
        let root = tree.root;
        assert_eq!(tree[root].direction, Some(Direction::Row));
        let children = tree.children(root);
        assert_eq!(children[0], ids[0]);
        let wrapper = children[1];
        assert!(tree[wrapper].is_generated());
        assert_eq!(tree[wrapper].direction, Some(Direction::Column));
        assert_eq!(tree.children(wrapper), vec![ids[1], ids[2]]);
    }

    #[test]
    fn title_over_two_columns() {
        let (mut tree, ids) = setup(&[
            ("title", Tag::Text, Bounds::new(0, 0, 300, 30)),
            ("l", Tag::View, Bounds::new(0, 50, 180, 100)),
            ("r", Tag::View, Bounds::new(200, 50, 180, 100)),
        ]);
        run(&mut tree);
        let root = tree.root;
        assert_eq!(tree[root].direction, Some(Direction::Column));
        let children = tree.children(root);
        assert_eq!(children.len(), 2);
        assert_eq!(children[0], ids[0]);
        assert_eq!(tree[children[1]].direction, Some(Direction::Row));
        assert_eq!(tree.children(children[1]), vec![ids[1], ids[2]]);
    }

    #[test]
    fn crossing_bars_demote_the_smaller() {
        let (mut tree, ids) = setup(&[
            ("h", Tag::View, Bounds::new(0, 40, 100, 20)),
            ("v", Tag::View, Bounds::new(40, 0, 20, 100)),
        ]);
        let diagnostics = run(&mut tree);
        let root = tree.root;
        assert_eq!(tree.children(root), vec![ids[0]]);
        assert_eq!(tree.attach_nodes(root), vec![ids[1]]);
        assert_eq!(tree[root].direction, Some(Direction::Column));
        assert_eq!(diagnostics[0].rule, "flex-demote");
    }

    #[test]
    fn leaf_has_no_direction() {
        let (mut tree, _) = setup(&[]);
        let root = tree.root;
        tree[root].direction = Some(Direction::Row);
        run(&mut tree);
        assert_eq!(tree[root].direction, None);
    }
}
