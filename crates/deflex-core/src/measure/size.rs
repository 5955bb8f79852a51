//! Size-mode resolution.
//!
//! `prepare_children` decides every child's spec from the parent's before
//! the recursion; `collapse_auto` folds an `Auto` axis to `Fixed` after it;
//! `size_classes` turns the final specs into tokens once the parent has
//! chosen its alignment.

use crate::context::BuildContext;
use crate::geometry::approx_eq;
use crate::model::{Align, Bounds, Direction, Role, SizeSpec, VNode, VTree};
use crate::style::px;
use crate::tree::{new_wrapper, replace_in_parent};
use petgraph::graph::NodeIndex;

const AXES: [Direction; 2] = [Direction::Row, Direction::Column];

// ─── Before recursion ────────────────────────────────────────────────────

pub fn prepare_children(tree: &mut VTree, parent: NodeIndex, ctx: &mut BuildContext) {
    let Some(dir) = tree[parent].direction else { return };
    let cross = dir.cross();
    let outer = tree[parent].bounds;
    let parent_width = tree[parent].width_spec;
    let parent_cross = tree[parent].spec(cross);

    for child in tree.children(parent) {
        let node = &mut tree[child];

        // Fixed list items keep their exported box on both axes.
        if ctx.config.list_item_size_fixed && node.role.contains(Role::ListItem) {
            node.width_spec = Some(SizeSpec::Fixed);
            node.height_spec = Some(SizeSpec::Fixed);
            continue;
        }
        if node.is_generated() && node.direction == Some(cross) && is_plain_wrapper(node) {
            node.bounds = node.bounds.with_span(cross, outer.start(cross), outer.end(cross));
            node.set_spec(cross, SizeSpec::Constrained);
        }
        let leaf = node.direction.is_none();
        for axis in AXES {
            if node.spec(axis).is_none() {
                node.set_spec(axis, default_spec(node, axis, leaf));
            }
        }
        if node.is_wrap_like()
            && node.width_spec == Some(SizeSpec::Auto)
            && parent_width != Some(SizeSpec::Constrained)
        {
            node.width_spec = Some(SizeSpec::Fixed);
        }
        if parent_cross == Some(SizeSpec::Constrained)
            && can_stretch(node)
            && approx_eq(
                node.bounds.start(cross) - outer.start(cross),
                outer.end(cross) - node.bounds.end(cross),
            )
        {
            node.set_spec(cross, SizeSpec::Constrained);
        }
    }

    for child in tree.children(parent) {
        treat_overflow(tree, parent, child, dir, ctx);
    }
}

/// Band and list-item wrappers; list containers keep their own extent.
fn is_plain_wrapper(node: &VNode) -> bool {
    !node.role.is_list() && !node.role.contains(Role::Spacer) && !node.role.contains(Role::Overflow)
}

fn default_spec(node: &VNode, axis: Direction, leaf: bool) -> SizeSpec {
    if node.is_text() {
        return if axis == Direction::Row || node.text_multi_line {
            SizeSpec::Auto
        } else {
            SizeSpec::Fixed
        };
    }
    if leaf { SizeSpec::Fixed } else { SizeSpec::Auto }
}

fn can_stretch(node: &VNode) -> bool {
    if node.is_image() || node.role.is_chrome() || node.role.contains(Role::Spacer) {
        return false;
    }
    !node.is_text() || node.text_multi_line
}

// ─── Overflow ────────────────────────────────────────────────────────────

fn treat_overflow(
    tree: &mut VTree,
    parent: NodeIndex,
    child: NodeIndex,
    dir: Direction,
    ctx: &mut BuildContext,
) {
    let config = ctx.config;
    let in_overflow = tree[parent].role.contains(Role::Overflow);
    let node = &mut tree[child];

    if config.list_overflow_auto {
        if node.role.contains(Role::ListX) {
            node.class_list.push("overflow-x-auto");
        } else if node.role.contains(Role::ListY) {
            node.class_list.push("overflow-y-auto");
        }
    }

    if node.is_text() && node.text_multi_line {
        if config.text_clamp
            && let Some(line) = node.line_height.filter(|&l| l > 0)
        {
            let lines = ((node.bounds.height() as f32) / line as f32).round().max(1.0) as i32;
            node.class_list.push(format!("line-clamp-{lines}"));
        }
        return;
    }
    if !node.is_text() || node.width_spec != Some(SizeSpec::Auto) {
        return;
    }
    node.class_list.push("truncate");
    // Already capped by its overflow wrapper.
    if !config.overflow_margin || in_overflow {
        return;
    }

    let outer = tree[parent].bounds;
    let inner = tree[child].bounds;
    let limit = match dir {
        // Up to the next sibling in the row, or the parent's edge.
        Direction::Row => {
            let siblings = tree.children(parent);
            let next = siblings
                .iter()
                .skip_while(|&&s| s != child)
                .nth(1)
                .map_or(outer.right(), |&s| tree[s].bounds.left());
            next - inner.left()
        }
        Direction::Column => outer.right() - inner.left(),
    };
    if limit <= inner.width() {
        return;
    }

    let start_margin = inner.left() - outer.left();
    let symmetric = approx_eq(start_margin, outer.right() - inner.right());
    if dir == Direction::Column && !symmetric {
        wrap_in_overflow(tree, parent, child, start_margin, ctx);
    } else {
        tree[child].class_list.push(format!("max-w-{}", px(limit)));
    }
}

/// Mirror the text's start margin on the far side, so the wrapper stretches
/// with the parent while the text is capped at the wrapper's width.
fn wrap_in_overflow(
    tree: &mut VTree,
    parent: NodeIndex,
    child: NodeIndex,
    start_margin: i32,
    ctx: &mut BuildContext,
) {
    let outer = tree[parent].bounds;
    let inner = tree[child].bounds;
    let end = outer.right() - start_margin;
    if end <= inner.right() {
        tree[child].class_list.push(format!("max-w-{}", px(outer.right() - inner.left())));
        return;
    }

    let bounds = Bounds::from_edges(inner.left(), inner.top(), end, inner.bottom());
    let mut wrapper = VNode::generated(ctx.next_index(), bounds, Direction::Row);
    wrapper.role.insert(Role::Overflow);
    wrapper.width_spec = Some(match tree[parent].width_spec {
        Some(SizeSpec::Constrained) => SizeSpec::Constrained,
        _ => SizeSpec::Fixed,
    });
    wrapper.height_spec = Some(SizeSpec::Auto);

    log::trace!("measure: overflow wrapper around {}", tree[child].label());
    let before = tree.children(parent);
    let wrapper = new_wrapper(tree, &[child], wrapper);
    replace_in_parent(tree, parent, &before, &[child], wrapper);
    tree[child].class_list.push("max-w-full");
}

// ─── After recursion ─────────────────────────────────────────────────────

/// An `Auto` axis whose children are all `Fixed` on it is `Fixed` too.
/// The page keeps its content-driven height.
pub fn collapse_auto(tree: &mut VTree, idx: NodeIndex) {
    if tree[idx].role.contains(Role::Page) {
        return;
    }
    let children = tree.children(idx);
    if children.is_empty() {
        return;
    }
    for axis in AXES {
        let all_fixed = children.iter().all(|&c| tree[c].spec(axis) == Some(SizeSpec::Fixed));
        if tree[idx].spec(axis) == Some(SizeSpec::Auto) && all_fixed {
            log::trace!("measure: {} collapses to fixed on {}", tree[idx].label(), axis.as_str());
            tree[idx].set_spec(axis, SizeSpec::Fixed);
        }
    }
}

/// Size tokens for `parent`'s flow children.
pub fn size_classes(tree: &mut VTree, parent: NodeIndex) {
    let Some(dir) = tree[parent].direction else { return };
    let stretched = tree[parent].align == Some(Align::Stretch);

    for child in tree.children(parent) {
        let node = &mut tree[child];
        for axis in AXES {
            match node.spec(axis) {
                Some(SizeSpec::Fixed) => {
                    let prefix = if axis == Direction::Row { "w" } else { "h" };
                    node.class_list.push(format!("{prefix}-{}", px(node.bounds.extent(axis))));
                    if axis == dir {
                        node.class_list.push("shrink-0");
                    }
                }
                Some(SizeSpec::Constrained) if axis == dir => node.class_list.push("flex-1"),
                Some(SizeSpec::Constrained) if !stretched => node.class_list.push("self-stretch"),
                _ => {}
            }
        }
    }
}
