//! Cross-axis alignment and padding.
//!
//! Each child's start/end margin on the cross axis votes for an alignment:
//! stretch when constrained children are the plurality, otherwise the
//! largest cluster of equal start margins, equal end margins, or equal
//! offsets from the center. Shared margins are hoisted into parent padding;
//! whatever remains per child becomes a margin or a `self-*` override.

use crate::config::MIN_SHARED_PADDING_GROUP;
use crate::geometry::approx_eq;
use crate::model::{Align, Bounds, Direction, Role, SizeSpec, VTree};
use crate::style::px;
use petgraph::graph::NodeIndex;

/// Distance from a child's edges to its parent's, on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Margins {
    pub start: i32,
    pub end: i32,
}

impl Margins {
    pub fn between(inner: &Bounds, outer: &Bounds, axis: Direction) -> Self {
        Self {
            start: inner.start(axis) - outer.start(axis),
            end: outer.end(axis) - inner.end(axis),
        }
    }

    /// Signed offset from center, doubled.
    pub fn skew(&self) -> i32 {
        self.start - self.end
    }

    pub fn is_symmetric(&self) -> bool {
        approx_eq(self.start, self.end)
    }
}

/// Most common value within tolerance, with its count. Ties keep the first.
fn cluster(values: impl Iterator<Item = i32> + Clone) -> Option<(i32, usize)> {
    values
        .clone()
        .map(|v| (v, values.clone().filter(|&w| approx_eq(v, w)).count()))
        .fold(None, |best, (v, n)| match best {
            Some((_, m)) if m >= n => best,
            _ => Some((v, n)),
        })
}

/// Margin and padding prefixes on `cross`: (margin start, margin end,
/// padding start, padding end).
fn prefixes(cross: Direction) -> (&'static str, &'static str, &'static str, &'static str) {
    match cross {
        Direction::Row => ("ml", "mr", "pl", "pr"),
        Direction::Column => ("mt", "mb", "pt", "pb"),
    }
}

/// The page grows with its content: nothing pins its bottom edge.
pub(crate) fn trailing_free(tree: &VTree, idx: NodeIndex, axis: Direction) -> bool {
    axis == Direction::Column && tree[idx].role.contains(Role::Page)
}

pub fn align_children(tree: &mut VTree, parent: NodeIndex) {
    let Some(dir) = tree[parent].direction else { return };
    let cross = dir.cross();
    let children = tree.children(parent);
    if children.is_empty() {
        return;
    }
    let outer = tree[parent].bounds;
    let margins: Vec<Margins> = children
        .iter()
        .map(|&c| Margins::between(&tree[c].bounds, &outer, cross))
        .collect();
    let constrained: Vec<bool> = children
        .iter()
        .map(|&c| tree[c].spec(cross) == Some(SizeSpec::Constrained))
        .collect();

    let align = tree[parent]
        .align
        .unwrap_or_else(|| choose_align(&margins, &constrained));

    // ─── Padding ─────────────────────────────────────────────────────────
    let n = children.len();
    let shared = |values: Vec<i32>| {
        cluster(values.into_iter())
            .filter(|&(_, count)| count >= MIN_SHARED_PADDING_GROUP && count * 2 > n)
            .map_or(0, |(v, _)| v)
    };
    let (mut pad_start, mut pad_end) = if tree[parent].spec(cross) == Some(SizeSpec::Auto) {
        (
            margins.iter().map(|m| m.start).min().unwrap_or(0),
            margins.iter().map(|m| m.end).min().unwrap_or(0),
        )
    } else if align == Align::Center {
        (0, 0)
    } else {
        (
            shared(margins.iter().map(|m| m.start).collect()),
            shared(margins.iter().map(|m| m.end).collect()),
        )
    };
    pad_start = pad_start.max(0);
    pad_end = pad_end.max(0);
    if trailing_free(tree, parent, cross) {
        pad_end = 0;
    }

    let shift = pad_start - pad_end;
    let center_skew = cluster(margins.iter().map(|m| m.skew() - shift)).map_or(0, |(v, _)| v);
    let (m_start, m_end, p_start, p_end) = prefixes(cross);

    // ─── Per child ───────────────────────────────────────────────────────
    for (i, &child) in children.iter().enumerate() {
        let rest = Margins {
            start: margins[i].start - pad_start,
            end: margins[i].end - pad_end,
        };
        let mut tokens: Vec<String> = Vec::new();
        let push_start = |tokens: &mut Vec<String>, v: i32| {
            if v != 0 {
                tokens.push(format!("{m_start}-{}", px(v)));
            }
        };

        if constrained[i] {
            push_start(&mut tokens, rest.start);
            if rest.end != 0 {
                tokens.push(format!("{m_end}-{}", px(rest.end)));
            }
        } else {
            match align {
                Align::Start | Align::Stretch if approx_eq(rest.start, 0) => {
                    if align == Align::Stretch {
                        tokens.push("self-start".into());
                    }
                }
                Align::End if approx_eq(rest.end, 0) => {}
                Align::Center if approx_eq(rest.skew(), center_skew) => {
                    tokens.extend(center_shift(m_start, m_end, center_skew));
                }
                _ => {
                    if approx_eq(rest.start, 0) {
                        tokens.push("self-start".into());
                    } else if approx_eq(rest.end, 0) {
                        tokens.push("self-end".into());
                    } else if rest.is_symmetric() {
                        tokens.push("self-center".into());
                    } else if rest.end < rest.start {
                        // Pinned to the nearer edge.
                        if align != Align::End {
                            tokens.push("self-end".into());
                        }
                        tokens.push(format!("{m_end}-{}", px(rest.end)));
                    } else {
                        if align != Align::Start {
                            tokens.push("self-start".into());
                        }
                        push_start(&mut tokens, rest.start);
                    }
                }
            }
        }
        tree[child].class_list.extend(tokens);
    }

    let node = &mut tree[parent];
    node.align = Some(align);
    node.class_list.push(match align {
        Align::Start => "items-start",
        Align::Center => "items-center",
        Align::End => "items-end",
        Align::Stretch => "items-stretch",
    });
    if pad_start > 0 {
        node.class_list.push(format!("{p_start}-{}", px(pad_start)));
    }
    if pad_end > 0 {
        node.class_list.push(format!("{p_end}-{}", px(pad_end)));
    }
    log::trace!("align: {} {:?}", node.label(), align);
}

/// A margin moving a centered child's center by `skew / 2`.
fn center_shift(m_start: &str, m_end: &str, skew: i32) -> Option<String> {
    match skew {
        s if approx_eq(s, 0) => None,
        s if s > 0 => Some(format!("{m_start}-{}", px(s))),
        s => Some(format!("{m_end}-{}", px(-s))),
    }
}

fn choose_align(margins: &[Margins], constrained: &[bool]) -> Align {
    let free: Vec<Margins> = margins
        .iter()
        .zip(constrained)
        .filter(|&(_, &c)| !c)
        .map(|(m, _)| *m)
        .collect();
    let n_constrained = constrained.iter().filter(|&&c| c).count();

    let starts = cluster(free.iter().map(|m| m.start));
    let ends = cluster(free.iter().map(|m| m.end));
    let centers = cluster(free.iter().map(|m| m.skew()));
    let count = |c: Option<(i32, usize)>| c.map_or(0, |(_, n)| n);
    let best = count(starts).max(count(ends)).max(count(centers));

    if n_constrained > 0 && n_constrained >= best {
        return Align::Stretch;
    }
    match centers {
        Some((skew, n)) if n == best && approx_eq(skew, 0) => Align::Center,
        _ if count(starts) == best => Align::Start,
        _ if count(ends) == best => Align::End,
        _ => Align::Center,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::DesignId;
    use crate::model::{Tag, VNode};

    fn parent(width: SizeSpec) -> VTree {
        let mut root = VNode::new(Some(DesignId::new("p")), 0, Tag::View, Bounds::new(0, 0, 400, 600));
        root.direction = Some(Direction::Column);
        root.width_spec = Some(width);
        root.height_spec = Some(SizeSpec::Fixed);
        VTree::new(root)
    }

    fn child(tree: &mut VTree, left: i32, width: i32, spec: SizeSpec) -> NodeIndex {
        let root = tree.root;
        let top = tree.children(root).len() as i32 * 50;
        let mut n = VNode::new(None, 1, Tag::View, Bounds::new(left, top, width, 40));
        n.width_spec = Some(spec);
        n.height_spec = Some(SizeSpec::Fixed);
        tree.add_child(root, n)
    }

    #[test]
    fn clusters_with_tolerance() {
        assert_eq!(cluster([16, 17, 40, 16].into_iter()), Some((16, 3)));
        assert_eq!(cluster(std::iter::empty()), None);
    }

    #[test]
    fn shared_left_margin_becomes_padding() {
        let mut tree = parent(SizeSpec::Fixed);
        let a = child(&mut tree, 16, 100, SizeSpec::Fixed);
        let b = child(&mut tree, 16, 200, SizeSpec::Fixed);
        let c = child(&mut tree, 16, 300, SizeSpec::Fixed);
        let d = child(&mut tree, 40, 100, SizeSpec::Fixed);
        let root = tree.root;
        align_children(&mut tree, root);

        assert_eq!(tree[root].align, Some(Align::Start));
        assert!(tree[root].class_list.contains("items-start"));
        assert!(tree[root].class_list.contains("pl-[16px]"));
        for n in [a, b, c] {
            assert!(tree[n].class_list.is_empty());
        }
        assert!(tree[d].class_list.contains("ml-[24px]"));
    }

    #[test]
    fn centered_children() {
        let mut tree = parent(SizeSpec::Fixed);
        let a = child(&mut tree, 150, 100, SizeSpec::Fixed);
        let b = child(&mut tree, 100, 200, SizeSpec::Fixed);
        let root = tree.root;
        align_children(&mut tree, root);
        assert_eq!(tree[root].align, Some(Align::Center));
        assert!(tree[a].class_list.is_empty());
        assert!(tree[b].class_list.is_empty());
    }

    #[test]
    fn stretch_with_right_pinned_outlier() {
        let mut tree = parent(SizeSpec::Constrained);
        let a = child(&mut tree, 16, 368, SizeSpec::Constrained);
        let b = child(&mut tree, 16, 368, SizeSpec::Constrained);
        let c = child(&mut tree, 16, 368, SizeSpec::Constrained);
        let badge = child(&mut tree, 300, 84, SizeSpec::Fixed);
        let root = tree.root;
        align_children(&mut tree, root);

        assert_eq!(tree[root].align, Some(Align::Stretch));
        assert!(tree[root].class_list.contains("pl-[16px]"));
        assert!(tree[root].class_list.contains("pr-[16px]"));
        for n in [a, b, c] {
            assert!(tree[n].class_list.is_empty());
        }
        assert!(tree[badge].class_list.contains("self-end"));
    }

    #[test]
    fn block_near_far_edge_pins_to_it() {
        let mut tree = parent(SizeSpec::Constrained);
        for _ in 0..3 {
            child(&mut tree, 16, 368, SizeSpec::Constrained);
        }
        let near_right = child(&mut tree, 290, 84, SizeSpec::Fixed);
        let near_left = child(&mut tree, 40, 84, SizeSpec::Fixed);
        let root = tree.root;
        align_children(&mut tree, root);

        assert_eq!(tree[root].align, Some(Align::Stretch));
        assert_eq!(tree[near_right].class_list.to_vec(), vec!["self-end", "mr-[10px]"]);
        assert_eq!(tree[near_left].class_list.to_vec(), vec!["self-start", "ml-[24px]"]);
    }

    #[test]
    fn auto_parent_pads_to_its_content() {
        let mut tree = parent(SizeSpec::Auto);
        let a = child(&mut tree, 8, 100, SizeSpec::Fixed);
        let b = child(&mut tree, 20, 300, SizeSpec::Fixed);
        let root = tree.root;
        align_children(&mut tree, root);
        assert!(tree[root].class_list.contains("pl-[8px]"));
        assert!(tree[root].class_list.contains("pr-[80px]"));
        assert!(tree[a].class_list.is_empty());
        assert!(tree[b].class_list.contains("self-end"));
    }
}
