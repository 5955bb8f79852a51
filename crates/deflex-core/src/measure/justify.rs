//! Main-axis placement.
//!
//! The gaps before, between and after the children decide a
//! `justify-content` value. Distributed layouts (around, between, evenly)
//! need uniform interior gaps; otherwise children are packed against the
//! closer edge and interior gaps become a gap token or per-child margins.
//! A stretchable container with irregular gaps gets one flexible spacer at
//! its largest gap instead.

use super::align::trailing_free;
use crate::config::TOLERANCE;
use crate::context::BuildContext;
use crate::geometry::approx_eq;
use crate::model::{Bounds, Direction, Role, SizeSpec, Tag, VNode, VTree};
use crate::style::px;
use petgraph::graph::NodeIndex;

/// Main-axis gaps of one sibling set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Gaps {
    pub start: i32,
    pub end: i32,
    pub interior: Vec<i32>,
}

impl Gaps {
    pub fn along(boxes: &[Bounds], outer: &Bounds, axis: Direction) -> Self {
        let (Some(first), Some(last)) = (boxes.first(), boxes.last()) else {
            return Self {
                start: 0,
                end: 0,
                interior: Vec::new(),
            };
        };
        Self {
            start: first.start(axis) - outer.start(axis),
            end: outer.end(axis) - last.end(axis),
            interior: boxes.windows(2).map(|w| w[1].start(axis) - w[0].end(axis)).collect(),
        }
    }

    /// The common interior gap, when there is one.
    pub fn uniform(&self) -> Option<i32> {
        let first = *self.interior.first()?;
        self.interior.iter().all(|&g| approx_eq(g, first)).then_some(first)
    }

    /// Index of the largest interior gap; ties keep the first.
    fn widest(&self) -> Option<usize> {
        self.interior
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, i32)>, (i, &g)| match best {
                Some((_, w)) if w >= g => best,
                _ => Some((i, g)),
            })
            .map(|(i, _)| i)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plan {
    Start,
    End,
    Center,
    Between,
    Around,
    Evenly,
    /// Spacer after the child at this index.
    Spacer(usize),
}

impl Plan {
    fn class(self) -> &'static str {
        match self {
            Plan::Start | Plan::Spacer(_) => "justify-start",
            Plan::End => "justify-end",
            Plan::Center => "justify-center",
            Plan::Between => "justify-between",
            Plan::Around => "justify-around",
            Plan::Evenly => "justify-evenly",
        }
    }
}

fn classify(gaps: &Gaps, spec: Option<SizeSpec>, open_end: bool) -> Plan {
    if spec == Some(SizeSpec::Auto) || open_end {
        return Plan::Start;
    }
    if let Some(g) = gaps.uniform().filter(|&g| g > 0) {
        if approx_eq(gaps.start * 2, g) && approx_eq(gaps.end * 2, g) {
            return Plan::Around;
        }
        if g > gaps.start + TOLERANCE && g > gaps.end + TOLERANCE {
            return Plan::Between;
        }
        if approx_eq(gaps.start, g) && approx_eq(gaps.end, g) {
            return Plan::Evenly;
        }
    }
    if approx_eq(gaps.start, gaps.end) && !approx_eq(gaps.start, 0) {
        return Plan::Center;
    }
    if spec == Some(SizeSpec::Constrained)
        && gaps.interior.len() >= 2
        && gaps.uniform().is_none()
        && let Some(k) = gaps.widest().filter(|&k| gaps.interior[k] > 0)
    {
        return Plan::Spacer(k);
    }
    if gaps.start <= gaps.end { Plan::Start } else { Plan::End }
}

fn prefixes(axis: Direction) -> (&'static str, &'static str, &'static str, &'static str, &'static str) {
    match axis {
        Direction::Row => ("ml", "mr", "pl", "pr", "gap-x"),
        Direction::Column => ("mt", "mb", "pt", "pb", "gap-y"),
    }
}

pub fn justify_children(tree: &mut VTree, parent: NodeIndex, ctx: &mut BuildContext) {
    let Some(dir) = tree[parent].direction else { return };
    let children = tree.children(parent);
    if children.is_empty() {
        return;
    }
    let outer = tree[parent].bounds;
    let boxes: Vec<Bounds> = children.iter().map(|&c| tree[c].bounds).collect();
    let gaps = Gaps::along(&boxes, &outer, dir);
    let spec = tree[parent].spec(dir);
    let open_end = trailing_free(tree, parent, dir);
    // Lists keep their spacing as a gap, whatever their extent.
    let plan = if tree[parent].role.is_list() { Plan::Start } else { classify(&gaps, spec, open_end) };
    let (m_start, m_end, p_start, p_end, gap) = prefixes(dir);

    let (pad_start, pad_end) = match plan {
        Plan::Start => (gaps.start, if spec == Some(SizeSpec::Auto) && !open_end { gaps.end } else { 0 }),
        Plan::End => (0, gaps.end),
        Plan::Between | Plan::Spacer(_) => (gaps.start, gaps.end),
        Plan::Center | Plan::Around | Plan::Evenly => (0, 0),
    };

    let node = &mut tree[parent];
    node.class_list.push(plan.class());
    if pad_start > 0 {
        node.class_list.push(format!("{p_start}-{}", px(pad_start)));
    }
    if pad_end > 0 {
        node.class_list.push(format!("{p_end}-{}", px(pad_end)));
    }
    log::trace!("justify: {} {:?}", node.label(), plan);

    // Edges sticking out past the parent.
    if pad_start < 0 && plan != Plan::End {
        tree[children[0]].class_list.push(format!("{m_start}-{}", px(pad_start)));
    }

    let spacer_at = match plan {
        Plan::Between | Plan::Around | Plan::Evenly => return,
        Plan::Spacer(k) => Some(k),
        _ => None,
    };
    let remaining: Vec<(usize, i32)> = gaps
        .interior
        .iter()
        .copied()
        .enumerate()
        .filter(|&(i, _)| Some(i) != spacer_at)
        .collect();
    let common = remaining.first().map(|&(_, g)| g).filter(|&g| {
        g > 0 && remaining.iter().all(|&(_, h)| approx_eq(g, h))
    });

    if let Some(g) = common {
        tree[parent].class_list.push(format!("{gap}-{}", px(g)));
    } else {
        for (i, g) in remaining {
            if g == 0 {
                continue;
            }
            if plan == Plan::End {
                tree[children[i]].class_list.push(format!("{m_end}-{}", px(g)));
            } else {
                tree[children[i + 1]].class_list.push(format!("{m_start}-{}", px(g)));
            }
        }
    }

    if let Some(k) = spacer_at {
        insert_spacer(tree, parent, &children, k, ctx);
    }
}

fn insert_spacer(
    tree: &mut VTree,
    parent: NodeIndex,
    children: &[NodeIndex],
    k: usize,
    ctx: &mut BuildContext,
) {
    let Some(dir) = tree[parent].direction else { return };
    let (Some(&before), Some(&after)) = (children.get(k), children.get(k + 1)) else {
        return;
    };
    let outer = tree[parent].bounds;
    let cross = dir.cross();
    let bounds = outer.with_span(dir, tree[before].bounds.end(dir), tree[after].bounds.start(dir));

    let mut spacer = VNode::new(None, ctx.next_index(), Tag::View, bounds);
    spacer.role.insert(Role::Spacer);
    spacer.set_spec(dir, SizeSpec::Constrained);
    spacer.set_spec(cross, SizeSpec::Auto);
    let spacer = tree.insert(spacer);

    let mut order = children.to_vec();
    order.insert(k + 1, spacer);
    tree.set_children(parent, &order);
    log::trace!("justify: spacer after {}", tree[before].label());
}
