//! Repetition detection: lists, wrapping grids and tables.
//!
//! Siblings are grouped into lines (bands sharing a cross-axis span), each
//! line is scanned for its longest run of repeating groups with equal
//! spacing, and adjacent lines repeating the same structure are combined.
//! The row pass also looks for tables before anything else.

use super::{members_bounds, new_wrapper, replace_in_parent};
use crate::config::{MAX_LIST_PERIOD, MIN_LIST_GROUPS, TOLERANCE};
use crate::context::BuildContext;
use crate::geometry::{approx_eq, overlap, overlaps};
use crate::model::{Align, Bounds, Direction, Role, VNode, VTree};
use crate::style::px;
use petgraph::graph::NodeIndex;

pub fn build_list_nodes(tree: &mut VTree, parent: NodeIndex, ctx: &mut BuildContext) {
    if tree.children(parent).len() < 2 {
        return;
    }
    detect_tables(tree, parent, ctx);
    for axis in [Direction::Row, Direction::Column] {
        detect_lists(tree, parent, axis, ctx);
    }
}

// ─── Lines ───────────────────────────────────────────────────────────────

/// Siblings sharing a cross-axis band, sorted along the main axis.
#[derive(Debug, Clone)]
struct Line {
    items: Vec<NodeIndex>,
    cross_start: i32,
    cross_end: i32,
}

fn collect_lines(tree: &VTree, parent: NodeIndex, axis: Direction) -> Vec<Line> {
    let cross = axis.cross();
    let mut sorted = tree.children(parent);
    sorted.sort_by_key(|&c| (tree[c].bounds.start(cross), tree[c].bounds.start(axis)));

    let mut lines: Vec<Line> = Vec::new();
    for c in sorted {
        let b = tree[c].bounds;
        if let Some(line) = lines.last_mut() {
            let band = b.with_span(cross, line.cross_start, line.cross_end);
            let shared = overlap(&b, &band, cross);
            let smaller = b.extent(cross).min(line.cross_end - line.cross_start);
            if shared * 2 > smaller {
                line.items.push(c);
                line.cross_end = line.cross_end.max(b.end(cross));
                continue;
            }
        }
        lines.push(Line {
            items: vec![c],
            cross_start: b.start(cross),
            cross_end: b.end(cross),
        });
    }
    for line in &mut lines {
        line.items.sort_by_key(|&c| tree[c].bounds.start(axis));
    }
    lines
}

fn gaps(tree: &VTree, items: &[NodeIndex], axis: Direction) -> Vec<i32> {
    items
        .windows(2)
        .map(|w| tree[w[1]].bounds.start(axis) - tree[w[0]].bounds.end(axis))
        .collect()
}

// ─── Runs ────────────────────────────────────────────────────────────────

/// `groups` repetitions of `period` consecutive items, from `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineRun {
    start: usize,
    period: usize,
    groups: usize,
}

impl LineRun {
    fn len(&self) -> usize {
        self.period * self.groups
    }

    fn items<'l>(&self, line: &'l Line) -> &'l [NodeIndex] {
        &line.items[self.start..self.start + self.len()]
    }

    fn group<'l>(&self, line: &'l Line, k: usize) -> &'l [NodeIndex] {
        let from = self.start + k * self.period;
        &line.items[from..from + self.period]
    }
}

/// Structural fingerprint two repeated items must share.
fn same_kind(tree: &VTree, a: NodeIndex, b: NodeIndex) -> bool {
    tree[a].tag == tree[b].tag && tree.children(a).len() == tree.children(b).len()
}

fn same_size(a: &Bounds, b: &Bounds) -> bool {
    approx_eq(a.width(), b.width()) && approx_eq(a.height(), b.height())
}

fn items_match(tree: &VTree, a: NodeIndex, b: NodeIndex, axis: Direction, period: usize) -> bool {
    let (ab, bb) = (tree[a].bounds, tree[b].bounds);
    same_kind(tree, a, b)
        && approx_eq(ab.extent(axis.cross()), bb.extent(axis.cross()))
        && (period == 1 || approx_eq(ab.extent(axis), bb.extent(axis)))
}

/// Longest equal-gap repetition in a line. Ties prefer the shorter period,
/// then the earlier start.
fn find_run(tree: &VTree, line: &Line, axis: Direction) -> Option<LineRun> {
    let items = &line.items;
    let gaps = gaps(tree, items, axis);
    let mut best: Option<LineRun> = None;

    for period in 1..=MAX_LIST_PERIOD {
        for start in 0..items.len() {
            let mut groups = 1;
            while start + (groups + 1) * period <= items.len()
                && extends(tree, items, &gaps, start, period, groups, axis)
            {
                groups += 1;
            }
            if groups < 2 {
                continue;
            }
            let run = LineRun {
                start,
                period,
                groups,
            };
            if best.is_none_or(|b| run.len() > b.len()) {
                best = Some(run);
            }
        }
    }
    best
}

/// Whether group number `next` continues the run.
fn extends(
    tree: &VTree,
    items: &[NodeIndex],
    gaps: &[i32],
    start: usize,
    period: usize,
    next: usize,
    axis: Direction,
) -> bool {
    let from = start + next * period;
    let shapes_match = (0..period).all(|j| items_match(tree, items[start + j], items[from + j], axis, period));
    // Gap `i` sits between items `i` and `i + 1`.
    let gaps_repeat = (from - 1..from + period - 1).all(|i| {
        gaps[i] >= -TOLERANCE && (i < start + period || approx_eq(gaps[i], gaps[i - period]))
    });
    shapes_match && gaps_repeat
}

// ─── Lists ───────────────────────────────────────────────────────────────

fn detect_lists(tree: &mut VTree, parent: NodeIndex, axis: Direction, ctx: &mut BuildContext) {
    let lines = collect_lines(tree, parent, axis);
    let runs: Vec<Option<LineRun>> = lines.iter().map(|l| find_run(tree, l, axis)).collect();

    let mut i = 0;
    while i < lines.len() {
        let Some(run) = runs[i] else {
            i += 1;
            continue;
        };
        let mut j = i + 1;
        while j < lines.len()
            && runs[j - 1].zip(runs[j]).is_some_and(|(prev, next)| {
                same_structure(tree, (&lines[j - 1], prev), (&lines[j], next), axis)
            })
        {
            j += 1;
        }

        let chain: Vec<(&Line, LineRun)> = (i..j).filter_map(|k| Some((&lines[k], runs[k]?))).collect();
        if chain.len() >= 2 {
            build_chain(tree, parent, &chain, axis, ctx);
        } else {
            build_standalone(tree, parent, lines[i].clone(), run, axis, ctx);
        }
        i = j;
    }
}

/// Two lines repeat the same groups at the same relative offsets.
fn same_structure(tree: &VTree, a: (&Line, LineRun), b: (&Line, LineRun), axis: Direction) -> bool {
    let (la, ra) = a;
    let (lb, rb) = b;
    if ra.period != rb.period || ra.groups != rb.groups {
        return false;
    }
    let (ia, ib) = (ra.items(la), rb.items(lb));
    let origin_a = tree[ia[0]].bounds.start(axis);
    let origin_b = tree[ib[0]].bounds.start(axis);
    ia.iter().zip(ib).all(|(&x, &y)| {
        approx_eq(
            tree[x].bounds.start(axis) - origin_a,
            tree[y].bounds.start(axis) - origin_b,
        )
    })
}

fn list_role(axis: Direction) -> Role {
    match axis {
        Direction::Row => Role::ListX,
        Direction::Column => Role::ListY,
    }
}

/// Members of the run, or their group wrappers when the period exceeds one.
fn list_items(
    tree: &mut VTree,
    line: &Line,
    run: LineRun,
    axis: Direction,
    ctx: &mut BuildContext,
) -> Vec<NodeIndex> {
    (0..run.groups)
        .map(|k| {
            let group = run.group(line, k);
            if run.period == 1 {
                tree[group[0]].role.insert(Role::ListItem);
                group[0]
            } else {
                let bounds = members_bounds(tree, group);
                let mut item = VNode::generated(ctx.next_index(), bounds, axis);
                item.role.insert(Role::ListItem);
                new_wrapper(tree, group, item)
            }
        })
        .collect()
}

fn overlaps_outsiders(tree: &VTree, parent: NodeIndex, members: &[NodeIndex], bounds: &Bounds) -> bool {
    tree.children(parent)
        .into_iter()
        .filter(|c| !members.contains(c))
        .any(|c| overlaps(bounds, &tree[c].bounds))
}

fn build_standalone(
    tree: &mut VTree,
    parent: NodeIndex,
    line: Line,
    run: LineRun,
    axis: Direction,
    ctx: &mut BuildContext,
) {
    if run.groups < MIN_LIST_GROUPS {
        return;
    }
    let members: Vec<NodeIndex> = run.items(&line).to_vec();
    if members.iter().all(|&m| tree[m].is_bare_text()) {
        log::trace!("list: {} bare text items left as text", members.len());
        return;
    }
    let bounds = members_bounds(tree, &members);
    if overlaps_outsiders(tree, parent, &members, &bounds) {
        return;
    }

    let before = tree.children(parent);
    let items = list_items(tree, &line, run, axis, ctx);
    let mut list = VNode::generated(ctx.next_index(), bounds, axis);
    list.role.insert(list_role(axis));
    let list = new_wrapper(tree, &items, list);
    replace_in_parent(tree, parent, &before, &members, list);
    ctx.info(
        tree[parent].id.as_ref(),
        "list",
        format!("{} of {} items", list_role(axis).as_str(), items.len()),
    );
}

fn build_chain(
    tree: &mut VTree,
    parent: NodeIndex,
    chain: &[(&Line, LineRun)],
    axis: Direction,
    ctx: &mut BuildContext,
) {
    let members: Vec<NodeIndex> = chain
        .iter()
        .flat_map(|(line, run)| run.items(line).iter().copied())
        .collect();
    let bounds = members_bounds(tree, &members);
    if overlaps_outsiders(tree, parent, &members, &bounds) {
        return;
    }
    let before = tree.children(parent);

    if axis == Direction::Row
        && let Some(row_gap) = wrap_row_gap(tree, chain)
    {
        let (line, run) = chain[0];
        let item_gap = gaps(tree, run.group(line, 0), axis)
            .first()
            .copied()
            .unwrap_or(0);
        let column_gap = if run.groups > 1 {
            let next = run.group(line, 1)[0];
            let prev = run.group(line, 0)[run.period - 1];
            tree[next].bounds.start(axis) - tree[prev].bounds.end(axis)
        } else {
            item_gap
        };

        let mut items = Vec::new();
        for &(line, run) in chain {
            items.extend(list_items(tree, line, run, axis, ctx));
        }
        let mut list = VNode::generated(ctx.next_index(), bounds, Direction::Row);
        list.role.insert(Role::ListWrap);
        list.class_list.extend([
            "flex-wrap".to_string(),
            format!("gap-x-{}", px(column_gap)),
            format!("gap-y-{}", px(row_gap)),
        ]);
        let list = new_wrapper(tree, &items, list);
        replace_in_parent(tree, parent, &before, &members, list);
        ctx.info(tree[parent].id.as_ref(), "list", format!("list-wrap of {} items", items.len()));
        return;
    }

    // Zip: the k-th group of every line forms one item, stacked on the cross axis.
    let (_, first_run) = chain[0];
    let mut items = Vec::new();
    let mut aligns = Vec::new();
    for k in 0..first_run.groups {
        let group: Vec<NodeIndex> = chain
            .iter()
            .flat_map(|(line, run)| run.group(line, k).iter().copied())
            .collect();
        aligns.push(shared_alignment(tree, &group, axis));
        let gb = members_bounds(tree, &group);
        let mut item = VNode::generated(ctx.next_index(), gb, axis.cross());
        item.role.insert(Role::ListItem);
        items.push(new_wrapper(tree, &group, item));
    }
    if let Some(align) = majority(&aligns) {
        for &item in &items {
            tree[item].align = Some(align);
        }
    }

    let mut list = VNode::generated(ctx.next_index(), bounds, axis);
    list.role.insert(list_role(axis));
    let list = new_wrapper(tree, &items, list);
    replace_in_parent(tree, parent, &before, &members, list);
    ctx.info(
        tree[parent].id.as_ref(),
        "list",
        format!("zipped {} of {} items", list_role(axis).as_str(), items.len()),
    );
}

/// Row gap of a wrapping grid: every line holds the same item sizes and
/// consecutive lines are evenly spaced.
fn wrap_row_gap(tree: &VTree, chain: &[(&Line, LineRun)]) -> Option<i32> {
    let (first_line, first_run) = chain[0];
    let template = first_run.items(first_line);
    let uniform = chain.iter().all(|(line, run)| {
        run.items(line)
            .iter()
            .zip(template)
            .all(|(&a, &b)| same_kind(tree, a, b) && same_size(&tree[a].bounds, &tree[b].bounds))
    });
    if !uniform {
        return None;
    }
    let row_gaps: Vec<i32> = chain
        .windows(2)
        .map(|w| w[1].0.cross_start - w[0].0.cross_end)
        .collect();
    let first = *row_gaps.first()?;
    (first >= 0 && row_gaps.iter().all(|&g| approx_eq(g, first))).then_some(first)
}

/// How a zipped item's members line up along `axis`.
fn shared_alignment(tree: &VTree, group: &[NodeIndex], axis: Direction) -> Option<Align> {
    let first = tree[*group.first()?].bounds;
    let all = |f: &dyn Fn(&Bounds) -> i32| group.iter().all(|&m| approx_eq(f(&tree[m].bounds), f(&first)));
    if all(&|b: &Bounds| b.start(axis) + b.end(axis)) {
        Some(Align::Center)
    } else if all(&|b: &Bounds| b.start(axis)) {
        Some(Align::Start)
    } else if all(&|b: &Bounds| b.end(axis)) {
        Some(Align::End)
    } else {
        None
    }
}

fn majority(aligns: &[Option<Align>]) -> Option<Align> {
    let mut counts: Vec<(Align, usize)> = Vec::new();
    for align in aligns.iter().flatten() {
        match counts.iter_mut().find(|(a, _)| a == align) {
            Some((_, n)) => *n += 1,
            None => counts.push((*align, 1)),
        }
    }
    counts
        .into_iter()
        .max_by_key(|&(_, n)| n)
        .filter(|&(_, n)| n * 2 > aligns.len())
        .map(|(a, _)| a)
}

// ─── Tables ──────────────────────────────────────────────────────────────

fn detect_tables(tree: &mut VTree, parent: NodeIndex, ctx: &mut BuildContext) {
    let lines = collect_lines(tree, parent, Direction::Row);
    let mut i = 0;
    while i < lines.len() {
        let mut j = i + 1;
        if is_table_row(tree, &lines[i]) {
            while j < lines.len() && is_table_row(tree, &lines[j]) && columns_match(tree, &lines[j - 1], &lines[j]) {
                j += 1;
            }
        }
        let rows = &lines[i..j];
        let columns = lines[i].items.len();
        if rows.len() >= 3 || (rows.len() == 2 && columns >= 3) {
            build_table(tree, parent, rows, ctx);
        }
        i = j;
    }
}

/// At least two cells, and not a plain run of identical equally-spaced items.
fn is_table_row(tree: &VTree, line: &Line) -> bool {
    if line.items.len() < 2 {
        return false;
    }
    let first = line.items[0];
    let homogeneous = line
        .items
        .iter()
        .all(|&c| same_kind(tree, c, first) && same_size(&tree[c].bounds, &tree[first].bounds));
    let g = gaps(tree, &line.items, Direction::Row);
    let even = g.iter().all(|&x| approx_eq(x, g[0]));
    !(homogeneous && even)
}

fn columns_match(tree: &VTree, a: &Line, b: &Line) -> bool {
    a.items.len() == b.items.len()
        && a.items.iter().zip(&b.items).all(|(&x, &y)| {
            let (bx, by) = (tree[x].bounds, tree[y].bounds);
            approx_eq(bx.left(), by.left())
                || approx_eq(bx.right(), by.right())
                || approx_eq(bx.left() + bx.right(), by.left() + by.right())
        })
}

fn build_table(tree: &mut VTree, parent: NodeIndex, rows: &[Line], ctx: &mut BuildContext) {
    let members: Vec<NodeIndex> = rows.iter().flat_map(|l| l.items.iter().copied()).collect();
    let bounds = members_bounds(tree, &members);
    if overlaps_outsiders(tree, parent, &members, &bounds) {
        return;
    }
    let before = tree.children(parent);
    let row_nodes: Vec<NodeIndex> = rows
        .iter()
        .map(|line| {
            let rb = members_bounds(tree, &line.items);
            let mut row = VNode::generated(ctx.next_index(), rb, Direction::Row);
            row.role.insert(Role::TableRow);
            new_wrapper(tree, &line.items, row)
        })
        .collect();
    let mut body = VNode::generated(ctx.next_index(), bounds, Direction::Column);
    body.role.insert(Role::TableBody);
    let body = new_wrapper(tree, &row_nodes, body);
    replace_in_parent(tree, parent, &before, &members, body);
    ctx.info(
        tree[parent].id.as_ref(),
        "table",
        format!("{} rows x {} columns", rows.len(), rows[0].items.len()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::id::DesignId;
    use crate::model::Tag;

    fn view(id: &str, bounds: Bounds) -> VNode {
        let mut v = VNode::new(Some(DesignId::new(id)), 0, Tag::View, bounds);
        v.class_list.push("bg-[hsla(0,0%,90%,1)]");
        v
    }

    fn text(bounds: Bounds) -> VNode {
        VNode::new(None, 0, Tag::Text, bounds)
    }

    fn page() -> VTree {
        VTree::new(VNode::new(None, 0, Tag::View, Bounds::new(0, 0, 750, 1000)))
    }

    fn run(tree: &mut VTree) {
        let config = BuildConfig::default();
        let mut ctx = BuildContext::new(&config);
        let root = tree.root;
        build_list_nodes(tree, root, &mut ctx);
    }

    #[test]
    fn equal_gap_row_becomes_list_x() {
        let mut tree = page();
        let root = tree.root;
        let cards: Vec<NodeIndex> = (0..4)
            .map(|i| tree.add_child(root, view(&format!("c{i}"), Bounds::new(i * 120, 0, 100, 80))))
            .collect();
        run(&mut tree);

        let children = tree.children(root);
        assert_eq!(children.len(), 1);
        let list = children[0];
        assert!(tree[list].role.contains(Role::ListX));
        assert_eq!(tree[list].direction, Some(Direction::Row));
        assert_eq!(tree.children(list), cards);
        assert!(cards.iter().all(|&c| tree[c].role.contains(Role::ListItem)));
    }

    #[test]
    fn two_items_are_not_a_list() {
        let mut tree = page();
        let root = tree.root;
        tree.add_child(root, view("a", Bounds::new(0, 0, 100, 50)));
        tree.add_child(root, view("b", Bounds::new(120, 0, 100, 50)));
        run(&mut tree);
        assert_eq!(tree.children(root).len(), 2);
    }

    #[test]
    fn bare_text_lines_are_not_lists() {
        let mut tree = page();
        let root = tree.root;
        for i in 0..4 {
            tree.add_child(root, text(Bounds::new(0, i * 30, 300, 20)));
        }
        run(&mut tree);
        assert_eq!(tree.children(root).len(), 4);
    }

    #[test]
    fn unequal_gaps_break_the_run() {
        let mut tree = page();
        let root = tree.root;
        for (i, left) in [0, 120, 240, 400].into_iter().enumerate() {
            tree.add_child(root, view(&format!("u{i}"), Bounds::new(left, 0, 100, 80)));
        }
        run(&mut tree);
        let children = tree.children(root);
        // First three repeat; the fourth stays outside the list.
        assert_eq!(children.len(), 2);
        assert_eq!(tree.children(children[0]).len(), 3);
    }

    #[test]
    fn period_two_groups_are_wrapped() {
        let mut tree = page();
        let root = tree.root;
        for i in 0..3 {
            let x = i * 200;
            tree.add_child(root, view(&format!("icon{i}"), Bounds::new(x, 0, 40, 40)));
            tree.add_child(root, view(&format!("tag{i}"), Bounds::new(x + 50, 10, 100, 20)));
        }
        run(&mut tree);
        let children = tree.children(root);
        assert_eq!(children.len(), 1);
        let items = tree.children(children[0]);
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|&it| tree[it].is_generated() && tree[it].role.contains(Role::ListItem)));
        assert_eq!(tree.children(items[0]).len(), 2);
    }

    #[test]
    fn identical_rows_wrap() {
        let mut tree = page();
        let root = tree.root;
        for row in 0..2 {
            for col in 0..3 {
                tree.add_child(
                    root,
                    view(&format!("g{row}{col}"), Bounds::new(col * 110, row * 110, 100, 100)),
                );
            }
        }
        run(&mut tree);
        let children = tree.children(root);
        assert_eq!(children.len(), 1);
        let grid = &tree[children[0]];
        assert!(grid.role.contains(Role::ListWrap));
        assert!(grid.class_list.contains("flex-wrap"));
        assert!(grid.class_list.contains("gap-x-[10px]"));
        assert!(grid.class_list.contains("gap-y-[10px]"));
        assert_eq!(tree.children(children[0]).len(), 6);
    }

    #[test]
    fn icon_row_over_label_row_zips() {
        let mut tree = page();
        let root = tree.root;
        for i in 0..3 {
            tree.add_child(root, view(&format!("ic{i}"), Bounds::new(i * 100 + 10, 0, 40, 40)));
        }
        for i in 0..3 {
            let mut label = text(Bounds::new(i * 100, 50, 60, 20));
            label.class_list.push("text-[12px]");
            tree.add_child(root, label);
        }
        run(&mut tree);
        let children = tree.children(root);
        assert_eq!(children.len(), 1);
        let list = children[0];
        assert!(tree[list].role.contains(Role::ListX));
        let items = tree.children(list);
        assert_eq!(items.len(), 3);
        assert_eq!(tree[items[0]].direction, Some(Direction::Column));
        assert_eq!(tree[items[0]].align, Some(Align::Center));
        assert_eq!(tree.children(items[0]).len(), 2);
    }

    #[test]
    fn aligned_columns_form_a_table() {
        let mut tree = page();
        let root = tree.root;
        for row in 0..3 {
            let y = row * 40;
            tree.add_child(root, text(Bounds::new(0, y, 80, 20)));
            tree.add_child(root, text(Bounds::new(100, y, 200 + row * 10, 20)));
        }
        run(&mut tree);
        let children = tree.children(root);
        assert_eq!(children.len(), 1);
        let body = children[0];
        assert!(tree[body].role.contains(Role::TableBody));
        let rows = tree.children(body);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|&r| tree[r].role.contains(Role::TableRow)));
        assert_eq!(tree.children(rows[0]).len(), 2);
    }
}
