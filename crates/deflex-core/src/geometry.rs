//! Tolerance-based box predicates.
//!
//! Source coordinates carry sub-pixel noise, so nothing here compares
//! edges exactly; every predicate allows `TOLERANCE` pixels of slack.

use crate::config::{ATTACH_INTRUSION_RATIO, TOLERANCE};
use crate::model::{Bounds, Direction};

pub fn approx_eq(a: i32, b: i32) -> bool {
    (a - b).abs() <= TOLERANCE
}

/// `inner`'s span along `axis` lies within `outer`'s (inclusive).
pub fn contained_within(inner: &Bounds, outer: &Bounds, axis: Direction) -> bool {
    inner.start(axis) >= outer.start(axis) - TOLERANCE && inner.end(axis) <= outer.end(axis) + TOLERANCE
}

pub fn contained_within_x(inner: &Bounds, outer: &Bounds) -> bool {
    contained_within(inner, outer, Direction::Row)
}

pub fn contained_within_y(inner: &Bounds, outer: &Bounds) -> bool {
    contained_within(inner, outer, Direction::Column)
}

/// `inner` fits inside `outer` on both axes.
pub fn contains(outer: &Bounds, inner: &Bounds) -> bool {
    contained_within_x(inner, outer) && contained_within_y(inner, outer)
}

/// Both boxes are the same within tolerance.
pub fn same_box(a: &Bounds, b: &Bounds) -> bool {
    approx_eq(a.left(), b.left())
        && approx_eq(a.top(), b.top())
        && approx_eq(a.right(), b.right())
        && approx_eq(a.bottom(), b.bottom())
}

/// `outer` contains `inner` and is not the same box.
pub fn strictly_contains(outer: &Bounds, inner: &Bounds) -> bool {
    contains(outer, inner) && !same_box(outer, inner) && outer.area() > inner.area()
}

/// Length of the shared span along `axis`; negative when apart.
pub fn overlap(a: &Bounds, b: &Bounds, axis: Direction) -> i32 {
    a.end(axis).min(b.end(axis)) - a.start(axis).max(b.start(axis))
}

/// Spans along `axis` share more than the tolerance.
pub fn overlapping(a: &Bounds, b: &Bounds, axis: Direction) -> bool {
    overlap(a, b, axis) > TOLERANCE
}

pub fn overlapping_x(a: &Bounds, b: &Bounds) -> bool {
    overlapping(a, b, Direction::Row)
}

pub fn overlapping_y(a: &Bounds, b: &Bounds) -> bool {
    overlapping(a, b, Direction::Column)
}

/// The boxes share area beyond the tolerance on both axes.
pub fn overlaps(a: &Bounds, b: &Bounds) -> bool {
    overlapping_x(a, b) && overlapping_y(a, b)
}

pub fn intersection(a: &Bounds, b: &Bounds) -> Option<Bounds> {
    let left = a.left().max(b.left());
    let top = a.top().max(b.top());
    let right = a.right().min(b.right());
    let bottom = a.bottom().min(b.bottom());
    (right > left && bottom > top).then(|| Bounds::from_edges(left, top, right, bottom))
}

pub fn intersection_area(a: &Bounds, b: &Bounds) -> i64 {
    intersection(a, b).map_or(0, |i| i.area())
}

/// Smallest box covering every input; `None` for an empty set.
pub fn union_bounds<'a, I>(boxes: I) -> Option<Bounds>
where
    I: IntoIterator<Item = &'a Bounds>,
{
    boxes.into_iter().fold(None, |acc, b| {
        Some(match acc {
            None => *b,
            Some(u) => Bounds::from_edges(
                u.left().min(b.left()),
                u.top().min(b.top()),
                u.right().max(b.right()),
                u.bottom().max(b.bottom()),
            ),
        })
    })
}

/// `small` intrudes into `large` past the attach ratio on `axis`.
pub fn intrudes(small: &Bounds, large: &Bounds, axis: Direction) -> bool {
    let extent = small.extent(axis);
    extent > 0 && overlap(small, large, axis) as f32 > extent as f32 * ATTACH_INTRUSION_RATIO
}

/// Index of the smallest box in `candidates` strictly containing `target`.
/// Ties keep the earliest candidate, i.e. original sibling order.
pub fn best_container(target: &Bounds, candidates: &[Bounds]) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| strictly_contains(c, target))
        .fold(None, |best: Option<(usize, i64)>, (i, c)| match best {
            Some((_, area)) if area <= c.area() => best,
            _ => Some((i, c.area())),
        })
        .map(|(i, _)| i)
}
