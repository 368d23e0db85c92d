//! The sweep status: the segments crossing the sweep line, from left to right.

use std::cmp::Ordering;

use crate::{
    geom::{horiz, Point},
    num::cmp_eps,
    rbtree::{Compare, Pos, Threaded},
    segments::{SegIdx, Segments},
    set::MultiSet,
};

/// Orders segments by where they cross the current sweep line.
///
/// Two segments whose crossings are within `eps` of one another are
/// equivalent. A horizontal segment is considered to cross the sweep line at
/// the sweep point's `x` coordinate, clamped to the segment's extent.
#[derive(Clone, Debug)]
pub struct SweepCompare<'a> {
    segments: &'a Segments,
    sweep: Point,
    eps: f64,
}

impl SweepCompare<'_> {
    /// The horizontal position at which `seg` crosses the sweep line.
    pub fn x_at(&self, seg: SegIdx) -> f64 {
        let s = &self.segments[seg];
        if horiz(s, self.eps) {
            self.sweep.x.clamp(s.min_x(), s.max_x())
        } else {
            s.x_at_y(self.sweep.y)
        }
    }

    // A bound on the rounding error in `x_at`. Steep segments are exact
    // enough, but a nearly horizontal one magnifies the error in `y`.
    fn x_error(&self, seg: SegIdx) -> f64 {
        let s = &self.segments[seg];
        if horiz(s, self.eps) {
            return 0.0;
        }
        let d = s.direction();
        let slope = (d.x / d.y).abs();
        let x_mag = s.min_x().abs().max(s.max_x().abs());
        let y_mag = s.min_y().abs().max(s.max_y().abs());
        4.0 * f64::EPSILON * (x_mag + slope * y_mag)
    }
}

impl Compare<SegIdx> for SweepCompare<'_> {
    fn less(&self, a: &SegIdx, b: &SegIdx) -> bool {
        cmp_eps(self.x_at(*a), self.x_at(*b), self.eps) == Ordering::Less
    }
}

/// The segments that currently cross the sweep line.
///
/// The order is only meaningful relative to the most recent call to
/// [`sweep`](Self::sweep). Everything that compares segments (the bound
/// queries and [`insert`](Self::insert)) assumes that the status was swept to
/// the current event first; the position-based operations don't care.
#[derive(Debug)]
pub struct SweepStatus<'a> {
    set: MultiSet<SegIdx, SweepCompare<'a>, Threaded>,
    // Where each segment is, indexed by `SegIdx`.
    positions: Vec<Option<Pos>>,
}

impl<'a> SweepStatus<'a> {
    /// Creates an empty status for segments from `segments`, which must be
    /// [normalized](crate::Segment::normalized).
    pub fn new(segments: &'a Segments, eps: f64) -> Self {
        SweepStatus {
            set: MultiSet::with_comparator(SweepCompare {
                segments,
                sweep: Point::default(),
                eps,
            }),
            positions: vec![None; segments.len()],
        }
    }

    /// Moves the sweep line to `point`.
    pub fn sweep(&mut self, point: Point) {
        self.set.comparator_mut().sweep = point;
    }

    /// The current sweep point.
    pub fn sweep_point(&self) -> Point {
        self.set.comparator().sweep
    }

    /// The horizontal position at which `seg` crosses the sweep line.
    pub fn x_at(&self, seg: SegIdx) -> f64 {
        self.set.comparator().x_at(seg)
    }

    /// The first segment that crosses the sweep line no further left than
    /// `x - eps`.
    pub fn lower_bound_x(&self, x: f64) -> Option<Pos> {
        let cmp = self.set.comparator();
        self.set.partition_point(|&s| cmp.x_at(s) < x - cmp.eps)
    }

    /// The first segment that crosses the sweep line strictly to the right of
    /// `x + eps`.
    pub fn upper_bound_x(&self, x: f64) -> Option<Pos> {
        let cmp = self.set.comparator();
        self.set.partition_point(|&s| cmp.x_at(s) <= x + cmp.eps)
    }

    /// The positions of all segments crossing the sweep line within `eps` of `x`.
    pub fn span_at(&self, x: f64) -> Vec<Pos> {
        let end = self.upper_bound_x(x);
        let mut ret = Vec::new();
        let mut pos = self.lower_bound_x(x);
        while let Some(p) = pos {
            if Some(p) == end {
                break;
            }
            ret.push(p);
            pos = self.set.next(p);
        }
        ret
    }

    /// Like [`span_at`](Self::span_at), but extended so that it also covers
    /// `members` and everything in between.
    ///
    /// This is for segments that are known to pass through the point being
    /// swept, even though rounding might have put them more than `eps` away
    /// from `x`. Every position in `members` must be occupied.
    pub fn span_covering(&self, x: f64, members: &[Pos]) -> Vec<Pos> {
        let mut span = self.span_at(x);
        let mut missing = Vec::new();
        for &p in members {
            if !span.contains(&p) && !missing.contains(&p) {
                missing.push(p);
            }
        }
        if missing.is_empty() {
            return span;
        }
        if span.is_empty() {
            span.push(missing.swap_remove(0));
        }

        // Walk outwards in both directions until we've seen all the members.
        // Anything beyond the outermost member on each side gets dropped.
        let (mut before, mut after) = (Vec::new(), Vec::new());
        let (mut keep_before, mut keep_after) = (0, 0);
        let mut left = self.prev(span[0]);
        let mut right = self.next(span[span.len() - 1]);
        while !missing.is_empty() && (left.is_some() || right.is_some()) {
            if let Some(p) = left {
                before.push(p);
                if take(&mut missing, p) {
                    keep_before = before.len();
                }
                left = self.prev(p);
            }
            if let Some(p) = right {
                after.push(p);
                if take(&mut missing, p) {
                    keep_after = after.len();
                }
                right = self.next(p);
            }
        }
        debug_assert!(missing.is_empty(), "{missing:?} aren't in the status");

        before.truncate(keep_before);
        after.truncate(keep_after);
        before.reverse();
        before.extend(span);
        before.extend(after);
        before
    }

    /// The position of `seg`, if it's crossing the sweep line.
    pub fn position(&self, seg: SegIdx) -> Option<Pos> {
        self.positions[seg.0]
    }

    /// Inserts `seg` according to where it crosses the sweep line.
    pub fn insert(&mut self, seg: SegIdx) -> Pos {
        let pos = self.set.insert(seg);
        self.positions[seg.0] = Some(pos);
        pos
    }

    /// Inserts `seg` immediately after `pos`, or at the far left if `pos`
    /// is `None`.
    pub fn insert_after(&mut self, pos: Option<Pos>, seg: SegIdx) -> Pos {
        let pos = self.set.insert_after(pos, seg);
        self.positions[seg.0] = Some(pos);
        pos
    }

    /// Removes the segment at `pos`.
    pub fn erase(&mut self, pos: Pos) -> SegIdx {
        let seg = self.set.erase(pos);
        self.positions[seg.0] = None;
        seg
    }

    /// The segment at `pos`.
    pub fn get(&self, pos: Pos) -> SegIdx {
        *self.set.get(pos)
    }

    /// The position to the right of `pos`.
    pub fn next(&self, pos: Pos) -> Option<Pos> {
        self.set.next(pos)
    }

    /// The position to the left of `pos`.
    pub fn prev(&self, pos: Pos) -> Option<Pos> {
        self.set.prev(pos)
    }

    /// The leftmost position.
    pub fn first(&self) -> Option<Pos> {
        self.set.first()
    }

    /// The rightmost position.
    pub fn last(&self) -> Option<Pos> {
        self.set.last()
    }

    /// The number of segments crossing the sweep line.
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Is the sweep line crossing no segments?
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Iterates over the segments, from left to right.
    pub fn iter(&self) -> impl Iterator<Item = SegIdx> + '_ {
        self.set.iter().copied()
    }

    /// Checks the tree invariants, and that the segments are ordered at the
    /// current sweep point.
    ///
    /// # Panics
    ///
    /// Panics if any of the invariants fail.
    pub fn check_invariants(&self) {
        self.set.check_structure();
        let cmp = self.set.comparator();
        let segs: Vec<SegIdx> = self.iter().collect();
        let xs: Vec<f64> = segs.iter().map(|&s| cmp.x_at(s)).collect();
        for (i, pair) in segs.windows(2).enumerate() {
            let slack = 4.0 * cmp.eps + cmp.x_error(pair[0]) + cmp.x_error(pair[1]);
            assert!(
                xs[i] <= xs[i + 1] + slack,
                "status out of order at {:?}: {xs:?}",
                cmp.sweep
            );
        }
        for (i, pos) in self.positions.iter().enumerate() {
            if let Some(pos) = *pos {
                assert_eq!(self.get(pos), SegIdx(i));
            }
        }
    }
}

fn take(missing: &mut Vec<Pos>, p: Pos) -> bool {
    match missing.iter().position(|&m| m == p) {
        Some(i) => {
            missing.swap_remove(i);
            true
        }
        None => false,
    }
}
