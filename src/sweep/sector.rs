//! The sweep driver, which visits events in order and reports intersections.

use arrayvec::ArrayVec;
use tracing::{debug, trace};

use crate::{
    geom::{horiz, intersect_seg_seg, sweep_less, Intersect, Point},
    num::CheapOrderedFloat,
    rbtree::Pos,
    segments::{SegIdx, Segments},
};

use super::{EventQueue, Intersection, PointEvent, SweepStatus};

/// Runs a sweep over a collection of segments, yielding their intersections.
///
/// The intersections come out in sweep order: from top to bottom, and from
/// left to right within a horizontal line.
///
/// ```
/// use segsweep::{sweep::Sector, Point, Segment, Segments};
///
/// let segments: Segments = vec![
///     Segment::new((1.0, 2.0), (-1.0, -2.0)),
///     Segment::new((-1.0, 2.0), (1.0, -2.0)),
/// ]
/// .into();
/// let segments = segments.normalized(1e-10);
/// let mut sector = Sector::new(&segments, 1e-10);
/// let crossing = sector.next().unwrap();
/// assert_eq!(crossing.point, Point::new(0.0, 0.0));
/// assert_eq!(crossing.lines.len(), 2);
/// assert!(sector.next().is_none());
/// sector.finish();
/// ```
#[derive(Debug)]
pub struct Sector<'a> {
    segments: &'a Segments,
    eps: f64,
    queue: EventQueue,
    status: SweepStatus<'a>,
    events: usize,
    reported: usize,
}

impl<'a> Sector<'a> {
    /// Prepares a sweep over `segments`.
    ///
    /// # Panics
    ///
    /// Panics unless the segments are [normalized](Segments::normalized)
    /// with the same `eps`, so that each one starts at the endpoint the sweep
    /// line reaches first.
    pub fn new(segments: &'a Segments, eps: f64) -> Self {
        let mut queue = EventQueue::new(eps);
        for idx in segments.indices() {
            let seg = &segments[idx];
            assert!(
                !sweep_less(&seg.v1, &seg.v0, eps),
                "segment {idx:?} isn't normalized: {seg:?}"
            );
            queue.push_upper(seg.v0, idx);
        }

        Sector {
            segments,
            eps,
            queue,
            status: SweepStatus::new(segments, eps),
            events: 0,
            reported: 0,
        }
    }

    /// The segments that cross the sweep line at its current position.
    pub fn status(&self) -> &SweepStatus<'a> {
        &self.status
    }

    /// The events that haven't been processed yet.
    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    /// Runs the sweep to completion, returning all the intersections.
    pub fn run(mut self) -> Vec<Intersection> {
        let ret: Vec<_> = self.by_ref().collect();
        self.finish();
        ret
    }

    /// Checks that the sweep ended cleanly.
    ///
    /// # Panics
    ///
    /// Panics if there are events left, or if the sweep line is still
    /// crossing some segments after the last event. The latter means that
    /// some segment's lower endpoint was lost, which is a bug.
    pub fn finish(self) {
        assert!(
            self.queue.is_empty(),
            "finished a sweep with {} events left",
            self.queue.len()
        );
        assert!(
            self.status.is_empty(),
            "sweep ended with segments {:?} still active",
            self.status.iter().collect::<Vec<_>>()
        );
        debug!(
            events = self.events,
            intersections = self.reported,
            segments = self.segments.len(),
            "sweep finished"
        );
    }

    fn process(&mut self, event: PointEvent) -> Option<Intersection> {
        let PointEvent {
            point,
            lower_end,
            upper_end,
            crossing: known,
        } = event;
        self.events += 1;
        self.status.sweep(point);

        let mut members = lower_end.clone();
        members.extend(known.iter().filter_map(|&seg| self.status.position(seg)));
        let span = self.status.span_covering(point.x, &members);
        let crossing = span.len().saturating_sub(lower_end.len());
        trace!(
            ?point,
            span = span.len(),
            lower = lower_end.len(),
            upper = upper_end.len(),
            "processing event"
        );

        let ret = if crossing + lower_end.len() + upper_end.len() > 1 {
            let mut lines: Vec<SegIdx> = span.iter().map(|&pos| self.status.get(pos)).collect();
            lines.extend_from_slice(&upper_end);
            debug!(?point, ?lines, "intersection");
            self.reported += 1;
            Some(Intersection { point, lines })
        } else {
            None
        };

        // The last segment to the left of the event, if any.
        let left = match span.first() {
            Some(&first) => self.status.prev(first),
            None => match self.status.lower_bound_x(point.x) {
                Some(pos) => self.status.prev(pos),
                None => self.status.last(),
            },
        };

        for &pos in &lower_end {
            self.status.erase(pos);
        }

        let mut inserted = None;
        if crossing + upper_end.len() != 0 {
            let mut reinsert = self.remove_crossing(&span, &lower_end);
            // Segments that cross here swap their order.
            reinsert.reverse();
            reinsert.extend_from_slice(&upper_end);
            reinsert.sort_by_key(|&seg| self.angle_key(seg, point));

            let mut at = left;
            for seg in reinsert {
                let s = self.segments[seg];
                if s.is_degenerate(self.eps) {
                    continue;
                }
                let pos = self.status.insert_after(at, seg);
                self.queue.push_lower(s.v1, pos);
                inserted = Some(match inserted {
                    Some((first, _)) => (first, pos),
                    None => (pos, pos),
                });
                at = Some(pos);
            }
        }

        let mut neighbors = ArrayVec::<(Pos, Pos), 2>::new();
        match inserted {
            Some((first, last)) => {
                if let Some(prev) = self.status.prev(first) {
                    neighbors.push((prev, first));
                }
                if let Some(next) = self.status.next(last) {
                    neighbors.push((last, next));
                }
            }
            None => {
                if let Some(left) = left {
                    if let Some(right) = self.status.next(left) {
                        neighbors.push((left, right));
                    }
                }
            }
        }
        for (a, b) in neighbors {
            let (a, b) = (self.status.get(a), self.status.get(b));
            self.find_new_event(a, b, point);
        }

        #[cfg(feature = "slow-asserts")]
        {
            self.status.check_invariants();
            self.queue.check_invariants();
        }

        ret
    }

    // Takes the segments in `span` that don't end at the event out of the
    // status, from left to right.
    fn remove_crossing(&mut self, span: &[Pos], lower_end: &[Pos]) -> Vec<SegIdx> {
        let mut ret = Vec::new();
        for &p in span {
            if lower_end.contains(&p) {
                continue;
            }
            let seg = self.status.erase(p);
            self.queue.remove_lower(self.segments[seg].v1, p);
            ret.push(seg);
        }
        ret
    }

    // Orders segments leaving `point` from left to right, just below the
    // sweep line. That's the clockwise angle from straight down, with
    // horizontal segments last.
    fn angle_key(&self, seg: SegIdx, point: Point) -> CheapOrderedFloat {
        let s = &self.segments[seg];
        if horiz(s, self.eps) {
            return f64::INFINITY.into();
        }
        let d = s.v1 - point;
        d.x.atan2(-d.y).into()
    }

    fn find_new_event(&mut self, a: SegIdx, b: SegIdx, event: Point) {
        // The same pair meets at the same point, to the last bit, whichever
        // side it's on.
        let pair = if a < b { [a, b] } else { [b, a] };
        let [a, b] = pair;
        match intersect_seg_seg(&self.segments[a], &self.segments[b], self.eps) {
            Intersect::None => {}
            Intersect::Point(p) => self.push_if_ahead(event, p, pair),
            Intersect::Overlap(p, q) => {
                self.push_if_ahead(event, p, pair);
                self.push_if_ahead(event, q, pair);
            }
        }
    }

    fn push_if_ahead(&mut self, event: Point, p: Point, pair: [SegIdx; 2]) {
        if self.queue.preceds(&event, &p) {
            trace!(?p, ?pair, "new event");
            self.queue.push_crossing(p, pair);
        }
    }
}

impl Iterator for Sector<'_> {
    type Item = Intersection;

    fn next(&mut self) -> Option<Intersection> {
        while let Some(event) = self.queue.pop() {
            if let Some(ret) = self.process(event) {
                return Some(ret);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Segment;

    fn sweep(segs: &[Segment]) -> Vec<Intersection> {
        let segs = Segments::from(segs.to_vec()).normalized(1e-10);
        Sector::new(&segs, 1e-10).run()
    }

    #[test]
    fn empty() {
        assert!(sweep(&[]).is_empty());
    }

    #[test]
    fn single_segment() {
        assert!(sweep(&[Segment::new((0.0, 0.0), (1.0, 1.0))]).is_empty());
    }

    #[test]
    fn shared_endpoint() {
        let out = sweep(&[
            Segment::new((0.0, 1.0), (0.0, 0.0)),
            Segment::new((0.0, 1.0), (1.0, 0.0)),
        ]);
        assert_eq!(
            out,
            vec![Intersection {
                point: Point::new(0.0, 1.0),
                lines: vec![SegIdx(0), SegIdx(1)],
            }]
        );
    }

    #[test]
    fn degenerate_segment_on_another() {
        let out = sweep(&[
            Segment::new((0.0, 2.0), (0.0, 0.0)),
            Segment::new((0.0, 1.0), (0.0, 1.0)),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].point, Point::new(0.0, 1.0));
        assert_eq!(out[0].lines, vec![SegIdx(0), SegIdx(1)]);
    }

    #[test]
    fn horizontal_crossing() {
        let out = sweep(&[
            Segment::new((0.0, 1.0), (3.0, 1.0)),
            Segment::new((1.0, 0.0), (1.0, 3.0)),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].point, Point::new(1.0, 1.0));
        let mut lines = out[0].lines.clone();
        lines.sort();
        assert_eq!(lines, vec![SegIdx(0), SegIdx(1)]);
    }

    #[test]
    fn three_through_one_point() {
        let out = sweep(&[
            Segment::new((-1.0, 1.0), (1.0, -1.0)),
            Segment::new((0.0, 1.0), (0.0, -1.0)),
            Segment::new((1.0, 1.0), (-1.0, -1.0)),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].point, Point::new(0.0, 0.0));
        assert_eq!(out[0].lines.len(), 3);
    }

    #[test]
    #[should_panic(expected = "isn't normalized")]
    fn rejects_unnormalized_segments() {
        let segs: Segments = vec![Segment::new((0.0, 0.0), (1.0, 1.0))].into();
        Sector::new(&segs, 1e-10);
    }

    #[test]
    fn status_stays_ordered_far_from_origin() {
        // An ulp is bigger than `eps` out here.
        let segs: Segments = vec![
            Segment::new((0.0, 0.0), (0.0, 1692540.83)),
            Segment::new((0.0, 7255333.94), (0.0, 0.0)),
            Segment::new((4815329.62, 0.0), (-4003428.71, 3127599.93)),
        ]
        .into();
        let segs = segs.normalized(1e-10);
        let mut sector = Sector::new(&segs, 1e-10);
        let mut out = Vec::new();
        while let Some(int) = sector.next() {
            sector.status().check_invariants();
            let mut lines = int.lines.clone();
            lines.sort();
            out.push((int.point, lines));
        }
        sector.finish();

        assert_eq!(out.len(), 3, "{out:?}");
        assert!(out[0].0.x.abs() < 1e-6);
        assert!((out[0].0.y - 1707771.55).abs() < 1e-2);
        assert_eq!(out[0].1, vec![SegIdx(1), SegIdx(2)]);
        assert_eq!(out[1].0, Point::new(0.0, 1692540.83));
        assert_eq!(out[1].1, vec![SegIdx(0), SegIdx(1)]);
        assert_eq!(out[2].0, Point::new(0.0, 0.0));
        assert_eq!(out[2].1, vec![SegIdx(0), SegIdx(1)]);
    }

    #[test]
    fn step_by_step() {
        let segs: Segments = vec![
            Segment::new((1.0, 2.0), (-1.0, -2.0)),
            Segment::new((-1.0, 2.0), (1.0, -2.0)),
        ]
        .into();
        let segs = segs.normalized(1e-10);
        let mut sector = Sector::new(&segs, 1e-10);
        assert_eq!(sector.queue().len(), 2);
        assert!(sector.next().is_some());
        // Both segments are still active, and they've swapped places.
        assert_eq!(
            sector.status().iter().collect::<Vec<_>>(),
            vec![SegIdx(0), SegIdx(1)]
        );
        assert!(sector.next().is_none());
        sector.finish();
    }
}
