//! The queue of points the sweep line still has to visit.

use crate::{
    geom::{sweep_less, Point},
    rbtree::{Compare, Plain, Pos},
    segments::SegIdx,
    set::Set,
};

/// Everything that happens at a single point of the sweep.
///
/// Segments that cross at this point without ending here are mostly found in
/// the sweep status when the event is processed. The ones whose intersection
/// created the event are also listed in `crossing`, because rounding can put
/// them further than `eps` (horizontally) from the point.
#[derive(Clone, Debug, PartialEq)]
pub struct PointEvent {
    /// Where this event happens.
    pub point: Point,
    /// Sweep status positions of the segments whose lower endpoint is here.
    pub lower_end: Vec<Pos>,
    /// The segments whose upper endpoint is here.
    pub upper_end: Vec<SegIdx>,
    /// Segments known to pass through this point, without ending here.
    pub crossing: Vec<SegIdx>,
}

impl PointEvent {
    /// An event at `point` with no segments attached.
    pub fn new(point: Point) -> Self {
        PointEvent {
            point,
            lower_end: Vec::new(),
            upper_end: Vec::new(),
            crossing: Vec::new(),
        }
    }
}

/// Orders events by their points, from top to bottom and then left to right.
///
/// Points within `eps` of one another (in both coordinates) are equivalent.
#[derive(Clone, Copy, Debug)]
pub struct EventCompare {
    eps: f64,
}

impl EventCompare {
    /// Does the sweep line reach `a` strictly before `b`?
    pub fn point_less(&self, a: &Point, b: &Point) -> bool {
        sweep_less(a, b, self.eps)
    }
}

impl Compare<PointEvent> for EventCompare {
    fn less(&self, a: &PointEvent, b: &PointEvent) -> bool {
        self.point_less(&a.point, &b.point)
    }
}

/// The events that the sweep line hasn't reached yet.
///
/// There's at most one event per point (up to `eps`); pushing a point that
/// is already present returns the existing event.
#[derive(Debug)]
pub struct EventQueue {
    set: Set<PointEvent, EventCompare, Plain>,
}

impl EventQueue {
    /// Creates an empty queue that merges points within `eps`.
    pub fn new(eps: f64) -> Self {
        EventQueue {
            set: Set::with_comparator(EventCompare { eps }),
        }
    }

    /// Returns the event at `point`, creating it if necessary.
    pub fn push(&mut self, point: Point) -> Pos {
        self.set.insert(PointEvent::new(point)).0
    }

    /// Records that `seg` starts at `point`.
    pub fn push_upper(&mut self, point: Point, seg: SegIdx) {
        let pos = self.push(point);
        self.set.get_mut(pos).upper_end.push(seg);
    }

    /// Records that the segment at status position `status_pos` ends at `point`.
    pub fn push_lower(&mut self, point: Point, status_pos: Pos) {
        let pos = self.push(point);
        self.set.get_mut(pos).lower_end.push(status_pos);
    }

    /// Records that the segments `segs` meet at `point`.
    pub fn push_crossing(&mut self, point: Point, segs: [SegIdx; 2]) {
        let pos = self.push(point);
        let crossing = &mut self.set.get_mut(pos).crossing;
        for seg in segs {
            if !crossing.contains(&seg) {
                crossing.push(seg);
            }
        }
    }

    /// Forgets that the segment at status position `status_pos` ends at `point`.
    ///
    /// # Panics
    ///
    /// Panics if there is no such event, or if it doesn't record that position.
    pub fn remove_lower(&mut self, point: Point, status_pos: Pos) {
        let Some(pos) = self.find(point) else {
            panic!("no event at {point:?}");
        };
        let lower = &mut self.set.get_mut(pos).lower_end;
        let Some(idx) = lower.iter().position(|&p| p == status_pos) else {
            panic!("event at {point:?} doesn't end {status_pos:?}");
        };
        lower.swap_remove(idx);
    }

    /// The next event.
    pub fn front(&self) -> Option<&PointEvent> {
        self.set.first().map(|pos| self.set.get(pos))
    }

    /// Removes and returns the next event.
    pub fn pop(&mut self) -> Option<PointEvent> {
        self.set.pop_first()
    }

    /// The position of the event at `point`, if there is one.
    pub fn find(&self, point: Point) -> Option<Pos> {
        self.set.find(&PointEvent::new(point))
    }

    /// The event at `pos`.
    pub fn get(&self, pos: Pos) -> &PointEvent {
        self.set.get(pos)
    }

    /// Mutable access to the event at `pos`.
    ///
    /// The event's point must not be changed.
    pub fn get_mut(&mut self, pos: Pos) -> &mut PointEvent {
        self.set.get_mut(pos)
    }

    /// Does `point` come strictly after `event_point` in sweep order?
    ///
    /// This is how the sweep decides whether a newly found intersection is
    /// still ahead of it.
    pub fn preceds(&self, event_point: &Point, point: &Point) -> bool {
        self.set.comparator().point_less(event_point, point)
    }

    /// The number of pending events.
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Are there no pending events?
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Iterates over the pending events, in sweep order.
    pub fn iter(&self) -> impl Iterator<Item = &PointEvent> + '_ {
        self.set.iter()
    }

    /// Checks the tree invariants and the event order.
    ///
    /// # Panics
    ///
    /// Panics if any of the invariants fail.
    pub fn check_invariants(&self) {
        self.set.check_invariants();
    }
}
