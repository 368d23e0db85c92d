//! The sweep-line implementation.
//!
//! A horizontal line moves from top to bottom across the plane, stopping at
//! every segment endpoint and every intersection point it discovers along
//! the way. The [`SweepStatus`] holds the segments that cross the line, in
//! order from left to right, and the [`EventQueue`] holds the points where
//! the line still has to stop. The [`Sector`] drives the whole thing and
//! reports an [`Intersection`] at every stop where more than one segment is
//! involved.

mod event_queue;
mod sector;
mod status;

pub use event_queue::{EventCompare, EventQueue, PointEvent};
pub use sector::Sector;
pub use status::{SweepCompare, SweepStatus};

use crate::{geom::Point, segments::SegIdx};

/// A point where two or more segments meet.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Intersection {
    /// Where they meet.
    pub point: Point,
    /// The segments that meet there.
    ///
    /// These are listed in the order the sweep line found them: the segments
    /// that were already crossing the sweep line from left to right, followed
    /// by the segments that start here.
    pub lines: Vec<SegIdx>,
}
