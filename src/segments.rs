use kurbo::{BezPath, PathEl};

use crate::geom::{Point, Segment};

/// An index into our segment arena.
///
/// Throughout this library, we assign identities to segments, so that we may
/// consider segments as different even if they have the same start- and end-points.
///
/// This index is used to identify a segment, whose data can be retrieved by looking
/// it up in [`Segments`]. (Of course, this index-as-identifier breaks down if there are
/// multiple `Segments` in flight. Just be careful not to mix them up.)
#[derive(
    Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SegIdx(pub usize);

impl std::fmt::Debug for SegIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s_{}", self.0)
    }
}

/// An arena of line segments.
///
/// Segments are indexed by [`SegIdx`] and can be retrieved by indexing (i.e. with square brackets).
/// The index of a segment is the order in which it was added.
#[derive(Debug, Clone, Default)]
pub struct Segments {
    segs: Vec<Segment>,
}

impl Segments {
    /// The number of line segments in this arena.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.segs.len()
    }

    /// Iterate over all indices that can be used to index into this arena.
    pub fn indices(&self) -> impl Iterator<Item = SegIdx> {
        (0..self.segs.len()).map(SegIdx)
    }

    /// Iterate over all segments in this arena.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segs.iter()
    }

    /// Add a segment, returning its index.
    pub fn push(&mut self, seg: Segment) -> SegIdx {
        self.segs.push(seg);
        SegIdx(self.segs.len() - 1)
    }

    /// Add a (non-closed) polyline to this arena.
    pub fn add_points<P: Into<Point>>(&mut self, ps: impl IntoIterator<Item = P>) {
        let ps: Vec<Point> = ps.into_iter().map(|p| p.into()).collect();
        for pair in ps.windows(2) {
            self.push(Segment::new(pair[0], pair[1]));
        }
    }

    /// Add the straight parts of a path to this arena.
    ///
    /// Curved path elements are skipped, but a `ClosePath` adds the closing
    /// line back to the start of its subpath.
    pub fn add_bez_path(&mut self, path: &BezPath) {
        let mut start = None;
        let mut current = None;
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => {
                    start = Some(Point::from(p));
                    current = start;
                }
                PathEl::LineTo(p) => {
                    let p = Point::from(p);
                    if let Some(c) = current {
                        self.push(Segment::new(c, p));
                    }
                    current = Some(p);
                }
                PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => {
                    current = Some(Point::from(p));
                }
                PathEl::ClosePath => {
                    if let (Some(c), Some(s)) = (current, start) {
                        if c != s {
                            self.push(Segment::new(c, s));
                        }
                    }
                    current = start;
                }
            }
        }
    }

    /// Construct a segment arena from the straight parts of a path.
    pub fn from_bez_path(path: &BezPath) -> Self {
        let mut ret = Self::default();
        ret.add_bez_path(path);
        ret
    }

    /// A copy of this arena with every segment in sweep order.
    ///
    /// Indices are preserved.
    pub fn normalized(&self, eps: f64) -> Segments {
        self.segs.iter().map(|s| s.normalized(eps)).collect()
    }

    /// All the segments, as a slice.
    pub fn as_slice(&self) -> &[Segment] {
        &self.segs
    }
}

impl FromIterator<Segment> for Segments {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Segments {
            segs: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Segment>> for Segments {
    fn from(segs: Vec<Segment>) -> Self {
        Segments { segs }
    }
}

impl std::ops::Index<SegIdx> for Segments {
    type Output = Segment;

    fn index(&self, index: SegIdx) -> &Self::Output {
        &self.segs[index.0]
    }
}
