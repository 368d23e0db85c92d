//! Geometric primitives, like points and segments, and the predicates the
//! sweep is built on.
//!
//! Everything here takes an explicit tolerance `eps`. Coordinates that are
//! within `eps` of one another are considered equal, and a point within `eps`
//! of a segment is considered to be on it.

use std::ops::{Add, Mul, Sub};

use crate::num::eq_eps;

/// A two-dimensional point.
///
/// The sweep runs from top to bottom, so larger `y` values are considered
/// to be *up*. Points are also used as vectors, for differences of points.
#[derive(Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    /// Horizontal coordinate, increasing to the right.
    pub x: f64,
    /// Vertical coordinate, increasing upwards.
    pub y: f64,
}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        debug_assert!(!x.is_nan());
        debug_assert!(!y.is_nan());
        Point { x, y }
    }

    /// Compute an affine combination between `self` and `other`; that is, `(1 - t) * self + t * other`.
    pub fn affine(&self, other: &Self, t: f64) -> Self {
        Point {
            x: (1.0 - t) * self.x + t * other.x,
            y: (1.0 - t) * self.y + t * other.y,
        }
    }

    /// The cross product of `self` and `other`, thought of as vectors.
    ///
    /// This is positive if `other` is counter-clockwise from `self`.
    pub fn cross(&self, other: &Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// The dot product of `self` and `other`, thought of as vectors.
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// The Euclidean length of `self`, thought of as a vector.
    pub fn hypot(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Is this point within `eps` of `other`, in both coordinates?
    pub fn close_to(&self, other: &Self, eps: f64) -> bool {
        eq_eps(self.x, other.x, eps) && eq_eps(self.y, other.y, eps)
    }

    /// Are both coordinates finite?
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Convert to a `kurbo` point.
    pub fn to_kurbo(self) -> kurbo::Point {
        kurbo::Point::new(self.x, self.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<kurbo::Point> for Point {
    fn from(p: kurbo::Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// A line segment between two points.
///
/// The endpoints can come in either order. The sweep works on a normalized
/// copy (see [`Segment::normalized`]) whose first endpoint is the one that
/// the sweep line reaches first.
#[derive(Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    /// One endpoint.
    pub v0: Point,
    /// The other endpoint.
    pub v1: Point,
}

impl std::fmt::Debug for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} -- {:?}", self.v0, self.v1)
    }
}

impl Segment {
    /// Create a new segment.
    pub fn new(v0: impl Into<Point>, v1: impl Into<Point>) -> Self {
        Segment {
            v0: v0.into(),
            v1: v1.into(),
        }
    }

    /// The vector from `v0` to `v1`.
    pub fn direction(&self) -> Point {
        self.v1 - self.v0
    }

    /// Returns this segment with its endpoints in sweep order.
    ///
    /// The sweep line moves downwards, and from left to right within a
    /// horizontal line. The normalized segment's `v0` is its *upper* endpoint
    /// (or its left endpoint, if the segment is horizontal within `eps`).
    pub fn normalized(&self, eps: f64) -> Segment {
        if sweep_less(&self.v1, &self.v0, eps) {
            Segment {
                v0: self.v1,
                v1: self.v0,
            }
        } else {
            *self
        }
    }

    /// Are the two endpoints within `eps` of one another?
    pub fn is_degenerate(&self, eps: f64) -> bool {
        self.v0.close_to(&self.v1, eps)
    }

    /// The smallest `x` coordinate of the two endpoints.
    pub fn min_x(&self) -> f64 {
        self.v0.x.min(self.v1.x)
    }

    /// The largest `x` coordinate of the two endpoints.
    pub fn max_x(&self) -> f64 {
        self.v0.x.max(self.v1.x)
    }

    /// The smallest `y` coordinate of the two endpoints.
    pub fn min_y(&self) -> f64 {
        self.v0.y.min(self.v1.y)
    }

    /// The largest `y` coordinate of the two endpoints.
    pub fn max_y(&self) -> f64 {
        self.v0.y.max(self.v1.y)
    }

    /// Our `x` coordinate at height `y`.
    ///
    /// Heights outside the segment are clamped to its endpoints. Horizontal
    /// segments don't have a well-defined answer, and return the `x`
    /// coordinate of `v0`.
    pub fn x_at_y(&self, y: f64) -> f64 {
        let dy = self.v1.y - self.v0.y;
        if dy == 0.0 {
            return self.v0.x;
        }
        let t = ((y - self.v0.y) / dy).clamp(0.0, 1.0);
        self.v0.x + t * (self.v1.x - self.v0.x)
    }

    /// Convert to a `kurbo` line.
    pub fn to_kurbo(&self) -> kurbo::Line {
        kurbo::Line::new(self.v0.to_kurbo(), self.v1.to_kurbo())
    }
}

impl From<kurbo::Line> for Segment {
    fn from(line: kurbo::Line) -> Self {
        Segment::new(line.p0, line.p1)
    }
}

/// The order in which the sweep line visits points: from top to bottom, and
/// from left to right within a horizontal line.
///
/// Coordinates within `eps` of one another are treated as equal, so this
/// returns false for points that are within `eps` in both coordinates.
pub(crate) fn sweep_less(a: &Point, b: &Point, eps: f64) -> bool {
    if (a.y - b.y).abs() > eps {
        a.y > b.y
    } else if (a.x - b.x).abs() > eps {
        a.x < b.x
    } else {
        false
    }
}

/// Is `seg` horizontal, in the sense that its endpoints' heights are within `eps`?
pub fn horiz(seg: &Segment, eps: f64) -> bool {
    (seg.v0.y - seg.v1.y).abs() <= eps
}

/// The result of intersecting a segment with something else.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Intersect {
    /// They don't meet.
    None,
    /// They meet at a single point.
    Point(Point),
    /// They overlap along a segment, with these endpoints.
    Overlap(Point, Point),
}

/// The orientation of a triple of points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// The points turn to the right.
    Clockwise,
    /// The points turn to the left.
    CounterClockwise,
    /// The points are (nearly) on a line.
    Collinear,
}

/// Which way do the points `a`, `b`, `c` turn?
///
/// The points are considered collinear if `c` is within `eps` of the line
/// through `a` and `b` (or if `a` and `b` are within `eps` of each other).
pub fn orientation(a: Point, b: Point, c: Point, eps: f64) -> Orientation {
    let ab = b - a;
    let cross = ab.cross(&(c - a));
    let len = ab.hypot();
    if len <= eps || cross.abs() <= eps * len {
        Orientation::Collinear
    } else if cross > 0.0 {
        Orientation::CounterClockwise
    } else {
        Orientation::Clockwise
    }
}

/// Which way do the points `a`, `b`, `c` turn, computed exactly?
///
/// This uses an adaptive-precision predicate, so the answer is correct even
/// for nearly collinear points. The sweep itself doesn't use it.
pub fn orientation_exact(a: Point, b: Point, c: Point) -> Orientation {
    let coord = |p: Point| robust::Coord { x: p.x, y: p.y };
    let det = robust::orient2d(coord(a), coord(b), coord(c));
    if det > 0.0 {
        Orientation::CounterClockwise
    } else if det < 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

// The distance from `p` to the closed segment `seg`.
fn distance_to_segment(p: Point, seg: &Segment) -> f64 {
    let d = seg.direction();
    let len2 = d.dot(&d);
    if len2 == 0.0 {
        return (p - seg.v0).hypot();
    }
    let t = ((p - seg.v0).dot(&d) / len2).clamp(0.0, 1.0);
    (p - seg.v0.affine(&seg.v1, t)).hypot()
}

/// Intersects two segments.
///
/// If the segments are collinear (within `eps`) and overlap, returns the
/// endpoints of the overlap; an overlap shorter than `eps` is reported as a
/// single point. Intersection points that are within `eps` of an endpoint
/// are snapped to that endpoint.
pub fn intersect_seg_seg(a: &Segment, b: &Segment, eps: f64) -> Intersect {
    let p = a.v0;
    let q = b.v0;
    let r = a.direction();
    let s = b.direction();
    let r_len = r.hypot();
    let s_len = s.hypot();

    if r_len <= eps || s_len <= eps {
        // At least one of the segments is (nearly) a point.
        let (point, other) = if r_len <= eps { (p, b) } else { (q, a) };
        return if distance_to_segment(point, other) <= eps {
            Intersect::Point(point)
        } else {
            Intersect::None
        };
    }

    let qp = q - p;
    let denom = r.cross(&s);
    if denom.abs() <= eps * r_len * s_len {
        // Parallel. They only meet if they're on the same line.
        if qp.cross(&r).abs() > eps * r_len {
            return Intersect::None;
        }
        let rr = r.dot(&r);
        let t0 = qp.dot(&r) / rr;
        let t1 = t0 + s.dot(&r) / rr;
        let lo = t0.min(t1).max(0.0);
        let hi = t0.max(t1).min(1.0);
        let tol = eps / r_len;
        return if lo > hi + tol {
            Intersect::None
        } else if hi - lo <= tol {
            Intersect::Point(p.affine(&a.v1, lo.min(1.0)))
        } else {
            Intersect::Overlap(p.affine(&a.v1, lo), p.affine(&a.v1, hi))
        };
    }

    let t = qp.cross(&s) / denom;
    let u = qp.cross(&r) / denom;
    let t_tol = eps / r_len;
    let u_tol = eps / s_len;
    if t < -t_tol || t > 1.0 + t_tol || u < -u_tol || u > 1.0 + u_tol {
        return Intersect::None;
    }

    let point = if u <= u_tol {
        b.v0
    } else if u >= 1.0 - u_tol {
        b.v1
    } else if t <= t_tol {
        a.v0
    } else if t >= 1.0 - t_tol {
        a.v1
    } else {
        p + r * t
    };
    Intersect::Point(point)
}

/// Intersects a segment with the infinite line through `line.v0` and `line.v1`.
///
/// If the segment lies on the line (within `eps`), the whole segment is
/// returned as an overlap.
pub fn intersect_seg_line(seg: &Segment, line: &Segment, eps: f64) -> Intersect {
    let dir = line.direction();
    let len = dir.hypot();
    if len <= eps {
        return Intersect::None;
    }

    // Signed distances of the segment's endpoints from the line.
    let d0 = dir.cross(&(seg.v0 - line.v0)) / len;
    let d1 = dir.cross(&(seg.v1 - line.v0)) / len;

    match (d0.abs() <= eps, d1.abs() <= eps) {
        (true, true) => Intersect::Overlap(seg.v0, seg.v1),
        (true, false) => Intersect::Point(seg.v0),
        (false, true) => Intersect::Point(seg.v1),
        (false, false) => {
            if d0.signum() == d1.signum() {
                Intersect::None
            } else {
                let t = d0 / (d0 - d1);
                Intersect::Point(seg.v0.affine(&seg.v1, t))
            }
        }
    }
}

/// Intersects a segment with the horizontal line at height `y`.
pub fn intersects_line_y(seg: &Segment, y: f64, eps: f64) -> Intersect {
    if horiz(seg, eps) {
        if (seg.v0.y - y).abs() <= eps {
            Intersect::Overlap(seg.v0, seg.v1)
        } else {
            Intersect::None
        }
    } else if y < seg.min_y() - eps || y > seg.max_y() + eps {
        Intersect::None
    } else {
        Intersect::Point(Point::new(seg.x_at_y(y), y))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::num::tests::Reasonable;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    impl Reasonable for Point {
        type Strategy = BoxedStrategy<Point>;

        fn reasonable() -> Self::Strategy {
            (f64::reasonable(), f64::reasonable())
                .prop_map(|(x, y)| Point::new(x, y))
                .boxed()
        }
    }

    impl Reasonable for Segment {
        type Strategy = BoxedStrategy<Segment>;

        fn reasonable() -> Self::Strategy {
            (Point::reasonable(), Point::reasonable())
                .prop_map(|(v0, v1)| Segment { v0, v1 })
                .boxed()
        }
    }

    const EPS: f64 = 1e-10;

    fn seg(x0: f64, y0: f64, x1: f64, y1: f64) -> Segment {
        Segment::new((x0, y0), (x1, y1))
    }

    #[test]
    fn crossing() {
        let a = seg(1.0, 2.0, -1.0, -2.0);
        let b = seg(-1.0, 2.0, 1.0, -2.0);
        assert_eq!(
            intersect_seg_seg(&a, &b, EPS),
            Intersect::Point(Point::new(0.0, 0.0))
        );
    }

    #[test]
    fn touching_endpoints_snap() {
        let a = seg(-2.0, 0.0, 0.0, 0.0);
        let b = seg(0.0, 0.0, 1.0, 1.0);
        assert_eq!(
            intersect_seg_seg(&a, &b, EPS),
            Intersect::Point(Point::new(0.0, 0.0))
        );

        // A T-junction: b ends in the middle of a.
        let a = seg(-1.0, 0.0, 1.0, 0.0);
        let b = seg(0.5, 1.0, 0.5, 0.0);
        assert_eq!(
            intersect_seg_seg(&a, &b, EPS),
            Intersect::Point(Point::new(0.5, 0.0))
        );
    }

    #[test]
    fn disjoint() {
        assert_eq!(
            intersect_seg_seg(&seg(0.0, 0.0, 0.0, 1.0), &seg(-1.0, 0.0, -1.0, 1.0), EPS),
            Intersect::None
        );
        assert_eq!(
            intersect_seg_seg(&seg(0.0, 0.0, 1.0, 1.0), &seg(0.0, 3.0, 3.0, 2.0), EPS),
            Intersect::None
        );
    }

    #[test]
    fn collinear() {
        // Touching at a single point.
        assert_eq!(
            intersect_seg_seg(&seg(-2.0, 0.0, 0.0, 0.0), &seg(2.0, 0.0, 0.0, 0.0), EPS),
            Intersect::Point(Point::new(0.0, 0.0))
        );
        // Properly overlapping.
        assert_eq!(
            intersect_seg_seg(&seg(0.0, 0.0, 2.0, 2.0), &seg(3.0, 3.0, 1.0, 1.0), EPS),
            Intersect::Overlap(Point::new(1.0, 1.0), Point::new(2.0, 2.0))
        );
        // On the same line, but apart.
        assert_eq!(
            intersect_seg_seg(&seg(0.0, 0.0, 1.0, 0.0), &seg(2.0, 0.0, 3.0, 0.0), EPS),
            Intersect::None
        );
    }

    #[test]
    fn degenerate_segments() {
        let dot = seg(0.5, 0.5, 0.5, 0.5);
        assert_eq!(
            intersect_seg_seg(&dot, &seg(0.0, 0.0, 1.0, 1.0), EPS),
            Intersect::Point(Point::new(0.5, 0.5))
        );
        assert_eq!(
            intersect_seg_seg(&seg(0.0, 1.0, 1.0, 0.0), &dot, EPS),
            Intersect::Point(Point::new(0.5, 0.5))
        );
        assert_eq!(
            intersect_seg_seg(&dot, &seg(0.0, 1.0, 1.0, 1.0), EPS),
            Intersect::None
        );
    }

    #[test]
    fn seg_line() {
        let line = seg(0.0, 0.0, 1.0, 0.0);
        assert_eq!(
            intersect_seg_line(&seg(5.0, 1.0, 5.0, -1.0), &line, EPS),
            Intersect::Point(Point::new(5.0, 0.0))
        );
        assert_eq!(
            intersect_seg_line(&seg(5.0, 1.0, 5.0, 2.0), &line, EPS),
            Intersect::None
        );
        assert_eq!(
            intersect_seg_line(&seg(-3.0, 0.0, -2.0, 0.0), &line, EPS),
            Intersect::Overlap(Point::new(-3.0, 0.0), Point::new(-2.0, 0.0))
        );
        assert_eq!(
            intersect_seg_line(&seg(-3.0, 0.0, -2.0, 4.0), &line, EPS),
            Intersect::Point(Point::new(-3.0, 0.0))
        );
    }

    #[test]
    fn line_y() {
        let s = seg(0.0, 0.0, 2.0, 4.0);
        assert_eq!(
            intersects_line_y(&s, 2.0, EPS),
            Intersect::Point(Point::new(1.0, 2.0))
        );
        assert_eq!(intersects_line_y(&s, 5.0, EPS), Intersect::None);
        assert_matches!(
            intersects_line_y(&seg(0.0, 1.0, 3.0, 1.0), 1.0, EPS),
            Intersect::Overlap(..)
        );
        assert_eq!(
            intersects_line_y(&seg(0.0, 1.0, 3.0, 1.0), 0.0, EPS),
            Intersect::None
        );
    }

    #[test]
    fn normalization() {
        let s = seg(0.0, 0.0, 1.0, 1.0).normalized(EPS);
        assert_eq!(s.v0, Point::new(1.0, 1.0));

        let s = seg(3.0, 1.0, 0.0, 1.0).normalized(EPS);
        assert_eq!(s.v0, Point::new(0.0, 1.0));
        assert!(horiz(&s, EPS));

        // Nearly horizontal segments are normalized as horizontal ones.
        let s = seg(3.0, 1.0, 0.0, 1.0 + EPS / 2.0).normalized(EPS);
        assert_eq!(s.v0.x, 0.0);
    }

    #[test]
    fn orientations() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        assert_eq!(
            orientation(a, b, Point::new(0.5, 1.0), EPS),
            Orientation::CounterClockwise
        );
        assert_eq!(
            orientation(a, b, Point::new(0.5, -1.0), EPS),
            Orientation::Clockwise
        );
        assert_eq!(
            orientation(a, b, Point::new(7.0, 0.0), EPS),
            Orientation::Collinear
        );
        assert_eq!(
            orientation_exact(a, b, Point::new(0.5, 1e-300)),
            Orientation::CounterClockwise
        );
        assert_eq!(
            orientation_exact(a, b, Point::new(7.0, 0.0)),
            Orientation::Collinear
        );
    }

    #[test]
    fn x_at_y() {
        let s = seg(0.0, 4.0, 2.0, 0.0);
        assert_eq!(s.x_at_y(2.0), 1.0);
        assert_eq!(s.x_at_y(10.0), 0.0);
        assert_eq!(s.x_at_y(-10.0), 2.0);
    }

    proptest! {
        #[test]
        fn intersection_is_symmetric(a in Segment::reasonable(), b in Segment::reasonable()) {
            let ab = intersect_seg_seg(&a, &b, 1e-9);
            let ba = intersect_seg_seg(&b, &a, 1e-9);
            prop_assert_eq!(
                matches!(ab, Intersect::None),
                matches!(ba, Intersect::None)
            );
        }

        #[test]
        fn intersection_is_on_both(a in Segment::reasonable(), b in Segment::reasonable()) {
            if let Intersect::Point(p) = intersect_seg_seg(&a, &b, 1e-9) {
                prop_assert!(distance_to_segment(p, &a) <= 1e-6);
                prop_assert!(distance_to_segment(p, &b) <= 1e-6);
            }
        }

        #[test]
        fn exact_agrees_with_clear_cases(a in Point::reasonable(), b in Point::reasonable(), c in Point::reasonable()) {
            let approx = orientation(a, b, c, 1e-6);
            if approx != Orientation::Collinear {
                prop_assert_eq!(approx, orientation_exact(a, b, c));
            }
        }
    }
}
