#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

#[macro_use]
mod typed_vec;

#[cfg(any(test, feature = "arbitrary"))]
pub mod arbitrary;
#[cfg(feature = "debug-svg")]
pub mod debug_svg;
mod geom;
mod num;
pub mod rbtree;
mod segments;
pub mod set;
pub mod sweep;

#[cfg(feature = "generators")]
pub mod generators;

pub use geom::{
    horiz, intersect_seg_line, intersect_seg_seg, intersects_line_y, orientation,
    orientation_exact, Intersect, Orientation, Point, Segment,
};
pub use num::{cmp_eps, eq_eps, DEFAULT_EPS};
pub use segments::{SegIdx, Segments};
pub use sweep::{Intersection, Sector};

#[derive(Clone, Copy, Debug, PartialEq)]
/// The input was faulty.
pub enum Error {
    /// At least one of the inputs was infinite.
    Infinity,
    /// At least one of the inputs was not a number.
    NaN,
    /// The tolerance was negative, infinite or not a number.
    BadEpsilon(f64),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Infinity => write!(f, "one of the inputs was infinite"),
            Error::NaN => write!(f, "one of the inputs had a NaN"),
            Error::BadEpsilon(eps) => write!(f, "{eps} is not a usable tolerance"),
        }
    }
}

impl std::error::Error for Error {}

fn check_coordinates(segments: &[Segment]) -> Result<(), Error> {
    for seg in segments {
        for c in [seg.v0.x, seg.v0.y, seg.v1.x, seg.v1.y] {
            if c.is_nan() {
                return Err(Error::NaN);
            }
            if c.is_infinite() {
                return Err(Error::Infinity);
            }
        }
    }
    Ok(())
}

/// Finds all the points where two or more of `segments` meet.
///
/// Each [`Intersection`] lists the indices (into `segments`) of the segments
/// that pass through its point. Points closer than [`DEFAULT_EPS`] are
/// merged. Segments that overlap along a stretch are reported at the ends of
/// the overlap (and possibly at other endpoints within it), not as a single
/// overlap.
///
/// ```
/// use segsweep::{section_lines, Point, SegIdx, Segment};
///
/// let segments = [
///     Segment::new((1.0, 2.0), (-1.0, -2.0)),
///     Segment::new((-1.0, 2.0), (1.0, -2.0)),
/// ];
/// let out = section_lines(&segments).unwrap();
/// assert_eq!(out.len(), 1);
/// assert_eq!(out[0].point, Point::new(0.0, 0.0));
/// assert_eq!(out[0].lines, vec![SegIdx(1), SegIdx(0)]);
/// ```
pub fn section_lines(segments: &[Segment]) -> Result<Vec<Intersection>, Error> {
    section_lines_with_eps(segments, DEFAULT_EPS)
}

/// Like [`section_lines`], but with a custom tolerance.
pub fn section_lines_with_eps(segments: &[Segment], eps: f64) -> Result<Vec<Intersection>, Error> {
    if !num::valid_eps(eps) {
        return Err(Error::BadEpsilon(eps));
    }
    check_coordinates(segments)?;

    let segments = Segments::from(segments.to_vec()).normalized(eps);
    Ok(Sector::new(&segments, eps).run())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn bad_inputs() {
        let good = Segment::new((0.0, 0.0), (1.0, 1.0));
        let nan = Segment::new((0.0, f64::NAN), (1.0, 1.0));
        let inf = Segment::new((0.0, 0.0), (f64::INFINITY, 1.0));
        assert_matches!(section_lines(&[good, nan]), Err(Error::NaN));
        assert_matches!(section_lines(&[inf, good]), Err(Error::Infinity));
        assert_matches!(
            section_lines_with_eps(&[good], -1.0),
            Err(Error::BadEpsilon(_))
        );
        assert_matches!(
            section_lines_with_eps(&[good], f64::NAN),
            Err(Error::BadEpsilon(_))
        );
        assert_eq!(section_lines_with_eps(&[good], 0.0), Ok(vec![]));
    }

    #[test]
    fn error_messages() {
        assert_eq!(Error::NaN.to_string(), "one of the inputs had a NaN");
        assert_eq!(
            Error::BadEpsilon(-1.0).to_string(),
            "-1 is not a usable tolerance"
        );
    }

    #[test]
    fn custom_eps_merges_points() {
        // The two crossings are 1e-3 apart. With a coarse tolerance they're
        // the same point.
        let segments = [
            Segment::new((-1.0, 1.0), (1.0, -1.0)),
            Segment::new((-1.0, -1.0), (1.0, 1.0)),
            Segment::new((-1.0, 1e-3), (1.0, 1e-3)),
        ];
        assert_eq!(section_lines(&segments).unwrap().len(), 3);
        let coarse = section_lines_with_eps(&segments, 1e-2).unwrap();
        assert_eq!(coarse.len(), 1);
        assert_eq!(coarse[0].lines.len(), 3);
    }
}
