//! Utilities for fuzz and/or property testing using `arbitrary`.

use arbitrary::Unstructured;

use crate::{Point, Segment};

/// Generate an arbitrary float in some range.
pub fn float_in_range(
    start: f64,
    end: f64,
    u: &mut Unstructured<'_>,
) -> Result<f64, arbitrary::Error> {
    let num: u32 = u.arbitrary()?;
    let t = num as f64 / u32::MAX as f64;
    Ok((1.0 - t) * start + t * end)
}

/// Generate a float in some range, but give it a chance to be close to another float.
fn another_float_in_range(
    orig: f64,
    start: f64,
    end: f64,
    u: &mut Unstructured<'_>,
) -> Result<f64, arbitrary::Error> {
    let close: bool = u.arbitrary()?;
    if close {
        let ulps: i32 = u.int_in_range(-32..=32)?;
        let scale = 1.0f64 + ulps as f64 * f64::EPSILON;
        Ok((orig * scale).clamp(start, end))
    } else {
        float_in_range(start, end, u)
    }
}

fn point(size: f64, u: &mut Unstructured<'_>) -> Result<Point, arbitrary::Error> {
    Ok(Point::new(
        float_in_range(-size, size, u)?,
        float_in_range(-size, size, u)?,
    ))
}

fn another_point(orig: Point, size: f64, u: &mut Unstructured<'_>) -> Result<Point, arbitrary::Error> {
    Ok(Point::new(
        another_float_in_range(orig.x, -size, size, u)?,
        another_float_in_range(orig.y, -size, size, u)?,
    ))
}

/// Generate a point with integer coordinates in `[-size, size]`.
pub fn grid_point(size: i32, u: &mut Unstructured<'_>) -> Result<Point, arbitrary::Error> {
    Ok(Point::new(
        u.int_in_range(-size..=size)? as f64,
        u.int_in_range(-size..=size)? as f64,
    ))
}

/// Generate a collection of segments whose endpoints have integer coordinates
/// in `[-size, size]`.
///
/// Snapping to a coarse grid makes the awkward cases common: shared
/// endpoints, horizontal and vertical segments, collinear overlaps, and
/// several segments meeting at a point.
pub fn grid_segments(size: i32, u: &mut Unstructured<'_>) -> Result<Vec<Segment>, arbitrary::Error> {
    let count = u.int_in_range(0..=16)?;
    let mut ret: Vec<Segment> = Vec::with_capacity(count);
    for _ in 0..count {
        let start = if !ret.is_empty() && u.arbitrary()? {
            let other = u.choose(&ret)?;
            if u.arbitrary()? {
                other.v0
            } else {
                other.v1
            }
        } else {
            grid_point(size, u)?
        };
        let end = match u.int_in_range(0..=3)? {
            0 => Point::new(u.int_in_range(-size..=size)? as f64, start.y),
            1 => Point::new(start.x, u.int_in_range(-size..=size)? as f64),
            _ => grid_point(size, u)?,
        };
        ret.push(Segment::new(start, end));
    }
    Ok(ret)
}

/// Generate a collection of segments with coordinates in `[-size, size]`.
///
/// Each segment has a chance to start very close to (but probably not
/// exactly at) one of the endpoints of an earlier segment.
pub fn segments(size: f64, u: &mut Unstructured<'_>) -> Result<Vec<Segment>, arbitrary::Error> {
    let count = u.int_in_range(0..=16)?;
    let mut ret: Vec<Segment> = Vec::with_capacity(count);
    for _ in 0..count {
        let start = if !ret.is_empty() && u.arbitrary()? {
            let other = u.choose(&ret)?.v1;
            another_point(other, size, u)?
        } else {
            point(size, u)?
        };
        ret.push(Segment::new(start, point(size, u)?));
    }
    Ok(ret)
}
