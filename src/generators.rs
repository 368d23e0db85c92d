//! Utilities for generating examples, benchmarks, and test cases.

use crate::{Point, Segment};

// The boundary segments of a closed polygon.
fn cycle(points: &[Point]) -> impl Iterator<Item = Segment> + '_ {
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(&p, &q)| Segment::new(p, q))
}

/// Generate the outlines of a bunch of squares, arranged in a grid.
///
/// The top-left of the first square is at (x0, y0). Each square has size `size
/// x size`, and the distance between squares (both horizontally and vertically)
/// is `offset`.
///
/// If `slant` is non-zero, generates parallelograms instead of squares: the
/// right-hand side of each square gets translated down by `slant`.
fn squares((x0, y0): (f64, f64), size: f64, offset: f64, slant: f64, count: usize) -> Vec<Segment> {
    let mut ret = Vec::new();
    for i in 0..count {
        let x = x0 + i as f64 * offset;
        for j in 0..count {
            let y = y0 + j as f64 * offset;
            let corners = [
                Point::new(x, y),
                Point::new(x, y + size),
                Point::new(x + size, y + size + slant),
                Point::new(x + size, y + slant),
            ];
            ret.extend(cycle(&corners));
        }
    }

    ret
}

/// Generate an `n` by `n` checkerboard-like pattern with overlapping squares.
/// For `n = 3`, it looks like:
///
/// ```text
/// ┌────┐ ┌────┐ ┌────┐
/// │    │ │    │ │    │
/// │  ┌─┼─┼─┐┌─┼─┼─┐  │
/// └──┼─┘ └─┼┼─┘ └─┼──┘
/// ┌──┼─┐ ┌─┼┼─┐ ┌─┼──┐
/// │  └─┼─┼─┘└─┼─┼─┘  │
/// │  ┌─┼─┼─┐┌─┼─┼─┐  │
/// └──┼─┘ └─┼┼─┘ └─┼──┘
/// ┌──┼─┐ ┌─┼┼─┐ ┌─┼──┐
/// │  └─┼─┼─┘└─┼─┼─┘  │
/// │    │ │    │ │    │
/// └────┘ └────┘ └────┘
/// ```
///
/// Every inner square crosses four outer squares twice each, for
/// `8 (n - 1)^2` intersections in all (plus the corners of the squares).
pub fn checkerboard(n: usize) -> Vec<Segment> {
    let mut ret = squares((0.0, 0.0), 30.0, 40.0, 0.0, n);
    ret.extend(squares((20.0, 20.0), 30.0, 40.0, 0.0, n.saturating_sub(1)));
    ret
}

/// Like `checkerboard`, but with no exactly-horizontal lines.
///
/// Horizontal lines have special handling in the sweep-line algorithm, so
/// their presence or absence can affect performance.
pub fn slanted_checkerboard(n: usize) -> Vec<Segment> {
    let mut ret = squares((0.0, 0.0), 30.0, 40.0, 1.0, n);
    ret.extend(squares((20.0, 20.0), 30.0, 40.0, 1.0, n.saturating_sub(1)));
    ret
}

/// `n` segments going from top-left to bottom-right, and `n` going from
/// top-right to bottom-left. Every segment of the first kind crosses every
/// segment of the second kind, so there are `n^2` intersections.
pub fn slanties(n: usize) -> Vec<Segment> {
    let h = 20.0 * n as f64;

    let mut ret = Vec::new();
    for i in 0..n {
        let x_off = 20.0 * i as f64;
        ret.push(Segment::new((x_off, h), (x_off + h, 0.0)));
        ret.push(Segment::new((x_off + h + 10.0, h), (x_off + 10.0, 0.0)));
    }
    ret
}

/// `n` horizontal and `n` vertical segments, crossing in `n^2` points.
pub fn grid(n: usize) -> Vec<Segment> {
    let len = n as f64 + 1.0;
    let mut ret = Vec::new();
    for i in 1..=n {
        let i = i as f64;
        ret.push(Segment::new((0.0, i), (len, i)));
        ret.push(Segment::new((i, 0.0), (i, len)));
    }
    ret
}

/// `n` lines, all passing through the origin.
///
/// They're spread evenly over a half-turn, so one of them is horizontal.
pub fn star(n: usize) -> Vec<Segment> {
    (0..n)
        .map(|i| {
            let theta = std::f64::consts::PI * i as f64 / n as f64;
            let d = Point::new(theta.cos(), theta.sin()) * 10.0;
            Segment::new(Point::default() - d, d)
        })
        .collect()
}

/// `2 n` short segments arranged in a staircase, none of which touch.
pub fn staircase(n: usize) -> Vec<Segment> {
    let mut ret = Vec::new();
    for i in 0..n {
        let x = i as f64;
        ret.push(Segment::new((x, x), (x + 0.8, x)));
        ret.push(Segment::new((x + 0.9, x + 0.1), (x + 0.9, x + 0.9)));
    }
    ret
}
