//! Drawing segments and their intersections, for eyeballing sweep output.

use svg::{
    node::element::{path::Data, Circle, Path},
    Document,
};

use crate::{sweep::Intersection, Segment};

/// Draws `segments` as black lines, with a red dot at each intersection.
///
/// The picture uses the segments' own coordinates, so it comes out flipped
/// vertically compared to the usual mathematical orientation.
pub fn render(segments: &[Segment], intersections: &[Intersection]) -> Document {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for seg in segments {
        min_x = min_x.min(seg.min_x());
        min_y = min_y.min(seg.min_y());
        max_x = max_x.max(seg.max_x());
        max_y = max_y.max(seg.max_y());
    }
    if segments.is_empty() {
        (min_x, min_y, max_x, max_y) = (0.0, 0.0, 1.0, 1.0);
    }

    let size = (max_x - min_x).max(max_y - min_y).max(f64::EPSILON);
    let stroke_width = size / 512.0;
    let pad = size / 32.0;
    let mut document = Document::new().set(
        "viewBox",
        (
            min_x - pad,
            min_y - pad,
            max_x - min_x + 2.0 * pad,
            max_y - min_y + 2.0 * pad,
        ),
    );

    let mut data = Data::new();
    for seg in segments {
        data = data
            .move_to((seg.v0.x, seg.v0.y))
            .line_to((seg.v1.x, seg.v1.y));
    }
    let path = Path::new()
        .set("stroke", "black")
        .set("stroke-width", stroke_width)
        .set("stroke-linecap", "round")
        .set("fill", "none")
        .set("d", data);
    document = document.add(path);

    for int in intersections {
        let dot = Circle::new()
            .set("cx", int.point.x)
            .set("cy", int.point.y)
            .set("r", 3.0 * stroke_width)
            .set("fill", "red")
            .set("opacity", 0.7);
        document = document.add(dot);
    }

    document
}
