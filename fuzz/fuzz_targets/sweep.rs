#![no_main]

use std::collections::BTreeSet;

use arbitrary::Unstructured;

use libfuzzer_sys::fuzz_target;
use segsweep::{
    arbitrary::segments, intersect_seg_seg, section_lines, Intersect, Point, Segment, DEFAULT_EPS,
};

fn distance(seg: &Segment, p: Point) -> f64 {
    let d = seg.v1 - seg.v0;
    let len2 = d.dot(&d);
    if len2 == 0.0 {
        return (p - seg.v0).hypot();
    }
    let t = ((p - seg.v0).dot(&d) / len2).clamp(0.0, 1.0);
    (seg.v0 + d * t - p).hypot()
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(segs) = segments(1e3, &mut u) else {
        return;
    };

    let mut expected = BTreeSet::new();
    for (i, a) in segs.iter().enumerate() {
        for (j, b) in segs.iter().enumerate().skip(i + 1) {
            if intersect_seg_seg(a, b, DEFAULT_EPS) != Intersect::None {
                expected.insert((i, j));
            }
        }
    }

    let mut found = BTreeSet::new();
    for int in section_lines(&segs).unwrap() {
        for a in &int.lines {
            assert!(
                distance(&segs[a.0], int.point) <= 4.0 * DEFAULT_EPS,
                "{a:?} doesn't pass through {int:?}"
            );
            for b in &int.lines {
                if a.0 < b.0 {
                    found.insert((a.0, b.0));
                }
            }
        }
    }
    assert_eq!(found, expected, "{segs:?}");
});
