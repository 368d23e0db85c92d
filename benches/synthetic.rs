use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use segsweep::{
    generators::{checkerboard, grid, slanted_checkerboard, slanties},
    section_lines,
    set::Set,
    Segment,
};

fn sweep(c: &mut Criterion) {
    let inputs: [(&str, Vec<Segment>); 4] = [
        ("checkerboard", checkerboard(10)),
        ("slanted checkerboard", slanted_checkerboard(10)),
        ("slanties", slanties(30)),
        ("grid", grid(30)),
    ];

    let mut group = c.benchmark_group("sweep");
    for (name, segs) in &inputs {
        group.bench_with_input(BenchmarkId::from_parameter(name), segs, |b, segs| {
            b.iter(|| black_box(section_lines(segs)))
        });
    }
    group.finish();
}

fn set_insert(c: &mut Criterion) {
    // A fixed scramble of 0..10_000, so that insertions don't all go on the right.
    let keys: Vec<u32> = (0..10_000u32).map(|i| i.wrapping_mul(7919) % 10_000).collect();

    c.bench_function("set insert", |b| {
        b.iter(|| black_box(keys.iter().copied().collect::<Set<u32>>()))
    });
}

criterion_group!(benches, sweep, set_insert);
criterion_main!(benches);
