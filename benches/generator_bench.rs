#![deny(warnings)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use linegen::*;

const SIZE: i32 = 1024;

/// Horizontal lines that never conflict with each other
fn disjoint_commands(count: i32) -> Generator<DrawLineCommand> {
    (0..count)
        .map(|i| {
            let y = i * SIZE / count;
            DrawLineCommand::plain(Line::new((0, y), (SIZE - 1, y), 1), Color::WHITE)
        })
        .collect()
}

/// Fan of lines through the center, all of them conflict with each other
fn overlapping_commands(count: i32) -> Generator<DrawLineCommand> {
    (0..count)
        .map(|i| {
            let x = i * SIZE / count;
            DrawLineCommand::plain(Line::new((x, 0), (SIZE - 1 - x, SIZE - 1), 3), Color::WHITE)
        })
        .collect()
}

fn generator_benchmark(c: &mut Criterion) {
    let mut img = ImageOwned::new_filled(SIZE as usize, SIZE as usize, Color::BLACK);
    let mut group = c.benchmark_group("apply_commands");
    for count in [16, 256] {
        let disjoint = disjoint_commands(count);
        let overlapping = overlapping_commands(count);
        group
            .throughput(Throughput::Elements(count as u64))
            .bench_with_input(BenchmarkId::new("disjoint", count), &disjoint, |b, g| {
                b.iter(|| g.apply_commands(&mut img))
            })
            .bench_with_input(
                BenchmarkId::new("overlapping", count),
                &overlapping,
                |b, g| b.iter(|| g.apply_commands(&mut img)),
            )
            .bench_with_input(BenchmarkId::new("plan", count), &overlapping, |b, g| {
                b.iter(|| g.plan())
            });
    }
    group.finish();
}

criterion_group!(generator, generator_benchmark);
criterion_main!(generator);
