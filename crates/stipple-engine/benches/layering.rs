//! Benchmarks for batch insertion and replay under heavy layer interleaving

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use stipple_engine::Batcher;
use stipple_engine::batch::TextureId;
use stipple_engine::coords::{Affine, Rect};
use stipple_engine::paint::Color;
use stipple_engine::render::RecordingBackend;

fn fill(batcher: &mut Batcher, count: usize, layers: i32) {
    batcher.clear();
    for i in 0..count {
        batcher.set_layer((i as i32 * 7) % layers);
        batcher.set_texture(Some(TextureId((i % 3) as u32)));
        let x = (i % 64) as f32 * 10.0;
        let y = (i / 64) as f32 * 10.0;
        let _ = batcher.rect(Rect::new(x, y, 8.0, 8.0), Color::WHITE);
    }
}

fn bench_interleaved_layers(c: &mut Criterion) {
    let mut group = c.benchmark_group("interleaved_layers");

    for count in [100, 1_000, 5_000] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut batcher = Batcher::default();
            b.iter(|| {
                fill(&mut batcher, count, 16);
                black_box(batcher.batch_count())
            });
        });
    }

    group.finish();
}

fn bench_single_layer(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_layer");

    for count in [1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut batcher = Batcher::default();
            b.iter(|| {
                batcher.clear();
                for i in 0..count {
                    let _ = batcher.rect(Rect::new(i as f32, 0.0, 1.0, 1.0), Color::WHITE);
                }
                black_box(batcher.triangle_count())
            });
        });
    }

    group.finish();
}

fn bench_replay(c: &mut Criterion) {
    let mut batcher = Batcher::default();
    fill(&mut batcher, 5_000, 16);

    c.bench_function("replay_5000_interleaved", |b| {
        let mut backend = RecordingBackend::new();
        b.iter(|| {
            backend.clear_calls();
            black_box(batcher.render(&mut backend, Affine::IDENTITY))
        });
    });
}

criterion_group!(benches, bench_interleaved_layers, bench_single_layer, bench_replay);
criterion_main!(benches);
