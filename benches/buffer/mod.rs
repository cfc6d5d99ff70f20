//! Buffer arithmetic benchmarks.
//!
//! The constant cases show what the zero-stride path costs compared to
//! reading two per-frame operands.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use poly_expander::AudioBuffer;

use crate::BLOCK_SIZES;

fn ramp(channels: usize, frames: usize) -> AudioBuffer<f32> {
    let mut buffer = AudioBuffer::new(channels, frames, 48_000.0).unwrap();
    buffer.set_constant(false);
    for (i, sample) in buffer.data_mut().iter_mut().enumerate() {
        *sample = (i as f32 * 0.01).sin();
    }
    buffer
}

fn dc(channels: usize, frames: usize, value: f32) -> AudioBuffer<f32> {
    let mut buffer = AudioBuffer::new(channels, frames, 48_000.0).unwrap();
    buffer.clear(value);
    buffer
}

pub fn bench_sum(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer/sum");

    for &size in BLOCK_SIZES {
        let a = ramp(2, size);
        let b = ramp(2, size);
        let k = dc(2, size, 0.5);
        let mut out = AudioBuffer::<f32>::new(2, size, 48_000.0).unwrap();

        group.bench_with_input(BenchmarkId::new("frames+frames", size), &size, |bench, &n| {
            bench.iter(|| out.sum(black_box(&a), black_box(&b), n))
        });

        group.bench_with_input(BenchmarkId::new("constant+frames", size), &size, |bench, &n| {
            bench.iter(|| out.sum(black_box(&k), black_box(&b), n))
        });
    }

    group.finish();
}

pub fn bench_accumulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer/accumulate");

    for &size in BLOCK_SIZES {
        let voice = ramp(2, size);
        let mut out = AudioBuffer::<f32>::new(2, size, 48_000.0).unwrap();

        // Mirrors the pool: clear to constant silence, then add one voice.
        group.bench_with_input(BenchmarkId::new("clear+accumulate", size), &size, |bench, &n| {
            bench.iter(|| {
                out.clear(0.0);
                out.accumulate(black_box(&voice), n);
            })
        });
    }

    group.finish();
}
