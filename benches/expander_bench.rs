//! Benchmarks for buffer arithmetic and voice pool processing.
//!
//! Run with: cargo bench
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - buffer/*  Elementwise sum/accumulate, constant vs. per-frame operands
//!   - pool/*    Full pool blocks and note event churn

use criterion::{criterion_group, criterion_main};

mod buffer;
mod pool;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

criterion_group!(
    benches,
    buffer::bench_sum,
    buffer::bench_accumulate,
    pool::bench_process,
    pool::bench_events,
);
criterion_main!(benches);
