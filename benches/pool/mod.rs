//! Voice pool benchmarks.
//!
//! These run the pool the way a plugin would: a handful of held notes,
//! one block at a time, with the reference sine voice as the inner module.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use poly_expander::{
    synth::{message::NoteEvent, sine::SineVoice},
    BlockCtx, ExpanderConfig, VoiceExpander,
};

use crate::BLOCK_SIZES;

const VOICE_COUNTS: &[usize] = &[1, 8, 32];

fn pool(voices: usize, block_size: usize) -> VoiceExpander<SineVoice> {
    let config = ExpanderConfig::default()
        .with_voices(voices)
        .with_channels(2)
        .with_block_size(block_size)
        .with_params(1);
    let mut pool = VoiceExpander::new(SineVoice::new(0.01, 0.2), &config).unwrap();
    pool.activate(48_000.0, block_size).unwrap();
    pool
}

pub fn bench_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool/process");

    for &size in BLOCK_SIZES {
        for &voices in VOICE_COUNTS {
            let mut pool = pool(voices, size);
            for key in 0..voices as i16 {
                pool.on_note_on(&NoteEvent::new(36 + key, 0, 0.8));
            }

            let id = BenchmarkId::new(format!("{voices}_voices"), size);
            group.bench_with_input(id, &size, |b, &n| {
                b.iter(|| black_box(pool.process(&BlockCtx::default(), n)))
            });
        }
    }

    group.finish();
}

pub fn bench_events(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool/events");

    for &voices in VOICE_COUNTS {
        let mut pool = pool(voices, 64);

        // Note on then choke for every voice, then one block to reclaim them.
        group.bench_with_input(BenchmarkId::new("on_choke_reclaim", voices), &voices, |b, &n| {
            b.iter(|| {
                for key in 0..n as i16 {
                    pool.on_note_on(black_box(&NoteEvent::new(36 + key, 0, 0.8)));
                }
                for key in 0..n as i16 {
                    pool.on_note_choke(black_box(&NoteEvent::new(36 + key, 0, 0.0)));
                }
                pool.process(&BlockCtx::default(), 64)
            })
        });
    }

    group.finish();
}
