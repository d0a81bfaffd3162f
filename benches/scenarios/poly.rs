//! Benchmarks for the polyphonic engine.
//!
//! The interesting costs are voice count (per-sample work scales with it)
//! and event density (each event splits the block into another render run).

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use midisynth::{io::AudioOutput, EngineConfig, SynthEngine, SynthHandle, DEFAULT_VOICES};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn build_engine(block_size: usize) -> (SynthEngine, SynthHandle) {
    let config = EngineConfig {
        sample_rate: SAMPLE_RATE,
        block_size,
        ..EngineConfig::default()
    };
    match SynthEngine::new(config) {
        Ok(pair) => pair,
        Err(err) => panic!("bench engine config rejected: {err}"),
    }
}

pub fn bench_poly(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/poly");

    for &size in BLOCK_SIZES {
        let mut output = AudioOutput::new(2, size);

        // === SINGLE NOTE ===
        // Baseline: one busy voice, 31 idle slots skipped
        let (mut engine, mut handle) = build_engine(size);
        let _ = handle.note_on(57, 100, 0);
        group.bench_with_input(BenchmarkId::new("single_note", size), &size, |b, _| {
            b.iter(|| engine.process_block(black_box(&mut output), size))
        });

        // === FULL POOL ===
        // Every slot sustaining: worst case per-sample cost
        let (mut engine, mut handle) = build_engine(size);
        for note in 0..DEFAULT_VOICES as u8 {
            let _ = handle.note_on(36 + note, 100, 0);
        }
        group.bench_with_input(BenchmarkId::new("full_pool", size), &size, |b, _| {
            b.iter(|| engine.process_block(black_box(&mut output), size))
        });

        // === STEALING UNDER LOAD ===
        // Full pool plus a fresh note-on every block, so each block steals
        let (mut engine, mut handle) = build_engine(size);
        for note in 0..DEFAULT_VOICES as u8 {
            let _ = handle.note_on(36 + note, 100, 0);
        }
        let mut next = 0u8;
        group.bench_with_input(BenchmarkId::new("steal_each_block", size), &size, |b, _| {
            b.iter(|| {
                let _ = handle.note_on(72 + next % 24, 100, 0);
                next = next.wrapping_add(1);
                engine.process_block(black_box(&mut output), size)
            })
        });

        // === DENSE EVENTS ===
        // Eight sample-accurate events per block, each splitting the render
        let (mut engine, mut handle) = build_engine(size);
        let spacing = (size / 8) as u32;
        group.bench_with_input(BenchmarkId::new("dense_events", size), &size, |b, _| {
            b.iter(|| {
                for i in 0..8u32 {
                    let note = 60 + (i as u8 % 4) * 3;
                    let frame = i * spacing;
                    let _ = if i % 2 == 0 {
                        handle.note_on(note, 90, frame)
                    } else {
                        handle.note_off(note, frame)
                    };
                }
                engine.process_block(black_box(&mut output), size)
            })
        });
    }

    group.finish();
}
