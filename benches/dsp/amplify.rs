//! Benchmarks for gain and channel fan-out.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use midisynth::dsp::amplify;

use crate::BLOCK_SIZES;

pub fn bench_amplify(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/amplify");

    for &size in BLOCK_SIZES {
        // Pre-allocate buffers
        let signal: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();
        let voice: Vec<f32> = (0..size).map(|i| i as f32 / size as f32).collect();

        let mut signal_copy = signal.clone();
        group.bench_with_input(BenchmarkId::new("apply_gain", size), &size, |b, _| {
            b.iter(|| {
                signal_copy.copy_from_slice(&signal);
                amplify::apply_gain(black_box(&mut signal_copy), black_box(0.5))
            })
        });

        let mut mix = signal.clone();
        group.bench_with_input(BenchmarkId::new("accumulate", size), &size, |b, _| {
            b.iter(|| {
                mix.copy_from_slice(&signal);
                amplify::accumulate(black_box(&mut mix), black_box(&voice))
            })
        });

        let mut channels = vec![signal.clone(), vec![0.0; size]];
        group.bench_with_input(BenchmarkId::new("fan_out_stereo", size), &size, |b, _| {
            b.iter(|| amplify::fan_out(black_box(&mut channels), size))
        });
    }

    group.finish();
}
