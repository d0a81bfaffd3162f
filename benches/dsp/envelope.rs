//! Benchmarks for ADSR envelope generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use midisynth::dsp::envelope::Envelope;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

const SUSTAIN: f32 = 0.7;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (ramping up); long enough to stay there
        let mut env = Envelope::adsr(SAMPLE_RATE, 10_000.0, 100.0, 300.0);
        env.start(1.0);
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), black_box(SUSTAIN));
            })
        });

        // Sustain phase (holding steady)
        let mut env = Envelope::adsr(SAMPLE_RATE, 1.0, 1.0, 300.0);
        env.start(1.0);
        for _ in 0..200 {
            env.process(SUSTAIN);
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), black_box(SUSTAIN));
            })
        });

        // Release phase (ramping down), retriggered so it never goes idle
        let mut env = Envelope::adsr(SAMPLE_RATE, 1.0, 1.0, 10_000.0);
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                env.start(1.0);
                for _ in 0..100 {
                    env.process(SUSTAIN);
                }
                env.release();
                env.render(black_box(&mut buffer), black_box(SUSTAIN));
            })
        });
    }

    group.finish();
}
