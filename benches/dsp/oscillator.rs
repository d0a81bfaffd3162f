//! Benchmarks for oscillator waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use midisynth::dsp::oscillator::{Oscillator, OscillatorWaveform};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    let shapes = [
        // Parabolic approximation, no transcendental call
        ("sine", OscillatorWaveform::Sine),
        // Simple linear ramp
        ("sawtooth", OscillatorWaveform::Sawtooth),
        // Branch per sample
        ("square", OscillatorWaveform::Square),
        // Absolute value
        ("triangle", OscillatorWaveform::Triangle),
    ];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, waveform) in shapes {
            let mut osc = Oscillator::new(waveform, SAMPLE_RATE);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    osc.render(black_box(&mut buffer), black_box(440.0));
                })
            });
        }

        // Frequency recomputed every sample, as a bent voice does
        let mut osc = Oscillator::sine(SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("sine_midi_pitch", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = osc.process(midisynth::dsp::midi_to_freq(black_box(69.5)));
                }
            })
        });
    }

    group.finish();
}
