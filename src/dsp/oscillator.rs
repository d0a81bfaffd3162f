#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Phase-Accumulating Oscillator
=============================

Every periodic waveform here is a function of one number: the phase, a
position within the current cycle normalized to [0, 1).

Vocabulary
----------

  phase       Where we are in the cycle. 0.0 is the start, 0.5 halfway,
              and 1.0 wraps back to 0.0.

  increment   How far the phase moves per sample:

                  increment = frequency / sample_rate

              440 Hz at 48 kHz moves 0.00917 of a cycle per sample, so one
              cycle takes 48000 / 440 ≈ 109.09 samples.

  wrap        When phase reaches 1.0 we subtract the whole part. Keeping
              phase small keeps f32 precision high no matter how long a
              note plays.


Order of Operations
-------------------

`process(frequency)` reads the waveform at the CURRENT phase, then advances.
A freshly reset oscillator therefore always emits waveform(0.0) first. For
the sine that is exactly 0.0, so a new note starts without a click.

The frequency is passed on every call rather than stored. Pitch bend and
other pitch changes take effect on the very next sample.


Fast Sine
---------

`f32::sin` is accurate but comparatively expensive when evaluated for every
voice on every sample. We use a parabolic approximation instead:

    x = phase mapped to [-1, 1)           (sin(pi * x) is the target)
    y = 4x(1 - |x|)                       (parabola through the peaks)
    y = y + 0.225 (y|y| - y)              (correction toward the sine)

The result stays inside [-1, 1], hits 0 and ±1 exactly, and is within about
0.001 of the true sine. That is well below what you can hear on a single
oscillator.


Other Shapes
------------

All shapes are phase-aligned so that phase 0.0 produces 0.0 (except square,
which has no zero crossing to align to):

  Sine       ∿   smooth, fundamental only
  Triangle   /\  odd harmonics falling off as 1/n²
  Sawtooth   /|  all harmonics falling off as 1/n
  Square     ⊓⊔  odd harmonics falling off as 1/n

These are naive (not band-limited) shapes. Bright shapes played high will
alias.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OscillatorWaveform {
    #[default]
    Sine,
    Triangle,
    Sawtooth,
    Square,
}

pub struct Oscillator {
    waveform: OscillatorWaveform,
    phase: f32,
    sample_rate: f32,
}

impl Oscillator {
    pub fn new(waveform: OscillatorWaveform, sample_rate: f32) -> Self {
        Self {
            waveform,
            phase: 0.0,
            sample_rate,
        }
    }

    pub fn sine(sample_rate: f32) -> Self {
        Self::new(OscillatorWaveform::Sine, sample_rate)
    }

    /// Produce one sample for the current phase, then advance by
    /// `frequency / sample_rate`.
    ///
    /// `frequency` must be positive; zero or negative values are a caller
    /// error and are not checked here.
    #[inline]
    pub fn process(&mut self, frequency: f32) -> f32 {
        let out = shape(self.waveform, self.phase);

        self.phase += frequency / self.sample_rate;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }

        out
    }

    /// Fill a buffer at a fixed frequency.
    pub fn render(&mut self, out: &mut [f32], frequency: f32) {
        for sample in out.iter_mut() {
            *sample = self.process(frequency);
        }
    }

    /// Restart the cycle at phase 0.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    pub fn set_waveform(&mut self, waveform: OscillatorWaveform) {
        self.waveform = waveform;
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }
}

#[inline]
fn shape(waveform: OscillatorWaveform, phase: f32) -> f32 {
    match waveform {
        OscillatorWaveform::Sine => fast_sin(phase),
        OscillatorWaveform::Triangle => {
            let shifted = wrap(phase + 0.75);
            4.0 * (shifted - 0.5).abs() - 1.0
        }
        OscillatorWaveform::Sawtooth => 2.0 * wrap(phase + 0.5) - 1.0,
        OscillatorWaveform::Square => {
            if phase < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
    }
}

/// Parabolic sine approximation of `sin(2π · phase)` for phase in [0, 1).
#[inline]
pub fn fast_sin(phase: f32) -> f32 {
    const P: f32 = 0.225;

    let x = if phase < 0.5 {
        2.0 * phase
    } else {
        2.0 * phase - 2.0
    };
    let y = 4.0 * x * (1.0 - x.abs());
    P * (y * y.abs() - y) + y
}

#[inline]
fn wrap(phase: f32) -> f32 {
    phase - phase.floor()
}
