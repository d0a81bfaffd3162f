//! Gain and channel fan-out primitives.

/*
Output Stage
============

Voices are rendered into one mono buffer. Two cheap operations turn that into
what the host receives.

Vocabulary
----------

  gain          A multiplier applied to amplitude.
                  gain > 1.0  →  louder (amplification)
                  gain = 1.0  →  unchanged (unity gain)
                  gain < 1.0  →  quieter (attenuation)
                  gain = 0.0  →  silence

  percent       Host parameters arrive as 0 - 100 %. 100 % is unity gain:

                  gain = percent / 100

  fan-out       Copying the mono mix to every output channel. The synth has
                no stereo image, so every channel carries the same signal.


Attenuation in Decibels
-----------------------

Audio engineers often measure level changes in decibels (dB) because human
hearing is logarithmic - we perceive loudness ratios, not differences.

    dB = 20 × log₁₀(amplitude_ratio)

    ×1.0   =   0 dB  (unity, no change)
    ×0.5   =  -6 dB  (half amplitude)
    ×0.1   = -20 dB  (one-tenth amplitude)

A linear percent knob therefore spends most of its travel near the top of
the loudness range. That is how the host-facing gain parameter behaves and
we keep it that way.


Summing Voices
--------------

Each voice ADDS into the shared buffer. With N voices at full level the sum
can reach ±N, so the master gain is what keeps a dense chord out of clipping.
*/

/// Convert a 0 - 100 % parameter into a linear gain factor.
#[inline]
pub fn percent_to_gain(percent: f32) -> f32 {
    percent / 100.0
}

/// Multiply a signal by a constant gain factor (in-place).
///
/// # Arguments
/// * `signal` - The signal buffer to modify in-place
/// * `gain` - The gain factor (0.0 = silence, 1.0 = unchanged, 2.0 = double)
#[inline]
pub fn apply_gain(signal: &mut [f32], gain: f32) {
    for sample in signal.iter_mut() {
        *sample *= gain;
    }
}

/// Add `source` into `dest` sample by sample.
#[inline]
pub fn accumulate(dest: &mut [f32], source: &[f32]) {
    debug_assert_eq!(dest.len(), source.len());

    for (d, &s) in dest.iter_mut().zip(source.iter()) {
        *d += s;
    }
}

/// Copy the first `frames` samples of channel 0 into every other channel.
///
/// Channels shorter than `frames` get as much as fits.
pub fn fan_out(channels: &mut [Vec<f32>], frames: usize) {
    if let Some((first, rest)) = channels.split_first_mut() {
        let source = &first[..frames.min(first.len())];
        for channel in rest {
            let n = source.len().min(channel.len());
            channel[..n].copy_from_slice(&source[..n]);
        }
    }
}
