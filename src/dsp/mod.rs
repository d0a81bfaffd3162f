//! Low-level DSP primitives used by the voices.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice structs. They stay focused on the
//! signal-processing math; note handling and allocation live in `synth`.

/// Gain and buffer fan-out helpers.
pub mod amplify;
/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Phase-accumulating oscillator with a fast sine.
pub mod oscillator;

pub use envelope::{Envelope, EnvelopeState};
pub use oscillator::{Oscillator, OscillatorWaveform};

/// Convert a (possibly fractional) MIDI pitch to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_to_freq(pitch: f32) -> f32 {
    440.0 * 2.0_f32.powf((pitch - 69.0) / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_440() {
        assert_eq!(midi_to_freq(69.0), 440.0);
    }

    #[test]
    fn octaves_double() {
        assert!((midi_to_freq(81.0) - 880.0).abs() < 1e-3);
        assert!((midi_to_freq(57.0) - 220.0).abs() < 1e-3);
    }

    #[test]
    fn fractional_pitch_sits_between_semitones() {
        let low = midi_to_freq(60.0);
        let high = midi_to_freq(61.0);
        let mid = midi_to_freq(60.5);
        assert!(low < mid && mid < high);
    }
}
