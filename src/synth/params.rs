//! Process-wide synth parameters.
//!
//! Envelope parameters travel to the audio thread as [`ParamChange`]
//! messages and are broadcast to every voice slot. Master gain is a single
//! scalar read once per block, so it lives in an atomic instead.

use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::envelope::{
    DEFAULT_ATTACK_MS, DEFAULT_DECAY_MS, DEFAULT_RELEASE_MS, DEFAULT_SUSTAIN,
};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamId {
    /// Attack time, ms
    Attack,
    /// Decay time, ms
    Decay,
    /// Sustain level, %
    Sustain,
    /// Release time, ms
    Release,
    /// Master gain, %
    Gain,
}

/// One parameter update in host units (ms or %).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamChange {
    pub id: ParamId,
    pub value: f32,
}

impl ParamChange {
    pub fn new(id: ParamId, value: f32) -> Self {
        Self { id, value }
    }
}

/// Envelope settings shared by every voice.
///
/// Times are in milliseconds; `sustain` is a fraction (0.0 - 1.0) even
/// though [`ParamId::Sustain`] updates arrive in percent.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    pub attack_ms: f32,
    pub decay_ms: f32,
    pub sustain: f32,
    pub release_ms: f32,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            attack_ms: DEFAULT_ATTACK_MS,
            decay_ms: DEFAULT_DECAY_MS,
            sustain: DEFAULT_SUSTAIN,
            release_ms: DEFAULT_RELEASE_MS,
        }
    }
}

impl EnvelopeParams {
    /// Fold a change into this set. Returns false for parameters that are
    /// not envelope parameters.
    pub fn apply(&mut self, change: ParamChange) -> bool {
        match change.id {
            ParamId::Attack => self.attack_ms = change.value,
            ParamId::Decay => self.decay_ms = change.value,
            ParamId::Sustain => self.sustain = change.value / 100.0,
            ParamId::Release => self.release_ms = change.value,
            ParamId::Gain => return false,
        }
        true
    }

    /// The same settings as messages in host units, sustain in percent.
    pub fn changes(&self) -> [ParamChange; 4] {
        [
            ParamChange::new(ParamId::Attack, self.attack_ms),
            ParamChange::new(ParamId::Decay, self.decay_ms),
            ParamChange::new(ParamId::Sustain, self.sustain * 100.0),
            ParamChange::new(ParamId::Release, self.release_ms),
        ]
    }
}

/// Master gain in percent, stored as `f32` bits so the control thread can
/// write it while the audio thread reads it without tearing.
#[derive(Debug)]
pub struct SharedGain {
    bits: AtomicU32,
}

impl SharedGain {
    pub fn new(percent: f32) -> Self {
        Self {
            bits: AtomicU32::new(percent.to_bits()),
        }
    }

    pub fn set_percent(&self, percent: f32) {
        self.bits.store(percent.to_bits(), Ordering::Relaxed);
    }

    pub fn percent(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

impl Default for SharedGain {
    fn default() -> Self {
        Self::new(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sustain_arrives_in_percent() {
        let mut params = EnvelopeParams::default();
        assert!(params.apply(ParamChange::new(ParamId::Sustain, 25.0)));
        assert_eq!(params.sustain, 0.25);
    }

    #[test]
    fn times_stay_in_milliseconds() {
        let mut params = EnvelopeParams::default();
        params.apply(ParamChange::new(ParamId::Attack, 5.0));
        params.apply(ParamChange::new(ParamId::Decay, 50.0));
        params.apply(ParamChange::new(ParamId::Release, 500.0));

        assert_eq!(params.attack_ms, 5.0);
        assert_eq!(params.decay_ms, 50.0);
        assert_eq!(params.release_ms, 500.0);
    }

    #[test]
    fn gain_is_not_an_envelope_param() {
        let mut params = EnvelopeParams::default();
        assert!(!params.apply(ParamChange::new(ParamId::Gain, 10.0)));
        assert_eq!(params, EnvelopeParams::default());
    }

    #[test]
    fn changes_rebuild_the_same_params() {
        let source = EnvelopeParams {
            attack_ms: 3.0,
            decay_ms: 40.0,
            sustain: 0.5,
            release_ms: 250.0,
        };
        let mut params = EnvelopeParams::default();
        for change in source.changes() {
            assert!(params.apply(change));
        }
        assert_eq!(params, source);
    }

    #[test]
    fn shared_gain_round_trips_bits() {
        let gain = SharedGain::default();
        assert_eq!(gain.percent(), 100.0);
        gain.set_percent(42.5);
        assert_eq!(gain.percent(), 42.5);
    }
}
