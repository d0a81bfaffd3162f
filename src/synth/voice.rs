use crate::{
    dsp::{
        envelope::Envelope,
        midi_to_freq,
        oscillator::{Oscillator, OscillatorWaveform},
    },
    synth::params::{EnvelopeParams, ParamChange, ParamId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Playing, envelope in attack/decay/sustain
    Releasing, // Key released, envelope in release phase
}

/// What the pool needs from a voice.
///
/// `PolySynth` is generic over this trait, so the per-sample path is
/// statically dispatched.
pub trait SynthVoice: Send {
    /// Start (or restart) the envelope at `level` for `note`.
    ///
    /// `is_retrigger` is true when the voice was still busy, either because
    /// the same note was struck again or because the voice was stolen.
    fn trigger(&mut self, note: u8, level: f32, is_retrigger: bool);

    fn release(&mut self);

    fn is_busy(&self) -> bool;

    fn is_released(&self) -> bool;

    /// Add `frames` samples into `out[start..start + frames]`.
    ///
    /// Existing buffer contents are summed with, never overwritten.
    fn process_samples(&mut self, out: &mut [f32], start: usize, frames: usize, pitch_bend: f32);

    /// The note this voice is sounding, `None` once it has gone idle.
    fn note(&self) -> Option<u8>;

    /// Current envelope level, used for metering and quietest-voice stealing.
    fn level(&self) -> f32;

    fn set_sample_rate(&mut self, sample_rate: f32);

    fn set_param(&mut self, change: ParamChange);

    /// Silence immediately and return to the free state.
    fn reset(&mut self);

    fn state(&self) -> VoiceState {
        if !self.is_busy() {
            VoiceState::Free
        } else if self.is_released() {
            VoiceState::Releasing
        } else {
            VoiceState::Active
        }
    }
}

/// One oscillator shaped by one ADSR envelope.
pub struct OscVoice {
    osc: Oscillator,
    env: Envelope,
    note: Option<u8>,
    base_pitch: f32,
    sustain: f32,
}

impl OscVoice {
    pub fn new(sample_rate: f32, waveform: OscillatorWaveform, params: &EnvelopeParams) -> Self {
        Self {
            osc: Oscillator::new(waveform, sample_rate),
            env: Envelope::adsr(
                sample_rate,
                params.attack_ms,
                params.decay_ms,
                params.release_ms,
            ),
            note: None,
            base_pitch: 0.0,
            sustain: params.sustain,
        }
    }

    pub fn sine(sample_rate: f32) -> Self {
        Self::new(sample_rate, OscillatorWaveform::Sine, &EnvelopeParams::default())
    }

    pub fn envelope(&self) -> &Envelope {
        &self.env
    }

    pub fn oscillator(&self) -> &Oscillator {
        &self.osc
    }
}

impl SynthVoice for OscVoice {
    fn trigger(&mut self, note: u8, level: f32, is_retrigger: bool) {
        self.note = Some(note);
        self.base_pitch = note as f32;

        // Fresh notes start at phase 0; a voice that is still sounding keeps
        // its phase so the waveform stays continuous.
        if !is_retrigger {
            self.osc.reset();
        }

        self.env.start(level);
    }

    fn release(&mut self) {
        self.env.release();
    }

    fn is_busy(&self) -> bool {
        self.env.is_busy()
    }

    fn is_released(&self) -> bool {
        self.env.is_released()
    }

    fn process_samples(&mut self, out: &mut [f32], start: usize, frames: usize, pitch_bend: f32) {
        // Pitch is constant across one call, so convert once
        let frequency = midi_to_freq(self.base_pitch + pitch_bend);

        for sample in out[start..start + frames].iter_mut() {
            if !self.env.is_busy() {
                break;
            }
            *sample += self.env.process(self.sustain) * self.osc.process(frequency);
        }

        if !self.env.is_busy() {
            self.note = None;
        }
    }

    fn note(&self) -> Option<u8> {
        self.note
    }

    fn level(&self) -> f32 {
        self.env.level()
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.osc.set_sample_rate(sample_rate);
        self.env.set_sample_rate(sample_rate);
    }

    fn set_param(&mut self, change: ParamChange) {
        match change.id {
            ParamId::Attack => self.env.set_attack_ms(change.value),
            ParamId::Decay => self.env.set_decay_ms(change.value),
            ParamId::Sustain => self.sustain = change.value / 100.0,
            ParamId::Release => self.env.set_release_ms(change.value),
            ParamId::Gain => {}
        }
    }

    fn reset(&mut self) {
        self.env.reset();
        self.osc.reset();
        self.note = None;
    }
}
