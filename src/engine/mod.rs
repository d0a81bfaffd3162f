//! Host-facing engine.
//!
//! [`SynthEngine`] lives on the audio thread and owns the [`PolySynth`];
//! [`SynthHandle`] lives anywhere else and talks to it through the message
//! ring and the shared gain. Splitting them at construction is what keeps
//! the audio callback free of locks.

pub mod allocator;
pub mod scheduler;

use std::sync::Arc;

use log::{debug, info, warn};
use rtrb::{Producer, RingBuffer};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{
        amplify::{apply_gain, fan_out, percent_to_gain},
        oscillator::OscillatorWaveform,
    },
    error::SynthError,
    io::{converter::midi_to_synth, midi::MidiEvent, AudioOutput},
    synth::{
        message::{SynthMessage, TimedMessage, MESSAGE_QUEUE_SIZE},
        params::{EnvelopeParams, ParamChange, ParamId, SharedGain},
        poly::{PolySynth, DEFAULT_BEND_RANGE},
        voice::OscVoice,
    },
    DEFAULT_VOICES, MAX_BLOCK_SIZE,
};

use self::allocator::{StealPolicy, VoiceSnapshot};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    pub block_size: usize,
    pub channels: usize,
    pub voices: usize,
    pub waveform: OscillatorWaveform,
    pub envelope: EnvelopeParams,
    /// Master gain, %
    pub gain_percent: f32,
    /// Semitones each way
    pub pitch_bend_range: f32,
    pub steal_policy: StealPolicy,
    /// MIDI channel (0 - 15) accepted by [`SynthHandle::send_midi`]
    pub midi_channel: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            block_size: 64,
            channels: 2,
            voices: DEFAULT_VOICES,
            waveform: OscillatorWaveform::Sine,
            envelope: EnvelopeParams::default(),
            gain_percent: 100.0,
            pitch_bend_range: DEFAULT_BEND_RANGE,
            steal_policy: StealPolicy::Oldest,
            midi_channel: 0,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), SynthError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(SynthError::InvalidConfig("sample rate must be positive"));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(SynthError::InvalidConfig(
                "block size must be between 1 and MAX_BLOCK_SIZE",
            ));
        }
        if self.channels == 0 {
            return Err(SynthError::InvalidConfig("at least one output channel is required"));
        }
        if self.voices == 0 {
            return Err(SynthError::InvalidConfig("at least one voice is required"));
        }
        if !(self.pitch_bend_range.is_finite() && self.pitch_bend_range >= 0.0) {
            return Err(SynthError::InvalidConfig("pitch bend range must be non-negative"));
        }
        if self.midi_channel > 15 {
            return Err(SynthError::InvalidConfig("MIDI channel must be 0 - 15"));
        }
        Ok(())
    }
}

/// Audio-thread half of the engine.
pub struct SynthEngine {
    synth: PolySynth<OscVoice>,
    gain: Arc<SharedGain>,
    channels: usize,
}

impl SynthEngine {
    /// Build the engine and the handle that controls it.
    pub fn new(config: EngineConfig) -> Result<(Self, SynthHandle), SynthError> {
        if let Err(err) = config.validate() {
            warn!("rejecting engine config: {err}");
            return Err(err);
        }

        let (tx, rx) = RingBuffer::new(MESSAGE_QUEUE_SIZE);
        let mut synth = PolySynth::new(
            config.sample_rate,
            config.block_size,
            config.voices,
            config.steal_policy,
            rx,
        );
        synth.set_bend_range(config.pitch_bend_range);
        synth.set_envelope(config.envelope);

        let EngineConfig {
            sample_rate,
            waveform,
            envelope,
            ..
        } = config;
        synth.fill(&move || OscVoice::new(sample_rate, waveform, &envelope))?;

        let gain = Arc::new(SharedGain::new(config.gain_percent));

        info!(
            "synth engine ready: {} Hz, {} frames, {} channels, {} voices ({:?})",
            config.sample_rate, config.block_size, config.channels, config.voices, waveform
        );

        let engine = Self {
            synth,
            gain: Arc::clone(&gain),
            channels: config.channels,
        };
        let handle = SynthHandle {
            tx,
            gain,
            channel: config.midi_channel,
        };
        Ok((engine, handle))
    }

    /// Render `frames` samples into every channel of `output`.
    ///
    /// Voices are summed into channel 0, copied to the remaining channels,
    /// and master gain is applied last. `frames` is clamped to the shortest
    /// channel.
    pub fn process_block(&mut self, output: &mut AudioOutput, frames: usize) {
        let frames = frames.min(output.frames());
        let Some(mono) = output.buffers.first_mut() else {
            return;
        };

        self.synth.render_block(&mut mono[..frames]);
        fan_out(&mut output.buffers, frames);

        let gain = percent_to_gain(self.gain.percent());
        for channel in &mut output.buffers {
            apply_gain(&mut channel[..frames], gain);
        }
    }

    pub fn set_sample_rate_and_block_size(&mut self, sample_rate: f32, block_size: usize) {
        debug!("sample rate {sample_rate} Hz, block size {block_size}");
        self.synth
            .set_sample_rate_and_block_size(sample_rate, block_size);
    }

    /// Hard-stop every voice and drop queued messages.
    pub fn reset(&mut self) {
        self.synth.reset();
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn block_size(&self) -> usize {
        self.synth.block_size()
    }

    pub fn active_voice_count(&self) -> usize {
        self.synth.active_voice_count()
    }

    pub fn voice_states(&self) -> impl Iterator<Item = VoiceSnapshot> + '_ {
        self.synth.voice_states()
    }

    pub fn synth(&self) -> &PolySynth<OscVoice> {
        &self.synth
    }
}

/// Control-thread half of the engine.
///
/// `frame` arguments are offsets into the next rendered block; larger values
/// carry over into later blocks.
pub struct SynthHandle {
    tx: Producer<TimedMessage>,
    gain: Arc<SharedGain>,
    channel: u8,
}

impl SynthHandle {
    pub fn send(&mut self, event: TimedMessage) -> Result<(), SynthError> {
        self.tx.push(event).map_err(|_| {
            warn!("synth queue full, dropping {:?}", event.message);
            SynthError::QueueFull
        })
    }

    pub fn note_on(&mut self, note: u8, velocity: u8, frame: u32) -> Result<(), SynthError> {
        self.send(TimedMessage::new(
            frame,
            SynthMessage::NoteOn { note, velocity },
        ))
    }

    pub fn note_off(&mut self, note: u8, frame: u32) -> Result<(), SynthError> {
        self.send(TimedMessage::new(
            frame,
            SynthMessage::NoteOff { note, velocity: 0 },
        ))
    }

    /// `bend` is normalized to -1.0 ..= 1.0.
    pub fn pitch_bend(&mut self, bend: f32, frame: u32) -> Result<(), SynthError> {
        self.send(TimedMessage::new(
            frame,
            SynthMessage::PitchBend {
                bend: bend.clamp(-1.0, 1.0),
            },
        ))
    }

    pub fn all_notes_off(&mut self) -> Result<(), SynthError> {
        self.send(TimedMessage::immediate(SynthMessage::AllNotesOff))
    }

    /// Gain takes effect on the next block; envelope parameters travel
    /// through the queue.
    pub fn set_param(&mut self, change: ParamChange) -> Result<(), SynthError> {
        match change.id {
            ParamId::Gain => {
                self.gain.set_percent(change.value);
                Ok(())
            }
            _ => self.send(TimedMessage::immediate(SynthMessage::SetParam(change))),
        }
    }

    /// Forward a decoded MIDI event. Events the synth ignores are dropped
    /// without error.
    pub fn send_midi(&mut self, event: MidiEvent, frame: u32) -> Result<(), SynthError> {
        match midi_to_synth(event, self.channel) {
            Some(message) => self.send(TimedMessage::new(frame, message)),
            None => Ok(()),
        }
    }

    pub fn gain_percent(&self) -> f32 {
        self.gain.percent()
    }

    /// Free slots in the message ring.
    pub fn capacity_left(&self) -> usize {
        self.tx.slots()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> EngineConfig {
        EngineConfig {
            voices: 4,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let bad = [
            EngineConfig {
                sample_rate: 0.0,
                ..EngineConfig::default()
            },
            EngineConfig {
                block_size: MAX_BLOCK_SIZE + 1,
                ..EngineConfig::default()
            },
            EngineConfig {
                channels: 0,
                ..EngineConfig::default()
            },
            EngineConfig {
                voices: 0,
                ..EngineConfig::default()
            },
            EngineConfig {
                midi_channel: 16,
                ..EngineConfig::default()
            },
        ];

        for config in bad {
            assert!(matches!(
                SynthEngine::new(config),
                Err(SynthError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn engine_fills_its_pool() {
        let (engine, _handle) = SynthEngine::new(small_config()).unwrap();
        assert_eq!(engine.synth().pool().len(), 4);
        assert_eq!(engine.channels(), 2);
    }

    #[test]
    fn gain_bypasses_the_queue() {
        let (_engine, mut handle) = SynthEngine::new(small_config()).unwrap();
        let before = handle.capacity_left();

        handle
            .set_param(ParamChange::new(ParamId::Gain, 25.0))
            .unwrap();

        assert_eq!(handle.gain_percent(), 25.0);
        assert_eq!(handle.capacity_left(), before);
    }

    #[test]
    fn full_queue_reports_error() {
        let (_engine, mut handle) = SynthEngine::new(small_config()).unwrap();
        for _ in 0..MESSAGE_QUEUE_SIZE {
            handle.note_on(60, 100, 0).unwrap();
        }

        assert_eq!(handle.note_on(60, 100, 0), Err(SynthError::QueueFull));
    }

    #[test]
    fn midi_on_other_channels_is_ignored() {
        let (mut engine, mut handle) = SynthEngine::new(small_config()).unwrap();
        let event = MidiEvent::NoteOn {
            channel: 5,
            key: 60,
            velocity: 100,
        };
        handle.send_midi(event, 0).unwrap();

        let mut output = AudioOutput::new(2, 64);
        engine.process_block(&mut output, 64);

        assert_eq!(engine.active_voice_count(), 0);
    }

    #[test]
    fn ragged_channels_render_the_common_length() {
        let (mut engine, mut handle) = SynthEngine::new(small_config()).unwrap();
        handle.note_on(69, 127, 0).unwrap();

        let mut output = AudioOutput {
            buffers: vec![vec![0.0; 64], vec![0.0; 32]],
        };
        engine.process_block(&mut output, 64);

        assert_eq!(output.buffers[1][..], output.buffers[0][..32]);
        assert!(output.buffers[0][..32].iter().any(|&s| s != 0.0));
        assert!(output.buffers[0][32..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn process_block_without_channels_is_a_no_op() {
        let (mut engine, mut handle) = SynthEngine::new(small_config()).unwrap();
        handle.note_on(60, 100, 0).unwrap();

        let mut output = AudioOutput::new(0, 0);
        engine.process_block(&mut output, 64);
        assert_eq!(output.channels(), 0);
    }
}
