//! Shared state types for UI communication
//!
//! Static data is handed over once at startup; per-callback updates are
//! `Copy` and allocation-free so the audio thread can send them.

use midisynth::{engine::allocator::VoiceSnapshot, synth::VoiceState, DEFAULT_VOICES};

/// Number of voice meters an update can carry
pub const MAX_METERS: usize = DEFAULT_VOICES;

/// Static state sent once at initialization (can allocate)
#[derive(Clone, Debug)]
pub struct UiStateInit {
    /// Audio sample rate in Hz
    pub sample_rate: f32,
    pub channels: usize,
    pub block_size: usize,
    /// Size of the voice pool
    pub voices: usize,
}

/// Dynamic state update sent from audio thread (allocation-free, Copy)
#[derive(Clone, Copy, Debug)]
pub struct UiStateUpdate {
    pub voices: [VoiceMeter; MAX_METERS],
    /// Number of meters filled in
    pub num_voices: u8,
}

/// One voice slot as the meters see it (Copy, no allocations)
#[derive(Clone, Copy, Debug, Default)]
pub struct VoiceMeter {
    pub busy: bool,
    pub releasing: bool,
    /// Current envelope level (0.0-1.0)
    pub level: f32,
    /// Current note (0 = none)
    pub note: u8,
}

impl UiStateUpdate {
    pub fn new() -> Self {
        Self {
            voices: [VoiceMeter::default(); MAX_METERS],
            num_voices: 0,
        }
    }

    pub fn active_count(&self) -> usize {
        self.meters().iter().filter(|m| m.busy).count()
    }

    pub fn meters(&self) -> &[VoiceMeter] {
        &self.voices[..self.num_voices as usize]
    }
}

impl Default for UiStateUpdate {
    fn default() -> Self {
        Self::new()
    }
}

impl From<VoiceSnapshot> for VoiceMeter {
    fn from(snapshot: VoiceSnapshot) -> Self {
        Self {
            busy: snapshot.state != VoiceState::Free,
            releasing: snapshot.state == VoiceState::Releasing,
            level: snapshot.level,
            note: snapshot.note.unwrap_or(0),
        }
    }
}
