//! Fixed pool of voices and the policy that hands them out.
//!
//! # Allocation
//!
//! On note-on the pool looks for a slot in this order:
//!
//! 1. A busy voice already sounding the same note. It is retriggered rather
//!    than doubled, so a repeated key never stacks two voices.
//! 2. The lowest-indexed idle voice.
//! 3. A victim chosen by the [`StealPolicy`].
//!
//! Stealing is deterministic: the same sequence of events always picks the
//! same slot. Every trigger stamps its slot with a monotonically increasing
//! age, and all ties resolve to the lowest slot index.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::SynthError,
    synth::{
        params::ParamChange,
        voice::{SynthVoice, VoiceState},
    },
};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StealPolicy {
    /// Oldest releasing voice, else the oldest voice overall.
    #[default]
    Oldest,
    /// Quietest releasing voice, else the quietest voice overall.
    Quietest,
}

/// Copyable view of one slot for meters and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceSnapshot {
    pub state: VoiceState,
    pub note: Option<u8>,
    pub level: f32,
}

struct VoiceSlot<V> {
    voice: V,
    // Trigger order; larger is newer
    age: u64,
}

pub struct VoicePool<V: SynthVoice> {
    slots: Vec<VoiceSlot<V>>,
    capacity: usize,
    policy: StealPolicy,
    trigger_count: u64,
}

impl<V: SynthVoice> VoicePool<V> {
    /// Reserve room for `capacity` voices. Slots are added with
    /// [`VoicePool::add_voice`] and never removed.
    pub fn with_capacity(capacity: usize, policy: StealPolicy) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            policy,
            trigger_count: 0,
        }
    }

    /// Register a voice and return its slot index.
    pub fn add_voice(&mut self, voice: V) -> Result<usize, SynthError> {
        if self.slots.len() >= self.capacity {
            return Err(SynthError::PoolFull {
                capacity: self.capacity,
            });
        }

        self.slots.push(VoiceSlot { voice, age: 0 });
        Ok(self.slots.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> StealPolicy {
        self.policy
    }

    /// Trigger `note` at `level` and return the slot that plays it.
    ///
    /// Returns `None` only when the pool has no voices at all.
    pub fn note_on(&mut self, note: u8, level: f32) -> Option<usize> {
        let index = self.select_slot(note)?;

        self.trigger_count += 1;
        let slot = &mut self.slots[index];
        slot.age = self.trigger_count;

        let is_retrigger = slot.voice.is_busy();
        slot.voice.trigger(note, level, is_retrigger);

        Some(index)
    }

    /// Release every held voice sounding `note`. Voices already releasing
    /// are left alone, so a repeated note-off changes nothing.
    ///
    /// Returns how many voices were released.
    pub fn note_off(&mut self, note: u8) -> usize {
        let mut released = 0;
        for slot in &mut self.slots {
            let voice = &mut slot.voice;
            if voice.is_busy() && !voice.is_released() && voice.note() == Some(note) {
                voice.release();
                released += 1;
            }
        }
        released
    }

    pub fn all_notes_off(&mut self) {
        for slot in &mut self.slots {
            if slot.voice.is_busy() {
                slot.voice.release();
            }
        }
    }

    /// Hard-stop every voice.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.voice.reset();
        }
    }

    /// Slot the next note-on for `note` would use.
    pub fn select_slot(&self, note: u8) -> Option<usize> {
        if self.slots.is_empty() {
            return None;
        }

        let same_note = self
            .slots
            .iter()
            .position(|s| s.voice.is_busy() && s.voice.note() == Some(note));
        if same_note.is_some() {
            return same_note;
        }

        let free = self.slots.iter().position(|s| !s.voice.is_busy());
        if free.is_some() {
            return free;
        }

        // Pool exhausted: steal, and never come back empty-handed
        Some(self.steal_candidate().unwrap_or(0))
    }

    fn steal_candidate(&self) -> Option<usize> {
        let released = || {
            self.slots
                .iter()
                .enumerate()
                .filter(|(_, s)| s.voice.is_released())
        };
        let all = || self.slots.iter().enumerate();

        // min_by_key/min_by return the first minimum, i.e. the lowest index
        let pick = match self.policy {
            StealPolicy::Oldest => released()
                .min_by_key(|(_, s)| s.age)
                .or_else(|| all().min_by_key(|(_, s)| s.age)),
            StealPolicy::Quietest => released()
                .min_by(|(_, a), (_, b)| a.voice.level().total_cmp(&b.voice.level()))
                .or_else(|| {
                    all().min_by(|(_, a), (_, b)| a.voice.level().total_cmp(&b.voice.level()))
                }),
        };

        pick.map(|(index, _)| index)
    }

    /// Render every busy voice into `out[start..start + frames]`.
    pub fn render(&mut self, out: &mut [f32], start: usize, frames: usize, pitch_bend: f32) {
        if frames == 0 {
            return;
        }

        for slot in &mut self.slots {
            if slot.voice.is_busy() {
                slot.voice.process_samples(out, start, frames, pitch_bend);
            }
        }
    }

    /// Apply a parameter change to every slot.
    pub fn broadcast(&mut self, change: ParamChange) {
        for slot in &mut self.slots {
            slot.voice.set_param(change);
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        for slot in &mut self.slots {
            slot.voice.set_sample_rate(sample_rate);
        }
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.voice.is_busy()).count()
    }

    pub fn voice(&self, index: usize) -> Option<&V> {
        self.slots.get(index).map(|s| &s.voice)
    }

    pub fn voices(&self) -> impl Iterator<Item = &V> + '_ {
        self.slots.iter().map(|s| &s.voice)
    }

    pub fn snapshots(&self) -> impl Iterator<Item = VoiceSnapshot> + '_ {
        self.slots.iter().map(|s| VoiceSnapshot {
            state: s.voice.state(),
            note: s.voice.note(),
            level: s.voice.level(),
        })
    }
}
