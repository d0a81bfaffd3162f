use crate::synth::params::ParamChange;

/// Ring capacity between the control thread and the audio thread.
pub const MESSAGE_QUEUE_SIZE: usize = 1024;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8, velocity: u8 },
    /// Normalized bend, -1.0 ..= 1.0, scaled by the synth's bend range.
    PitchBend { bend: f32 },
    AllNotesOff,
    SetParam(ParamChange),
}

/// A message stamped with the frame inside the block where it takes effect.
///
/// Frames at or past the end of the block carry over to the next block with
/// the block length subtracted.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TimedMessage {
    pub frame: u32,
    pub message: SynthMessage,
}

impl TimedMessage {
    pub fn new(frame: u32, message: SynthMessage) -> Self {
        Self { frame, message }
    }

    /// A message that applies at the start of the next block.
    pub fn immediate(message: SynthMessage) -> Self {
        Self { frame: 0, message }
    }
}

impl From<SynthMessage> for TimedMessage {
    fn from(message: SynthMessage) -> Self {
        Self::immediate(message)
    }
}
