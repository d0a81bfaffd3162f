/// Channel voice messages the synth understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// Signed bend, -8192 ..= 8191 with 0 at center.
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

/// Controller number for "All Notes Off".
pub const CC_ALL_NOTES_OFF: u8 = 123;

/// Pitch wheel center in the raw 14-bit encoding.
const PITCH_BEND_CENTER: i16 = 8192;

impl MidiEvent {
    /// Decode a raw channel voice message.
    ///
    /// Returns `None` for truncated messages, running status and message
    /// types the synth ignores (aftertouch, system messages). Data bytes are
    /// masked to 7 bits.
    pub fn from_bytes(message: &[u8]) -> Option<Self> {
        let status = *message.first()?;
        let channel = status & 0x0F;
        let data = |i: usize| message.get(i).map(|b| b & 0x7F);

        match status & 0xF0 {
            0x80 => Some(Self::NoteOff {
                channel,
                key: data(1)?,
                velocity: data(2)?,
            }),
            0x90 => Some(Self::NoteOn {
                channel,
                key: data(1)?,
                velocity: data(2)?,
            }),
            0xB0 => Some(Self::ControlChange {
                channel,
                controller: data(1)?,
                value: data(2)?,
            }),
            0xC0 => Some(Self::ProgramChange {
                channel,
                program: data(1)?,
            }),
            0xE0 => {
                let lsb = data(1)? as i16;
                let msb = data(2)? as i16;
                Some(Self::PitchBend {
                    channel,
                    value: ((msb << 7) | lsb) - PITCH_BEND_CENTER,
                })
            }
            _ => None,
        }
    }

    pub fn channel(&self) -> u8 {
        match *self {
            Self::NoteOn { channel, .. }
            | Self::NoteOff { channel, .. }
            | Self::ControlChange { channel, .. }
            | Self::PitchBend { channel, .. }
            | Self::ProgramChange { channel, .. } => channel,
        }
    }
}
