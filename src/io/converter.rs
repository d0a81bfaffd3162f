use crate::{
    io::midi::{MidiEvent, CC_ALL_NOTES_OFF},
    synth::message::SynthMessage,
};

/// Half the 14-bit pitch bend range.
const PITCH_BEND_CENTER: f32 = 8192.0;

/// Translate a decoded MIDI event into a synth message.
///
/// Events on other channels, controllers other than all-notes-off, and
/// program changes yield `None`.
pub fn midi_to_synth(midi: MidiEvent, channel_filter: u8) -> Option<SynthMessage> {
    if midi.channel() != channel_filter {
        return None;
    }

    match midi {
        // Running-status keyboards send note-on with velocity 0 as a release
        MidiEvent::NoteOn { key, velocity: 0, .. } => Some(SynthMessage::NoteOff {
            note: key,
            velocity: 0,
        }),
        MidiEvent::NoteOn { key, velocity, .. } => Some(SynthMessage::NoteOn {
            note: key,
            velocity,
        }),
        MidiEvent::NoteOff { key, velocity, .. } => Some(SynthMessage::NoteOff {
            note: key,
            velocity,
        }),
        MidiEvent::ControlChange { controller, .. } if controller == CC_ALL_NOTES_OFF => {
            Some(SynthMessage::AllNotesOff)
        }
        MidiEvent::PitchBend { value, .. } => Some(SynthMessage::PitchBend {
            bend: (value as f32 / PITCH_BEND_CENTER).clamp(-1.0, 1.0),
        }),
        _ => None,
    }
}
