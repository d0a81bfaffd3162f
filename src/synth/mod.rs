// Purpose: Voices, polyphony, MIDI handling
// This layer sits above the DSP primitives and manages multiple voices

pub mod factory;
pub mod message;
pub mod params;
pub mod poly;
pub mod voice;

pub use message::{SynthMessage, TimedMessage};
pub use params::{EnvelopeParams, ParamChange, ParamId};
pub use poly::PolySynth;
pub use voice::{OscVoice, SynthVoice, VoiceState};
