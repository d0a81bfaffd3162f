pub mod dsp; // Oscillator, envelope and gain primitives
pub mod engine; // Host-facing engine, voice pool, event scheduling
pub mod error;
pub mod io;
pub mod synth; // Voices, polyphony, MIDI messages

pub use engine::{EngineConfig, SynthEngine, SynthHandle};
pub use error::SynthError;

pub const MAX_BLOCK_SIZE: usize = 2048;
pub const DEFAULT_VOICES: usize = 32;
