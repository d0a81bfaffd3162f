//! Errors for setup and control paths.
//!
//! Nothing on the audio thread returns these. Rendering resolves every
//! problem by policy (ignore, steal, clamp); only construction, voice
//! registration and the cross-thread handle can fail.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SynthError {
    /// Engine configuration rejected by `EngineConfig::validate`.
    InvalidConfig(&'static str),
    /// The message ring to the audio thread has no free slot.
    QueueFull,
    /// Voices can only be added before the first block is rendered.
    PoolFrozen,
    /// The pool already holds as many voices as it was created for.
    PoolFull { capacity: usize },
}

impl fmt::Display for SynthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthError::InvalidConfig(reason) => write!(f, "invalid engine config: {reason}"),
            SynthError::QueueFull => write!(f, "synth message queue is full"),
            SynthError::PoolFrozen => write!(f, "voice pool is frozen once rendering has started"),
            SynthError::PoolFull { capacity } => {
                write!(f, "voice pool is full ({capacity} voices)")
            }
        }
    }
}

impl std::error::Error for SynthError {}
