use crate::synth::voice::SynthVoice;

/// Factory for filling a voice pool with identically configured voices.
///
/// This is the "instrument design" layer - you configure your sound once,
/// then the pool is populated from it at startup.
pub trait VoiceFactory {
    type Voice: SynthVoice;

    fn create_voice(&self) -> Self::Voice;
}

impl<F, T> VoiceFactory for F
where
    F: Fn() -> T,
    T: SynthVoice,
{
    type Voice = T;

    fn create_voice(&self) -> Self::Voice {
        self()
    }
}
