//! Audio setup: opens the output device and moves the engine into the
//! callback. The UI keeps the `SynthHandle`.

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;

use midisynth::{io::AudioOutput, EngineConfig, SynthEngine, MAX_BLOCK_SIZE};

use super::ui::{
    state::{UiStateInit, UiStateUpdate, VoiceMeter, MAX_METERS},
    UiApp,
};

/// Samples buffered for the oscilloscope
const SCOPE_RING_SIZE: usize = 8192;
/// Voice snapshots buffered for the meters
const STATE_RING_SIZE: usize = 64;

pub struct MidiSynth {
    config: EngineConfig,
}

impl MidiSynth {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Open the default output device and run the UI until the user quits.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let supported = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let channels = supported.channels() as usize;
        let config = EngineConfig {
            sample_rate: supported.sample_rate().0 as f32,
            channels,
            block_size: self.config.block_size.min(MAX_BLOCK_SIZE),
            ..self.config
        };

        let (mut engine, handle) =
            SynthEngine::new(config.clone()).wrap_err("failed to build synth engine")?;

        let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_RING_SIZE);
        let (mut state_tx, state_rx) = RingBuffer::<UiStateUpdate>::new(STATE_RING_SIZE);

        let block_size = config.block_size;
        let mut output = AudioOutput::new(channels, block_size);

        let stream = device.build_output_stream(
            &supported.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames = (total_frames - frames_written).min(block_size);
                    engine.process_block(&mut output, frames);

                    // Interleave
                    let offset = frames_written * channels;
                    for i in 0..frames {
                        for (ch, buffer) in output.buffers.iter().enumerate() {
                            data[offset + i * channels + ch] = buffer[i];
                        }
                    }

                    // Scope readback; drop samples when the UI falls behind
                    for &sample in &output.buffers[0][..frames] {
                        if scope_tx.push(sample).is_err() {
                            break;
                        }
                    }

                    frames_written += frames;
                }

                let mut update = UiStateUpdate::new();
                for (meter, voice) in update.voices.iter_mut().zip(engine.voice_states()) {
                    *meter = VoiceMeter::from(voice);
                    update.num_voices += 1;
                }
                let _ = state_tx.push(update);
            },
            |err| log::error!("audio stream error: {err}"),
            None,
        )?;

        stream.play().wrap_err("failed to start audio stream")?;

        let init = UiStateInit {
            sample_rate: config.sample_rate,
            channels,
            block_size,
            voices: config.voices.min(MAX_METERS),
        };

        let mut terminal = ratatui::init();
        let result = UiApp::new(handle, scope_rx, state_rx, init).run(&mut terminal);
        ratatui::restore();

        drop(stream);
        result
    }
}
