//! midisynth - terminal keyboard synthesizer
//!
//! Run with: cargo run

mod app;
mod keyboard;
mod ui;

use std::{fs::File, path::PathBuf};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use env_logger::{Builder, Env, Target};

use app::MidiSynth;
use midisynth::{dsp::OscillatorWaveform, EngineConfig};

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let log_path = init_logging()?;

    let config = EngineConfig {
        block_size: 256,
        waveform: OscillatorWaveform::Sine,
        gain_percent: 30.0,
        ..EngineConfig::default()
    };

    let result = MidiSynth::new(config).run();
    println!("Log written to {}", log_path.display());
    result
}

/// The TUI owns the terminal, so log records go to a file instead.
fn init_logging() -> EyreResult<PathBuf> {
    let path = std::env::temp_dir().join("midisynth.log");
    let file = File::create(&path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;

    file_logger(file)
        .try_init()
        .map_err(|err| eyre!("failed to install logger: {err}"))?;
    Ok(path)
}

fn file_logger(file: File) -> Builder {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.target(Target::Pipe(Box::new(file)));
    builder
}
