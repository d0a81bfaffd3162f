//! Status bar widget - engine settings, polyphony and audio stats

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{UiStateInit, UiStateUpdate};

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    /// Compute audio stats from a buffer
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

/// Everything the status bar shows that the UI owns
pub struct ControlStatus {
    pub octave: i8,
    pub gain_percent: f32,
    pub bend: f32,
}

pub fn render_transport(
    frame: &mut Frame,
    area: Rect,
    static_state: &UiStateInit,
    dynamic_state: &UiStateUpdate,
    controls: &ControlStatus,
    audio_stats: &AudioStats,
) {
    let block = Block::default().title(" midisynth ").borders(Borders::ALL);

    let active = dynamic_state.active_count();
    let voice_color = if active >= static_state.voices {
        Color::Red
    } else if active > 0 {
        Color::Green
    } else {
        Color::DarkGray
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" Voices: {}/{}  ", active, static_state.voices),
            Style::default().fg(voice_color),
        ),
        Span::styled(
            format!("Octave: {}  ", controls.octave),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("Gain: {:.0}%  ", controls.gain_percent),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("Bend: {:+.1}  ", controls.bend),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!(
                "{:.1}kHz/{}ch/{}  ",
                static_state.sample_rate / 1000.0,
                static_state.channels,
                static_state.block_size
            ),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", audio_stats.peak, audio_stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
