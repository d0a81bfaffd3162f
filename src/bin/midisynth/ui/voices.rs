//! Per-slot voice meters

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::keyboard::note_name;

use super::UiStateUpdate;

const BAR_WIDTH: usize = 20;

pub fn render_voices(frame: &mut Frame, area: Rect, state: &UiStateUpdate) {
    let block = Block::default().title(" Voices ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Two columns when the pool does not fit in one
    let rows = inner.height.max(1) as usize;
    let meters = state.meters();
    let columns = meters.len().div_ceil(rows).max(1);
    let column_width = inner.width / columns as u16;

    for (column, chunk) in meters.chunks(rows).enumerate() {
        let lines: Vec<Line> = chunk
            .iter()
            .enumerate()
            .map(|(row, meter)| {
                let slot = column * rows + row;
                let filled = ((meter.level.clamp(0.0, 1.0)) * BAR_WIDTH as f32).round() as usize;
                let (label, color) = match (meter.busy, meter.releasing) {
                    (false, _) => ("--".to_string(), Color::DarkGray),
                    (true, false) => (note_name(meter.note), Color::Green),
                    (true, true) => (note_name(meter.note), Color::Yellow),
                };

                Line::from(vec![
                    Span::styled(format!("{slot:>2} "), Style::default().fg(Color::DarkGray)),
                    Span::styled(format!("{label:<4}"), Style::default().fg(color)),
                    Span::styled("█".repeat(filled), Style::default().fg(color)),
                    Span::raw(" ".repeat(BAR_WIDTH - filled)),
                ])
            })
            .collect();

        let column_area = Rect {
            x: inner.x + column as u16 * column_width,
            y: inner.y,
            width: column_width,
            height: inner.height,
        };
        frame.render_widget(Paragraph::new(lines), column_area);
    }
}
