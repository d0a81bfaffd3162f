//! TUI module for midisynth
//!
//! Turns key presses into synth messages and shows what the voices are
//! doing.

pub mod state;
mod transport;
mod voices;
mod waveform;

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;

use midisynth::{
    synth::{ParamChange, ParamId},
    SynthError, SynthHandle,
};

pub use state::{UiStateInit, UiStateUpdate};

use crate::keyboard::Keyboard;
use transport::{render_transport, AudioStats, ControlStatus};
use voices::render_voices;
use waveform::render_waveform;

/// Audio visualization buffer size
const VIS_BUFFER_SIZE: usize = 1024;

const VELOCITY: u8 = 100;
const GAIN_STEP: f32 = 5.0;

/// UI application state
pub struct UiApp {
    handle: SynthHandle,
    /// Ring buffer receiver for audio samples
    audio_rx: Consumer<f32>,
    /// Ring buffer receiver for voice meter updates
    state_rx: Consumer<UiStateUpdate>,
    init: UiStateInit,
    /// Latest meter update
    current_state: UiStateUpdate,
    audio_buffer: Vec<f32>,
    keyboard: Keyboard,
    gain_percent: f32,
    bend: f32,
    /// Time the bend snaps back to center
    bend_until: Option<Instant>,
    last_error: Option<SynthError>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        handle: SynthHandle,
        audio_rx: Consumer<f32>,
        state_rx: Consumer<UiStateUpdate>,
        init: UiStateInit,
    ) -> Self {
        let gain_percent = handle.gain_percent();
        Self {
            handle,
            audio_rx,
            state_rx,
            init,
            current_state: UiStateUpdate::new(),
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            keyboard: Keyboard::new(),
            gain_percent,
            bend: 0.0,
            bend_until: None,
            last_error: None,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_state();
            self.release_expired(Instant::now());

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, Instant::now());
                    }
                }
            }
        }

        // Leave nothing hanging on the way out
        let _ = self.handle.all_notes_off();
        Ok(())
    }

    /// Poll for new audio samples from ring buffer
    fn poll_audio(&mut self) {
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
        }

        if self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
    }

    /// Keep only the latest meter update
    fn poll_state(&mut self) {
        while let Ok(state) = self.state_rx.pop() {
            self.current_state = state;
        }
    }

    fn release_expired(&mut self, now: Instant) {
        for note in self.keyboard.expired(now) {
            self.record(|handle| handle.note_off(note, 0));
        }

        if self.bend_until.is_some_and(|until| until <= now) {
            self.bend_until = None;
            self.set_bend(0.0);
        }
    }

    fn handle_key(&mut self, key: KeyCode, now: Instant) {
        match key {
            KeyCode::Esc | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Char('z') => self.keyboard.shift_octave(-1),
            KeyCode::Char('x') => self.keyboard.shift_octave(1),
            KeyCode::Char(' ') => {
                self.keyboard.clear();
                self.record(SynthHandle::all_notes_off);
            }
            KeyCode::Up => self.set_gain(self.gain_percent + GAIN_STEP),
            KeyCode::Down => self.set_gain(self.gain_percent - GAIN_STEP),
            KeyCode::Left | KeyCode::Right => {
                let bend = if key == KeyCode::Left { -1.0 } else { 1.0 };
                self.bend_until = Some(now + crate::keyboard::HOLD_TIME);
                self.set_bend(bend);
            }
            KeyCode::Char(c) => {
                if let Some(note) = self.keyboard.press(c, now) {
                    self.record(|handle| handle.note_on(note, VELOCITY, 0));
                }
            }
            _ => {}
        }
    }

    fn set_gain(&mut self, percent: f32) {
        self.gain_percent = percent.clamp(0.0, 100.0);
        let change = ParamChange::new(ParamId::Gain, self.gain_percent);
        self.record(|handle| handle.set_param(change));
    }

    fn set_bend(&mut self, bend: f32) {
        self.bend = bend;
        self.record(|handle| handle.pitch_bend(bend, 0));
    }

    /// Run a handle call and keep its error for the help bar
    fn record<F>(&mut self, send: F)
    where
        F: FnOnce(&mut SynthHandle) -> Result<(), SynthError>,
    {
        if let Err(err) = send(&mut self.handle) {
            self.last_error = Some(err);
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Status bar
                Constraint::Min(6),     // Voice meters
                Constraint::Length(10), // Waveform
                Constraint::Length(1),  // Help bar
            ])
            .split(area);

        let stats = AudioStats::from_buffer(&self.audio_buffer);
        let controls = ControlStatus {
            octave: self.keyboard.octave(),
            gain_percent: self.gain_percent,
            bend: self.bend,
        };
        render_transport(
            frame,
            chunks[0],
            &self.init,
            &self.current_state,
            &controls,
            &stats,
        );

        render_voices(frame, chunks[1], &self.current_state);
        render_waveform(frame, chunks[2], &self.audio_buffer);

        let help = match &self.last_error {
            Some(err) => Paragraph::new(format!(" {err}")).style(Style::default().fg(Color::Red)),
            None => Paragraph::new(
                " [a-;] Play  [z/x] Octave  [←/→] Bend  [↑/↓] Gain  [Space] All off  [Esc] Quit",
            )
            .style(Style::default().fg(Color::DarkGray)),
        };
        frame.render_widget(help, chunks[3]);
    }
}
