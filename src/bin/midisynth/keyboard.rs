//! Computer keyboard as a piano.
//!
//! Two rows, laid out like a tracker:
//!
//! ```text
//!   w e   t y u   o p
//!  a s d f g h j k l ;
//! ```
//!
//! `a` is C of the current octave. Terminals report key presses but not
//! releases, so every note is held for a fixed time and then released.

use std::time::{Duration, Instant};

/// How long a key press holds its note
pub const HOLD_TIME: Duration = Duration::from_millis(450);

const KEYS: [char; 17] = [
    'a', 'w', 's', 'e', 'd', 'f', 't', 'g', 'y', 'h', 'u', 'j', 'k', 'o', 'l', 'p', ';',
];

const NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

pub const MIN_OCTAVE: i8 = 0;
pub const MAX_OCTAVE: i8 = 8;

/// MIDI note for `key` with `a` mapped to C in `octave` (C4 = 60).
pub fn note_for_key(key: char, octave: i8) -> Option<u8> {
    let offset = KEYS.iter().position(|&k| k == key)? as i16;
    let note = (octave as i16 + 1) * 12 + offset;
    u8::try_from(note).ok().filter(|&n| n <= 127)
}

/// Scientific pitch name, e.g. `A4` for 69.
pub fn note_name(note: u8) -> String {
    let octave = note as i16 / 12 - 1;
    format!("{}{}", NAMES[note as usize % 12], octave)
}

/// Notes waiting for their automatic release.
pub struct Keyboard {
    octave: i8,
    held: Vec<(u8, Instant)>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            octave: 4,
            held: Vec::new(),
        }
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    pub fn shift_octave(&mut self, delta: i8) {
        self.octave = (self.octave + delta).clamp(MIN_OCTAVE, MAX_OCTAVE);
    }

    /// Register a press. Returns the note to start.
    pub fn press(&mut self, key: char, now: Instant) -> Option<u8> {
        let note = note_for_key(key, self.octave)?;
        let until = now + HOLD_TIME;

        // Auto-repeat extends the hold
        match self.held.iter_mut().find(|(n, _)| *n == note) {
            Some(entry) => entry.1 = until,
            None => self.held.push((note, until)),
        }
        Some(note)
    }

    /// Remove and return notes whose hold has run out.
    pub fn expired(&mut self, now: Instant) -> Vec<u8> {
        let mut released = Vec::new();
        self.held.retain(|&(note, until)| {
            if until <= now {
                released.push(note);
                false
            } else {
                true
            }
        });
        released
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}
