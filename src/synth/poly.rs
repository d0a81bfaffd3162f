use rtrb::Consumer;

use crate::{
    engine::{
        allocator::{StealPolicy, VoicePool, VoiceSnapshot},
        scheduler::Scheduler,
    },
    error::SynthError,
    synth::{
        factory::VoiceFactory,
        message::{SynthMessage, TimedMessage, MESSAGE_QUEUE_SIZE},
        params::EnvelopeParams,
        voice::SynthVoice,
    },
};

/// Default pitch wheel range, in semitones each way.
pub const DEFAULT_BEND_RANGE: f32 = 2.0;

/// Block-based polyphonic renderer.
///
/// Owns the voice pool and the consumer end of the message ring. Messages are
/// applied at their frame offset inside the block, so a note-on stamped at
/// frame 17 starts sounding at sample 17, not at the next block boundary.
pub struct PolySynth<V: SynthVoice> {
    pool: VoicePool<V>,
    rx: Consumer<TimedMessage>,
    scheduler: Scheduler,
    params: EnvelopeParams,
    /// Current bend in semitones
    pitch_bend: f32,
    bend_range: f32,
    sample_rate: f32,
    block_size: usize,
    /// Set by the first rendered block; the pool is fixed from then on
    started: bool,
}

impl<V: SynthVoice> PolySynth<V> {
    pub fn new(
        sample_rate: f32,
        block_size: usize,
        max_voices: usize,
        policy: StealPolicy,
        rx: Consumer<TimedMessage>,
    ) -> Self {
        Self {
            pool: VoicePool::with_capacity(max_voices, policy),
            rx,
            scheduler: Scheduler::with_capacity(MESSAGE_QUEUE_SIZE),
            params: EnvelopeParams::default(),
            pitch_bend: 0.0,
            bend_range: DEFAULT_BEND_RANGE,
            sample_rate,
            block_size,
            started: false,
        }
    }

    /// Register one voice. Only allowed before the first block.
    pub fn add_voice(&mut self, voice: V) -> Result<usize, SynthError> {
        if self.started {
            return Err(SynthError::PoolFrozen);
        }
        self.pool.add_voice(voice)
    }

    /// Fill every remaining slot from `factory`, returning how many voices
    /// were added.
    pub fn fill<F>(&mut self, factory: &F) -> Result<usize, SynthError>
    where
        F: VoiceFactory<Voice = V>,
    {
        let mut added = 0;
        while self.pool.len() < self.pool.capacity() {
            self.add_voice(factory.create_voice())?;
            added += 1;
        }
        Ok(added)
    }

    /// Queue a message from the thread that owns the synth.
    ///
    /// Other threads go through the ring instead (see `SynthHandle`).
    pub fn add_midi_event(&mut self, event: TimedMessage) -> Result<(), SynthError> {
        self.scheduler
            .enqueue(event)
            .map_err(|_| SynthError::QueueFull)
    }

    pub fn set_sample_rate_and_block_size(&mut self, sample_rate: f32, block_size: usize) {
        self.sample_rate = sample_rate;
        self.block_size = block_size;
        self.pool.set_sample_rate(sample_rate);
    }

    pub fn set_bend_range(&mut self, semitones: f32) {
        self.bend_range = semitones;
    }

    /// Replace the envelope settings on every voice slot.
    pub fn set_envelope(&mut self, params: EnvelopeParams) {
        self.params = params;
        for change in params.changes() {
            self.pool.broadcast(change);
        }
    }

    /// Silence everything and drop pending messages.
    pub fn reset(&mut self) {
        self.pool.reset();
        self.scheduler.clear();
        self.pitch_bend = 0.0;
    }

    /// Render one block of mono audio into `out`.
    pub fn render_block(&mut self, out: &mut [f32]) {
        self.started = true;
        out.fill(0.0);
        let frames = out.len();

        // Pull what the backlog has room for; anything else waits in the ring
        while !self.scheduler.is_full() {
            let Ok(event) = self.rx.pop() else {
                break;
            };
            let _ = self.scheduler.enqueue(event);
        }
        self.scheduler.sort();

        let due = self.scheduler.due(frames);
        let mut cursor = 0;
        for index in 0..due {
            let Some(event) = self.scheduler.get(index) else {
                break;
            };

            let at = event.frame as usize;
            if at > cursor {
                self.pool.render(out, cursor, at - cursor, self.pitch_bend);
                cursor = at;
            }
            self.handle_message(event.message);
        }
        self.pool
            .render(out, cursor, frames - cursor, self.pitch_bend);

        self.scheduler.advance(due, frames);
    }

    fn handle_message(&mut self, message: SynthMessage) {
        match message {
            SynthMessage::NoteOn { note, velocity: 0 } | SynthMessage::NoteOff { note, .. } => {
                self.pool.note_off(note);
            }
            SynthMessage::NoteOn { note, velocity } => {
                let level = velocity.min(127) as f32 / 127.0;
                self.pool.note_on(note, level);
            }
            SynthMessage::PitchBend { bend } => {
                self.pitch_bend = bend * self.bend_range;
            }
            SynthMessage::AllNotesOff => self.pool.all_notes_off(),
            SynthMessage::SetParam(change) => {
                if self.params.apply(change) {
                    self.pool.broadcast(change);
                }
            }
        }
    }

    pub fn active_voice_count(&self) -> usize {
        self.pool.active_count()
    }

    pub fn voice_states(&self) -> impl Iterator<Item = VoiceSnapshot> + '_ {
        self.pool.snapshots()
    }

    pub fn pool(&self) -> &VoicePool<V> {
        &self.pool
    }

    pub fn params(&self) -> &EnvelopeParams {
        &self.params
    }

    /// Current bend in semitones.
    pub fn pitch_bend(&self) -> f32 {
        self.pitch_bend
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }
}
