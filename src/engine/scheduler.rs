//! Per-block ordering of timestamped messages.
//!
//! The scheduler owns a backlog with a fixed capacity, allocated once. Each
//! block it is sorted by frame offset (stable, so messages stamped with the
//! same frame keep their arrival order), the due prefix is dispatched, and
//! whatever lies beyond the block is shifted into the next one.

use crate::synth::message::TimedMessage;

pub struct Scheduler {
    pending: Vec<TimedMessage>,
    capacity: usize,
}

impl Scheduler {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Queue a message. Hands it back if the backlog is full.
    pub fn enqueue(&mut self, event: TimedMessage) -> Result<(), TimedMessage> {
        if self.pending.len() >= self.capacity {
            return Err(event);
        }
        self.pending.push(event);
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        self.pending.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Sort by frame, preserving arrival order among equal frames.
    ///
    /// Insertion sort: the backlog is short and nearly sorted, and unlike
    /// `slice::sort` it never allocates.
    pub fn sort(&mut self) {
        for i in 1..self.pending.len() {
            let mut j = i;
            while j > 0 && self.pending[j - 1].frame > self.pending[j].frame {
                self.pending.swap(j - 1, j);
                j -= 1;
            }
        }
    }

    /// Number of sorted messages that fall inside a block of `frames`.
    pub fn due(&self, frames: usize) -> usize {
        self.pending
            .iter()
            .take_while(|e| (e.frame as usize) < frames)
            .count()
    }

    pub fn get(&self, index: usize) -> Option<TimedMessage> {
        self.pending.get(index).copied()
    }

    /// Drop the first `dispatched` messages and move the rest one block
    /// closer.
    pub fn advance(&mut self, dispatched: usize, frames: usize) {
        self.pending.drain(..dispatched.min(self.pending.len()));

        let frames = frames as u32;
        for event in &mut self.pending {
            event.frame = event.frame.saturating_sub(frames);
        }
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::message::SynthMessage;

    fn note_on(frame: u32, note: u8) -> TimedMessage {
        TimedMessage::new(frame, SynthMessage::NoteOn { note, velocity: 100 })
    }

    fn notes(scheduler: &Scheduler) -> Vec<(u32, u8)> {
        (0..scheduler.len())
            .filter_map(|i| scheduler.get(i))
            .map(|e| match e.message {
                SynthMessage::NoteOn { note, .. } => (e.frame, note),
                _ => unreachable!(),
            })
            .collect()
    }

    #[test]
    fn sorts_by_frame_and_keeps_ties_in_order() {
        let mut scheduler = Scheduler::with_capacity(8);
        for (frame, note) in [(10, 1), (0, 2), (10, 3), (5, 4), (0, 5)] {
            scheduler.enqueue(note_on(frame, note)).unwrap();
        }

        scheduler.sort();

        assert_eq!(notes(&scheduler), vec![(0, 2), (0, 5), (5, 4), (10, 1), (10, 3)]);
    }

    #[test]
    fn due_counts_only_this_block() {
        let mut scheduler = Scheduler::with_capacity(8);
        for (frame, note) in [(3, 1), (63, 2), (64, 3), (200, 4)] {
            scheduler.enqueue(note_on(frame, note)).unwrap();
        }
        scheduler.sort();

        assert_eq!(scheduler.due(64), 2);
    }

    #[test]
    fn late_messages_carry_into_next_block() {
        let mut scheduler = Scheduler::with_capacity(8);
        scheduler.enqueue(note_on(5, 1)).unwrap();
        scheduler.enqueue(note_on(70, 2)).unwrap();
        scheduler.sort();

        let due = scheduler.due(64);
        scheduler.advance(due, 64);

        assert_eq!(notes(&scheduler), vec![(6, 2)]);
    }

    #[test]
    fn refuses_past_capacity() {
        let mut scheduler = Scheduler::with_capacity(2);
        scheduler.enqueue(note_on(0, 1)).unwrap();
        scheduler.enqueue(note_on(0, 2)).unwrap();

        assert!(scheduler.is_full());
        assert_eq!(scheduler.enqueue(note_on(0, 3)), Err(note_on(0, 3)));
    }
}
