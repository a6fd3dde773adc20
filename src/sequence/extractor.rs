// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Pairs note on and note off events into bounded intervals and assigns voice slots.

use std::collections::HashMap;

use tracing::warn;

use super::event::{EventKind, RawEvent};
use crate::error::SequenceError;
use crate::playback::VoicePool;

/// A note with a known start and end, bound to a voice slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteInterval {
    note: u8,
    velocity: u8,
    start_tick: u64,
    end_tick: u64,
    voice: usize,
}

impl NoteInterval {
    /// Creates a new note interval.
    pub fn new(note: u8, velocity: u8, start_tick: u64, end_tick: u64, voice: usize) -> Self {
        Self {
            note,
            velocity,
            start_tick,
            end_tick,
            voice,
        }
    }

    /// Gets the MIDI note number.
    pub fn note(&self) -> u8 {
        self.note
    }

    /// Gets the note on velocity.
    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    /// Gets the tick the note starts at.
    pub fn start_tick(&self) -> u64 {
        self.start_tick
    }

    /// Gets the tick the note ends at.
    pub fn end_tick(&self) -> u64 {
        self.end_tick
    }

    /// Gets the voice slot the note plays on.
    pub fn voice(&self) -> usize {
        self.voice
    }
}

/// A note on that has not been closed yet.
struct PendingNote {
    velocity: u8,
    start_tick: u64,
    voice: usize,
}

/// Builds note intervals from a track's event stream.
///
/// Each sounding note holds one voice slot. A new note takes the lowest free slot, so N
/// overlapping notes occupy exactly slots 0..N and a slot is reused once its note ends.
struct NoteEventExtractor<'a> {
    pending: HashMap<u8, PendingNote>,
    /// Occupancy per voice slot.
    occupied: Vec<bool>,
    intervals: Vec<NoteInterval>,
    pool: &'a mut VoicePool,
}

impl<'a> NoteEventExtractor<'a> {
    fn new(pool: &'a mut VoicePool) -> Self {
        Self {
            pending: HashMap::new(),
            occupied: Vec::new(),
            intervals: Vec::new(),
            pool,
        }
    }

    fn process(&mut self, event: &RawEvent) -> Result<(), SequenceError> {
        match event.kind {
            EventKind::NoteOn => self.note_on(event),
            EventKind::NoteOff => self.note_off(event),
            _ => Ok(()),
        }
    }

    fn note_on(&mut self, event: &RawEvent) -> Result<(), SequenceError> {
        if self.pending.contains_key(&event.note) {
            return Err(SequenceError::DuplicateNoteOn {
                note: event.note,
                tick: event.tick,
            });
        }

        let voice = match self.occupied.iter().position(|occupied| !occupied) {
            Some(voice) => voice,
            None => {
                self.occupied.push(false);
                self.occupied.len() - 1
            }
        };
        self.occupied[voice] = true;
        self.pool.ensure_slot_count(voice + 1);

        self.pending.insert(
            event.note,
            PendingNote {
                velocity: event.velocity,
                start_tick: event.tick,
                voice,
            },
        );
        Ok(())
    }

    fn note_off(&mut self, event: &RawEvent) -> Result<(), SequenceError> {
        let pending = self
            .pending
            .remove(&event.note)
            .ok_or(SequenceError::MissingNoteOn {
                note: event.note,
                tick: event.tick,
            })?;
        self.occupied[pending.voice] = false;

        if event.tick == pending.start_tick {
            warn!(
                note = event.note,
                tick = event.tick,
                "Dropping zero length note"
            );
            return Ok(());
        }

        self.intervals.push(NoteInterval::new(
            event.note,
            pending.velocity,
            pending.start_tick,
            event.tick,
            pending.voice,
        ));
        Ok(())
    }

    fn finish(mut self) -> Vec<NoteInterval> {
        for (note, pending) in self.pending.iter() {
            warn!(
                note,
                tick = pending.start_tick,
                "Dropping note that is never released"
            );
        }

        // Intervals complete in note off order; dispatch needs start order.
        self.intervals.sort_by_key(NoteInterval::start_tick);
        self.intervals
    }
}

/// Extracts the note intervals from a track's events, growing the pool so that every
/// assigned voice slot exists.
pub fn extract_notes(
    events: &[RawEvent],
    pool: &mut VoicePool,
) -> Result<Vec<NoteInterval>, SequenceError> {
    let mut extractor = NoteEventExtractor::new(pool);
    for event in events {
        extractor.process(event)?;
    }
    Ok(extractor.finish())
}
