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

use super::event::RawEvent;

/// Events that share one tick and are dispatched together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventChunk {
    tick: u64,
    events: Vec<RawEvent>,
}

impl EventChunk {
    /// Gets the tick shared by every event in the chunk.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Gets the events in input order.
    pub fn events(&self) -> &[RawEvent] {
        &self.events
    }
}

/// Groups a track's events into chunks of identical tick.
///
/// Input ticks are expected to be non-decreasing. A new chunk starts whenever the tick
/// differs from the previous event's, so no event is dropped or reordered.
pub fn batch_events(events: &[RawEvent]) -> Vec<EventChunk> {
    let mut chunks: Vec<EventChunk> = Vec::new();
    let mut current: Option<EventChunk> = None;

    for event in events {
        match current.as_mut() {
            Some(chunk) if chunk.tick == event.tick => chunk.events.push(*event),
            _ => {
                if let Some(chunk) = current.take() {
                    chunks.push(chunk);
                }
                current = Some(EventChunk {
                    tick: event.tick,
                    events: vec![*event],
                });
            }
        }
    }

    // The last run is never closed by a tick change.
    if let Some(chunk) = current {
        chunks.push(chunk);
    }

    chunks
}
