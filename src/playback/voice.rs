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

//! Voice management for polyphonic sample playback.
//!
//! Each voice is double buffered: scheduling alternates between its two channels so the
//! channel receiving a new note has already been left to finish the previous one.

use std::fmt;

use tracing::debug;

use super::driver::{ChannelId, TrackHandle};

/// Number of channels owned by a voice.
pub const CHANNELS_PER_VOICE: usize = 2;

/// One polyphony slot, backed by two alternating channels.
#[derive(Debug, Clone)]
pub struct Voice {
    channels: [ChannelId; CHANNELS_PER_VOICE],
    /// Index of the channel that receives the next schedule call.
    next: usize,
}

impl Voice {
    /// Creates the voice for the given slot of a track.
    fn new(track: TrackHandle, voice: usize) -> Voice {
        Voice {
            channels: [0, 1].map(|buffer| ChannelId {
                track,
                voice,
                buffer,
            }),
            next: 0,
        }
    }

    /// Gets both channels of this voice.
    pub fn channels(&self) -> &[ChannelId; CHANNELS_PER_VOICE] {
        &self.channels
    }

    /// Gets the channel that will receive the next schedule call.
    pub fn next_channel(&self) -> ChannelId {
        self.channels[self.next]
    }

    /// Returns the inactive channel and flips so the other one is used next time.
    fn take_channel(&mut self) -> ChannelId {
        let channel = self.channels[self.next];
        self.next = 1 - self.next;
        channel
    }
}

/// The growable set of voices owned by one track.
pub struct VoicePool {
    track: TrackHandle,
    voices: Vec<Voice>,
}

impl VoicePool {
    /// Creates an empty pool for the given track.
    pub fn new(track: TrackHandle) -> VoicePool {
        VoicePool {
            track,
            voices: Vec::new(),
        }
    }

    /// Grows the pool to at least `count` voices. Never shrinks.
    pub fn ensure_slot_count(&mut self, count: usize) {
        while self.voices.len() < count {
            let index = self.voices.len();
            self.voices.push(Voice::new(self.track, index));
            debug!(track = self.track.index(), voice = index, "Voice created");
        }
    }

    /// Returns the channel to schedule on for the given slot and flips the slot's
    /// alternation. Returns `None` if the slot does not exist.
    pub fn channel_for(&mut self, slot: usize) -> Option<ChannelId> {
        self.voices.get_mut(slot).map(Voice::take_channel)
    }

    /// Gets the voice in the given slot.
    pub fn voice(&self, slot: usize) -> Option<&Voice> {
        self.voices.get(slot)
    }

    /// Iterates over every channel of every voice.
    pub fn channels(&self) -> impl Iterator<Item = ChannelId> + '_ {
        self.voices
            .iter()
            .flat_map(|voice| voice.channels.iter().copied())
    }

    /// Returns the number of voices.
    pub fn len(&self) -> usize {
        self.voices.len()
    }

    /// Returns true if no voice has been created.
    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}

impl fmt::Debug for VoicePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoicePool")
            .field("track", &self.track.index())
            .field("voices", &self.voices.len())
            .finish()
    }
}
