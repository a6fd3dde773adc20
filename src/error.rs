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

use crate::config::error::ConfigError;

/// Errors raised while pairing note events into playable intervals.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SequenceError {
    #[error("note off for note {note} at tick {tick} has no pending note on")]
    MissingNoteOn { note: u8, tick: u64 },
    #[error("note on for note {note} at tick {tick} while the same note is still sounding")]
    DuplicateNoteOn { note: u8, tick: u64 },
}

/// Crate level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed sequence: {0}")]
    MalformedSequence(#[from] SequenceError),
    #[error("no sample found for id {id} (percussion: {percussion})")]
    SampleNotFound { id: u8, percussion: bool },
    #[error("SMPTE timecode timing is not supported")]
    UnsupportedTiming,
    #[error("MIDI decode error: {0}")]
    Midi(#[from] midly::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
