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

//! Load time processing of a track's decoded event stream.
//!
//! This module provides:
//! - The decoded event model
//! - Batching of same-tick events into chunks
//! - Note on/off pairing into voice-bound note intervals

mod batcher;
mod event;
mod extractor;

pub use batcher::{batch_events, EventChunk};
pub use event::{ControlChange, EventKind, RawEvent, CONTROLLER_EXPRESSION, CONTROLLER_VOLUME};
pub use extractor::{extract_notes, NoteInterval};
