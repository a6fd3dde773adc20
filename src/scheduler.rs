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

//! Frame driven scheduling of loaded tracks against a playback driver.
//!
//! A [Session] owns the song's time base and its tracks. The host calls
//! [Session::advance] once per frame with the current clock time; each track then
//! dispatches due control events and keeps its note lookahead committed to the driver.

mod control;
mod session;
mod track;

pub use control::{Performance, MAX_MIDI_VALUE};
pub use session::Session;
pub use track::{pitch_ratio, Track, TrackOptions, C5_NOTE, LOOKAHEAD_DEPTH};
