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

//! The boundary between the scheduler and the audio backend.

mod driver;
mod dryrun;
mod mock;
mod voice;

pub use driver::{ChannelId, Clock, PlaybackDriver, SystemClock, TrackHandle};
pub use dryrun::LogDriver;
pub use mock::{ChannelState, Command, MockDriver};
pub use voice::{Voice, VoicePool, CHANNELS_PER_VOICE};
