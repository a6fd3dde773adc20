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
use tracing::{debug, info};

use super::driver::{ChannelId, PlaybackDriver};
use crate::samples::SampleHandle;

/// A dry run driver that logs every command instead of playing audio.
#[derive(Debug, Default)]
pub struct LogDriver {
    plays: usize,
}

impl LogDriver {
    /// Creates a new log driver.
    pub fn new() -> LogDriver {
        LogDriver::default()
    }

    /// Returns the number of notes scheduled so far.
    pub fn plays(&self) -> usize {
        self.plays
    }
}

impl PlaybackDriver for LogDriver {
    fn schedule_play(&mut self, channel: ChannelId, time: f64) {
        self.plays += 1;
        info!(channel = %channel, time, "Play scheduled");
    }

    fn schedule_stop(&mut self, channel: ChannelId, time: f64) {
        debug!(channel = %channel, time, "Stop scheduled");
    }

    fn set_pitch(&mut self, channel: ChannelId, ratio: f32) {
        debug!(channel = %channel, ratio, "Pitch set");
    }

    fn set_volume(&mut self, channel: ChannelId, level: f32) {
        debug!(channel = %channel, level, "Volume set");
    }

    fn set_sample(&mut self, channel: ChannelId, sample: Option<SampleHandle>) {
        match sample {
            Some(sample) => debug!(channel = %channel, sample = %sample, "Sample set"),
            None => debug!(channel = %channel, "Sample cleared"),
        }
    }
}
