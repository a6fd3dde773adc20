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
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::driver::{ChannelId, PlaybackDriver};
use crate::samples::SampleHandle;

/// A command received by the mock driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play { channel: ChannelId, time: f64 },
    Stop { channel: ChannelId, time: f64 },
    Pitch { channel: ChannelId, ratio: f32 },
    Volume { channel: ChannelId, level: f32 },
    Sample {
        channel: ChannelId,
        sample: Option<SampleHandle>,
    },
}

/// The last known settings of a channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelState {
    pub sample: Option<SampleHandle>,
    pub pitch: Option<f32>,
    pub volume: Option<f32>,
}

#[derive(Default)]
struct Recording {
    commands: Vec<Command>,
    channels: HashMap<ChannelId, ChannelState>,
    /// Snapshot of the channel state taken at each play command.
    plays: Vec<(ChannelId, f64, ChannelState)>,
}

/// A mock driver. Doesn't actually play anything, but records every command it receives.
/// Clones share the same recording.
#[derive(Clone, Default)]
pub struct MockDriver {
    recording: Arc<Mutex<Recording>>,
}

impl MockDriver {
    /// Creates a new mock driver.
    pub fn new() -> MockDriver {
        MockDriver::default()
    }

    /// Gets every command received so far.
    pub fn commands(&self) -> Vec<Command> {
        self.recording.lock().commands.clone()
    }

    /// Gets every play command with the channel state at the time it was issued.
    pub fn plays(&self) -> Vec<(ChannelId, f64, ChannelState)> {
        self.recording.lock().plays.clone()
    }

    /// Gets the current state of a channel.
    pub fn channel(&self, channel: ChannelId) -> ChannelState {
        self.recording
            .lock()
            .channels
            .get(&channel)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the number of commands received so far.
    pub fn len(&self) -> usize {
        self.recording.lock().commands.len()
    }

    /// Returns true if no command has been received.
    pub fn is_empty(&self) -> bool {
        self.recording.lock().commands.is_empty()
    }

    /// Forgets every recorded command. Channel state is kept.
    pub fn clear(&self) {
        let mut recording = self.recording.lock();
        recording.commands.clear();
        recording.plays.clear();
    }
}

impl PlaybackDriver for MockDriver {
    fn schedule_play(&mut self, channel: ChannelId, time: f64) {
        let mut recording = self.recording.lock();
        let state = recording
            .channels
            .get(&channel)
            .cloned()
            .unwrap_or_default();
        recording.plays.push((channel, time, state));
        recording.commands.push(Command::Play { channel, time });
    }

    fn schedule_stop(&mut self, channel: ChannelId, time: f64) {
        self.recording
            .lock()
            .commands
            .push(Command::Stop { channel, time });
    }

    fn set_pitch(&mut self, channel: ChannelId, ratio: f32) {
        let mut recording = self.recording.lock();
        recording.channels.entry(channel).or_default().pitch = Some(ratio);
        recording.commands.push(Command::Pitch { channel, ratio });
    }

    fn set_volume(&mut self, channel: ChannelId, level: f32) {
        let mut recording = self.recording.lock();
        recording.channels.entry(channel).or_default().volume = Some(level);
        recording.commands.push(Command::Volume { channel, level });
    }

    fn set_sample(&mut self, channel: ChannelId, sample: Option<SampleHandle>) {
        let mut recording = self.recording.lock();
        recording.channels.entry(channel).or_default().sample = sample.clone();
        recording.commands.push(Command::Sample { channel, sample });
    }
}
