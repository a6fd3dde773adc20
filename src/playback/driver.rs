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
use std::fmt;

use crate::samples::SampleHandle;

/// Stable handle to a track loaded into a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackHandle(usize);

impl TrackHandle {
    /// Creates a handle for the track at the given index.
    pub fn new(index: usize) -> TrackHandle {
        TrackHandle(index)
    }

    /// Gets the index of the track within its session.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for TrackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "track {}", self.0)
    }
}

/// Identifies one schedulable playback channel: one of the two buffers of a voice on a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId {
    pub track: TrackHandle,
    pub voice: usize,
    /// Either 0 or 1.
    pub buffer: usize,
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/voice {}/buffer {}",
            self.track, self.voice, self.buffer
        )
    }
}

/// The audio backend. Every call is fire-and-forget: start and stop times are absolute
/// clock times in the future and the backend is responsible for honoring them.
pub trait PlaybackDriver {
    /// Starts the channel at the given time.
    fn schedule_play(&mut self, channel: ChannelId, time: f64);

    /// Stops the channel at the given time.
    fn schedule_stop(&mut self, channel: ChannelId, time: f64);

    /// Sets the playback rate of the channel relative to the sample's native pitch.
    fn set_pitch(&mut self, channel: ChannelId, ratio: f32);

    /// Sets the channel gain, 0.0 to 1.0.
    fn set_volume(&mut self, channel: ChannelId, level: f32);

    /// Sets the sample the channel plays. `None` leaves the channel silent.
    fn set_sample(&mut self, channel: ChannelId, sample: Option<SampleHandle>);
}

/// A monotonic clock in seconds, sharing its unit with the time base.
pub trait Clock {
    fn now(&self) -> f64;
}

#[cfg(not(feature = "quanta"))]
type Instant = std::time::Instant;
#[cfg(feature = "quanta")]
type Instant = quanta::Instant;

/// Wall clock measured from the moment it was created.
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    /// Creates a new clock reading zero now.
    pub fn new() -> SystemClock {
        SystemClock {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(first >= 0.0);
        assert!(second >= first);
    }

    #[test]
    fn channel_display() {
        let channel = ChannelId {
            track: TrackHandle::new(2),
            voice: 1,
            buffer: 0,
        };
        assert_eq!("track 2/voice 1/buffer 0", channel.to_string());
    }
}
