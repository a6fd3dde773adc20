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
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, File};
use duration_string::DurationString;
use serde::Deserialize;

use self::error::ConfigError;
use crate::timebase::DEFAULT_BPM;

pub mod error;

/// Default offset between session creation and tick zero.
pub const DEFAULT_LOOKAHEAD: Duration = Duration::from_secs(2);

/// Default 1-indexed MIDI channel carrying percussion.
pub const DEFAULT_PERCUSSION_CHANNEL: u8 = 10;

/// Default time between two scheduler frames when driven by the CLI.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// How percussion tracks are scheduled.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PercussionMode {
    /// Percussion tracks issue no commands at all.
    Skip,
    /// Control events are skipped. Notes are scheduled with the percussion sample of
    /// their note number.
    #[default]
    NotesOnly,
    /// Percussion tracks are scheduled exactly like melodic tracks.
    Melodic,
}

/// A YAML representation of the scheduler configuration.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct SchedulerConfig {
    /// Offset between session creation and tick zero, e.g. "2s".
    lookahead: Option<String>,

    /// Tempo used when the tempo track has no tempo event.
    default_bpm: Option<u32>,

    /// Index of the track scanned for the tempo event.
    tempo_track: Option<usize>,

    /// The 1-indexed MIDI channel that marks a track as percussion.
    percussion_channel: Option<u8>,

    /// How percussion tracks are scheduled.
    #[serde(default)]
    percussion: PercussionMode,

    /// Directory of sample files.
    samples: Option<String>,

    /// Time between two frames when running in real time, e.g. "16ms".
    frame_interval: Option<String>,
}

impl SchedulerConfig {
    /// Parse a scheduler configuration from a YAML file.
    pub fn deserialize(path: &Path) -> Result<SchedulerConfig, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<SchedulerConfig>()?)
    }

    /// Returns the lookahead.
    pub fn lookahead(&self) -> Result<Duration, ConfigError> {
        parse_duration(self.lookahead.as_deref(), DEFAULT_LOOKAHEAD)
    }

    /// Returns the default tempo.
    pub fn default_bpm(&self) -> Result<u32, ConfigError> {
        match self.default_bpm {
            Some(0) => Err(ConfigError::InvalidTempo(0)),
            Some(bpm) => Ok(bpm),
            None => Ok(DEFAULT_BPM),
        }
    }

    /// Returns the index of the tempo track.
    pub fn tempo_track(&self) -> usize {
        self.tempo_track.unwrap_or(0)
    }

    /// Returns the 0-indexed percussion channel.
    pub fn percussion_channel(&self) -> Result<u8, ConfigError> {
        let channel = self
            .percussion_channel
            .unwrap_or(DEFAULT_PERCUSSION_CHANNEL);
        if !(1..=16).contains(&channel) {
            return Err(ConfigError::InvalidChannel(channel));
        }
        Ok(channel - 1)
    }

    /// Returns the percussion mode.
    pub fn percussion(&self) -> PercussionMode {
        self.percussion
    }

    /// Returns the sample directory, resolved against the given base path.
    pub fn samples(&self, base_path: &Path) -> Option<PathBuf> {
        self.samples.as_ref().map(|samples| base_path.join(samples))
    }

    /// Returns the frame interval.
    pub fn frame_interval(&self) -> Result<Duration, ConfigError> {
        parse_duration(self.frame_interval.as_deref(), DEFAULT_FRAME_INTERVAL)
    }
}

fn parse_duration(value: Option<&str>, default: Duration) -> Result<Duration, ConfigError> {
    match value {
        Some(value) => Ok(DurationString::from_string(value.to_string())
            .map_err(|e| ConfigError::InvalidDuration {
                value: value.to_string(),
                reason: e.to_string(),
            })?
            .into()),
        None => Ok(default),
    }
}
