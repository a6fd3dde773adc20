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

//! Applies a chunk's control events to a track's performance state.

use tracing::{debug, warn};

use crate::playback::{PlaybackDriver, TrackHandle, VoicePool};
use crate::samples::{instrument_family, resolve_sample, SampleHandle, SampleLookup};
use crate::sequence::{ControlChange, EventKind, RawEvent};

/// Highest MIDI data value.
pub const MAX_MIDI_VALUE: u8 = 127;

/// Mutable performance state of a track.
#[derive(Debug)]
pub struct Performance {
    pub(super) voices: VoicePool,
    pub(super) sample: Option<SampleHandle>,
    pub(super) max_volume: u8,
    pub(super) expression: u8,
    pub(super) percussion: bool,
}

impl Performance {
    pub(super) fn new(voices: VoicePool, percussion: bool) -> Performance {
        Performance {
            voices,
            sample: None,
            max_volume: MAX_MIDI_VALUE,
            expression: MAX_MIDI_VALUE,
            percussion,
        }
    }

    /// Gets the track's voices.
    pub fn voices(&self) -> &VoicePool {
        &self.voices
    }

    /// Gets the sample applied by the last program change.
    pub fn sample(&self) -> Option<&SampleHandle> {
        self.sample.as_ref()
    }

    /// Gets the channel volume, 0-127.
    pub fn max_volume(&self) -> u8 {
        self.max_volume
    }

    /// Gets the expression, 0-127.
    pub fn expression(&self) -> u8 {
        self.expression
    }

    /// Returns true if the track carries percussion.
    pub fn is_percussion(&self) -> bool {
        self.percussion
    }

    /// Channel gain for a note of the given velocity under the current volume and expression.
    pub fn level(&self, velocity: u8) -> f32 {
        let max = f32::from(MAX_MIDI_VALUE);
        (f32::from(velocity) / max) * (f32::from(self.expression) / max)
            * (f32::from(self.max_volume) / max)
    }
}

/// Applies every event of a chunk in order.
pub(super) fn handle_events(
    track: TrackHandle,
    events: &[RawEvent],
    performance: &mut Performance,
    driver: &mut dyn PlaybackDriver,
    samples: &dyn SampleLookup,
) {
    for event in events {
        match event.kind {
            EventKind::ProgramChange => {
                let program = event.arg2;
                let sample = match resolve_sample(samples, program, performance.percussion) {
                    Ok(sample) => {
                        debug!(
                            track = track.index(),
                            program,
                            sample = %sample,
                            "Program change"
                        );
                        Some(sample)
                    }
                    Err(e) => {
                        warn!(
                            track = track.index(),
                            program,
                            family = instrument_family(program),
                            err = %e,
                            "No sample for program, track will be silent"
                        );
                        None
                    }
                };
                for channel in performance.voices.channels() {
                    driver.set_sample(channel, sample.clone());
                }
                performance.sample = sample;
            }
            EventKind::ControlChange(ControlChange::Volume) => {
                performance.max_volume = event.arg3.min(MAX_MIDI_VALUE);
            }
            EventKind::ControlChange(ControlChange::Expression) => {
                performance.expression = event.arg3.min(MAX_MIDI_VALUE);
            }
            EventKind::NoteOn => {
                let level = performance.level(event.velocity);
                for channel in performance.voices.channels() {
                    driver.set_volume(channel, level);
                }
            }
            EventKind::NoteOff
            | EventKind::ControlChange(ControlChange::Other(_))
            | EventKind::ChannelAfterTouch
            | EventKind::KeyAfterTouch
            | EventKind::PitchBend => {}
        }
    }
}
