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

use tracing::{info, span, warn, Level, Span};

use super::track::{Track, TrackOptions};
use crate::config::{PercussionMode, SchedulerConfig};
use crate::error::Error;
use crate::midi::DecodedMidi;
use crate::playback::{PlaybackDriver, TrackHandle};
use crate::samples::SampleLookup;
use crate::sequence::RawEvent;
use crate::timebase::{Tempo, TimeBase};

/// A playback session: the song's time base and every loaded track.
pub struct Session {
    time_base: TimeBase,
    tracks: Vec<Track>,
    percussion_mode: PercussionMode,
    driver: Box<dyn PlaybackDriver>,
    samples: Box<dyn SampleLookup>,
    /// The logging span.
    span: Span,
}

impl Session {
    /// Creates a new session. Tick zero lands one lookahead after `now`, so the first
    /// events reach the driver ahead of the audio backend's own scheduling latency.
    pub fn new(
        tempo: Tempo,
        now: f64,
        config: &SchedulerConfig,
        driver: Box<dyn PlaybackDriver>,
        samples: Box<dyn SampleLookup>,
    ) -> Result<Session, Error> {
        let origin = now + config.lookahead()?.as_secs_f64();
        let span = span!(Level::INFO, "session");
        {
            let _enter = span.enter();
            info!(tempo = %tempo, origin, "Session created");
        }

        Ok(Session {
            time_base: TimeBase::new(tempo, origin),
            tracks: Vec::new(),
            percussion_mode: config.percussion(),
            driver,
            samples,
            span,
        })
    }

    /// Creates a session with every playable track of a decoded MIDI file loaded. Tracks
    /// whose notes cannot be paired are skipped.
    pub fn from_midi(
        midi: &DecodedMidi,
        now: f64,
        config: &SchedulerConfig,
        driver: Box<dyn PlaybackDriver>,
        samples: Box<dyn SampleLookup>,
    ) -> Result<Session, Error> {
        let tempo = midi.tempo(config.default_bpm()?);
        let percussion_channel = config.percussion_channel()?;

        let mut session = Session::new(tempo, now, config, driver, samples)?;
        for track in midi.playable_tracks() {
            let percussion = track.first_channel() == Some(percussion_channel);
            let options = TrackOptions {
                percussion,
                percussion_mode: session.percussion_mode,
            };
            match session.load_track_with(track.events(), options) {
                Ok(_) => {}
                // A malformed track is left out; the rest of the song still plays.
                Err(Error::MalformedSequence(e)) => {
                    let _enter = session.span.enter();
                    warn!(midi_track = track.index(), err = %e, "Skipping malformed MIDI track");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(session)
    }

    /// Loads a melodic track.
    pub fn load_track(&mut self, events: &[RawEvent]) -> Result<TrackHandle, Error> {
        let options = TrackOptions {
            percussion: false,
            percussion_mode: self.percussion_mode,
        };
        self.load_track_with(events, options)
    }

    /// Loads a track. On error nothing is added to the session.
    pub fn load_track_with(
        &mut self,
        events: &[RawEvent],
        options: TrackOptions,
    ) -> Result<TrackHandle, Error> {
        let _enter = self.span.enter();

        let handle = TrackHandle::new(self.tracks.len());
        let track = Track::load(handle, events, options).inspect_err(|e| {
            warn!(track = handle.index(), err = %e, "Track rejected");
        })?;

        info!(
            track = handle.index(),
            events = events.len(),
            chunks = track.chunks().len(),
            notes = track.intervals().len(),
            voices = track.performance().voices().len(),
            percussion = options.percussion,
            "Track loaded"
        );
        self.tracks.push(track);
        Ok(handle)
    }

    /// Advances every track to the given clock time. Call once per frame.
    pub fn advance(&mut self, now: f64) {
        for track in self.tracks.iter_mut() {
            track.advance(
                now,
                &self.time_base,
                self.driver.as_mut(),
                self.samples.as_ref(),
            );
        }
    }

    /// Returns true once no track will issue further commands.
    pub fn is_finished(&self) -> bool {
        self.tracks.iter().all(Track::is_finished)
    }

    /// Gets the time base.
    pub fn time_base(&self) -> &TimeBase {
        &self.time_base
    }

    /// Gets a track by handle.
    pub fn track(&self, handle: TrackHandle) -> Option<&Track> {
        self.tracks.get(handle.index())
    }

    /// Gets every track.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Clock time at which the last command of the song takes effect. Chunks and notes a
    /// track never dispatches are not counted.
    pub fn end_time(&self) -> f64 {
        let last_tick = self
            .tracks
            .iter()
            .flat_map(|track| {
                let chunk = track
                    .chunks()
                    .last()
                    .filter(|_| track.controls_enabled())
                    .map(|chunk| chunk.tick());
                let note = track
                    .intervals()
                    .iter()
                    .filter(|_| track.notes_enabled())
                    .map(|interval| interval.end_tick())
                    .max();
                chunk.into_iter().chain(note)
            })
            .max()
            .unwrap_or(0);
        self.time_base.tick_to_time(last_tick)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("time_base", &self.time_base)
            .field("tracks", &self.tracks.len())
            .field("percussion_mode", &self.percussion_mode)
            .finish()
    }
}
