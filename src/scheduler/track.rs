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

//! Per-track scheduling state machine.
//!
//! A track advances two independent cursors every frame: one over control event chunks
//! and one over note intervals. Notes are committed to the driver one interval ahead of
//! the clock, so a channel is always queued before the previous note starts.
//!
//! The single interval of lookahead assumes that the frame rate is high relative to note
//! density. When several notes start within one frame, later notes are scheduled late and
//! a warning is logged.

use tracing::{debug, warn};

use super::control::{self, Performance};
use crate::config::PercussionMode;
use crate::error::SequenceError;
use crate::playback::{PlaybackDriver, TrackHandle, VoicePool};
use crate::samples::{resolve_sample, SampleLookup};
use crate::sequence::{batch_events, extract_notes, EventChunk, NoteInterval, RawEvent};
use crate::timebase::TimeBase;

/// MIDI note at which samples are recorded and play at their native pitch.
pub const C5_NOTE: u8 = 72;

/// Equal tempered semitone frequency ratio.
const SEMITONE_RATIO: f32 = 1.05946;

/// Number of intervals committed to the driver ahead of the one currently due.
pub const LOOKAHEAD_DEPTH: usize = 1;

/// Playback rate for a note, relative to a sample recorded at C5.
pub fn pitch_ratio(note: u8) -> f32 {
    SEMITONE_RATIO.powi(i32::from(note) - i32::from(C5_NOTE))
}

/// Options for loading a track.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackOptions {
    pub percussion: bool,
    pub percussion_mode: PercussionMode,
}

/// A loaded track and its playback progress.
#[derive(Debug)]
pub struct Track {
    handle: TrackHandle,
    chunks: Vec<EventChunk>,
    intervals: Vec<NoteInterval>,
    chunk_cursor: usize,
    interval_cursor: usize,
    /// True once the initial lookahead has been scheduled.
    primed: bool,
    percussion_mode: PercussionMode,
    performance: Performance,
}

impl Track {
    /// Builds a track from its decoded events. Fails without side effects if note events
    /// cannot be paired.
    pub fn load(
        handle: TrackHandle,
        events: &[RawEvent],
        options: TrackOptions,
    ) -> Result<Track, SequenceError> {
        let mut voices = VoicePool::new(handle);
        let intervals = extract_notes(events, &mut voices)?;
        let chunks = batch_events(events);

        Ok(Track {
            handle,
            chunks,
            intervals,
            chunk_cursor: 0,
            interval_cursor: 0,
            primed: false,
            percussion_mode: options.percussion_mode,
            performance: Performance::new(voices, options.percussion),
        })
    }

    /// Gets the handle of this track.
    pub fn handle(&self) -> TrackHandle {
        self.handle
    }

    /// Gets the control event chunks.
    pub fn chunks(&self) -> &[EventChunk] {
        &self.chunks
    }

    /// Gets the note intervals in start order.
    pub fn intervals(&self) -> &[NoteInterval] {
        &self.intervals
    }

    /// Gets the index of the next chunk to dispatch.
    pub fn chunk_cursor(&self) -> usize {
        self.chunk_cursor
    }

    /// Gets the index of the interval whose start gates the next schedule.
    pub fn interval_cursor(&self) -> usize {
        self.interval_cursor
    }

    /// Gets the performance state.
    pub fn performance(&self) -> &Performance {
        &self.performance
    }

    /// Returns true if the track carries percussion.
    pub fn is_percussion(&self) -> bool {
        self.performance.percussion
    }

    /// Returns true if the track dispatches its control event chunks.
    pub fn controls_enabled(&self) -> bool {
        !self.is_percussion() || self.percussion_mode == PercussionMode::Melodic
    }

    /// Returns true if the track schedules its note intervals.
    pub fn notes_enabled(&self) -> bool {
        !self.is_percussion() || self.percussion_mode != PercussionMode::Skip
    }

    /// Percussion tracks scheduled note by note pick their sample from the note number.
    fn per_note_samples(&self) -> bool {
        self.is_percussion() && self.percussion_mode == PercussionMode::NotesOnly
    }

    /// Returns true once no further commands will be issued.
    pub fn is_finished(&self) -> bool {
        let chunks_done = !self.controls_enabled() || self.chunk_cursor == self.chunks.len();
        let notes_done = !self.notes_enabled() || self.interval_cursor == self.intervals.len();
        chunks_done && notes_done
    }

    /// Advances the track to the given clock time.
    pub fn advance(
        &mut self,
        now: f64,
        time_base: &TimeBase,
        driver: &mut dyn PlaybackDriver,
        samples: &dyn SampleLookup,
    ) {
        if self.controls_enabled() {
            self.advance_chunks(now, time_base, driver, samples);
        }
        if self.notes_enabled() {
            self.advance_intervals(now, time_base, driver, samples);
        }
    }

    /// Dispatches at most one due chunk.
    fn advance_chunks(
        &mut self,
        now: f64,
        time_base: &TimeBase,
        driver: &mut dyn PlaybackDriver,
        samples: &dyn SampleLookup,
    ) {
        let Some(chunk) = self.chunks.get(self.chunk_cursor) else {
            return;
        };
        if now < time_base.tick_to_time(chunk.tick()) {
            return;
        }

        control::handle_events(
            self.handle,
            chunk.events(),
            &mut self.performance,
            driver,
            samples,
        );
        self.chunk_cursor += 1;
    }

    fn advance_intervals(
        &mut self,
        now: f64,
        time_base: &TimeBase,
        driver: &mut dyn PlaybackDriver,
        samples: &dyn SampleLookup,
    ) {
        if !self.primed {
            self.primed = true;
            for index in 0..=LOOKAHEAD_DEPTH {
                if let Some(interval) = self.intervals.get(index).copied() {
                    self.schedule(&interval, now, time_base, driver, samples);
                }
            }
            self.interval_cursor = LOOKAHEAD_DEPTH.min(self.intervals.len());
            return;
        }

        let Some(current) = self.intervals.get(self.interval_cursor) else {
            return;
        };
        if now < time_base.tick_to_time(current.start_tick()) {
            return;
        }

        if let Some(next) = self
            .intervals
            .get(self.interval_cursor + LOOKAHEAD_DEPTH)
            .copied()
        {
            self.schedule(&next, now, time_base, driver, samples);
        }
        self.interval_cursor += 1;
    }

    /// Commits one note interval to the driver on the voice's next channel.
    fn schedule(
        &mut self,
        interval: &NoteInterval,
        now: f64,
        time_base: &TimeBase,
        driver: &mut dyn PlaybackDriver,
        samples: &dyn SampleLookup,
    ) {
        let per_note_samples = self.per_note_samples();
        let Some(channel) = self.performance.voices.channel_for(interval.voice()) else {
            warn!(
                track = self.handle.index(),
                voice = interval.voice(),
                "Note refers to a voice that does not exist"
            );
            return;
        };

        let start = time_base.tick_to_time(interval.start_tick());
        let end = time_base.tick_to_time(interval.end_tick());
        if start < now {
            warn!(
                track = self.handle.index(),
                note = interval.note(),
                late_by = now - start,
                "Note scheduled after its start time"
            );
        }

        if per_note_samples {
            let sample = match resolve_sample(samples, interval.note(), true) {
                Ok(sample) => Some(sample),
                Err(e) => {
                    warn!(track = self.handle.index(), err = %e, "Percussion note will be silent");
                    None
                }
            };
            driver.set_sample(channel, sample);
            driver.set_pitch(channel, 1.0);
        } else {
            driver.set_pitch(channel, pitch_ratio(interval.note()));
        }
        driver.schedule_play(channel, start);
        driver.schedule_stop(channel, end);

        debug!(
            track = self.handle.index(),
            channel = %channel,
            note = interval.note(),
            start,
            end,
            "Note scheduled"
        );
    }
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use super::*;
    use crate::playback::{Command, MockDriver};
    use crate::samples::{SampleHandle, SampleLibrary};
    use crate::timebase::Tempo;

    fn time_base() -> TimeBase {
        // 960 ticks per second, tick zero at 10s.
        TimeBase::new(Tempo::new(120, 480), 10.0)
    }

    fn load(events: &[RawEvent], options: TrackOptions) -> Track {
        Track::load(TrackHandle::new(0), events, options).expect("valid track")
    }

    fn plays(driver: &MockDriver) -> Vec<f64> {
        driver
            .commands()
            .iter()
            .filter_map(|command| match command {
                Command::Play { time, .. } => Some(*time),
                _ => None,
            })
            .collect()
    }

    fn scale(count: u64) -> Vec<RawEvent> {
        (0..count)
            .flat_map(|i| {
                [
                    RawEvent::note_on(i * 480, 60 + i as u8, 100),
                    RawEvent::note_off(i * 480 + 240, 60 + i as u8),
                ]
            })
            .collect()
    }

    #[test]
    fn pitch() {
        assert_eq!(1.0, pitch_ratio(C5_NOTE));
        assert!((pitch_ratio(84) - 2.0).abs() < 0.001);
        assert!((pitch_ratio(60) - 0.5).abs() < 0.001);
        assert!(pitch_ratio(73) > 1.0);
    }

    #[test]
    fn bootstrap_schedules_two_intervals() {
        let mut track = load(&scale(4), TrackOptions::default());
        let mut driver = MockDriver::new();
        let samples = SampleLibrary::new();

        // Well before tick zero: the bootstrap is unconditional.
        track.advance(0.0, &time_base(), &mut driver, &samples);
        assert_eq!(vec![10.0, 10.5], plays(&driver));
        assert_eq!(1, track.interval_cursor());
    }

    #[test]
    fn bootstrap_after_both_due_times() {
        let mut track = load(&scale(4), TrackOptions::default());
        let mut driver = MockDriver::new();
        let samples = SampleLibrary::new();

        track.advance(10.6, &time_base(), &mut driver, &samples);
        assert_eq!(2, plays(&driver).len());
        assert_eq!(1, track.interval_cursor());

        // The second interval is due, so the next frame commits the third.
        track.advance(10.6, &time_base(), &mut driver, &samples);
        assert_eq!(vec![10.0, 10.5, 11.0], plays(&driver));
    }

    #[test]
    fn keeps_one_interval_of_lookahead() {
        let mut track = load(&scale(4), TrackOptions::default());
        let mut driver = MockDriver::new();
        let samples = SampleLibrary::new();
        let time_base = time_base();

        track.advance(9.0, &time_base, &mut driver, &samples);
        track.advance(10.49, &time_base, &mut driver, &samples);
        assert_eq!(2, plays(&driver).len());

        track.advance(10.5, &time_base, &mut driver, &samples);
        assert_eq!(3, plays(&driver).len());
        assert_eq!(2, track.interval_cursor());

        track.advance(11.0, &time_base, &mut driver, &samples);
        assert_eq!(4, plays(&driver).len());
        assert_eq!(3, track.interval_cursor());

        // The last interval is due; nothing is left to schedule.
        track.advance(11.5, &time_base, &mut driver, &samples);
        assert_eq!(4, plays(&driver).len());
        assert_eq!(4, track.interval_cursor());
    }

    #[test]
    fn idempotent_without_clock_progress() {
        let mut track = load(&scale(4), TrackOptions::default());
        let mut driver = MockDriver::new();
        let samples = SampleLibrary::new();
        let time_base = time_base();

        track.advance(10.2, &time_base, &mut driver, &samples);
        let count = driver.len();
        for _ in 0..10 {
            track.advance(10.2, &time_base, &mut driver, &samples);
        }
        // A clock regression only delays.
        track.advance(5.0, &time_base, &mut driver, &samples);
        assert_eq!(count, driver.len());
    }

    #[test]
    fn single_interval() {
        let mut track = load(&scale(1), TrackOptions::default());
        let mut driver = MockDriver::new();
        let samples = SampleLibrary::new();

        track.advance(0.0, &time_base(), &mut driver, &samples);
        assert_eq!(vec![10.0], plays(&driver));
        assert_eq!(1, track.interval_cursor());

        track.advance(100.0, &time_base(), &mut driver, &samples);
        assert_eq!(1, plays(&driver).len());
    }

    #[test]
    fn empty_track_is_finished() {
        let mut track = load(&[], TrackOptions::default());
        let mut driver = MockDriver::new();
        let samples = SampleLibrary::new();

        assert!(track.is_finished());
        track.advance(100.0, &time_base(), &mut driver, &samples);
        assert!(driver.is_empty());
    }

    #[test]
    fn one_chunk_per_frame() {
        let events = vec![
            RawEvent::control_change(0, 7, 100),
            RawEvent::control_change(10, 7, 90),
            RawEvent::control_change(20, 7, 80),
        ];
        let mut track = load(&events, TrackOptions::default());
        let mut driver = MockDriver::new();
        let samples = SampleLibrary::new();

        track.advance(20.0, &time_base(), &mut driver, &samples);
        assert_eq!(1, track.chunk_cursor());
        assert_eq!(100, track.performance().max_volume());

        track.advance(20.0, &time_base(), &mut driver, &samples);
        track.advance(20.0, &time_base(), &mut driver, &samples);
        assert_eq!(3, track.chunk_cursor());
        assert_eq!(80, track.performance().max_volume());
        assert!(track.is_finished());

        track.advance(20.0, &time_base(), &mut driver, &samples);
        assert_eq!(3, track.chunk_cursor());
    }

    #[test]
    fn chunks_wait_for_their_time() {
        let events = vec![RawEvent::control_change(960, 11, 50)];
        let mut track = load(&events, TrackOptions::default());
        let mut driver = MockDriver::new();
        let samples = SampleLibrary::new();

        track.advance(10.99, &time_base(), &mut driver, &samples);
        assert_eq!(0, track.chunk_cursor());
        track.advance(11.0, &time_base(), &mut driver, &samples);
        assert_eq!(1, track.chunk_cursor());
        assert_eq!(50, track.performance().expression());
    }

    #[test]
    fn alternates_channels_on_one_voice() {
        let mut track = load(&scale(3), TrackOptions::default());
        let mut driver = MockDriver::new();
        let samples = SampleLibrary::new();
        let time_base = time_base();

        track.advance(0.0, &time_base, &mut driver, &samples);
        track.advance(10.5, &time_base, &mut driver, &samples);

        let buffers: Vec<(usize, usize)> = driver
            .plays()
            .iter()
            .map(|(channel, _, _)| (channel.voice, channel.buffer))
            .collect();
        assert_eq!(vec![(0, 0), (0, 1), (0, 0)], buffers);
    }

    #[test]
    fn schedules_pitch_and_stop() {
        let events = vec![RawEvent::note_on(0, 84, 100), RawEvent::note_off(960, 84)];
        let mut track = load(&events, TrackOptions::default());
        let mut driver = MockDriver::new();
        let samples = SampleLibrary::new();

        track.advance(0.0, &time_base(), &mut driver, &samples);
        let commands = driver.commands();
        assert_eq!(3, commands.len());
        assert!(matches!(commands[0], Command::Pitch { ratio, .. } if (ratio - 2.0).abs() < 0.001));
        assert!(matches!(commands[1], Command::Play { time, .. } if time == 10.0));
        assert!(matches!(commands[2], Command::Stop { time, .. } if time == 11.0));
    }

    fn percussion(mode: PercussionMode) -> Track {
        let mut events = vec![RawEvent::program_change(0, 0)];
        events.extend(scale(2));
        load(
            &events,
            TrackOptions {
                percussion: true,
                percussion_mode: mode,
            },
        )
    }

    fn percussion_samples() -> SampleLibrary {
        let mut library = SampleLibrary::new();
        library.insert(
            60,
            true,
            SampleHandle::new("Percussion/60", PathBuf::from("60.wav")),
        );
        library.insert(
            0,
            true,
            SampleHandle::new("Percussion/0", PathBuf::from("0.wav")),
        );
        library
    }

    #[test]
    fn percussion_skip() {
        let mut track = percussion(PercussionMode::Skip);
        let mut driver = MockDriver::new();

        assert!(track.is_finished());
        track.advance(100.0, &time_base(), &mut driver, &percussion_samples());
        assert!(driver.is_empty());
    }

    #[test]
    fn percussion_notes_only() {
        let mut track = percussion(PercussionMode::NotesOnly);
        let mut driver = MockDriver::new();

        track.advance(100.0, &time_base(), &mut driver, &percussion_samples());
        assert_eq!(0, track.chunk_cursor());

        let plays = driver.plays();
        assert_eq!(2, plays.len());
        assert_eq!(
            Some("Percussion/60"),
            plays[0].2.sample.as_ref().map(SampleHandle::name)
        );
        assert_eq!(Some(1.0), plays[0].2.pitch);
        // No sample for note 61.
        assert_eq!(None, plays[1].2.sample);
    }

    #[test]
    fn percussion_melodic() {
        let mut track = percussion(PercussionMode::Melodic);
        let mut driver = MockDriver::new();

        track.advance(100.0, &time_base(), &mut driver, &percussion_samples());
        assert_eq!(1, track.chunk_cursor());
        assert_eq!(
            Some("Percussion/0"),
            track.performance().sample().map(SampleHandle::name)
        );
    }
}
