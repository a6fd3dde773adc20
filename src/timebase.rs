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

//! Conversion from MIDI ticks to playback clock time.

use std::fmt;

/// Default tempo used when a file carries no tempo meta-event.
pub const DEFAULT_BPM: u32 = 100;

/// Fixed song tempo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tempo {
    /// Beats (quarter notes) per minute.
    bpm: u32,
    /// MIDI ticks per quarter note.
    ticks_per_quarter: u16,
}

impl Tempo {
    /// Creates a new tempo.
    pub fn new(bpm: u32, ticks_per_quarter: u16) -> Tempo {
        Tempo {
            bpm,
            ticks_per_quarter,
        }
    }

    /// Gets the beats per minute.
    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    /// Gets the ticks per quarter note.
    pub fn ticks_per_quarter(&self) -> u16 {
        self.ticks_per_quarter
    }

    /// Ticks elapsed per second of playback.
    pub fn ticks_per_second(&self) -> f64 {
        let ticks_per_minute = f64::from(self.bpm) * f64::from(self.ticks_per_quarter);
        ticks_per_minute / 60.0
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bpm ({} ticks/quarter)", self.bpm, self.ticks_per_quarter)
    }
}

/// Maps ticks onto absolute clock time, anchored at a fixed origin.
#[derive(Debug, Clone, Copy)]
pub struct TimeBase {
    tempo: Tempo,
    /// Clock time of tick zero.
    origin: f64,
    /// Cached from the tempo, never recomputed.
    ticks_per_second: f64,
}

impl TimeBase {
    /// Creates a new time base.
    pub fn new(tempo: Tempo, origin: f64) -> TimeBase {
        TimeBase {
            tempo,
            origin,
            ticks_per_second: tempo.ticks_per_second(),
        }
    }

    /// Gets the tempo.
    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    /// Gets the clock time of tick zero.
    pub fn origin(&self) -> f64 {
        self.origin
    }

    /// Gets the ticks per second.
    pub fn ticks_per_second(&self) -> f64 {
        self.ticks_per_second
    }

    /// Converts a tick into absolute clock time.
    #[inline]
    pub fn tick_to_time(&self, tick: u64) -> f64 {
        self.origin + (tick as f64 / self.ticks_per_second)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ticks_per_second() {
        assert_eq!(960.0, Tempo::new(120, 480).ticks_per_second());
        assert_eq!(160.0, Tempo::new(DEFAULT_BPM, 96).ticks_per_second());
    }

    #[test]
    fn tick_zero_is_origin() {
        let time_base = TimeBase::new(Tempo::new(120, 480), 12.5);
        assert_eq!(12.5, time_base.tick_to_time(0));
    }

    #[test]
    fn strictly_increasing() {
        let time_base = TimeBase::new(Tempo::new(97, 384), 3.0);
        let mut last = time_base.tick_to_time(0);
        for tick in 1..5000 {
            let time = time_base.tick_to_time(tick);
            assert!(time > last, "tick {} did not advance the clock", tick);
            last = time;
        }
    }

    #[test]
    fn doubling_bpm_halves_delta() {
        let slow = TimeBase::new(Tempo::new(60, 480), 0.0);
        let fast = TimeBase::new(Tempo::new(120, 480), 0.0);

        let slow_delta = slow.tick_to_time(1440) - slow.tick_to_time(480);
        let fast_delta = fast.tick_to_time(1440) - fast.tick_to_time(480);
        assert!((slow_delta / 2.0 - fast_delta).abs() < 1e-12);
    }

    #[test]
    fn one_second_per_960_ticks() {
        let time_base = TimeBase::new(Tempo::new(120, 480), 2.0);
        assert_eq!(2.5, time_base.tick_to_time(480));
        assert_eq!(3.0, time_base.tick_to_time(960));
    }

    #[test]
    fn reproducible() {
        let time_base = TimeBase::new(Tempo::new(133, 192), 1.25);
        for tick in [0, 1, 17, 191, 192, 100_000] {
            assert_eq!(
                time_base.tick_to_time(tick).to_bits(),
                time_base.tick_to_time(tick).to_bits()
            );
        }
    }
}
