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

//! Decodes standard MIDI files into per-track event streams.

use std::fs;
use std::path::Path;

use midly::{Format, MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use tracing::{debug, info};

use crate::error::Error;
use crate::sequence::{EventKind, RawEvent};
use crate::timebase::Tempo;

/// Microseconds per minute, for tempo conversion.
const MICROS_PER_MINUTE: f64 = 60_000_000.0;

/// The channel events of one MIDI track at absolute ticks.
#[derive(Debug, Clone)]
pub struct DecodedTrack {
    index: usize,
    events: Vec<RawEvent>,
}

impl DecodedTrack {
    /// Gets the index of the track within the file.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Gets the events in tick order.
    pub fn events(&self) -> &[RawEvent] {
        &self.events
    }

    /// Gets the channel of the first channel event, if any.
    pub fn first_channel(&self) -> Option<u8> {
        self.events.first().map(|event| event.channel)
    }
}

/// A decoded MIDI file.
#[derive(Debug, Clone)]
pub struct DecodedMidi {
    format: Format,
    ticks_per_quarter: u16,
    tracks: Vec<DecodedTrack>,
    tempo_track: usize,
    /// Tempo from the first tempo event on the tempo track.
    bpm: Option<u32>,
}

impl DecodedMidi {
    /// Gets the file format.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Gets the ticks per quarter note.
    pub fn ticks_per_quarter(&self) -> u16 {
        self.ticks_per_quarter
    }

    /// Gets every track in the file.
    pub fn tracks(&self) -> &[DecodedTrack] {
        &self.tracks
    }

    /// Gets the tempo found in the file, if any.
    pub fn bpm(&self) -> Option<u32> {
        self.bpm
    }

    /// Gets the song tempo, falling back to the given default.
    pub fn tempo(&self, default_bpm: u32) -> Tempo {
        Tempo::new(self.bpm.unwrap_or(default_bpm), self.ticks_per_quarter)
    }

    /// Gets the tracks that carry playable events. In parallel files the tempo track is
    /// a conductor track and is left out.
    pub fn playable_tracks(&self) -> impl Iterator<Item = &DecodedTrack> {
        let skip = match self.format {
            Format::Parallel => Some(self.tempo_track),
            Format::SingleTrack | Format::Sequential => None,
        };
        self.tracks
            .iter()
            .filter(move |track| Some(track.index) != skip)
    }
}

/// Reads and decodes the MIDI file at the given path.
pub fn decode_file(path: &Path, tempo_track: usize) -> Result<DecodedMidi, Error> {
    let buf: Vec<u8> = fs::read(path)?;
    info!(path = ?path, bytes = buf.len(), "Decoding MIDI file");
    decode(&buf, tempo_track)
}

/// Decodes a MIDI file held in memory.
pub fn decode(bytes: &[u8], tempo_track: usize) -> Result<DecodedMidi, Error> {
    let smf = Smf::parse(bytes)?;
    let ticks_per_quarter = match smf.header.timing {
        Timing::Metrical(ticks) if ticks.as_int() > 0 => ticks.as_int(),
        _ => return Err(Error::UnsupportedTiming),
    };

    let mut bpm = None;
    let mut tracks = Vec::with_capacity(smf.tracks.len());
    for (index, track) in smf.tracks.iter().enumerate() {
        let mut tick: u64 = 0;
        let mut events = Vec::new();

        for event in track.iter() {
            tick += u64::from(event.delta.as_int());
            match event.kind {
                TrackEventKind::Midi { channel, message } => {
                    events.push(convert(tick, message).on_channel(channel.as_int()));
                }
                TrackEventKind::Meta(MetaMessage::Tempo(micros)) => {
                    if index == tempo_track && bpm.is_none() && micros.as_int() > 0 {
                        let value = (MICROS_PER_MINUTE / f64::from(micros.as_int())).round();
                        bpm = Some(value as u32);
                    }
                }
                _ => {}
            }
        }

        debug!(track = index, events = events.len(), "Track decoded");
        tracks.push(DecodedTrack { index, events });
    }

    info!(
        format = ?smf.header.format,
        ticks_per_quarter,
        tracks = tracks.len(),
        bpm = ?bpm,
        "MIDI file decoded"
    );

    Ok(DecodedMidi {
        format: smf.header.format,
        ticks_per_quarter,
        tracks,
        tempo_track,
        bpm,
    })
}

fn convert(tick: u64, message: MidiMessage) -> RawEvent {
    match message {
        MidiMessage::NoteOn { key, vel } if vel.as_int() == 0 => {
            RawEvent::note_off(tick, key.as_int())
        }
        MidiMessage::NoteOn { key, vel } => RawEvent::note_on(tick, key.as_int(), vel.as_int()),
        MidiMessage::NoteOff { key, vel } => RawEvent {
            velocity: vel.as_int(),
            ..RawEvent::note_off(tick, key.as_int())
        },
        MidiMessage::ProgramChange { program } => RawEvent::program_change(tick, program.as_int()),
        MidiMessage::Controller { controller, value } => {
            RawEvent::control_change(tick, controller.as_int(), value.as_int())
        }
        MidiMessage::Aftertouch { key, vel } => RawEvent {
            note: key.as_int(),
            velocity: vel.as_int(),
            ..RawEvent::other(tick, EventKind::KeyAfterTouch)
        },
        MidiMessage::ChannelAftertouch { vel } => RawEvent {
            velocity: vel.as_int(),
            ..RawEvent::other(tick, EventKind::ChannelAfterTouch)
        },
        MidiMessage::PitchBend { bend } => {
            let value = bend.0.as_int();
            RawEvent {
                arg2: (value & 0x7f) as u8,
                arg3: (value >> 7) as u8,
                ..RawEvent::other(tick, EventKind::PitchBend)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::error::Error;

    use midly::num::{u15, u24, u28, u4, u7};
    use midly::{Header, TrackEvent};

    use super::*;
    use crate::sequence::ControlChange;

    fn event(delta: u32, kind: TrackEventKind<'static>) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind,
        }
    }

    fn midi(delta: u32, channel: u8, message: MidiMessage) -> TrackEvent<'static> {
        event(
            delta,
            TrackEventKind::Midi {
                channel: u4::new(channel),
                message,
            },
        )
    }

    fn end() -> TrackEvent<'static> {
        event(0, TrackEventKind::Meta(MetaMessage::EndOfTrack))
    }

    fn write(format: Format, tracks: Vec<Vec<TrackEvent<'static>>>) -> Vec<u8> {
        let mut smf = Smf::new(Header::new(format, Timing::Metrical(u15::new(480))));
        smf.tracks = tracks;
        let mut buf = Vec::new();
        smf.write_std(&mut buf).expect("write MIDI");
        buf
    }

    fn song() -> Vec<u8> {
        write(
            Format::Parallel,
            vec![
                vec![
                    event(0, TrackEventKind::Meta(MetaMessage::Tempo(u24::new(500_000)))),
                    event(10, TrackEventKind::Meta(MetaMessage::Tempo(u24::new(250_000)))),
                    end(),
                ],
                vec![
                    midi(0, 0, MidiMessage::ProgramChange { program: u7::new(24) }),
                    midi(
                        0,
                        0,
                        MidiMessage::Controller {
                            controller: u7::new(7),
                            value: u7::new(100),
                        },
                    ),
                    midi(
                        0,
                        0,
                        MidiMessage::NoteOn {
                            key: u7::new(60),
                            vel: u7::new(90),
                        },
                    ),
                    midi(
                        480,
                        0,
                        MidiMessage::NoteOn {
                            key: u7::new(60),
                            vel: u7::new(0),
                        },
                    ),
                    end(),
                ],
                vec![
                    midi(
                        240,
                        9,
                        MidiMessage::NoteOn {
                            key: u7::new(36),
                            vel: u7::new(127),
                        },
                    ),
                    midi(
                        240,
                        9,
                        MidiMessage::NoteOff {
                            key: u7::new(36),
                            vel: u7::new(64),
                        },
                    ),
                    end(),
                ],
            ],
        )
    }

    #[test]
    fn decodes_tracks() -> Result<(), Box<dyn Error>> {
        let decoded = decode(&song(), 0)?;

        assert_eq!(Format::Parallel, decoded.format());
        assert_eq!(480, decoded.ticks_per_quarter());
        assert_eq!(3, decoded.tracks().len());
        assert!(decoded.tracks()[0].events().is_empty());

        let melodic = decoded.tracks()[1].events();
        assert_eq!(4, melodic.len());
        assert_eq!(EventKind::ProgramChange, melodic[0].kind);
        assert_eq!(24, melodic[0].arg2);
        assert_eq!(
            EventKind::ControlChange(ControlChange::Volume),
            melodic[1].kind
        );
        assert_eq!(100, melodic[1].arg3);
        assert_eq!(RawEvent::note_on(0, 60, 90), melodic[2]);
        // Note on with zero velocity is a note off.
        assert_eq!(RawEvent::note_off(480, 60), melodic[3]);

        let drums = &decoded.tracks()[2];
        assert_eq!(Some(9), drums.first_channel());
        assert_eq!(240, drums.events()[0].tick);
        assert_eq!(480, drums.events()[1].tick);
        assert_eq!(EventKind::NoteOff, drums.events()[1].kind);
        Ok(())
    }

    #[test]
    fn first_tempo_wins() -> Result<(), Box<dyn Error>> {
        let decoded = decode(&song(), 0)?;
        assert_eq!(Some(120), decoded.bpm());
        assert_eq!(960.0, decoded.tempo(100).ticks_per_second());
        Ok(())
    }

    #[test]
    fn default_tempo() -> Result<(), Box<dyn Error>> {
        // Track 1 carries no tempo event.
        let decoded = decode(&song(), 1)?;
        assert_eq!(None, decoded.bpm());
        assert_eq!(100, decoded.tempo(100).bpm());
        Ok(())
    }

    #[test]
    fn parallel_files_skip_the_tempo_track() -> Result<(), Box<dyn Error>> {
        let decoded = decode(&song(), 0)?;
        let playable: Vec<usize> = decoded.playable_tracks().map(DecodedTrack::index).collect();
        assert_eq!(vec![1, 2], playable);
        Ok(())
    }

    #[test]
    fn single_track_files_keep_track_zero() -> Result<(), Box<dyn Error>> {
        let bytes = write(
            Format::SingleTrack,
            vec![vec![
                midi(
                    0,
                    0,
                    MidiMessage::NoteOn {
                        key: u7::new(60),
                        vel: u7::new(90),
                    },
                ),
                end(),
            ]],
        );
        let decoded = decode(&bytes, 0)?;
        assert_eq!(1, decoded.playable_tracks().count());
        Ok(())
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode(b"not a midi file", 0).is_err());
    }

    #[test]
    fn decode_from_file() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("song.mid");
        std::fs::write(&path, song())?;

        let decoded = decode_file(&path, 0)?;
        assert_eq!(3, decoded.tracks().len());
        Ok(())
    }
}
