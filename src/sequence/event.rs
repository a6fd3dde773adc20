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

/// MIDI controller number for channel volume.
pub const CONTROLLER_VOLUME: u8 = 7;

/// MIDI controller number for expression.
pub const CONTROLLER_EXPRESSION: u8 = 11;

/// Control change subtypes the scheduler distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlChange {
    Volume,
    Expression,
    /// Any other controller, by number.
    Other(u8),
}

impl From<u8> for ControlChange {
    fn from(controller: u8) -> Self {
        match controller {
            CONTROLLER_VOLUME => ControlChange::Volume,
            CONTROLLER_EXPRESSION => ControlChange::Expression,
            other => ControlChange::Other(other),
        }
    }
}

/// The kind of a decoded channel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    NoteOn,
    NoteOff,
    ProgramChange,
    ControlChange(ControlChange),
    ChannelAfterTouch,
    KeyAfterTouch,
    PitchBend,
}

/// A single decoded channel event at an absolute tick.
///
/// Payload fields follow the decoder's layout: `note` and `velocity` carry note data,
/// `arg2` carries the program number for program changes, `arg3` carries the controller
/// value for control changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub tick: u64,
    pub kind: EventKind,
    /// MIDI channel, 0-indexed.
    pub channel: u8,
    pub note: u8,
    pub velocity: u8,
    pub arg2: u8,
    pub arg3: u8,
}

impl RawEvent {
    fn new(tick: u64, kind: EventKind) -> RawEvent {
        RawEvent {
            tick,
            kind,
            channel: 0,
            note: 0,
            velocity: 0,
            arg2: 0,
            arg3: 0,
        }
    }

    /// Creates a note on event.
    pub fn note_on(tick: u64, note: u8, velocity: u8) -> RawEvent {
        RawEvent {
            note,
            velocity,
            ..RawEvent::new(tick, EventKind::NoteOn)
        }
    }

    /// Creates a note off event.
    pub fn note_off(tick: u64, note: u8) -> RawEvent {
        RawEvent {
            note,
            ..RawEvent::new(tick, EventKind::NoteOff)
        }
    }

    /// Creates a program change event.
    pub fn program_change(tick: u64, program: u8) -> RawEvent {
        RawEvent {
            arg2: program,
            ..RawEvent::new(tick, EventKind::ProgramChange)
        }
    }

    /// Creates a control change event.
    pub fn control_change(tick: u64, controller: u8, value: u8) -> RawEvent {
        RawEvent {
            arg2: controller,
            arg3: value,
            ..RawEvent::new(tick, EventKind::ControlChange(controller.into()))
        }
    }

    /// Creates an event of any other kind with no payload.
    pub fn other(tick: u64, kind: EventKind) -> RawEvent {
        RawEvent::new(tick, kind)
    }

    /// Returns a copy of this event on the given channel.
    pub fn on_channel(self, channel: u8) -> RawEvent {
        RawEvent { channel, ..self }
    }
}
