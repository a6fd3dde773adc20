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

//! Sample lookup by program or percussion note.
//!
//! This module provides:
//! - Opaque handles to playable samples
//! - The single-probe lookup capability
//! - Instrument family fallback for melodic programs
//! - A directory backed sample library

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::Error;

mod library;

pub use library::SampleLibrary;

/// Number of programs in one General MIDI instrument family.
pub const FAMILY_SIZE: u8 = 8;

/// General MIDI instrument family names, indexed by `program / FAMILY_SIZE`.
pub const INSTRUMENT_FAMILIES: [&str; 16] = [
    "Piano",
    "Chromatic Percussion",
    "Organ",
    "Guitar",
    "Bass",
    "Strings",
    "Ensemble",
    "Brass",
    "Reed",
    "Pipe",
    "Synth Lead",
    "Synth Pad",
    "Synth Effects",
    "Ethnic",
    "Percussive",
    "Sound Effects",
];

/// A handle to a playable sample. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SampleHandle {
    name: Arc<str>,
    path: Arc<Path>,
}

impl SampleHandle {
    /// Creates a new sample handle.
    pub fn new(name: &str, path: PathBuf) -> SampleHandle {
        SampleHandle {
            name: Arc::from(name),
            path: Arc::from(path),
        }
    }

    /// Gets the sample name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the sample file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for SampleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Looks up a single sample. `id` is a program number for melodic samples and a note
/// number for percussion samples.
pub trait SampleLookup {
    fn lookup(&self, id: u8, percussion: bool) -> Option<SampleHandle>;
}

/// Gets the instrument family name of a program.
pub fn instrument_family(program: u8) -> &'static str {
    INSTRUMENT_FAMILIES
        .get(usize::from(program / FAMILY_SIZE))
        .copied()
        .unwrap_or("Unknown")
}

/// Resolves the sample for a program or percussion note.
///
/// Percussion samples are probed once. Melodic programs try the exact program first and
/// then every program of the same instrument family in ascending order.
pub fn resolve_sample(
    lookup: &dyn SampleLookup,
    id: u8,
    percussion: bool,
) -> Result<SampleHandle, Error> {
    if let Some(sample) = lookup.lookup(id, percussion) {
        return Ok(sample);
    }

    if !percussion {
        let first = (id / FAMILY_SIZE) * FAMILY_SIZE;
        for program in first..first.saturating_add(FAMILY_SIZE) {
            if let Some(sample) = lookup.lookup(program, false) {
                debug!(
                    program = id,
                    fallback = program,
                    family = instrument_family(id),
                    "Using instrument family fallback"
                );
                return Ok(sample);
            }
        }
    }

    Err(Error::SampleNotFound { id, percussion })
}

#[cfg(test)]
mod test {
    use super::*;

    fn library(melodic: &[u8], percussion: &[u8]) -> SampleLibrary {
        let mut library = SampleLibrary::new();
        for program in melodic {
            let name = format!("{:03}_C5", program);
            library.insert(*program, false, SampleHandle::new(&name, PathBuf::from(&name)));
        }
        for note in percussion {
            let name = format!("Percussion/{}", note);
            library.insert(*note, true, SampleHandle::new(&name, PathBuf::from(&name)));
        }
        library
    }

    #[test]
    fn exact_match() -> Result<(), Error> {
        let library = library(&[0, 3], &[]);
        assert_eq!("003_C5", resolve_sample(&library, 3, false)?.name());
        Ok(())
    }

    #[test]
    fn family_fallback() -> Result<(), Error> {
        // Program 27 is a guitar; the guitar family spans 24..32.
        let library = library(&[0, 26, 30], &[]);
        assert_eq!("026_C5", resolve_sample(&library, 27, false)?.name());
        assert_eq!("026_C5", resolve_sample(&library, 31, false)?.name());
        assert_eq!("Guitar", instrument_family(27));
        Ok(())
    }

    #[test]
    fn fallback_stays_within_family() {
        let library = library(&[0, 16], &[]);
        assert!(matches!(
            resolve_sample(&library, 8, false),
            Err(Error::SampleNotFound {
                id: 8,
                percussion: false
            })
        ));
    }

    #[test]
    fn last_family() -> Result<(), Error> {
        let library = library(&[120], &[]);
        assert_eq!("120_C5", resolve_sample(&library, 127, false)?.name());
        assert_eq!("Sound Effects", instrument_family(127));
        Ok(())
    }

    #[test]
    fn percussion_has_no_fallback() -> Result<(), Error> {
        let library = library(&[35], &[36]);
        assert_eq!("Percussion/36", resolve_sample(&library, 36, true)?.name());
        assert!(matches!(
            resolve_sample(&library, 35, true),
            Err(Error::SampleNotFound {
                id: 35,
                percussion: true
            })
        ));
        Ok(())
    }
}
