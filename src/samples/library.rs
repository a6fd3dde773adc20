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

//! Directory backed sample library.
//!
//! Melodic samples are recorded at C5 and named `<program>_C5.<ext>`, with or without zero
//! padding. Percussion samples live in a `Percussion` subdirectory named `<note>.<ext>`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::{SampleHandle, SampleLookup};
use crate::error::Error;

/// Name of the subdirectory holding percussion samples.
const PERCUSSION_DIR: &str = "Percussion";

/// Suffix of melodic sample file stems.
const MELODIC_SUFFIX: &str = "_C5";

/// An index of known samples by program and by percussion note.
#[derive(Debug, Default)]
pub struct SampleLibrary {
    melodic: HashMap<u8, SampleHandle>,
    percussion: HashMap<u8, SampleHandle>,
}

impl SampleLibrary {
    /// Creates an empty library.
    pub fn new() -> SampleLibrary {
        SampleLibrary::default()
    }

    /// Indexes every sample found in the given directory.
    pub fn scan(path: &Path) -> Result<SampleLibrary, Error> {
        let mut library = SampleLibrary::new();

        for entry in fs::read_dir(path)? {
            let path = entry?.path();
            if path.is_dir() {
                continue;
            }
            let Some(program) = stem(&path)
                .and_then(|stem| stem.strip_suffix(MELODIC_SUFFIX))
                .and_then(parse_id)
            else {
                debug!(path = ?path, "Skipping file that is not a melodic sample");
                continue;
            };
            let name = format!("{:03}{}", program, MELODIC_SUFFIX);
            library.insert(program, false, SampleHandle::new(&name, path));
        }

        let percussion_path = path.join(PERCUSSION_DIR);
        if percussion_path.is_dir() {
            for entry in fs::read_dir(&percussion_path)? {
                let path = entry?.path();
                if path.is_dir() {
                    continue;
                }
                let Some(note) = stem(&path).and_then(parse_id) else {
                    debug!(path = ?path, "Skipping file that is not a percussion sample");
                    continue;
                };
                let name = format!("{}/{}", PERCUSSION_DIR, note);
                library.insert(note, true, SampleHandle::new(&name, path));
            }
        }

        info!(
            path = ?path,
            melodic = library.melodic.len(),
            percussion = library.percussion.len(),
            "Sample library indexed"
        );
        Ok(library)
    }

    /// Adds or replaces a sample.
    pub fn insert(&mut self, id: u8, percussion: bool, sample: SampleHandle) {
        if percussion {
            self.percussion.insert(id, sample);
        } else {
            self.melodic.insert(id, sample);
        }
    }

    /// Returns the total number of samples.
    pub fn len(&self) -> usize {
        self.melodic.len() + self.percussion.len()
    }

    /// Returns true if the library holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SampleLookup for SampleLibrary {
    fn lookup(&self, id: u8, percussion: bool) -> Option<SampleHandle> {
        if percussion {
            self.percussion.get(&id).cloned()
        } else {
            self.melodic.get(&id).cloned()
        }
    }
}

fn stem(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|stem| stem.to_str())
}

/// Parses a MIDI data value (0-127).
fn parse_id(value: &str) -> Option<u8> {
    value.parse::<u8>().ok().filter(|id| *id < 128)
}
