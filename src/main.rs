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
use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{crate_version, Parser, Subcommand};
use midisched::config::SchedulerConfig;
use midisched::midi;
use midisched::playback::{Clock, LogDriver, SystemClock};
use midisched::samples::{SampleLibrary, SampleLookup};
use midisched::scheduler::Session;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A MIDI driven sample scheduler."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prints the tempo and the per track scheduling plan of a MIDI file.
    Inspect {
        /// The path to the MIDI file.
        midi_path: String,
        /// The path to the scheduler config.
        #[arg[short, long]]
        config: Option<String>,
    },
    /// Schedules a MIDI file in real time against a logging driver.
    Play {
        /// The path to the MIDI file.
        midi_path: String,
        /// The path to the scheduler config.
        #[arg[short, long]]
        config: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { midi_path, config } => {
            let (config, base_path) = load_config(config.as_deref())?;
            let midi = midi::decode_file(&PathBuf::from(&midi_path), config.tempo_track())?;
            let session = Session::from_midi(
                &midi,
                0.0,
                &config,
                Box::new(LogDriver::new()),
                load_samples(&config, &base_path)?,
            )?;

            let tempo = session.time_base().tempo();
            println!("{} ({:?})", midi_path, midi.format());
            println!(
                "Tempo: {} bpm, {} ticks per quarter{}",
                tempo.bpm(),
                tempo.ticks_per_quarter(),
                if midi.bpm().is_none() { " (default)" } else { "" }
            );
            println!(
                "Length: {:.2}s",
                session.end_time() - session.time_base().origin()
            );
            println!("\nTracks (count: {}):", session.tracks().len());
            for track in session.tracks() {
                println!(
                    "- {}: {} chunks, {} notes, {} voices{}",
                    track.handle(),
                    track.chunks().len(),
                    track.intervals().len(),
                    track.performance().voices().len(),
                    if track.is_percussion() {
                        " (percussion)"
                    } else {
                        ""
                    }
                );
            }
        }
        Commands::Play { midi_path, config } => {
            let (config, base_path) = load_config(config.as_deref())?;
            let midi = midi::decode_file(&PathBuf::from(&midi_path), config.tempo_track())?;
            let frame_interval = config.frame_interval()?;

            let clock = SystemClock::new();
            let mut session = Session::from_midi(
                &midi,
                clock.now(),
                &config,
                Box::new(LogDriver::new()),
                load_samples(&config, &base_path)?,
            )?;

            let end_time = session.end_time();
            info!(path = %midi_path, end_time, "Playing");
            // Keep running past the last dispatch until the final stop time has passed.
            while !session.is_finished() || clock.now() < end_time {
                session.advance(clock.now());
                spin_sleep::sleep(frame_interval);
            }
            info!(path = %midi_path, "Finished");
        }
    }

    Ok(())
}

/// Loads the scheduler config, if given. Relative paths in the config are resolved
/// against the config file's directory.
fn load_config(path: Option<&str>) -> Result<(SchedulerConfig, PathBuf), Box<dyn Error>> {
    match path {
        Some(path) => {
            let path = PathBuf::from(path);
            let config = SchedulerConfig::deserialize(&path)?;
            let base_path = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            Ok((config, base_path))
        }
        None => Ok((SchedulerConfig::default(), PathBuf::from("."))),
    }
}

fn load_samples(
    config: &SchedulerConfig,
    base_path: &Path,
) -> Result<Box<dyn SampleLookup>, Box<dyn Error>> {
    match config.samples(base_path) {
        Some(path) => {
            let library = SampleLibrary::scan(&path)?;
            info!(path = ?path, samples = library.len(), "Sample library loaded");
            Ok(Box::new(library))
        }
        None => Ok(Box::new(SampleLibrary::new())),
    }
}
