//! Command-line interface.
//!
//! Every command writes to a caller supplied `Write` so that the binary
//! can hand it stdout and tests can hand it a buffer.

use crate::cue::CueTrack;
use crate::error::SubcueError;
use crate::format::{self, Meta, Video};
use crate::parser::Parser;
use crate::serialiser;
use crate::tracker::CueTracker;

use std::io::{self, Read, Write};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser as ClapParser, Subcommand};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, ClapParser)]
#[command(name = "subcue", about = "Resolve which subtitle cue is on screen during playback")]
pub struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The file to read from. If not supplied, the input will be read from standard input.",
        default_value = "-",
        global = true
    )]
    pub input: String,
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Log more detail to standard error. Repeat for more. RUST_LOG takes precedence.",
        global = true
    )]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the cue shown at the given playback position. Exits with status 1 when no cue is shown.
    At {
        #[arg(value_name = "SECONDS")]
        seconds: f64,
    },
    /// Simulate playback and print every change of the cue on screen.
    Play {
        #[arg(long, value_name = "SECONDS", default_value_t = 0.0)]
        from: f64,
        #[arg(
            long,
            value_name = "SECONDS",
            help = "Where to stop. Defaults to the end of the last cue."
        )]
        to: Option<f64>,
        #[arg(long, value_name = "SECONDS", default_value_t = 0.1)]
        step: f64,
    },
    /// Print the display titles for a JSON document of the form {"meta": {...}, "video": {...}}.
    Title,
}

#[derive(Deserialize)]
struct TitleInput {
    meta: Option<Meta>,
    video: Option<Video>,
}

/// Runs `cli` against the already read input `data`.
///
/// Returns `Ok(false)` when `at` finds no cue, which the binary reports
/// with exit status 1.
pub fn run<W: Write>(cli: &Cli, data: &str, out: &mut W) -> Result<bool> {
    match cli.command {
        Command::At { seconds } => {
            let track = load_track(data, &cli.input)?;
            let time = seconds_to_duration(seconds)?;
            match track.find(time) {
                Some(cue) => {
                    serialiser::write_cue(out, cue)?;
                    Ok(true)
                }
                None => {
                    info!(seconds, "No cue at the requested time");
                    Ok(false)
                }
            }
        }
        Command::Play { from, to, step } => {
            let track = load_track(data, &cli.input)?;
            let from = seconds_to_duration(from)?;
            let to = match to {
                Some(to) => seconds_to_duration(to)?,
                None => track.end(),
            };
            let step = seconds_to_duration(step)?;
            if step.is_zero() {
                return Err(anyhow!("The step must be greater than zero."));
            }
            play(out, &track, from, to, step)?;
            Ok(true)
        }
        Command::Title => {
            let doc: TitleInput = serde_json::from_str(data)
                .context(format!("Failed to parse title document: '{}'", cli.input))?;
            print_titles(out, doc.meta.as_ref(), doc.video.as_ref())?;
            Ok(true)
        }
    }
}

pub fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(input).context(format!("Failed to open input file: '{}'", input))
    }
}

fn load_track(data: &str, source: &str) -> Result<CueTrack> {
    let mut parser = Parser::new()?;

    let cues = parser
        .parse(data)
        .context(format!("Failed to parse subtitle file: '{}'", source))?;
    if cues.is_empty() {
        return Err(anyhow!("You appear to have supplied an empty file."));
    }
    info!(cues = cues.len(), source, "Loaded subtitle track");

    CueTrack::new(cues).context("Parsed cues do not form a valid track")
}

fn seconds_to_duration(seconds: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(seconds).map_err(|_| SubcueError::InvalidTime(seconds).into())
}

// The clock stops at `to` or when it can no longer advance.
fn play<W: Write>(
    out: &mut W,
    track: &CueTrack,
    from: Duration,
    to: Duration,
    step: Duration,
) -> Result<()> {
    let mut tracker = CueTracker::new();
    let mut time = from;
    while time <= to {
        if let Some(change) = tracker.update(track.cues(), time) {
            serialiser::write_change(out, time, &change)?;
        }
        time = match time.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    out.flush()?;
    Ok(())
}

fn print_titles<W: Write>(out: &mut W, meta: Option<&Meta>, video: Option<&Video>) -> Result<()> {
    let released = video
        .and_then(|v| v.released.as_deref())
        .or_else(|| meta.and_then(|m| m.released.as_deref()));
    let lines = [
        ("player", format::player_title(meta, video)),
        ("card", format::episode_card_title(video)),
        ("list", video.map(|v| format::episode_list_title(Some(v)))),
        ("release", format::release_info(meta, video)),
        ("date", format::release_date(released)),
        ("runtime", format::runtime(meta, video)),
        ("description", format::description(meta, video)),
    ];
    for (label, value) in lines {
        if let Some(value) = value {
            writeln!(out, "{}: {}", label, value)?;
        }
    }
    Ok(())
}
