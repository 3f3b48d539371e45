//! Subtitle cue resolution for a media player front-end.
//!
//! Subtitle sources are parsed into an immutable, sorted [`cue::CueTrack`].
//! The cue on screen at any playback position is found by binary search,
//! and [`tracker::CueTracker`] turns a stream of clock updates into the
//! few display changes that actually matter.

pub mod cli;
pub mod cue;
pub mod error;
pub mod format;
pub mod parser;
pub mod processor;
pub mod serialiser;
pub mod tracker;
