use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubcueError {
    #[error("{0}")]
    ParseError(String),
    #[error("cue {index} ends ({hide_at:?}) before it starts ({show_at:?})")]
    EmptyInterval {
        index: usize,
        show_at: Duration,
        hide_at: Duration,
    },
    #[error("cue {index} starts before the cue preceding it")]
    Unsorted { index: usize },
    #[error("cue {index} overlaps the cue preceding it")]
    Overlap { index: usize },
    #[error("cue at position {position} carries index {index}")]
    BadIndex { position: usize, index: usize },
    #[error("invalid playback time: {0}")]
    InvalidTime(f64),
}
