use std::path::PathBuf;

use crate::{CueId, SchedulerState};

/// Result alias that carries the custom [`CueEngineError`] type.
pub type Result<T> = std::result::Result<T, CueEngineError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum CueEngineError {
    /// The bound (or about to be bound) feature track has no frames.
    #[error("feature track has no frames")]
    NoFrames,
    /// An operation needed a bound track but the scheduler has none.
    #[error("no feature track is bound to the scheduler")]
    NotBound,
    /// The scheduler was asked to do something its current state forbids.
    #[error("cannot {operation} while the scheduler is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: SchedulerState,
    },
    /// The cue is not part of the catalog.
    #[error("cue `{0}` is not in the trigger catalog")]
    UnknownCue(CueId),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("track index {index} is out of range for a deck of {len} tracks")]
    TrackIndex { index: usize, len: usize },
    /// A shared lock was poisoned by a panicking holder.
    #[error("{0} has been poisoned")]
    Poisoned(&'static str),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Free-form message for host-level failures.
    #[error("{0}")]
    Message(String),
}

impl CueEngineError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

/// Failure reported by the track loader. Never escapes as a panic; it travels
/// next to an empty track in [`crate::LoadedTrack`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("feature track `{}` does not exist", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read feature track `{}`: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse feature track: {0}")]
    Parse(#[from] serde_json::Error),
}
