//! Core library for the audio-reactive animation cue engine.
//!
//! A pre-analysed [`FeatureTrack`] is walked one frame per tick by the
//! [`CueScheduler`]. Every [`TriggerRule`] in the bound [`TriggerCatalog`] is
//! checked against the current frame and matching cues are fired on an
//! [`AnimationSink`], unless the sink reports the cue as already playing.
//! Audio playback sits behind [`AudioTransport`]; [`PlaybackSession`] keeps
//! the two in step.

pub mod analysis;
pub mod audio;
pub mod catalog;
pub mod config;
pub mod error;
pub mod loader;
pub mod mapping;
pub mod session;
pub mod sink;
pub mod timeline;

pub use analysis::{FeatureFrame, FeatureStats, FeatureTrack, TrackSummary};
pub use audio::{AudioTransport, TrackDeck};
pub use catalog::TriggerCatalog;
pub use config::{EngineConfig, EvaluationMode, SchedulerConfig};
pub use error::{CueEngineError, LoadError, Result};
pub use loader::{load_track, parse_track, LoadedTrack};
pub use mapping::{CueId, RangePredicate, TriggerRule};
pub use session::{PlaybackSession, SharedScheduler};
pub use sink::{AnimationSink, RecordingSink, SinkCall};
pub use timeline::{CadenceClock, CueScheduler, SchedulerState, TickOutcome, TickReport};
