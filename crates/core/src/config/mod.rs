use std::{fmt, path::Path, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{CueEngineError, Result};

/// Top-level configuration structure for the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scheduler: SchedulerConfig,
    /// Bind the curated preset catalog when no catalog is supplied.
    pub use_default_presets: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            use_default_presets: true,
        }
    }
}

impl EngineConfig {
    /// Reads a JSON config file. Missing keys fall back to their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Configuration specific to the cue scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Wall-clock time between two ticks, in milliseconds.
    pub cadence_ms: u64,
    pub mode: EvaluationMode,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            // one rendered frame at ~60 Hz
            cadence_ms: 16,
            mode: EvaluationMode::default(),
        }
    }
}

impl SchedulerConfig {
    pub fn cadence(&self) -> Duration {
        Duration::from_millis(self.cadence_ms.max(1))
    }
}

/// What the scheduler does with rules that do not match the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvaluationMode {
    /// Leave them alone; the animation system owns its own transitions out.
    #[default]
    MatchedOnly,
    /// Reset the trigger of every non-matching rule on every tick.
    ExplicitDeactivate,
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EvaluationMode::MatchedOnly => "matched-only",
            EvaluationMode::ExplicitDeactivate => "explicit-deactivate",
        })
    }
}

impl FromStr for EvaluationMode {
    type Err = CueEngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "matched-only" => Ok(EvaluationMode::MatchedOnly),
            "explicit-deactivate" => Ok(EvaluationMode::ExplicitDeactivate),
            other => Err(CueEngineError::msg(format!(
                "unknown evaluation mode `{other}` (expected `matched-only` or `explicit-deactivate`)"
            ))),
        }
    }
}
