use std::{fmt, sync::Arc, time::Duration};

use crate::{
    AnimationSink, CueEngineError, CueId, EvaluationMode, FeatureFrame, FeatureTrack, Result,
    SchedulerConfig, TriggerCatalog, TriggerRule,
};

/// Fixed-cadence clock that turns elapsed wall-clock time into whole ticks.
///
/// One tick always covers one frame, whatever the track's real frame rate or
/// tempo, so long tracks drift away from the audio.
// TODO: derive the cursor from the transport's reported playback position
// instead of accumulating cadence time here.
#[derive(Debug, Clone)]
pub struct CadenceClock {
    cadence: Duration,
    pending: Duration,
}

impl CadenceClock {
    pub fn new(cadence: Duration) -> Self {
        Self {
            cadence: cadence.max(Duration::from_nanos(1)),
            pending: Duration::ZERO,
        }
    }

    pub fn cadence(&self) -> Duration {
        self.cadence
    }

    pub fn reset(&mut self) {
        self.pending = Duration::ZERO;
    }

    /// Adds `delta` and returns how many ticks became due. The remainder is
    /// carried into the next call.
    pub fn advance(&mut self, delta: Duration) -> u32 {
        self.pending = self.pending.saturating_add(delta);
        let due = self.pending.as_nanos() / self.cadence.as_nanos();
        let due = u32::try_from(due).unwrap_or(u32::MAX);
        self.pending -= self.cadence * due;
        due
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchedulerState {
    /// Nothing bound, or bound but never started since the last reset.
    #[default]
    Idle,
    Running,
    /// Stopped explicitly or by reaching the end of the track.
    Stopped,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SchedulerState::Idle => "idle",
            SchedulerState::Running => "running",
            SchedulerState::Stopped => "stopped",
        })
    }
}

/// Decisions made while evaluating one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Index of the frame that was evaluated.
    pub index: usize,
    pub activated: Vec<CueId>,
    /// Cues explicitly reset. Always empty in [`EvaluationMode::MatchedOnly`].
    pub reset: Vec<CueId>,
    /// The evaluated frame was the last one; the scheduler is now stopped.
    pub reached_end: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Evaluated(TickReport),
    /// The cursor is past the last frame. Repeated calls stay here.
    Finished,
    /// Not running and not at the end: idle or stopped mid-track.
    Halted,
}

impl TickOutcome {
    pub fn is_finished(&self) -> bool {
        matches!(self, TickOutcome::Finished)
            || matches!(self, TickOutcome::Evaluated(report) if report.reached_end)
    }

    pub fn report(&self) -> Option<&TickReport> {
        match self {
            TickOutcome::Evaluated(report) => Some(report),
            _ => None,
        }
    }
}

/// Walks a feature track one frame per tick and fires the cues whose rules
/// match the current frame.
#[derive(Debug, Default)]
pub struct CueScheduler {
    config: SchedulerConfig,
    track: Option<Arc<FeatureTrack>>,
    catalog: TriggerCatalog,
    cursor: usize,
    state: SchedulerState,
}

impl CueScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Attaches a track and the catalog evaluated against it.
    pub fn bind(
        &mut self,
        track: impl Into<Arc<FeatureTrack>>,
        catalog: TriggerCatalog,
    ) -> Result<()> {
        if self.state != SchedulerState::Idle {
            return Err(CueEngineError::InvalidTransition {
                operation: "bind a track",
                state: self.state,
            });
        }

        let track = track.into();
        if track.is_empty() {
            return Err(CueEngineError::NoFrames);
        }

        for rule in catalog.rules().filter(|rule| rule.has_inverted_range()) {
            tracing::warn!(cue = %rule.cue, "rule has an inverted range and will never fire");
        }

        tracing::info!(
            frames = track.len(),
            bpm = track.bpm,
            rules = catalog.len(),
            mode = %self.config.mode,
            "bound feature track"
        );
        self.track = Some(track);
        self.catalog = catalog;
        self.cursor = 0;
        Ok(())
    }

    /// Detaches the track and hands the catalog back, leaving the scheduler
    /// idle.
    pub fn unbind(&mut self) -> Option<(Arc<FeatureTrack>, TriggerCatalog)> {
        self.state = SchedulerState::Idle;
        self.cursor = 0;
        let track = self.track.take()?;
        Some((track, std::mem::take(&mut self.catalog)))
    }

    pub fn start(&mut self) -> Result<()> {
        if self.state == SchedulerState::Running {
            return Ok(());
        }

        let track = self.track.as_ref().ok_or(CueEngineError::NotBound)?;
        if track.is_empty() {
            return Err(CueEngineError::NoFrames);
        }

        tracing::info!(cursor = self.cursor, "scheduler started");
        self.state = SchedulerState::Running;
        Ok(())
    }

    /// Keeps the cursor so playback can resume with [`CueScheduler::start`].
    pub fn stop(&mut self) {
        if self.state == SchedulerState::Running {
            tracing::info!(cursor = self.cursor, "scheduler stopped");
            self.state = SchedulerState::Stopped;
        }
    }

    /// Rewinds to the first frame and clears every trigger, in the catalog
    /// and in the sink.
    pub fn reset(&mut self, sink: &mut dyn AnimationSink) {
        tracing::debug!(cursor = self.cursor, "scheduler reset");
        self.cursor = 0;
        self.state = SchedulerState::Idle;
        self.catalog.clear_active();
        sink.reset_all();
    }

    /// Evaluates the frame under the cursor and moves on by one.
    pub fn advance_one_tick(&mut self, sink: &mut dyn AnimationSink) -> TickOutcome {
        if self.state != SchedulerState::Running {
            return if self.is_finished() {
                TickOutcome::Finished
            } else {
                TickOutcome::Halted
            };
        }

        let Some(track) = self.track.as_ref() else {
            self.state = SchedulerState::Stopped;
            return TickOutcome::Halted;
        };

        let Some(frame) = track.frame(self.cursor).copied() else {
            self.state = SchedulerState::Stopped;
            return TickOutcome::Finished;
        };

        let mut report = TickReport {
            index: self.cursor,
            ..TickReport::default()
        };
        let mode = self.config.mode;
        for rule in self.catalog.rules_mut() {
            evaluate_rule(rule, &frame, mode, sink, &mut report);
        }

        self.cursor += 1;
        if self.cursor >= track.len() {
            tracing::info!(frames = track.len(), "reached end of feature track");
            self.state = SchedulerState::Stopped;
            report.reached_end = true;
        }

        TickOutcome::Evaluated(report)
    }

    /// Self-driven advancement: feeds `elapsed` into the cadence clock and
    /// runs one tick per due cadence unit, stopping early once the scheduler
    /// leaves the running state.
    pub fn run_for(
        &mut self,
        clock: &mut CadenceClock,
        elapsed: Duration,
        sink: &mut dyn AnimationSink,
    ) -> Vec<TickOutcome> {
        if !self.is_running() {
            return Vec::new();
        }

        let due = clock.advance(elapsed);
        let mut outcomes = Vec::new();
        for _ in 0..due {
            if !self.is_running() {
                break;
            }
            outcomes.push(self.advance_one_tick(sink));
        }
        outcomes
    }

    pub fn cadence_clock(&self) -> CadenceClock {
        CadenceClock::new(self.config.cadence())
    }

    /// Fraction of the track already evaluated, `0.0` when nothing is bound.
    pub fn progress(&self) -> f32 {
        match self.track.as_ref() {
            Some(track) if !track.is_empty() => self.cursor as f32 / track.len() as f32,
            _ => 0.0,
        }
    }

    pub fn has_more_frames(&self) -> bool {
        self.track
            .as_ref()
            .map(|track| self.cursor < track.len())
            .unwrap_or(false)
    }

    pub fn is_finished(&self) -> bool {
        self.track
            .as_ref()
            .map(|track| self.cursor >= track.len())
            .unwrap_or(false)
    }

    pub fn current_frame(&self) -> Option<&FeatureFrame> {
        self.track.as_ref()?.frame(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    pub fn track(&self) -> Option<&Arc<FeatureTrack>> {
        self.track.as_ref()
    }

    pub fn catalog(&self) -> &TriggerCatalog {
        &self.catalog
    }

    /// Rule edits land between ticks; `&mut self` rules out an evaluation in
    /// flight.
    pub fn catalog_mut(&mut self) -> &mut TriggerCatalog {
        &mut self.catalog
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn set_mode(&mut self, mode: EvaluationMode) {
        self.config.mode = mode;
    }
}

fn evaluate_rule(
    rule: &mut TriggerRule,
    frame: &FeatureFrame,
    mode: EvaluationMode,
    sink: &mut dyn AnimationSink,
    report: &mut TickReport,
) {
    if rule.matches(frame) {
        // The sink knows about clips finishing on their own; `rule.active`
        // does not.
        if !sink.is_playing(rule.cue) {
            tracing::debug!(cue = %rule.cue, frame = report.index, "activating cue");
            sink.activate(rule.cue);
            rule.active = true;
            report.activated.push(rule.cue);
        }
        return;
    }

    if mode == EvaluationMode::ExplicitDeactivate {
        sink.reset(rule.cue);
        rule.active = false;
        report.reset.push(rule.cue);
    }
}
