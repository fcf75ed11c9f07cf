use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use crate::{
    AnimationSink, AudioTransport, CadenceClock, CueEngineError, CueScheduler, Result,
    SchedulerState, TickOutcome, TriggerCatalog,
};

/// One transport, one sink and one scheduler driven together.
#[derive(Debug)]
pub struct PlaybackSession<T, S> {
    transport: T,
    sink: S,
    scheduler: CueScheduler,
    clock: CadenceClock,
}

impl<T: AudioTransport, S: AnimationSink> PlaybackSession<T, S> {
    /// The scheduler should already have a track bound.
    pub fn new(transport: T, sink: S, scheduler: CueScheduler) -> Self {
        let clock = scheduler.cadence_clock();
        Self {
            transport,
            sink,
            scheduler,
            clock,
        }
    }

    /// Starts audio and cue evaluation together from the first frame. Every
    /// trigger is cleared first so a clip left playing by an earlier session
    /// cannot swallow the first activation. A stopped or finished scheduler is
    /// rewound, since `play` always restarts the audio from the beginning.
    pub fn begin(&mut self, track_index: usize) -> Result<()> {
        if self.scheduler.is_running() {
            return Ok(());
        }

        if self.scheduler.state() == SchedulerState::Idle {
            self.sink.reset_all();
        } else {
            self.scheduler.reset(&mut self.sink);
        }
        self.transport.play(track_index)?;
        if let Err(err) = self.scheduler.start() {
            self.transport.stop();
            return Err(err);
        }
        self.clock.reset();
        Ok(())
    }

    /// Per-frame driver entry point: exactly one tick. Audio stops with the
    /// last frame.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.scheduler.advance_one_tick(&mut self.sink);
        if outcome.is_finished() {
            self.transport.stop();
        }
        outcome
    }

    /// Timer-driven entry point: as many ticks as the cadence says are due.
    pub fn update(&mut self, elapsed: Duration) -> Vec<TickOutcome> {
        let outcomes = self.scheduler.run_for(&mut self.clock, elapsed, &mut self.sink);
        if outcomes.iter().any(TickOutcome::is_finished) {
            self.transport.stop();
        }
        outcomes
    }

    pub fn end(&mut self) {
        self.scheduler.stop();
        self.transport.stop();
    }

    /// Stops audio and rewinds the scheduler to the first frame.
    pub fn restart(&mut self) {
        self.transport.stop();
        self.scheduler.reset(&mut self.sink);
        self.clock.reset();
    }

    pub fn scheduler(&self) -> &CueScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut CueScheduler {
        &mut self.scheduler
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_parts(self) -> (T, S, CueScheduler) {
        (self.transport, self.sink, self.scheduler)
    }
}

/// Thread-safe handle over a scheduler. Ticks and catalog edits take the same
/// lock, so a rule can never change halfway through an evaluation.
#[derive(Clone)]
pub struct SharedScheduler {
    shared: Arc<Mutex<CueScheduler>>,
}

impl SharedScheduler {
    pub fn new(scheduler: CueScheduler) -> Self {
        Self {
            shared: Arc::new(Mutex::new(scheduler)),
        }
    }

    pub fn tick(&self, sink: &mut dyn AnimationSink) -> Result<TickOutcome> {
        let mut scheduler = self.lock()?;
        Ok(scheduler.advance_one_tick(sink))
    }

    pub fn with_catalog<R>(&self, edit: impl FnOnce(&mut TriggerCatalog) -> R) -> Result<R> {
        let mut scheduler = self.lock()?;
        Ok(edit(scheduler.catalog_mut()))
    }

    /// Runs `f` with exclusive access to the scheduler.
    pub fn with_scheduler<R>(&self, f: impl FnOnce(&mut CueScheduler) -> R) -> Result<R> {
        let mut scheduler = self.lock()?;
        Ok(f(&mut scheduler))
    }

    pub fn progress(&self) -> Result<f32> {
        Ok(self.lock()?.progress())
    }

    fn lock(&self) -> Result<MutexGuard<'_, CueScheduler>> {
        self.shared
            .lock()
            .map_err(|_| CueEngineError::Poisoned("cue scheduler"))
    }
}

impl std::fmt::Debug for SharedScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedScheduler").finish()
    }
}
