use std::collections::BTreeMap;

use crate::CueId;

/// The animation system the scheduler drives. Only these calls cross the
/// boundary; parameter names and state-machine internals stay on the far side.
pub trait AnimationSink {
    /// Fires the trigger for `cue`.
    fn activate(&mut self, cue: CueId);

    /// Clears the trigger for a single cue.
    fn reset(&mut self, cue: CueId);

    /// Clears every trigger the sink knows about.
    fn reset_all(&mut self);

    /// Whether the animation behind `cue` is currently playing.
    fn is_playing(&self, cue: CueId) -> bool;
}

/// Call recorded by [`RecordingSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkCall {
    Activate(CueId),
    Reset(CueId),
    ResetAll,
}

/// In-memory sink that remembers every call it receives.
///
/// By default an activated cue keeps playing until it is reset. With
/// [`RecordingSink::with_clip_length`] each activation only lasts for a fixed
/// number of [`RecordingSink::elapse`] calls, which mimics an animation clip
/// finishing on its own.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    playing: BTreeMap<CueId, Option<u32>>,
    calls: Vec<SinkCall>,
    clip_length: Option<u32>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clip_length(ticks: u32) -> Self {
        Self {
            clip_length: Some(ticks.max(1)),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> &[SinkCall] {
        &self.calls
    }

    /// Cues passed to `activate`, in call order.
    pub fn activations(&self) -> Vec<CueId> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SinkCall::Activate(cue) => Some(*cue),
                _ => None,
            })
            .collect()
    }

    pub fn playing(&self) -> Vec<CueId> {
        self.playing.keys().copied().collect()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Forces a cue into the playing state without recording a call, as if
    /// something outside the engine started it.
    pub fn mark_playing(&mut self, cue: CueId) {
        self.playing.insert(cue, self.clip_length);
    }

    /// Ends the animation for `cue` as if its clip completed.
    pub fn finish(&mut self, cue: CueId) {
        self.playing.remove(&cue);
    }

    /// Counts one tick off every running clip and drops the ones that ended.
    pub fn elapse(&mut self) {
        self.playing.retain(|_, remaining| match remaining {
            Some(ticks) => {
                *ticks = ticks.saturating_sub(1);
                *ticks > 0
            }
            None => true,
        });
    }
}

impl AnimationSink for RecordingSink {
    fn activate(&mut self, cue: CueId) {
        self.calls.push(SinkCall::Activate(cue));
        self.playing.insert(cue, self.clip_length);
    }

    fn reset(&mut self, cue: CueId) {
        self.calls.push(SinkCall::Reset(cue));
        self.playing.remove(&cue);
    }

    fn reset_all(&mut self) {
        self.calls.push(SinkCall::ResetAll);
        self.playing.clear();
    }

    fn is_playing(&self, cue: CueId) -> bool {
        self.playing.contains_key(&cue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_calls_and_playing_state() {
        let mut sink = RecordingSink::new();
        sink.activate(CueId::Beat);
        sink.activate(CueId::Drop);
        sink.reset(CueId::Beat);

        assert!(!sink.is_playing(CueId::Beat));
        assert!(sink.is_playing(CueId::Drop));
        assert_eq!(
            sink.calls(),
            &[
                SinkCall::Activate(CueId::Beat),
                SinkCall::Activate(CueId::Drop),
                SinkCall::Reset(CueId::Beat),
            ]
        );

        sink.reset_all();
        assert!(sink.playing().is_empty());
    }

    #[test]
    fn clips_expire_after_their_length() {
        let mut sink = RecordingSink::with_clip_length(2);
        sink.activate(CueId::HighEnergy);

        sink.elapse();
        assert!(sink.is_playing(CueId::HighEnergy));
        sink.elapse();
        assert!(!sink.is_playing(CueId::HighEnergy));
    }

    #[test]
    fn unbounded_clips_survive_elapse() {
        let mut sink = RecordingSink::new();
        sink.mark_playing(CueId::LowFlux);
        sink.elapse();
        assert!(sink.is_playing(CueId::LowFlux));
        assert!(sink.calls().is_empty());

        sink.finish(CueId::LowFlux);
        assert!(!sink.is_playing(CueId::LowFlux));
    }
}
