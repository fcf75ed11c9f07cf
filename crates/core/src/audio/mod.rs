use crate::{CueEngineError, Result};

/// Playback control the engine needs from the audio side. No elapsed-time
/// feedback is required under the fixed-cadence model.
pub trait AudioTransport {
    fn play(&mut self, track_index: usize) -> Result<()>;

    fn stop(&mut self);
}

/// In-memory transport over a list of track names.
#[derive(Debug, Default, Clone)]
pub struct TrackDeck {
    tracks: Vec<String>,
    current: usize,
    playing: bool,
}

impl TrackDeck {
    pub fn new<I, S>(tracks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tracks: tracks.into_iter().map(Into::into).collect(),
            current: 0,
            playing: false,
        }
    }

    pub fn tracks(&self) -> &[String] {
        &self.tracks
    }

    /// Index of the track that is playing or was played last.
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_name(&self) -> Option<&str> {
        self.tracks.get(self.current).map(String::as_str)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Plays the following track, wrapping around at the end of the deck.
    pub fn next(&mut self) -> Result<()> {
        let len = self.non_empty_len()?;
        self.play((self.current + 1) % len)
    }

    /// Plays the preceding track, wrapping around at the start of the deck.
    pub fn previous(&mut self) -> Result<()> {
        let len = self.non_empty_len()?;
        self.play((self.current + len - 1) % len)
    }

    fn non_empty_len(&self) -> Result<usize> {
        if self.tracks.is_empty() {
            tracing::warn!("no tracks assigned to the deck");
            return Err(CueEngineError::TrackIndex { index: 0, len: 0 });
        }
        Ok(self.tracks.len())
    }
}

impl AudioTransport for TrackDeck {
    fn play(&mut self, track_index: usize) -> Result<()> {
        if track_index >= self.tracks.len() {
            tracing::warn!(
                index = track_index,
                tracks = self.tracks.len(),
                "track index is out of range"
            );
            return Err(CueEngineError::TrackIndex {
                index: track_index,
                len: self.tracks.len(),
            });
        }

        self.current = track_index;
        self.playing = true;
        tracing::info!(index = track_index, track = %self.tracks[track_index], "playing track");
        Ok(())
    }

    fn stop(&mut self) {
        if self.playing {
            tracing::info!(index = self.current, "stopped playback");
        }
        self.playing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plays_and_stops_tracks() {
        let mut deck = TrackDeck::new(["intro", "drop"]);
        deck.play(1).unwrap();
        assert!(deck.is_playing());
        assert_eq!(deck.current_name(), Some("drop"));

        deck.stop();
        assert!(!deck.is_playing());
        assert_eq!(deck.current(), 1);
    }

    #[test]
    fn rejects_out_of_range_index() {
        let mut deck = TrackDeck::new(["only"]);
        let err = deck.play(3).unwrap_err();
        assert!(matches!(err, CueEngineError::TrackIndex { index: 3, len: 1 }));
        assert!(!deck.is_playing());
    }

    #[test]
    fn next_and_previous_wrap_around() {
        let mut deck = TrackDeck::new(["a", "b", "c"]);
        deck.previous().unwrap();
        assert_eq!(deck.current(), 2);
        deck.next().unwrap();
        assert_eq!(deck.current(), 0);
    }

    #[test]
    fn empty_deck_cannot_play() {
        let mut deck = TrackDeck::default();
        assert!(deck.next().is_err());
        assert!(deck.play(0).is_err());
    }
}
