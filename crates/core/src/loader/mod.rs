use std::{io::ErrorKind, path::Path};

use crate::{FeatureTrack, LoadError};

/// Outcome of loading a feature track from disk.
///
/// On failure `track` is [`FeatureTrack::empty`] and `failure` says why. An
/// empty track on its own does not mean the load failed: a file may hold a
/// legitimately silent track.
#[derive(Debug)]
pub struct LoadedTrack {
    pub track: FeatureTrack,
    pub failure: Option<LoadError>,
}

impl LoadedTrack {
    fn loaded(track: FeatureTrack) -> Self {
        Self {
            track,
            failure: None,
        }
    }

    fn failed(failure: LoadError) -> Self {
        Self {
            track: FeatureTrack::empty(),
            failure: Some(failure),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.failure.is_none()
    }

    pub fn into_result(self) -> Result<FeatureTrack, LoadError> {
        match self.failure {
            Some(failure) => Err(failure),
            None => Ok(self.track),
        }
    }
}

/// Reads and parses a JSON feature track.
pub fn load_track(path: impl AsRef<Path>) -> LoadedTrack {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "reading feature track");

    // Raw bytes: a file that is not UTF-8 is a format problem, not an I/O one.
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::error!(path = %path.display(), "feature track does not exist");
            return LoadedTrack::failed(LoadError::NotFound(path.to_path_buf()));
        }
        Err(source) => {
            tracing::error!(path = %path.display(), error = %source, "failed to read feature track");
            return LoadedTrack::failed(LoadError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    match parse_track_bytes(&bytes) {
        Ok(track) => {
            tracing::info!(
                path = %path.display(),
                bpm = track.bpm,
                frames = track.len(),
                "loaded feature track"
            );
            LoadedTrack::loaded(track)
        }
        Err(err) => {
            tracing::error!(path = %path.display(), error = %err, "failed to parse feature track");
            LoadedTrack::failed(err)
        }
    }
}

/// Parses the `{ "bpm": .., "frames": [..] }` track format.
pub fn parse_track(text: &str) -> Result<FeatureTrack, LoadError> {
    parse_track_bytes(text.as_bytes())
}

fn parse_track_bytes(bytes: &[u8]) -> Result<FeatureTrack, LoadError> {
    Ok(serde_json::from_slice(bytes)?)
}
