use serde::{Deserialize, Serialize};

/// Representation of the feature set for a single time slot of a track.
///
/// Values arrive pre-computed; energy is roughly normalised to `[0, 1]`, the
/// spectral descriptors are whatever the offline analyser produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureFrame {
    pub spectral_flux: f32,
    pub energy: f32,
    pub spectral_centroid: f32,
}

impl FeatureFrame {
    pub fn new(energy: f32, spectral_flux: f32, spectral_centroid: f32) -> Self {
        Self {
            spectral_flux,
            energy,
            spectral_centroid,
        }
    }

    /// Frame with the same value for every feature. Handy for synthetic tracks.
    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value)
    }
}

/// Ordered feature frames plus tempo metadata. Frame `i` belongs to cadence
/// slot `i`, so the order is playback order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTrack {
    #[serde(default)]
    pub bpm: i32,
    #[serde(default)]
    pub frames: Vec<FeatureFrame>,
}

impl FeatureTrack {
    pub fn new(bpm: i32, frames: Vec<FeatureFrame>) -> Self {
        Self { bpm, frames }
    }

    /// The explicit "nothing loaded" value handed out on load failures.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// A track is ready for playback once it carries at least one frame.
    pub fn is_ready(&self) -> bool {
        !self.frames.is_empty()
    }

    pub fn frame(&self, index: usize) -> Option<&FeatureFrame> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> &[FeatureFrame] {
        &self.frames
    }

    /// Per-feature statistics across the whole track.
    pub fn summary(&self) -> TrackSummary {
        TrackSummary {
            bpm: self.bpm,
            frame_count: self.frames.len(),
            energy: FeatureStats::collect(self.frames.iter().map(|f| f.energy)),
            spectral_flux: FeatureStats::collect(self.frames.iter().map(|f| f.spectral_flux)),
            spectral_centroid: FeatureStats::collect(
                self.frames.iter().map(|f| f.spectral_centroid),
            ),
        }
    }
}

/// Summary of a loaded track, used to pick sensible trigger ranges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackSummary {
    pub bpm: i32,
    pub frame_count: usize,
    pub energy: FeatureStats,
    pub spectral_flux: FeatureStats,
    pub spectral_centroid: FeatureStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

impl FeatureStats {
    /// Folds the values into min/max/mean. An empty input yields all zeros.
    fn collect(values: impl Iterator<Item = f32>) -> Self {
        let mut count = 0usize;
        let mut sum = 0.0f32;
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;

        for value in values {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }

        if count == 0 {
            return Self::default();
        }

        Self {
            min,
            max,
            mean: sum / count as f32,
        }
    }
}
