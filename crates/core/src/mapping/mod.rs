use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{CueEngineError, FeatureFrame};

/// Closed set of cues the engine can fire. The PascalCase name doubles as the
/// trigger name handed to the animation system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CueId {
    HighEnergy,
    LowEnergy,
    HighFlux,
    LowFlux,
    HighCentroid,
    LowCentroid,
    Beat,
    Drop,
}

impl CueId {
    pub const ALL: [CueId; 8] = [
        CueId::HighEnergy,
        CueId::LowEnergy,
        CueId::HighFlux,
        CueId::LowFlux,
        CueId::HighCentroid,
        CueId::LowCentroid,
        CueId::Beat,
        CueId::Drop,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CueId::HighEnergy => "HighEnergy",
            CueId::LowEnergy => "LowEnergy",
            CueId::HighFlux => "HighFlux",
            CueId::LowFlux => "LowFlux",
            CueId::HighCentroid => "HighCentroid",
            CueId::LowCentroid => "LowCentroid",
            CueId::Beat => "Beat",
            CueId::Drop => "Drop",
        }
    }
}

impl fmt::Display for CueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for CueId {
    type Err = CueEngineError;

    /// Accepts `HighEnergy`, `highenergy` and `high-energy` alike.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        CueId::ALL
            .into_iter()
            .find(|cue| cue.as_str().to_ascii_lowercase() == folded)
            .ok_or_else(|| CueEngineError::msg(format!("unknown cue `{s}`")))
    }
}

/// Closed interval `[min, max]` over a single feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangePredicate {
    pub min: f32,
    pub max: f32,
}

impl RangePredicate {
    /// Bounds are stored as given. Inverted bounds match nothing until
    /// [`RangePredicate::normalize`] repairs them.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// The whole normalised feature domain.
    pub const fn full() -> Self {
        Self::new(0.0, 1.0)
    }

    /// Zero-width interval that only admits `value` itself.
    pub const fn point(value: f32) -> Self {
        Self::new(value, value)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn is_inverted(&self) -> bool {
        self.min > self.max
    }

    pub fn width(&self) -> f32 {
        self.max - self.min
    }

    /// Swaps out-of-order bounds in place.
    pub fn normalize(&mut self) {
        if self.is_inverted() {
            std::mem::swap(&mut self.min, &mut self.max);
        }
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }
}

impl Default for RangePredicate {
    fn default() -> Self {
        Self::point(0.0)
    }
}

/// A named cue and the feature ranges that fire it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerRule {
    pub cue: CueId,
    pub energy: RangePredicate,
    pub flux: RangePredicate,
    pub centroid: RangePredicate,
    /// Last decision the scheduler made for this cue.
    #[serde(skip)]
    pub active: bool,
}

impl TriggerRule {
    /// Inert rule: every range is `[0, 0]`.
    pub fn new(cue: CueId) -> Self {
        Self::with_ranges(
            cue,
            RangePredicate::default(),
            RangePredicate::default(),
            RangePredicate::default(),
        )
    }

    pub fn with_ranges(
        cue: CueId,
        energy: RangePredicate,
        flux: RangePredicate,
        centroid: RangePredicate,
    ) -> Self {
        Self {
            cue,
            energy,
            flux,
            centroid,
            active: false,
        }
    }

    /// True only when all three features sit inside their ranges.
    pub fn matches(&self, frame: &FeatureFrame) -> bool {
        self.energy.contains(frame.energy)
            && self.flux.contains(frame.spectral_flux)
            && self.centroid.contains(frame.spectral_centroid)
    }

    pub fn set_ranges(
        &mut self,
        energy: RangePredicate,
        flux: RangePredicate,
        centroid: RangePredicate,
    ) {
        self.energy = energy;
        self.flux = flux;
        self.centroid = centroid;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether any range is inverted and therefore can never match.
    pub fn has_inverted_range(&self) -> bool {
        self.energy.is_inverted() || self.flux.is_inverted() || self.centroid.is_inverted()
    }

    pub fn normalize(&mut self) {
        self.energy.normalize();
        self.flux.normalize();
        self.centroid.normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_inclusive_on_both_ends() {
        let range = RangePredicate::new(0.25, 0.75);
        assert!(range.contains(0.25));
        assert!(range.contains(0.75));
        assert!(range.contains(0.5));
        assert!(!range.contains(0.2499));
        assert!(!range.contains(0.7501));
    }

    #[test]
    fn inverted_range_matches_nothing_until_normalized() {
        let mut range = RangePredicate::new(0.8, 0.2);
        assert!(range.is_inverted());
        assert!(!range.contains(0.5));
        assert!(!range.contains(0.8));

        range.normalize();
        assert_eq!(range, RangePredicate::new(0.2, 0.8));
        for value in [0.1, 0.2, 0.5, 0.8, 0.9] {
            assert_eq!(
                range.contains(value),
                RangePredicate::new(0.2, 0.8).contains(value)
            );
        }
    }

    #[test]
    fn normalize_leaves_ordered_bounds_alone() {
        let range = RangePredicate::new(0.1, 0.4).normalized();
        assert_eq!(range, RangePredicate::new(0.1, 0.4));
    }

    #[test]
    fn out_of_domain_bounds_are_accepted() {
        let range = RangePredicate::new(2.0, 3.0);
        assert!(!range.contains(1.0));
        assert!(range.contains(2.5));
    }

    #[test]
    fn rule_requires_every_feature_in_range() {
        let rule = TriggerRule::with_ranges(
            CueId::Beat,
            RangePredicate::new(0.6, 1.0),
            RangePredicate::new(0.6, 1.0),
            RangePredicate::new(0.5, 1.0),
        );
        let frame = FeatureFrame::new(0.7, 0.7, 0.7);
        assert!(rule.matches(&frame));

        let mut narrowed = rule.clone();
        narrowed.centroid = RangePredicate::new(0.8, 1.0);
        assert!(!narrowed.matches(&frame));

        let mut narrowed = rule.clone();
        narrowed.energy = RangePredicate::new(0.0, 0.5);
        assert!(!narrowed.matches(&frame));

        let mut narrowed = rule;
        narrowed.flux = RangePredicate::point(0.1);
        assert!(!narrowed.matches(&frame));
    }

    #[test]
    fn new_rule_is_inert() {
        let rule = TriggerRule::new(CueId::Drop);
        assert!(!rule.is_active());
        assert!(!rule.matches(&FeatureFrame::uniform(0.5)));
        assert_eq!(rule.energy, RangePredicate::point(0.0));
    }

    #[test]
    fn set_ranges_replaces_all_predicates() {
        let mut rule = TriggerRule::new(CueId::HighFlux);
        rule.set_ranges(
            RangePredicate::full(),
            RangePredicate::new(0.7, 1.0),
            RangePredicate::full(),
        );
        assert_eq!(rule.energy, RangePredicate::full());
        assert_eq!(rule.flux, RangePredicate::new(0.7, 1.0));
        assert_eq!(rule.centroid, RangePredicate::full());
    }

    #[test]
    fn parses_cue_names() {
        assert_eq!("HighEnergy".parse::<CueId>().unwrap(), CueId::HighEnergy);
        assert_eq!("low-centroid".parse::<CueId>().unwrap(), CueId::LowCentroid);
        assert_eq!("drop".parse::<CueId>().unwrap(), CueId::Drop);
        assert!("snare".parse::<CueId>().is_err());
        assert_eq!(CueId::HighFlux.to_string(), "HighFlux");
    }
}
