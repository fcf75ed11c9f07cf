use std::collections::BTreeMap;

use crate::{CueEngineError, CueId, RangePredicate, Result, TriggerRule};

/// Curated ranges installed by [`TriggerCatalog::load_default_presets`],
/// as `(cue, energy, flux, centroid)`.
const DEFAULT_PRESETS: [(CueId, RangePredicate, RangePredicate, RangePredicate); 8] = [
    (
        CueId::HighEnergy,
        RangePredicate::new(0.7, 1.0),
        RangePredicate::full(),
        RangePredicate::full(),
    ),
    (
        CueId::LowEnergy,
        RangePredicate::new(0.0, 0.3),
        RangePredicate::full(),
        RangePredicate::full(),
    ),
    (
        CueId::HighFlux,
        RangePredicate::full(),
        RangePredicate::new(0.7, 1.0),
        RangePredicate::full(),
    ),
    (
        CueId::LowFlux,
        RangePredicate::full(),
        RangePredicate::new(0.0, 0.3),
        RangePredicate::full(),
    ),
    (
        CueId::HighCentroid,
        RangePredicate::full(),
        RangePredicate::full(),
        RangePredicate::new(0.7, 1.0),
    ),
    (
        CueId::LowCentroid,
        RangePredicate::full(),
        RangePredicate::full(),
        RangePredicate::new(0.0, 0.3),
    ),
    (
        CueId::Beat,
        RangePredicate::new(0.6, 1.0),
        RangePredicate::new(0.6, 1.0),
        RangePredicate::new(0.5, 1.0),
    ),
    (
        CueId::Drop,
        RangePredicate::new(0.8, 1.0),
        RangePredicate::new(0.8, 1.0),
        RangePredicate::new(0.7, 1.0),
    ),
];

/// Registry of trigger rules, at most one per cue. Iteration follows the
/// declaration order of [`CueId`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TriggerCatalog {
    rules: BTreeMap<CueId, TriggerRule>,
}

impl TriggerCatalog {
    pub fn new() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    pub fn with_default_presets() -> Self {
        let mut catalog = Self::new();
        catalog.load_default_presets();
        catalog
    }

    /// Replaces the whole catalog with the curated presets.
    pub fn load_default_presets(&mut self) {
        self.rules.clear();
        for (cue, energy, flux, centroid) in DEFAULT_PRESETS {
            self.insert(TriggerRule::with_ranges(cue, energy, flux, centroid));
        }
    }

    /// Adds an inert rule for `cue`. The first rule registered for a cue wins.
    pub fn add(&mut self, cue: CueId) {
        self.rules.entry(cue).or_insert_with(|| TriggerRule::new(cue));
    }

    /// Inserts a fully configured rule, replacing any previous one.
    pub fn insert(&mut self, rule: TriggerRule) {
        self.rules.insert(rule.cue, rule);
    }

    pub fn remove(&mut self, cue: CueId) {
        self.rules.remove(&cue);
    }

    pub fn has(&self, cue: CueId) -> bool {
        self.rules.contains_key(&cue)
    }

    pub fn get(&self, cue: CueId) -> Result<&TriggerRule> {
        self.rules.get(&cue).ok_or(CueEngineError::UnknownCue(cue))
    }

    /// Returns whether the rule existed. Unknown cues are ignored.
    pub fn set_ranges(
        &mut self,
        cue: CueId,
        energy: RangePredicate,
        flux: RangePredicate,
        centroid: RangePredicate,
    ) -> bool {
        match self.rules.get_mut(&cue) {
            Some(rule) => {
                rule.set_ranges(energy, flux, centroid);
                true
            }
            None => false,
        }
    }

    pub fn cue_ids(&self) -> Vec<CueId> {
        self.rules.keys().copied().collect()
    }

    pub fn rules(&self) -> impl Iterator<Item = &TriggerRule> {
        self.rules.values()
    }

    pub fn rules_mut(&mut self) -> impl Iterator<Item = &mut TriggerRule> {
        self.rules.values_mut()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn normalize_all(&mut self) {
        self.rules_mut().for_each(TriggerRule::normalize);
    }

    pub fn clear_active(&mut self) {
        for rule in self.rules_mut() {
            rule.active = false;
        }
    }
}
