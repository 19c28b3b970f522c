use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::LayerId;
use crate::panes::PaneIndex;
use crate::recording::Recording;
use crate::visibility::VisibilityKey;

/// Full visibility state at one instant
///
/// Annotation entries are keyed by the annotation's [`VisibilityKey`] string
/// (`highlight:L1:h1`); layers by id; sections by pane index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilitySnapshot {
    #[serde(default)]
    pub layers: BTreeMap<LayerId, bool>,
    #[serde(default)]
    pub annotations: BTreeMap<String, bool>,
    #[serde(default)]
    pub sections: BTreeMap<PaneIndex, bool>,
}

impl VisibilitySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded value for a target, `None` if the snapshot does not mention it
    pub fn get(&self, key: &VisibilityKey) -> Option<bool> {
        match key {
            VisibilityKey::Layer(id) => self.layers.get(id).copied(),
            VisibilityKey::Section(index) => self.sections.get(index).copied(),
            VisibilityKey::Annotation { .. } => self.annotations.get(&key.to_string()).copied(),
        }
    }

    /// Whether a target is visible; targets the snapshot does not mention are visible
    pub fn is_visible(&self, key: &VisibilityKey) -> bool {
        self.get(key).unwrap_or(true)
    }

    pub fn insert(&mut self, key: &VisibilityKey, visible: bool) {
        match key {
            VisibilityKey::Layer(id) => {
                self.layers.insert(id.clone(), visible);
            }
            VisibilityKey::Section(index) => {
                self.sections.insert(*index, visible);
            }
            VisibilityKey::Annotation { .. } => {
                self.annotations.insert(key.to_string(), visible);
            }
        }
    }

    /// Every entry as a delta key string, in a stable order
    pub fn entries(&self) -> impl Iterator<Item = (String, bool)> + '_ {
        let layers = self
            .layers
            .iter()
            .map(|(id, v)| (VisibilityKey::Layer(id.clone()).to_string(), *v));
        let annotations = self.annotations.iter().map(|(k, v)| (k.clone(), *v));
        let sections = self
            .sections
            .iter()
            .map(|(index, v)| (VisibilityKey::Section(*index).to_string(), *v));
        layers.chain(annotations).chain(sections)
    }
}

/// Sparse set of visibility changes relative to the immediately prior state
///
/// Keys absent from a delta keep whatever value they had before it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisibilityDelta(BTreeMap<String, bool>);

impl VisibilityDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &VisibilityKey, visible: bool) {
        self.0.insert(key.to_string(), visible);
    }

    pub fn insert_raw(&mut self, key: impl Into<String>, visible: bool) {
        self.0.insert(key.into(), visible);
    }

    pub fn get(&self, key: &str) -> Option<bool> {
        self.0.get(key).copied()
    }

    /// Merge `other` over this delta; later values win
    pub fn merge(&mut self, other: &VisibilityDelta) {
        for (key, visible) in &other.0 {
            self.0.insert(key.clone(), *visible);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, bool)> for VisibilityDelta {
    fn from_iter<T: IntoIterator<Item = (String, bool)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Entries of `curr` that differ from `prev`, plus entries `prev` had and `curr` lost (as hidden)
pub fn compute_delta(prev: &VisibilitySnapshot, curr: &VisibilitySnapshot) -> VisibilityDelta {
    let mut delta = VisibilityDelta::new();

    for (id, visible) in &curr.layers {
        if prev.layers.get(id) != Some(visible) {
            delta.insert(&VisibilityKey::Layer(id.clone()), *visible);
        }
    }
    for id in prev.layers.keys().filter(|id| !curr.layers.contains_key(*id)) {
        delta.insert(&VisibilityKey::Layer(id.clone()), false);
    }

    for (key, visible) in &curr.annotations {
        if prev.annotations.get(key) != Some(visible) {
            delta.insert_raw(key.clone(), *visible);
        }
    }
    for key in prev
        .annotations
        .keys()
        .filter(|key| !curr.annotations.contains_key(*key))
    {
        delta.insert_raw(key.clone(), false);
    }

    for (index, visible) in &curr.sections {
        if prev.sections.get(index) != Some(visible) {
            delta.insert(&VisibilityKey::Section(*index), *visible);
        }
    }
    for index in prev
        .sections
        .keys()
        .filter(|index| !curr.sections.contains_key(*index))
    {
        delta.insert(&VisibilityKey::Section(*index), false);
    }

    delta
}

/// Why one delta entry could not be applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaWarning {
    MalformedKey(String),
}

impl DeltaWarning {
    pub fn key(&self) -> &str {
        match self {
            DeltaWarning::MalformedKey(key) => key,
        }
    }
}

/// Apply a delta to a snapshot without touching any live state
///
/// Every well-formed entry is written, including targets the snapshot does
/// not mention yet; those were implicitly visible before. Whether a target
/// still exists is decided by whoever projects the result onto live state.
pub fn apply_delta(
    snapshot: &VisibilitySnapshot,
    delta: &VisibilityDelta,
) -> (VisibilitySnapshot, Vec<DeltaWarning>) {
    let mut result = snapshot.clone();
    let mut warnings = Vec::new();

    for (raw, visible) in delta.iter() {
        match raw.parse::<VisibilityKey>() {
            Ok(key) => result.insert(&key, visible),
            Err(_) => warnings.push(DeltaWarning::MalformedKey(raw.to_string())),
        }
    }

    (result, warnings)
}

/// Visibility after the first `steps_applied` steps of a recording
///
/// `0` is the initial state; counts past the end stop at the last step.
pub fn snapshot_at_step(
    recording: &Recording,
    steps_applied: usize,
) -> (VisibilitySnapshot, Vec<DeltaWarning>) {
    let mut current = recording.initial_state.clone();
    let mut all_warnings = Vec::new();

    for step in recording.steps.iter().take(steps_applied) {
        let (next, warnings) = apply_delta(&current, &step.delta);
        current = next;
        all_warnings.extend(warnings);
    }

    (current, all_warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnnotationKind;
    use crate::recording::{RecordingStep, TransitionType};
    use pretty_assertions::assert_eq;

    fn snapshot(layers: &[(&str, bool)], annotations: &[(&str, bool)]) -> VisibilitySnapshot {
        VisibilitySnapshot {
            layers: layers.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            annotations: annotations.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            sections: BTreeMap::new(),
        }
    }

    fn delta(entries: &[(&str, bool)]) -> VisibilityDelta {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_compute_delta_reports_changes_only() {
        let prev = snapshot(&[("L1", true), ("L2", true)], &[("highlight:L1:h1", true)]);
        let curr = snapshot(&[("L1", false), ("L2", true)], &[("highlight:L1:h1", true)]);
        assert_eq!(compute_delta(&prev, &curr), delta(&[("layer:L1", false)]));
    }

    #[test]
    fn test_compute_delta_hides_removed_targets() {
        let mut prev = snapshot(&[("L1", true)], &[("arrow:L1:a1", true)]);
        prev.sections.insert(1, true);
        let curr = VisibilitySnapshot::new();

        assert_eq!(
            compute_delta(&prev, &curr),
            delta(&[
                ("layer:L1", false),
                ("arrow:L1:a1", false),
                ("section:1", false)
            ])
        );
    }

    #[test]
    fn test_compute_delta_reports_new_targets() {
        let prev = VisibilitySnapshot::new();
        let mut curr = VisibilitySnapshot::new();
        curr.sections.insert(0, false);
        assert_eq!(compute_delta(&prev, &curr), delta(&[("section:0", false)]));
    }

    #[test]
    fn test_apply_delta_writes_unmentioned_targets_and_skips_garbage() {
        let initial = snapshot(&[("L1", true)], &[]);
        let (result, warnings) = apply_delta(
            &initial,
            &delta(&[
                ("layer:L2", false),
                ("highlight:L1:h1", false),
                ("section:3", false),
                ("garbage", true),
            ]),
        );

        assert_eq!(result.layers.get("L1"), Some(&true));
        assert_eq!(result.layers.get("L2"), Some(&false));
        assert_eq!(result.annotations.get("highlight:L1:h1"), Some(&false));
        assert_eq!(result.sections.get(&3), Some(&false));
        assert_eq!(warnings, vec![DeltaWarning::MalformedKey("garbage".to_string())]);
        assert!(initial.annotations.is_empty());
    }

    #[test]
    fn test_merge_later_values_win() {
        let mut first = delta(&[("layer:L1", false), ("section:0", false)]);
        first.merge(&delta(&[("layer:L1", true), ("arrow:L1:a1", false)]));
        assert_eq!(
            first,
            delta(&[("layer:L1", true), ("section:0", false), ("arrow:L1:a1", false)])
        );
    }

    #[test]
    fn test_snapshot_at_step_is_cumulative() {
        let recording = Recording {
            id: "r1".to_string(),
            name: "demo".to_string(),
            initial_state: snapshot(&[("L1", true)], &[("highlight:L1:h1", true)]),
            steps: vec![
                RecordingStep::new(delta(&[("highlight:L1:h1", false)])),
                RecordingStep::new(delta(&[("layer:L1", false)])),
                RecordingStep::new(delta(&[("highlight:L1:h1", true)])),
            ],
            global_delay_ms: 1000,
            transition_type: TransitionType::Instant,
            created_at: 0,
            updated_at: 0,
        };

        let (at_zero, _) = snapshot_at_step(&recording, 0);
        assert_eq!(at_zero, recording.initial_state);

        let (at_two, warnings) = snapshot_at_step(&recording, 2);
        assert!(warnings.is_empty());
        assert_eq!(at_two, snapshot(&[("L1", false)], &[("highlight:L1:h1", false)]));

        let (past_end, _) = snapshot_at_step(&recording, 99);
        assert_eq!(past_end, snapshot(&[("L1", false)], &[("highlight:L1:h1", true)]));
    }

    #[test]
    fn test_unknown_targets_default_to_visible() {
        let snap = VisibilitySnapshot::new();
        let key = VisibilityKey::annotation(AnnotationKind::Highlight, "L1", "h1");
        assert_eq!(snap.get(&key), None);
        assert!(snap.is_visible(&key));
    }

    #[test]
    fn test_snapshot_json_uses_string_section_keys() {
        let mut snap = snapshot(&[("L1", true)], &[]);
        snap.sections.insert(2, false);
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"layers": {"L1": true}, "annotations": {}, "sections": {"2": false}})
        );
        let back: VisibilitySnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snap);
    }
}
