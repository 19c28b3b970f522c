//! Visibility recordings and their playback.
//!
//! A recording is an initial [`VisibilitySnapshot`] plus an ordered list of
//! sparse [`VisibilityDelta`]s. Each step's delta only holds what changed
//! since the step before it, so replaying step `n` requires replaying every
//! step before it too (see [`snapshot_at_step`]).
//!
//! [`snapshot_at_step`]: crate::visibility::snapshot_at_step

pub mod describe;
pub mod engine;
pub mod library;

pub use describe::describe_delta;
pub use engine::{EngineState, PlaybackEvent, RecordingEngine, RecordingError, Transition};
pub use library::RecordingLibrary;

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::visibility::{VisibilityDelta, VisibilitySnapshot};

pub type RecordingId = String;
pub type StepId = String;

pub const DEFAULT_GLOBAL_DELAY_MS: u64 = 1000;

/// How a step's change is presented; the logical change is always immediate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionType {
    #[default]
    Instant,
    Fade,
}

impl std::str::FromStr for TransitionType {
    type Err = RecordingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "instant" => Ok(TransitionType::Instant),
            "fade" => Ok(TransitionType::Fade),
            other => Err(RecordingError::UnknownTransition(other.to_string())),
        }
    }
}

/// Settings new recordings start with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackDefaults {
    pub global_delay_ms: u64,
    pub transition_type: TransitionType,
}

impl Default for PlaybackDefaults {
    fn default() -> Self {
        Self {
            global_delay_ms: DEFAULT_GLOBAL_DELAY_MS,
            transition_type: TransitionType::Instant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingStep {
    pub id: StepId,
    pub delta: VisibilityDelta,
}

impl RecordingStep {
    pub fn new(delta: VisibilityDelta) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            delta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    pub id: RecordingId,
    pub name: String,
    pub initial_state: VisibilitySnapshot,
    #[serde(default)]
    pub steps: Vec<RecordingStep>,
    #[serde(default = "default_delay")]
    pub global_delay_ms: u64,
    #[serde(default)]
    pub transition_type: TransitionType,
    /// Milliseconds since the Unix epoch
    pub created_at: u64,
    pub updated_at: u64,
}

fn default_delay() -> u64 {
    DEFAULT_GLOBAL_DELAY_MS
}

impl Recording {
    pub fn new(
        name: impl Into<String>,
        initial_state: VisibilitySnapshot,
        defaults: PlaybackDefaults,
    ) -> Self {
        let now = now_ms();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            initial_state,
            steps: Vec::new(),
            global_delay_ms: defaults.global_delay_ms,
            transition_type: defaults.transition_type,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.global_delay_ms)
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = now_ms().max(self.updated_at);
    }
}

pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_recording_json_shape() {
        let mut initial = VisibilitySnapshot::new();
        initial.layers.insert("L1".to_string(), true);
        let mut delta = VisibilityDelta::new();
        delta.insert_raw("highlight:L1:h1", false);

        let recording = Recording {
            id: "r1".to_string(),
            name: "Intro".to_string(),
            initial_state: initial,
            steps: vec![RecordingStep {
                id: "s1".to_string(),
                delta,
            }],
            global_delay_ms: 500,
            transition_type: TransitionType::Fade,
            created_at: 1,
            updated_at: 2,
        };

        let json = serde_json::to_value(&recording).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "r1",
                "name": "Intro",
                "initialState": {"layers": {"L1": true}, "annotations": {}, "sections": {}},
                "steps": [{"id": "s1", "delta": {"highlight:L1:h1": false}}],
                "globalDelayMs": 500,
                "transitionType": "fade",
                "createdAt": 1,
                "updatedAt": 2
            })
        );
    }

    #[test]
    fn test_missing_settings_use_defaults() {
        let recording: Recording = serde_json::from_value(serde_json::json!({
            "id": "r1",
            "name": "Old",
            "initialState": {"layers": {}},
            "createdAt": 0,
            "updatedAt": 0
        }))
        .unwrap();
        assert_eq!(recording.global_delay_ms, DEFAULT_GLOBAL_DELAY_MS);
        assert_eq!(recording.transition_type, TransitionType::Instant);
        assert!(recording.steps.is_empty());
    }

    #[test]
    fn test_new_recording_uses_defaults() {
        let recording = Recording::new("Demo", VisibilitySnapshot::new(), PlaybackDefaults::default());
        assert_eq!(recording.global_delay_ms, 1000);
        assert_eq!(recording.created_at, recording.updated_at);
        assert_eq!("fade".parse::<TransitionType>(), Ok(TransitionType::Fade));
    }

    #[test]
    fn test_unknown_transition_type_is_an_error() {
        let err = "wipe".parse::<TransitionType>().unwrap_err();
        assert_eq!(err, RecordingError::UnknownTransition("wipe".to_string()));
        assert_eq!(err.to_string(), "Unknown transition type \"wipe\"");
    }
}
