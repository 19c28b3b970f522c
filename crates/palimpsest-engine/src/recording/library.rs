use serde::{Deserialize, Serialize};

use crate::recording::{Recording, RecordingId, RecordingStep, TransitionType, now_ms};

/// Every saved recording of a workspace, in creation order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordingLibrary {
    recordings: Vec<Recording>,
}

impl RecordingLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_recordings(recordings: Vec<Recording>) -> Self {
        Self { recordings }
    }

    /// Add a recording, replacing any existing one with the same id
    pub fn insert(&mut self, recording: Recording) {
        match self.recordings.iter_mut().find(|r| r.id == recording.id) {
            Some(existing) => *existing = recording,
            None => self.recordings.push(recording),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Recording> {
        self.recordings.iter().find(|r| r.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Recording> {
        self.recordings.iter_mut().find(|r| r.id == id)
    }

    pub fn delete(&mut self, id: &str) -> Option<Recording> {
        let index = self.recordings.iter().position(|r| r.id == id)?;
        Some(self.recordings.remove(index))
    }

    /// Rename a recording; returns false if it does not exist
    pub fn rename(&mut self, id: &str, name: &str) -> bool {
        match self.get_mut(id) {
            Some(recording) => {
                recording.name = name.to_string();
                recording.touch();
                true
            }
            None => false,
        }
    }

    /// Change playback settings; `None` leaves a setting as it is
    pub fn update_settings(
        &mut self,
        id: &str,
        global_delay_ms: Option<u64>,
        transition_type: Option<TransitionType>,
    ) -> bool {
        let Some(recording) = self.get_mut(id) else {
            return false;
        };
        if let Some(delay) = global_delay_ms {
            recording.global_delay_ms = delay;
        }
        if let Some(transition) = transition_type {
            recording.transition_type = transition;
        }
        recording.touch();
        true
    }

    /// Copy a recording under a new id, with fresh step ids
    pub fn duplicate(&mut self, id: &str) -> Option<RecordingId> {
        let source = self.get(id)?;
        let now = now_ms();
        let copy = Recording {
            id: uuid::Uuid::new_v4().to_string(),
            name: format!("{} (copy)", source.name),
            initial_state: source.initial_state.clone(),
            steps: source
                .steps
                .iter()
                .map(|step| RecordingStep::new(step.delta.clone()))
                .collect(),
            global_delay_ms: source.global_delay_ms,
            transition_type: source.transition_type,
            created_at: now,
            updated_at: now,
        };
        let new_id = copy.id.clone();
        self.recordings.push(copy);
        Some(new_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recording> {
        self.recordings.iter()
    }

    pub fn first(&self) -> Option<&Recording> {
        self.recordings.first()
    }

    pub fn len(&self) -> usize {
        self.recordings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::PlaybackDefaults;
    use crate::visibility::{VisibilityDelta, VisibilitySnapshot};
    use pretty_assertions::assert_eq;

    fn recording_with_steps(name: &str, steps: usize) -> Recording {
        let mut recording =
            Recording::new(name, VisibilitySnapshot::new(), PlaybackDefaults::default());
        for i in 0..steps {
            let mut delta = VisibilityDelta::new();
            delta.insert_raw(format!("section:{i}"), false);
            recording.steps.push(RecordingStep::new(delta));
        }
        recording
    }

    #[test]
    fn test_insert_get_delete() {
        let mut library = RecordingLibrary::new();
        let recording = recording_with_steps("A", 1);
        let id = recording.id.clone();
        library.insert(recording);

        assert_eq!(library.get(&id).unwrap().name, "A");
        assert_eq!(library.len(), 1);
        assert_eq!(library.delete(&id).unwrap().id, id);
        assert!(library.delete(&id).is_none());
        assert!(library.is_empty());
    }

    #[test]
    fn test_rename_and_settings_bump_updated_at() {
        let mut library = RecordingLibrary::new();
        let mut recording = recording_with_steps("A", 1);
        recording.updated_at = 0;
        let id = recording.id.clone();
        library.insert(recording);

        assert!(library.rename(&id, "Renamed"));
        assert!(library.update_settings(&id, Some(250), Some(TransitionType::Fade)));
        let recording = library.get(&id).unwrap();
        assert_eq!(recording.name, "Renamed");
        assert_eq!(recording.global_delay_ms, 250);
        assert_eq!(recording.transition_type, TransitionType::Fade);
        assert!(recording.updated_at > 0);

        assert!(library.update_settings(&id, None, Some(TransitionType::Instant)));
        assert_eq!(library.get(&id).unwrap().global_delay_ms, 250);
        assert!(!library.rename("missing", "x"));
    }

    #[test]
    fn test_duplicate_gets_fresh_ids() {
        let mut library = RecordingLibrary::new();
        let recording = recording_with_steps("Tour", 2);
        let id = recording.id.clone();
        library.insert(recording);

        let copy_id = library.duplicate(&id).unwrap();
        let source = library.get(&id).unwrap();
        let copy = library.get(&copy_id).unwrap();

        assert_ne!(copy_id, id);
        assert_eq!(copy.name, "Tour (copy)");
        assert_eq!(copy.steps.len(), 2);
        for (a, b) in source.steps.iter().zip(&copy.steps) {
            assert_ne!(a.id, b.id);
            assert_eq!(a.delta, b.delta);
        }
        assert!(library.duplicate("missing").is_none());
    }

    #[test]
    fn test_library_serializes_as_array() {
        let mut library = RecordingLibrary::new();
        library.insert(recording_with_steps("A", 0));
        let json = serde_json::to_value(&library).unwrap();
        assert!(json.is_array());
        let back: RecordingLibrary = serde_json::from_value(json).unwrap();
        assert_eq!(back, library);
    }
}
