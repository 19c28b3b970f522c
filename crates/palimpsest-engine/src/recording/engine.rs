use std::fmt;
use std::time::Duration;

use crate::recording::{
    PlaybackDefaults, Recording, RecordingId, RecordingLibrary, RecordingStep, StepId,
    TransitionType,
};
use crate::visibility::{
    VisibilityKey, VisibilitySnapshot, VisibilityTarget, compute_delta, snapshot_at_step,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Recording,
    /// A recording is loaded but not playing
    PlaybackIdle,
    Playing,
    Paused,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::Idle => "idle",
            EngineState::Recording => "recording",
            EngineState::PlaybackIdle => "playback idle",
            EngineState::Playing => "playing",
            EngineState::Paused => "paused",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecordingError {
    #[error("Recording not found: {0}")]
    NotFound(RecordingId),
    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: EngineState,
    },
    #[error("Step {index} is out of range for a recording with {len} steps")]
    StepOutOfRange { index: usize, len: usize },
    #[error("Unknown transition type {0:?}")]
    UnknownTransition(String),
}

/// New logical values a step set, for the renderer to animate towards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub kind: TransitionType,
    pub targets: Vec<(VisibilityKey, bool)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// The live projection was reset to the state after `position` steps
    Reset {
        recording_id: RecordingId,
        position: usize,
    },
    StepApplied {
        index: usize,
        step_id: StepId,
        transition: Transition,
        /// Delta keys whose target no longer exists
        dangling: Vec<String>,
    },
    Finished,
    /// The loaded recording was deleted
    Unloaded,
}

#[derive(Debug)]
struct Draft {
    recording: Recording,
    last_snapshot: VisibilitySnapshot,
}

/// Records visibility toggles and plays recordings back against a [`VisibilityTarget`]
///
/// Nothing here owns a timer. The host calls [`RecordingEngine::tick`] with
/// the time that passed and the engine applies whatever steps fell due.
#[derive(Debug)]
pub struct RecordingEngine {
    state: EngineState,
    draft: Option<Draft>,
    loaded: Option<Recording>,
    /// Steps applied to the live projection so far
    cursor: usize,
    /// Time left before the next step is due
    remaining: Duration,
}

impl Default for RecordingEngine {
    fn default() -> Self {
        Self {
            state: EngineState::Idle,
            draft: None,
            loaded: None,
            cursor: 0,
            remaining: Duration::ZERO,
        }
    }
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Number of steps applied to the live projection, while a recording is loaded
    pub fn position(&self) -> Option<usize> {
        self.loaded.as_ref().map(|_| self.cursor)
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn loaded(&self) -> Option<&Recording> {
        self.loaded.as_ref()
    }

    /// The recording being captured, while recording
    pub fn draft(&self) -> Option<&Recording> {
        self.draft.as_ref().map(|d| &d.recording)
    }

    fn transition_to(&mut self, state: EngineState) {
        if self.state != state {
            log::debug!("recording engine: {} -> {}", self.state, state);
            self.state = state;
        }
    }

    fn require(
        &self,
        operation: &'static str,
        allowed: &[EngineState],
    ) -> Result<(), RecordingError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(RecordingError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn unload(&mut self) {
        self.loaded = None;
        self.cursor = 0;
        self.remaining = Duration::ZERO;
    }

    /// Begin capturing a new recording from the current visibility
    pub fn start_recording(
        &mut self,
        name: &str,
        target: &dyn VisibilityTarget,
        defaults: PlaybackDefaults,
    ) -> Result<&Recording, RecordingError> {
        self.require(
            "start recording",
            &[EngineState::Idle, EngineState::PlaybackIdle],
        )?;
        self.unload();

        self.transition_to(EngineState::Recording);
        let snapshot = target.capture();
        let draft = self.draft.insert(Draft {
            recording: Recording::new(name, snapshot.clone(), defaults),
            last_snapshot: snapshot,
        });
        Ok(&draft.recording)
    }

    /// Append a step holding whatever changed since the previous step
    ///
    /// Returns `None` when nothing changed.
    pub fn record_toggle(
        &mut self,
        target: &dyn VisibilityTarget,
    ) -> Result<Option<&RecordingStep>, RecordingError> {
        self.require("record a toggle", &[EngineState::Recording])?;
        let Some(draft) = self.draft.as_mut() else {
            return Err(RecordingError::InvalidState {
                operation: "record a toggle",
                state: self.state,
            });
        };

        let current = target.capture();
        let delta = compute_delta(&draft.last_snapshot, &current);
        if delta.is_empty() {
            return Ok(None);
        }
        draft.last_snapshot = current;
        draft.recording.steps.push(RecordingStep::new(delta));
        draft.recording.touch();
        log::debug!(
            "recorded step {} of {}",
            draft.recording.steps.len(),
            draft.recording.id
        );
        Ok(draft.recording.steps.last())
    }

    /// Finalize the current recording into `library` and load it
    ///
    /// A recording with no steps is discarded and the engine returns to
    /// [`EngineState::Idle`]; `None` is returned in that case.
    pub fn stop_recording(
        &mut self,
        library: &mut RecordingLibrary,
    ) -> Result<Option<RecordingId>, RecordingError> {
        self.require("stop recording", &[EngineState::Recording])?;
        let Some(draft) = self.draft.take() else {
            self.transition_to(EngineState::Idle);
            return Ok(None);
        };

        if draft.recording.steps.is_empty() {
            log::debug!("discarding empty recording {}", draft.recording.id);
            self.transition_to(EngineState::Idle);
            return Ok(None);
        }

        let id = draft.recording.id.clone();
        library.insert(draft.recording.clone());
        self.loaded = Some(draft.recording);
        self.cursor = 0;
        self.remaining = Duration::ZERO;
        self.transition_to(EngineState::PlaybackIdle);
        Ok(Some(id))
    }

    /// Load a saved recording for playback
    pub fn load(&mut self, library: &RecordingLibrary, id: &str) -> Result<(), RecordingError> {
        self.require(
            "load a recording",
            &[
                EngineState::Idle,
                EngineState::PlaybackIdle,
                EngineState::Playing,
                EngineState::Paused,
            ],
        )?;
        let recording = library
            .get(id)
            .ok_or_else(|| RecordingError::NotFound(id.to_string()))?;
        self.loaded = Some(recording.clone());
        self.cursor = 0;
        self.remaining = Duration::ZERO;
        self.transition_to(EngineState::PlaybackIdle);
        Ok(())
    }

    /// Pick up metadata changes to the loaded recording, or unload it if it was deleted
    pub fn sync(&mut self, library: &RecordingLibrary) -> Option<PlaybackEvent> {
        let id = self.loaded.as_ref()?.id.clone();
        match library.get(&id) {
            Some(recording) => {
                self.loaded = Some(recording.clone());
                None
            }
            None => {
                log::debug!("loaded recording {id} was deleted");
                self.unload();
                self.transition_to(EngineState::Idle);
                Some(PlaybackEvent::Unloaded)
            }
        }
    }

    /// Reset the live projection to the initial state and start the clock
    ///
    /// Step 0 falls due immediately; the host's next [`tick`](Self::tick)
    /// applies it.
    pub fn play(&mut self, target: &mut dyn VisibilityTarget) -> Result<PlaybackEvent, RecordingError> {
        self.require("play", &[EngineState::PlaybackIdle])?;
        let recording = self.loaded.as_ref().ok_or(RecordingError::InvalidState {
            operation: "play",
            state: self.state,
        })?;

        target.reset_to(&recording.initial_state);
        let event = PlaybackEvent::Reset {
            recording_id: recording.id.clone(),
            position: 0,
        };
        self.cursor = 0;
        self.remaining = Duration::ZERO;
        self.transition_to(EngineState::Playing);
        Ok(event)
    }

    /// Suspend the countdown to the next step
    pub fn pause(&mut self) -> Result<(), RecordingError> {
        self.require("pause", &[EngineState::Playing])?;
        self.transition_to(EngineState::Paused);
        Ok(())
    }

    /// Continue the countdown from where [`pause`](Self::pause) left it
    pub fn resume(&mut self) -> Result<(), RecordingError> {
        self.require("resume", &[EngineState::Paused])?;
        self.transition_to(EngineState::Playing);
        Ok(())
    }

    /// Stop playback, keeping the recording loaded
    pub fn stop(&mut self) -> Result<(), RecordingError> {
        self.require("stop", &[EngineState::Playing, EngineState::Paused])?;
        self.remaining = Duration::ZERO;
        self.transition_to(EngineState::PlaybackIdle);
        Ok(())
    }

    /// Abandon whatever is going on and return to [`EngineState::Idle`]
    ///
    /// An in-progress recording is finalized first, as [`stop_recording`](Self::stop_recording) would.
    pub fn cancel(&mut self, library: &mut RecordingLibrary) -> Option<RecordingId> {
        let saved = match self.state {
            EngineState::Recording => self.stop_recording(library).ok().flatten(),
            _ => None,
        };
        self.draft = None;
        self.unload();
        self.transition_to(EngineState::Idle);
        saved
    }

    /// Advance the playback clock by `elapsed`, applying every step that falls due
    ///
    /// Does nothing unless playing.
    pub fn tick(
        &mut self,
        elapsed: Duration,
        target: &mut dyn VisibilityTarget,
    ) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();
        if self.state != EngineState::Playing {
            return events;
        }
        let Some(recording) = self.loaded.as_ref() else {
            return events;
        };

        let mut budget = elapsed;
        loop {
            if self.remaining > budget {
                self.remaining -= budget;
                break;
            }
            budget -= self.remaining;
            self.remaining = Duration::ZERO;

            match recording.steps.get(self.cursor) {
                Some(step) => {
                    events.push(apply_step(
                        self.cursor,
                        step,
                        recording.transition_type,
                        target,
                    ));
                    self.cursor += 1;
                    self.remaining = recording.delay();
                }
                None => {
                    events.push(PlaybackEvent::Finished);
                    break;
                }
            }
        }

        if events.last() == Some(&PlaybackEvent::Finished) {
            self.transition_to(EngineState::PlaybackIdle);
        }
        events
    }

    /// Jump the live projection to the state after `position` steps
    ///
    /// Only while loaded and not running. While paused, the countdown to the
    /// next step restarts from the full delay.
    pub fn go_to_step(
        &mut self,
        position: usize,
        target: &mut dyn VisibilityTarget,
    ) -> Result<PlaybackEvent, RecordingError> {
        self.require(
            "change step",
            &[EngineState::PlaybackIdle, EngineState::Paused],
        )?;
        let recording = self.loaded.as_ref().ok_or(RecordingError::InvalidState {
            operation: "change step",
            state: self.state,
        })?;
        if position > recording.steps.len() {
            return Err(RecordingError::StepOutOfRange {
                index: position,
                len: recording.steps.len(),
            });
        }

        let (snapshot, warnings) = snapshot_at_step(recording, position);
        for warning in &warnings {
            log::debug!("skipping {} while jumping to step {position}", warning.key());
        }
        target.reset_to(&snapshot);
        let event = PlaybackEvent::Reset {
            recording_id: recording.id.clone(),
            position,
        };
        self.remaining = if position == 0 {
            Duration::ZERO
        } else {
            recording.delay()
        };
        self.cursor = position;
        Ok(event)
    }

    pub fn next_step(
        &mut self,
        target: &mut dyn VisibilityTarget,
    ) -> Result<PlaybackEvent, RecordingError> {
        let len = self.loaded.as_ref().map_or(0, |r| r.steps.len());
        self.go_to_step((self.cursor + 1).min(len), target)
    }

    pub fn previous_step(
        &mut self,
        target: &mut dyn VisibilityTarget,
    ) -> Result<PlaybackEvent, RecordingError> {
        self.go_to_step(self.cursor.saturating_sub(1), target)
    }
}

/// Apply one step's delta as a single batch; missing targets are skipped and reported
fn apply_step(
    index: usize,
    step: &RecordingStep,
    kind: TransitionType,
    target: &mut dyn VisibilityTarget,
) -> PlaybackEvent {
    let mut changes = Vec::new();
    let mut dangling = Vec::new();

    for (raw, visible) in step.delta.iter() {
        match raw.parse::<VisibilityKey>() {
            Ok(key) => changes.push((key, visible)),
            Err(_) => dangling.push(raw.to_string()),
        }
    }

    let missing = target.apply(&changes);
    let (targets, skipped): (Vec<_>, Vec<_>) = changes
        .into_iter()
        .partition(|(key, _)| !missing.contains(key));
    dangling.extend(skipped.into_iter().map(|(key, _)| key.to_string()));
    for raw in &dangling {
        log::debug!("step {index}: no target for {raw}, skipping");
    }

    PlaybackEvent::StepApplied {
        index,
        step_id: step.id.clone(),
        transition: Transition { kind, targets },
        dangling,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visibility::VisibilityDelta;
    use pretty_assertions::assert_eq;

    /// Projection over a fixed set of known targets
    #[derive(Debug, Default)]
    struct Projection {
        known: VisibilitySnapshot,
    }

    impl Projection {
        fn with(keys: &[&str]) -> Self {
            let mut known = VisibilitySnapshot::new();
            for key in keys {
                let key: VisibilityKey = key.parse().unwrap();
                known.insert(&key, true);
            }
            Self { known }
        }

        fn visible(&self, key: &str) -> Option<bool> {
            self.known.get(&key.parse().unwrap())
        }
    }

    impl VisibilityTarget for Projection {
        fn capture(&self) -> VisibilitySnapshot {
            self.known.clone()
        }

        fn set(&mut self, key: &VisibilityKey, visible: bool) -> bool {
            if self.known.get(key).is_none() {
                return false;
            }
            self.known.insert(key, visible);
            true
        }

        fn reset_to(&mut self, snapshot: &VisibilitySnapshot) {
            let keys: Vec<VisibilityKey> = self
                .known
                .entries()
                .map(|(k, _)| k.parse().unwrap())
                .collect();
            for key in keys {
                self.known.insert(&key, snapshot.is_visible(&key));
            }
        }
    }

    fn recording(steps: &[&[(&str, bool)]], delay_ms: u64) -> Recording {
        let mut recording = Recording::new(
            "test",
            VisibilitySnapshot::new(),
            PlaybackDefaults {
                global_delay_ms: delay_ms,
                transition_type: TransitionType::Instant,
            },
        );
        recording.initial_state.layers.insert("L1".to_string(), true);
        for entries in steps {
            let delta: VisibilityDelta =
                entries.iter().map(|(k, v)| (k.to_string(), *v)).collect();
            recording.steps.push(RecordingStep::new(delta));
        }
        recording
    }

    fn loaded(recording: Recording) -> (RecordingEngine, RecordingLibrary) {
        let mut library = RecordingLibrary::new();
        let id = recording.id.clone();
        library.insert(recording);
        let mut engine = RecordingEngine::new();
        engine.load(&library, &id).unwrap();
        (engine, library)
    }

    fn applied_indices(events: &[PlaybackEvent]) -> Vec<usize> {
        events
            .iter()
            .filter_map(|e| match e {
                PlaybackEvent::StepApplied { index, .. } => Some(*index),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_record_toggle_captures_step_local_diffs() {
        let mut projection = Projection::with(&["layer:L1", "highlight:L1:h1"]);
        let mut engine = RecordingEngine::new();
        let mut library = RecordingLibrary::new();
        engine
            .start_recording("tour", &projection, PlaybackDefaults::default())
            .unwrap();
        assert_eq!(engine.state(), EngineState::Recording);

        projection.set(&"highlight:L1:h1".parse().unwrap(), false);
        engine.record_toggle(&projection).unwrap();
        assert!(engine.record_toggle(&projection).unwrap().is_none());
        projection.set(&"layer:L1".parse().unwrap(), false);
        engine.record_toggle(&projection).unwrap();

        let draft = engine.draft().unwrap();
        assert_eq!(draft.steps.len(), 2);
        assert_eq!(draft.steps[0].delta.get("highlight:L1:h1"), Some(false));
        assert_eq!(draft.steps[1].delta.len(), 1);
        assert_eq!(draft.steps[1].delta.get("layer:L1"), Some(false));
        assert_eq!(draft.initial_state.layers.get("L1"), Some(&true));

        let id = engine.stop_recording(&mut library).unwrap().unwrap();
        assert_eq!(engine.state(), EngineState::PlaybackIdle);
        assert_eq!(library.get(&id).unwrap().steps.len(), 2);
    }

    #[test]
    fn test_empty_recording_is_discarded() {
        let projection = Projection::with(&["layer:L1"]);
        let mut engine = RecordingEngine::new();
        let mut library = RecordingLibrary::new();
        engine
            .start_recording("nothing", &projection, PlaybackDefaults::default())
            .unwrap();
        assert_eq!(engine.stop_recording(&mut library).unwrap(), None);
        assert_eq!(engine.state(), EngineState::Idle);
        assert!(library.is_empty());
    }

    #[test]
    fn test_playback_applies_steps_on_schedule() {
        let (mut engine, _library) = loaded(recording(
            &[&[("layer:L1", false)], &[("layer:L1", true)]],
            1000,
        ));
        let mut projection = Projection::with(&["layer:L1"]);

        engine.play(&mut projection).unwrap();
        assert_eq!(applied_indices(&engine.tick(Duration::ZERO, &mut projection)), vec![0]);
        assert_eq!(projection.visible("layer:L1"), Some(false));

        assert!(engine.tick(Duration::from_millis(999), &mut projection).is_empty());
        assert_eq!(applied_indices(&engine.tick(Duration::from_millis(1), &mut projection)), vec![1]);
        assert_eq!(projection.visible("layer:L1"), Some(true));

        let events = engine.tick(Duration::from_millis(1000), &mut projection);
        assert_eq!(events, vec![PlaybackEvent::Finished]);
        assert_eq!(engine.state(), EngineState::PlaybackIdle);
    }

    #[test]
    fn test_one_long_tick_applies_each_step_once() {
        let (mut engine, _library) = loaded(recording(
            &[&[("layer:L1", false)], &[("layer:L1", true)], &[("layer:L1", false)]],
            100,
        ));
        let mut projection = Projection::with(&["layer:L1"]);
        engine.play(&mut projection).unwrap();

        let events = engine.tick(Duration::from_secs(10), &mut projection);
        assert_eq!(applied_indices(&events), vec![0, 1, 2]);
        assert_eq!(events.last(), Some(&PlaybackEvent::Finished));
        assert_eq!(projection.visible("layer:L1"), Some(false));
    }

    #[test]
    fn test_pause_keeps_remaining_delay() {
        let (mut engine, _library) = loaded(recording(
            &[&[("layer:L1", false)], &[("layer:L1", true)]],
            1000,
        ));
        let mut projection = Projection::with(&["layer:L1"]);
        engine.play(&mut projection).unwrap();
        engine.tick(Duration::ZERO, &mut projection);
        assert_eq!(engine.remaining(), Duration::from_millis(1000));
        engine.tick(Duration::from_millis(400), &mut projection);

        engine.pause().unwrap();
        // time passing while paused is ignored
        assert!(engine.tick(Duration::from_secs(60), &mut projection).is_empty());
        assert_eq!(engine.remaining(), Duration::from_millis(600));

        engine.resume().unwrap();
        assert!(engine.tick(Duration::from_millis(599), &mut projection).is_empty());
        assert_eq!(applied_indices(&engine.tick(Duration::from_millis(1), &mut projection)), vec![1]);
    }

    #[test]
    fn test_dangling_keys_are_skipped_and_reported() {
        let (mut engine, _library) = loaded(recording(
            &[&[("layer:gone", false), ("layer:L1", false), ("bogus", true)]],
            10,
        ));
        let mut projection = Projection::with(&["layer:L1"]);
        engine.play(&mut projection).unwrap();

        let events = engine.tick(Duration::ZERO, &mut projection);
        let PlaybackEvent::StepApplied {
            transition,
            dangling,
            ..
        } = &events[0]
        else {
            panic!("expected a step, got {events:?}");
        };
        assert_eq!(dangling, &vec!["bogus".to_string(), "layer:gone".to_string()]);
        assert_eq!(transition.targets, vec![(VisibilityKey::layer("L1"), false)]);
        assert_eq!(projection.visible("layer:L1"), Some(false));
    }

    #[test]
    fn test_manual_navigation() {
        let (mut engine, _library) = loaded(recording(
            &[&[("layer:L1", false)], &[("highlight:L1:h1", false)]],
            1000,
        ));
        let mut projection = Projection::with(&["layer:L1", "highlight:L1:h1"]);

        engine.next_step(&mut projection).unwrap();
        assert_eq!(engine.position(), Some(1));
        assert_eq!(projection.visible("layer:L1"), Some(false));

        engine.go_to_step(2, &mut projection).unwrap();
        // h1 is absent from the initial state, so it starts out visible
        assert_eq!(projection.visible("highlight:L1:h1"), Some(false));
        engine.previous_step(&mut projection).unwrap();
        assert_eq!(projection.visible("highlight:L1:h1"), Some(true));
        engine.next_step(&mut projection).unwrap();

        engine.previous_step(&mut projection).unwrap();
        engine.previous_step(&mut projection).unwrap();
        engine.previous_step(&mut projection).unwrap();
        assert_eq!(engine.position(), Some(0));
        assert_eq!(projection.visible("layer:L1"), Some(true));

        assert_eq!(
            engine.go_to_step(3, &mut projection),
            Err(RecordingError::StepOutOfRange { index: 3, len: 2 })
        );
    }

    #[test]
    fn test_invalid_transitions_are_rejected() {
        let mut engine = RecordingEngine::new();
        let mut projection = Projection::default();
        assert_eq!(
            engine.play(&mut projection),
            Err(RecordingError::InvalidState {
                operation: "play",
                state: EngineState::Idle
            })
        );
        assert!(engine.pause().is_err());

        let (mut engine, _library) = loaded(recording(&[&[("layer:L1", false)]], 10));
        engine.play(&mut projection).unwrap();
        assert!(engine.go_to_step(0, &mut projection).is_err());
        assert!(
            engine
                .start_recording("x", &projection, PlaybackDefaults::default())
                .is_err()
        );
    }

    #[test]
    fn test_stop_and_cancel() {
        let (mut engine, mut library) = loaded(recording(&[&[("layer:L1", false)]], 10));
        let mut projection = Projection::with(&["layer:L1"]);
        engine.play(&mut projection).unwrap();
        engine.stop().unwrap();
        assert_eq!(engine.state(), EngineState::PlaybackIdle);
        assert!(engine.tick(Duration::from_secs(1), &mut projection).is_empty());

        assert_eq!(engine.cancel(&mut library), None);
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.position(), None);
    }

    #[test]
    fn test_cancel_while_recording_keeps_steps() {
        let mut projection = Projection::with(&["layer:L1"]);
        let mut engine = RecordingEngine::new();
        let mut library = RecordingLibrary::new();
        engine
            .start_recording("tour", &projection, PlaybackDefaults::default())
            .unwrap();
        projection.set(&VisibilityKey::layer("L1"), false);
        engine.record_toggle(&projection).unwrap();

        let saved = engine.cancel(&mut library).unwrap();
        assert_eq!(engine.state(), EngineState::Idle);
        assert!(library.get(&saved).is_some());
    }

    #[test]
    fn test_sync_unloads_deleted_recording() {
        let recording = recording(&[&[("layer:L1", false)]], 10);
        let id = recording.id.clone();
        let (mut engine, mut library) = loaded(recording);

        library.update_settings(&id, Some(50), None);
        assert_eq!(engine.sync(&library), None);
        assert_eq!(engine.loaded().unwrap().global_delay_ms, 50);

        library.delete(&id);
        assert_eq!(engine.sync(&library), Some(PlaybackEvent::Unloaded));
        assert_eq!(engine.state(), EngineState::Idle);
    }
}
