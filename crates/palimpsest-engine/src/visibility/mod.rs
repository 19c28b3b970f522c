//! Visibility targets, snapshots and deltas.
//!
//! Three kinds of thing can be shown or hidden: whole layers, individual
//! annotations and whole panes (sections). They share one flat key space
//! ([`VisibilityKey`]) so recordings can store a change to any of them as
//! `key -> bool`.

pub mod key;
pub mod snapshot;

pub use key::{KEY_SEPARATOR, KeyError, VisibilityKey};
pub use snapshot::{
    DeltaWarning, VisibilityDelta, VisibilitySnapshot, apply_delta, compute_delta,
    snapshot_at_step,
};

/// The live visibility projection that playback mutates
pub trait VisibilityTarget {
    /// Current visibility of every existing target
    fn capture(&self) -> VisibilitySnapshot;

    /// Set one target; returns false if the target does not exist
    fn set(&mut self, key: &VisibilityKey, visible: bool) -> bool;

    /// Set several targets as one change, returning the keys with no target
    fn apply(&mut self, changes: &[(VisibilityKey, bool)]) -> Vec<VisibilityKey> {
        changes
            .iter()
            .filter(|(key, visible)| !self.set(key, *visible))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Make the live state match a snapshot
    ///
    /// Existing targets the snapshot does not mention become visible.
    fn reset_to(&mut self, snapshot: &VisibilitySnapshot);
}
