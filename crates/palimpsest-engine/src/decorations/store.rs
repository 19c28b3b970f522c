use std::collections::HashMap;

use crate::decorations::{Concern, DecorationSet, PaneDecorations};
use crate::panes::{PaneHandle, PaneIndex};

#[derive(Debug, Default)]
struct PaneSlots {
    generation: u32,
    selection: DecorationSet,
    layers: PaneDecorations,
}

/// Current decorations of every pane, one slot per concern
///
/// Slots remember the pane generation they were built for. A lookup through
/// a handle from another generation finds nothing, so a recreated pane never
/// shows decorations computed for its predecessor.
#[derive(Debug, Default)]
pub struct DecorationStore {
    panes: HashMap<PaneIndex, PaneSlots>,
}

impl DecorationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots_mut(&mut self, handle: PaneHandle) -> &mut PaneSlots {
        let slots = self.panes.entry(handle.index).or_default();
        if slots.generation != handle.generation {
            *slots = PaneSlots {
                generation: handle.generation,
                ..Default::default()
            };
        }
        slots
    }

    fn slots(&self, handle: PaneHandle) -> Option<&PaneSlots> {
        self.panes
            .get(&handle.index)
            .filter(|slots| slots.generation == handle.generation)
    }

    /// Swap in all layer concerns of a pane at once
    pub fn replace_pane(&mut self, handle: PaneHandle, decorations: PaneDecorations) {
        self.slots_mut(handle).layers = decorations;
    }

    pub fn replace_selection(&mut self, handle: PaneHandle, selection: DecorationSet) {
        self.slots_mut(handle).selection = selection;
    }

    pub fn get(&self, handle: PaneHandle, concern: Concern) -> Option<&DecorationSet> {
        let slots = self.slots(handle)?;
        match concern {
            Concern::Selection => Some(&slots.selection),
            _ => slots.layers.get(concern),
        }
    }

    pub fn pane(&self, handle: PaneHandle) -> Option<&PaneDecorations> {
        self.slots(handle).map(|slots| &slots.layers)
    }

    /// Drop everything held for a destroyed pane
    pub fn forget(&mut self, index: PaneIndex) {
        self.panes.remove(&index);
    }

    pub fn clear(&mut self) {
        self.panes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decorations::{Decoration, DecorationKind};

    fn handle(index: PaneIndex, generation: u32) -> PaneHandle {
        PaneHandle { index, generation }
    }

    fn one_highlight() -> PaneDecorations {
        PaneDecorations {
            highlights: DecorationSet::new(vec![
                Decoration::inline(0..3, 10, DecorationKind::Highlight, "#fca5a5", 0.3, false)
                    .unwrap(),
            ]),
            ..Default::default()
        }
    }

    #[test]
    fn test_replace_and_get() {
        let mut store = DecorationStore::new();
        store.replace_pane(handle(0, 0), one_highlight());

        assert_eq!(store.get(handle(0, 0), Concern::Highlights).unwrap().len(), 1);
        assert!(store.get(handle(0, 0), Concern::Underlines).unwrap().is_empty());
        assert!(store.get(handle(0, 0), Concern::Selection).unwrap().is_empty());
        assert!(store.get(handle(1, 0), Concern::Highlights).is_none());
    }

    #[test]
    fn test_stale_generation_is_unresolved() {
        let mut store = DecorationStore::new();
        store.replace_pane(handle(0, 0), one_highlight());
        assert!(store.pane(handle(0, 1)).is_none());

        // a newer generation discards the old slots
        store.replace_selection(handle(0, 1), DecorationSet::empty());
        assert!(store.pane(handle(0, 0)).is_none());
        assert!(store.pane(handle(0, 1)).unwrap().is_empty());
    }

    #[test]
    fn test_forget_drops_pane() {
        let mut store = DecorationStore::new();
        store.replace_pane(handle(2, 0), one_highlight());
        store.forget(2);
        assert!(store.pane(handle(2, 0)).is_none());
    }
}
