//! Arena of panes addressed by stable index.
//!
//! Annotations refer to panes by index. A pane can be torn down while
//! annotations, decorations or playback still mention its index, so every
//! slot carries a generation counter. Removing a pane bumps the generation
//! and leaves the slot vacant; lookups through an old [`PaneHandle`] or a
//! vacant index resolve to `None` instead of reaching a destroyed pane.

/// Pane index as stored in annotation positions
pub type PaneIndex = usize;

/// Index plus the generation it was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaneHandle {
    pub index: PaneIndex,
    pub generation: u32,
}

#[derive(Debug)]
struct Slot<P> {
    generation: u32,
    pane: Option<P>,
}

#[derive(Debug)]
pub struct PaneArena<P> {
    slots: Vec<Slot<P>>,
}

impl<P> Default for PaneArena<P> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<P> PaneArena<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pane at the next free index
    pub fn push(&mut self, pane: P) -> PaneHandle {
        let index = self.slots.len();
        self.slots.push(Slot {
            generation: 0,
            pane: Some(pane),
        });
        PaneHandle {
            index,
            generation: 0,
        }
    }

    /// Tear a pane down, invalidating every handle issued for it
    pub fn remove(&mut self, index: PaneIndex) -> Option<P> {
        let slot = self.slots.get_mut(index)?;
        let pane = slot.pane.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        Some(pane)
    }

    /// Put a pane back into a vacant slot; returns `None` if the slot is occupied or unknown
    pub fn restore(&mut self, index: PaneIndex, pane: P) -> Option<PaneHandle> {
        let slot = self.slots.get_mut(index)?;
        if slot.pane.is_some() {
            return None;
        }
        slot.pane = Some(pane);
        Some(PaneHandle {
            index,
            generation: slot.generation,
        })
    }

    /// Handle for the pane currently living at `index`
    pub fn handle(&self, index: PaneIndex) -> Option<PaneHandle> {
        let slot = self.slots.get(index)?;
        slot.pane.as_ref().map(|_| PaneHandle {
            index,
            generation: slot.generation,
        })
    }

    pub fn get(&self, index: PaneIndex) -> Option<&P> {
        self.slots.get(index)?.pane.as_ref()
    }

    pub fn get_mut(&mut self, index: PaneIndex) -> Option<&mut P> {
        self.slots.get_mut(index)?.pane.as_mut()
    }

    /// Resolve a handle, failing if the pane it was issued for has gone
    pub fn resolve(&self, handle: PaneHandle) -> Option<&P> {
        let slot = self.slots.get(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.pane.as_ref()
    }

    pub fn is_live(&self, handle: PaneHandle) -> bool {
        self.resolve(handle).is_some()
    }

    /// Live panes with their handles, in index order
    pub fn iter(&self) -> impl Iterator<Item = (PaneHandle, &P)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.pane.as_ref().map(|pane| {
                (
                    PaneHandle {
                        index,
                        generation: slot.generation,
                    },
                    pane,
                )
            })
        })
    }

    /// Number of live panes
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.pane.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
