//! One workspace: panes, layers and everything derived from them.
//!
//! Every mutation goes through here so derived state is rebuilt strictly
//! after the change it depends on: a document change reconciles anchors
//! first and recomputes that pane's decorations second; a visibility change
//! recomputes decorations before returning.

use std::collections::BTreeMap;

use kurbo::Rect;

use crate::anchors::{Reconciliation, reconcile};
use crate::arrows::{
    ARROW_OPACITY, ArrowPath, ArrowRenderInput, ArrowStyleAttrs, arrow_opacity, compute_arrow_path,
};
use crate::decorations::{
    Concern, DecorationSet, DecorationStore, PaneDecorations, RenderMode, SelectionPreview,
    blend_with_background, compute_decorations, selection_decoration,
};
use crate::document::{DocumentError, Edit, PaneSurface, PositionMap, TextPane};
use crate::model::{AnchorStatus, AnnotationKind, LayerStore, WordSelection};
use crate::panes::{PaneArena, PaneHandle, PaneIndex};
use crate::visibility::{VisibilityKey, VisibilitySnapshot, VisibilityTarget};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WorkspaceError {
    #[error("Pane {0} does not exist")]
    PaneNotFound(PaneIndex),
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Display state shared by every pane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditorSettings {
    /// Text editing frozen; annotations only render while locked
    pub locked: bool,
    pub dark_mode: bool,
    /// Hide arrows with an endpoint scrolled out of view instead of ghosting them
    pub hide_offscreen_arrows: bool,
}

impl EditorSettings {
    fn render_mode(&self) -> RenderMode {
        RenderMode {
            locked: self.locked,
            dark_mode: self.dark_mode,
        }
    }
}

/// One arrow ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowRender {
    pub input: ArrowRenderInput,
    pub path: ArrowPath,
    pub opacity: f64,
    pub attrs: ArrowStyleAttrs,
    /// Opaque stroke color
    pub stroke: String,
}

#[derive(Debug)]
pub struct Workspace<P> {
    layers: LayerStore,
    panes: PaneArena<P>,
    sections: BTreeMap<PaneIndex, bool>,
    settings: EditorSettings,
    decorations: DecorationStore,
    selection: Option<WordSelection>,
    selection_preview: SelectionPreview,
}

impl<P: PaneSurface> Workspace<P> {
    pub fn new(layers: LayerStore, settings: EditorSettings) -> Self {
        Self {
            layers,
            panes: PaneArena::new(),
            sections: BTreeMap::new(),
            settings,
            decorations: DecorationStore::new(),
            selection: None,
            selection_preview: SelectionPreview::default(),
        }
    }

    pub fn layers(&self) -> &LayerStore {
        &self.layers
    }

    /// Mutate the layer collection, then rebuild every pane's decorations
    pub fn update_layers<R>(&mut self, f: impl FnOnce(&mut LayerStore) -> R) -> R {
        let result = f(&mut self.layers);
        self.refresh_all();
        result
    }

    pub fn settings(&self) -> EditorSettings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: EditorSettings) {
        self.settings = settings;
        self.refresh_all();
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.settings.locked = locked;
        self.refresh_all();
    }

    pub fn panes(&self) -> &PaneArena<P> {
        &self.panes
    }

    pub fn pane(&self, index: PaneIndex) -> Option<&P> {
        self.panes.get(index)
    }

    /// Mutable pane access for layout changes such as scrolling
    ///
    /// Text changes must go through [`apply_change`](Self::apply_change).
    pub fn pane_mut(&mut self, index: PaneIndex) -> Option<&mut P> {
        self.panes.get_mut(index)
    }

    pub fn add_pane(&mut self, pane: P) -> PaneHandle {
        let handle = self.panes.push(pane);
        self.sections.insert(handle.index, true);
        self.refresh_decorations(handle.index);
        handle
    }

    /// Tear down a pane; later lookups for its index resolve to nothing
    pub fn remove_pane(&mut self, index: PaneIndex) -> Option<P> {
        let pane = self.panes.remove(index)?;
        self.decorations.forget(index);
        self.sections.remove(&index);
        if self.selection.as_ref().is_some_and(|s| s.pane_index == index) {
            self.selection = None;
        }
        log::debug!("removed pane {index}");
        Some(pane)
    }

    /// Reconcile anchors after a document change in one pane, then redecorate
    ///
    /// Returns `None` if the pane no longer exists.
    pub fn apply_change(
        &mut self,
        index: PaneIndex,
        map: &dyn PositionMap,
    ) -> Option<Reconciliation> {
        self.panes.get(index)?;
        let result = reconcile(self.layers.layers_mut(), index, map);

        let arrow_went_stale = result.stale.iter().any(|key| {
            matches!(
                key,
                VisibilityKey::Annotation {
                    kind: AnnotationKind::Arrow,
                    ..
                }
            )
        });
        if arrow_went_stale {
            // the other end's pane loses its endpoint decoration too
            self.refresh_all();
        } else {
            self.refresh_decorations(index);
        }
        Some(result)
    }

    pub fn is_section_visible(&self, index: PaneIndex) -> bool {
        self.sections.get(&index).copied().unwrap_or(true)
    }

    pub fn set_section_visible(&mut self, index: PaneIndex, visible: bool) -> bool {
        if self.panes.get(index).is_none() {
            return false;
        }
        self.sections.insert(index, visible);
        self.refresh_decorations(index);
        true
    }

    pub fn toggle_section(&mut self, index: PaneIndex) -> Option<bool> {
        let visible = !self.is_section_visible(index);
        self.set_section_visible(index, visible).then_some(visible)
    }

    pub fn selection(&self) -> Option<&WordSelection> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, selection: Option<WordSelection>) {
        let previous = self.selection.take().map(|s| s.pane_index);
        let next = selection.as_ref().map(|s| s.pane_index);
        self.selection = selection;
        for index in [previous, next].into_iter().flatten() {
            self.refresh_selection(index);
        }
    }

    pub fn set_selection_preview(&mut self, preview: SelectionPreview) {
        self.selection_preview = preview;
        if let Some(index) = self.selection.as_ref().map(|s| s.pane_index) {
            self.refresh_selection(index);
        }
    }

    fn refresh_selection(&mut self, index: PaneIndex) {
        let Some(handle) = self.panes.handle(index) else {
            return;
        };
        let Some(pane) = self.panes.resolve(handle) else {
            return;
        };
        let set = selection_decoration(
            self.selection.as_ref(),
            index,
            pane.len(),
            self.layers.active_layer().map(|l| l.color.as_str()),
            self.selection_preview,
            self.settings.render_mode(),
        );
        self.decorations.replace_selection(handle, set);
    }

    /// Rebuild one pane's decorations; returns false if the pane is gone
    pub fn refresh_decorations(&mut self, index: PaneIndex) -> bool {
        let Some(handle) = self.panes.handle(index) else {
            return false;
        };
        let Some(pane) = self.panes.resolve(handle) else {
            return false;
        };
        let decorations = compute_decorations(
            index,
            pane.len(),
            self.layers.layers(),
            self.is_section_visible(index),
            self.settings.render_mode(),
        );
        self.decorations.replace_pane(handle, decorations);
        self.refresh_selection(index);
        true
    }

    pub fn refresh_all(&mut self) {
        let indices: Vec<PaneIndex> = self.panes.iter().map(|(handle, _)| handle.index).collect();
        for index in indices {
            self.refresh_decorations(index);
        }
    }

    /// Current layer decorations of a live pane
    pub fn decorations(&self, index: PaneIndex) -> Option<&PaneDecorations> {
        self.decorations.pane(self.panes.handle(index)?)
    }

    pub fn selection_decorations(&self, index: PaneIndex) -> Option<&DecorationSet> {
        self.decorations
            .get(self.panes.handle(index)?, Concern::Selection)
    }

    /// Every arrow that can be drawn this frame
    ///
    /// Skips hidden layers, hidden or stale arrows, arrows with an end in a
    /// hidden section and arrows whose endpoints cannot be resolved.
    pub fn arrow_renders(&self, container: Rect) -> Vec<ArrowRender> {
        if !self.settings.locked {
            return Vec::new();
        }

        let mut renders = Vec::new();
        for layer in self.layers.layers().iter().filter(|l| l.visible) {
            let stroke = blend_with_background(&layer.color, ARROW_OPACITY, self.settings.dark_mode)
                .unwrap_or_else(|_| layer.color.clone());

            for arrow in &layer.arrows {
                if !arrow.visible
                    || arrow.status == AnchorStatus::Stale
                    || !self.is_section_visible(arrow.from.pane_index)
                    || !self.is_section_visible(arrow.to.pane_index)
                {
                    continue;
                }
                let Some(path) = compute_arrow_path(arrow, &self.panes, container) else {
                    log::trace!("arrow {} unresolved this frame", arrow.id);
                    continue;
                };
                renders.push(ArrowRender {
                    input: ArrowRenderInput {
                        layer_id: layer.id.clone(),
                        arrow_id: arrow.id.clone(),
                        color: layer.color.clone(),
                        arrow_style: arrow.arrow_style,
                        from: arrow.from.clone(),
                        to: arrow.to.clone(),
                    },
                    opacity: arrow_opacity(
                        path.any_endpoint_clamped(),
                        self.settings.hide_offscreen_arrows,
                    ),
                    attrs: arrow.arrow_style.attrs(),
                    stroke: stroke.clone(),
                    path,
                });
            }
        }
        renders
    }
}

impl Workspace<TextPane> {
    /// Edit a text pane and reconcile everything anchored in it
    pub fn edit(&mut self, index: PaneIndex, edit: &Edit) -> Result<Reconciliation, WorkspaceError> {
        let pane = self
            .panes
            .get_mut(index)
            .ok_or(WorkspaceError::PaneNotFound(index))?;
        let delta = pane.apply(edit)?;
        self.apply_change(index, &delta)
            .ok_or(WorkspaceError::PaneNotFound(index))
    }
}

impl<P: PaneSurface> VisibilityTarget for Workspace<P> {
    fn capture(&self) -> VisibilitySnapshot {
        let mut snapshot = VisibilitySnapshot::new();
        for layer in self.layers.layers() {
            snapshot.layers.insert(layer.id.clone(), layer.visible);
            for (kind, id) in layer.annotation_ids() {
                let key = VisibilityKey::annotation(kind, layer.id.as_str(), id);
                if let Some(visible) = layer.annotation_visible(kind, id) {
                    snapshot.insert(&key, visible);
                }
            }
        }
        for (handle, _) in self.panes.iter() {
            snapshot
                .sections
                .insert(handle.index, self.is_section_visible(handle.index));
        }
        snapshot
    }

    fn set(&mut self, key: &VisibilityKey, visible: bool) -> bool {
        self.apply(std::slice::from_ref(&(key.clone(), visible)))
            .is_empty()
    }

    /// Write every change, then rebuild decorations once
    fn apply(&mut self, changes: &[(VisibilityKey, bool)]) -> Vec<VisibilityKey> {
        let mut missing = Vec::new();
        for (key, visible) in changes {
            let found = match key {
                VisibilityKey::Section(index) => {
                    let live = self.panes.get(*index).is_some();
                    if live {
                        self.sections.insert(*index, *visible);
                    }
                    live
                }
                VisibilityKey::Layer(id) => self.layers.set_layer_visible(id, *visible),
                VisibilityKey::Annotation {
                    kind,
                    layer_id,
                    annotation_id,
                } => self
                    .layers
                    .set_annotation_visible(*kind, layer_id, annotation_id, *visible),
            };
            if !found {
                missing.push(key.clone());
            }
        }
        if missing.len() < changes.len() {
            self.refresh_all();
        }
        missing
    }

    fn reset_to(&mut self, snapshot: &VisibilitySnapshot) {
        for layer in self.layers.layers_mut() {
            layer.visible = snapshot.is_visible(&VisibilityKey::layer(layer.id.as_str()));
            let ids: Vec<(AnnotationKind, String)> = layer
                .annotation_ids()
                .map(|(kind, id)| (kind, id.to_string()))
                .collect();
            for (kind, id) in ids {
                let key = VisibilityKey::annotation(kind, layer.id.as_str(), id.as_str());
                layer.set_annotation_visible(kind, &id, snapshot.is_visible(&key));
            }
        }
        let indices: Vec<PaneIndex> = self.panes.iter().map(|(handle, _)| handle.index).collect();
        for index in indices {
            self.sections
                .insert(index, snapshot.is_visible(&VisibilityKey::Section(index)));
        }
        self.refresh_all();
    }
}
