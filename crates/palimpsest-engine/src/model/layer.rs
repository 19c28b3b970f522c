use serde::{Deserialize, Serialize};

use crate::decorations::Rgb;
use crate::model::{
    AnnotationId, AnnotationKind, AnnotationPosition, Arrow, ArrowStyle, Highlight, LayerId,
    Underline,
};
use crate::visibility::KEY_SEPARATOR;

/// Colors handed out to new layers, in order
pub const LAYER_PALETTE: [&str; 17] = [
    "#fca5a5", "#fdba74", "#fcd34d", "#fde047", "#bef264", "#86efac", "#6ee7b7", "#5eead4",
    "#67e8f9", "#7dd3fc", "#93c5fd", "#a5b4fc", "#c4b5fd", "#d8b4fe", "#f0abfc", "#f9a8d4",
    "#fda4af",
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LayerError {
    #[error("Layer not found: {0}")]
    NotFound(LayerId),
    #[error("Layer already exists: {0}")]
    Duplicate(LayerId),
    #[error("Invalid layer id {0:?}: must be non-empty and must not contain ':'")]
    InvalidId(String),
    #[error("Invalid layer color {0:?}")]
    InvalidColor(String),
    #[error("All palette colors are already in use")]
    PaletteExhausted,
    #[error("Invalid range {from}..{to}")]
    InvalidRange { from: usize, to: usize },
}

/// A named, colored, independently visible group of annotations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub color: String,
    pub visible: bool,
    #[serde(default)]
    pub highlights: Vec<Highlight>,
    #[serde(default)]
    pub underlines: Vec<Underline>,
    #[serde(default)]
    pub arrows: Vec<Arrow>,
}

impl Layer {
    pub fn new(id: impl Into<LayerId>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            visible: true,
            highlights: Vec::new(),
            underlines: Vec::new(),
            arrows: Vec::new(),
        }
    }

    pub fn contains(&self, kind: AnnotationKind, annotation_id: &str) -> bool {
        match kind {
            AnnotationKind::Highlight => self.highlights.iter().any(|h| h.id == annotation_id),
            AnnotationKind::Underline => self.underlines.iter().any(|u| u.id == annotation_id),
            AnnotationKind::Arrow => self.arrows.iter().any(|a| a.id == annotation_id),
        }
    }

    /// Visibility flag of one annotation, `None` if it does not exist
    pub fn annotation_visible(&self, kind: AnnotationKind, annotation_id: &str) -> Option<bool> {
        match kind {
            AnnotationKind::Highlight => self
                .highlights
                .iter()
                .find(|h| h.id == annotation_id)
                .map(|h| h.visible),
            AnnotationKind::Underline => self
                .underlines
                .iter()
                .find(|u| u.id == annotation_id)
                .map(|u| u.visible),
            AnnotationKind::Arrow => self
                .arrows
                .iter()
                .find(|a| a.id == annotation_id)
                .map(|a| a.visible),
        }
    }

    /// Set one annotation's visibility; returns false if it does not exist
    pub fn set_annotation_visible(
        &mut self,
        kind: AnnotationKind,
        annotation_id: &str,
        visible: bool,
    ) -> bool {
        let flag = match kind {
            AnnotationKind::Highlight => self
                .highlights
                .iter_mut()
                .find(|h| h.id == annotation_id)
                .map(|h| &mut h.visible),
            AnnotationKind::Underline => self
                .underlines
                .iter_mut()
                .find(|u| u.id == annotation_id)
                .map(|u| &mut u.visible),
            AnnotationKind::Arrow => self
                .arrows
                .iter_mut()
                .find(|a| a.id == annotation_id)
                .map(|a| &mut a.visible),
        };
        match flag {
            Some(flag) => {
                *flag = visible;
                true
            }
            None => false,
        }
    }

    /// Ids of every annotation in this layer, tagged with their kind
    pub fn annotation_ids(&self) -> impl Iterator<Item = (AnnotationKind, &str)> {
        let highlights = self
            .highlights
            .iter()
            .map(|h| (AnnotationKind::Highlight, h.id.as_str()));
        let underlines = self
            .underlines
            .iter()
            .map(|u| (AnnotationKind::Underline, u.id.as_str()));
        let arrows = self
            .arrows
            .iter()
            .map(|a| (AnnotationKind::Arrow, a.id.as_str()));
        highlights.chain(underlines).chain(arrows)
    }

    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty() && self.underlines.is_empty() && self.arrows.is_empty()
    }
}

fn new_annotation_id() -> AnnotationId {
    uuid::Uuid::new_v4().to_string()
}

fn check_position(position: &AnnotationPosition) -> Result<(), LayerError> {
    if position.from > position.to {
        return Err(LayerError::InvalidRange {
            from: position.from,
            to: position.to,
        });
    }
    Ok(())
}

fn check_layer_id(id: &str) -> Result<(), LayerError> {
    if id.is_empty() || id.contains(KEY_SEPARATOR) {
        return Err(LayerError::InvalidId(id.to_string()));
    }
    Ok(())
}

fn check_color(color: &str) -> Result<(), LayerError> {
    Rgb::from_hex(color)
        .map(|_| ())
        .map_err(|_| LayerError::InvalidColor(color.to_string()))
}

/// Ordered layer collection plus the single active layer
#[derive(Debug, Clone, Default)]
pub struct LayerStore {
    layers: Vec<Layer>,
    active_layer_id: Option<LayerId>,
    layer_counter: usize,
}

impl LayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from persisted layers; the first layer becomes active
    pub fn from_layers(layers: Vec<Layer>) -> Result<Self, LayerError> {
        let mut store = Self::new();
        for layer in layers {
            store.insert_layer(layer)?;
        }
        store.active_layer_id = store.layers.first().map(|l| l.id.clone());
        Ok(store)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_mut(&mut self, id: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Mutable access to every layer, used by anchor reconciliation
    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    fn require_mut(&mut self, id: &str) -> Result<&mut Layer, LayerError> {
        self.layer_mut(id)
            .ok_or_else(|| LayerError::NotFound(id.to_string()))
    }

    /// Create a layer with an auto-assigned name and/or palette color
    ///
    /// The new layer becomes the active layer.
    pub fn add_layer(
        &mut self,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<LayerId, LayerError> {
        let color = match color {
            Some(color) => {
                check_color(color)?;
                color.to_string()
            }
            None => LAYER_PALETTE
                .iter()
                .find(|c| !self.layers.iter().any(|l| l.color.eq_ignore_ascii_case(c)))
                .ok_or(LayerError::PaletteExhausted)?
                .to_string(),
        };
        let name = match name {
            Some(name) => name.to_string(),
            None => {
                self.layer_counter += 1;
                format!("Layer {}", self.layer_counter)
            }
        };

        let id = uuid::Uuid::new_v4().to_string();
        self.layers.push(Layer::new(id.clone(), name, color));
        self.active_layer_id = Some(id.clone());
        Ok(id)
    }

    /// Insert a fully formed layer, keeping its id
    pub fn insert_layer(&mut self, layer: Layer) -> Result<(), LayerError> {
        check_layer_id(&layer.id)?;
        check_color(&layer.color)?;
        if self.layer(&layer.id).is_some() {
            return Err(LayerError::Duplicate(layer.id));
        }
        self.layers.push(layer);
        Ok(())
    }

    /// Delete a layer and all of its annotations
    pub fn remove_layer(&mut self, id: &str) -> Option<Layer> {
        let index = self.layers.iter().position(|l| l.id == id)?;
        if self.active_layer_id.as_deref() == Some(id) {
            self.active_layer_id = None;
        }
        Some(self.layers.remove(index))
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.active_layer_id.as_deref().and_then(|id| self.layer(id))
    }

    pub fn set_active(&mut self, id: &str) -> Result<(), LayerError> {
        if self.layer(id).is_none() {
            return Err(LayerError::NotFound(id.to_string()));
        }
        self.active_layer_id = Some(id.to_string());
        Ok(())
    }

    pub fn clear_active(&mut self) {
        self.active_layer_id = None;
    }

    pub fn rename_layer(&mut self, id: &str, name: &str) -> Result<(), LayerError> {
        self.require_mut(id)?.name = name.to_string();
        Ok(())
    }

    pub fn set_layer_color(&mut self, id: &str, color: &str) -> Result<(), LayerError> {
        check_color(color)?;
        self.require_mut(id)?.color = color.to_string();
        Ok(())
    }

    pub fn set_layer_visible(&mut self, id: &str, visible: bool) -> bool {
        match self.layer_mut(id) {
            Some(layer) => {
                layer.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn toggle_layer(&mut self, id: &str) -> Result<bool, LayerError> {
        let layer = self.require_mut(id)?;
        layer.visible = !layer.visible;
        Ok(layer.visible)
    }

    /// Hide every layer if any is visible, otherwise show them all
    pub fn toggle_all_layers(&mut self) {
        let any_visible = self.layers.iter().any(|l| l.visible);
        for layer in &mut self.layers {
            layer.visible = !any_visible;
        }
    }

    /// Move a layer to `new_index` in the stored order
    pub fn move_layer(&mut self, id: &str, new_index: usize) -> Result<(), LayerError> {
        let index = self
            .layers
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| LayerError::NotFound(id.to_string()))?;
        let layer = self.layers.remove(index);
        let new_index = new_index.min(self.layers.len());
        self.layers.insert(new_index, layer);
        Ok(())
    }

    pub fn add_highlight(
        &mut self,
        layer_id: &str,
        position: AnnotationPosition,
    ) -> Result<AnnotationId, LayerError> {
        check_position(&position)?;
        let id = new_annotation_id();
        self.require_mut(layer_id)?.highlights.push(Highlight {
            id: id.clone(),
            position,
            visible: true,
            status: Default::default(),
        });
        Ok(id)
    }

    pub fn add_underline(
        &mut self,
        layer_id: &str,
        position: AnnotationPosition,
    ) -> Result<AnnotationId, LayerError> {
        check_position(&position)?;
        let id = new_annotation_id();
        self.require_mut(layer_id)?.underlines.push(Underline {
            id: id.clone(),
            position,
            visible: true,
            status: Default::default(),
        });
        Ok(id)
    }

    pub fn add_arrow(
        &mut self,
        layer_id: &str,
        from: AnnotationPosition,
        to: AnnotationPosition,
        arrow_style: ArrowStyle,
    ) -> Result<AnnotationId, LayerError> {
        check_position(&from)?;
        check_position(&to)?;
        let id = new_annotation_id();
        self.require_mut(layer_id)?.arrows.push(Arrow {
            id: id.clone(),
            from,
            to,
            arrow_style,
            visible: true,
            status: Default::default(),
        });
        Ok(id)
    }

    /// Remove one annotation; returns false if it was not there
    pub fn remove_annotation(
        &mut self,
        kind: AnnotationKind,
        layer_id: &str,
        annotation_id: &str,
    ) -> bool {
        let Some(layer) = self.layer_mut(layer_id) else {
            return false;
        };
        match kind {
            AnnotationKind::Highlight => remove_by_id(&mut layer.highlights, annotation_id, |h| &h.id),
            AnnotationKind::Underline => remove_by_id(&mut layer.underlines, annotation_id, |u| &u.id),
            AnnotationKind::Arrow => remove_by_id(&mut layer.arrows, annotation_id, |a| &a.id),
        }
    }

    pub fn clear_layer_highlights(&mut self, layer_id: &str) -> Result<(), LayerError> {
        self.require_mut(layer_id)?.highlights.clear();
        Ok(())
    }

    pub fn annotation_exists(&self, kind: AnnotationKind, layer_id: &str, annotation_id: &str) -> bool {
        self.layer(layer_id)
            .is_some_and(|layer| layer.contains(kind, annotation_id))
    }

    pub fn set_annotation_visible(
        &mut self,
        kind: AnnotationKind,
        layer_id: &str,
        annotation_id: &str,
        visible: bool,
    ) -> bool {
        self.layer_mut(layer_id)
            .is_some_and(|layer| layer.set_annotation_visible(kind, annotation_id, visible))
    }
}

fn remove_by_id<T>(items: &mut Vec<T>, id: &str, key: impl Fn(&T) -> &AnnotationId) -> bool {
    let before = items.len();
    items.retain(|item| key(item) != id);
    items.len() != before
}
