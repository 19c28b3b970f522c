//! Per-pane decoration sets derived from the layer collection.
//!
//! Decorations are never edited in place. Every recompute builds fresh
//! [`DecorationSet`]s for one pane and hands them to the [`DecorationStore`],
//! which swaps them in as a unit.

pub mod blend;
pub mod color;
pub mod store;

pub use blend::{BlendedSegment, blended_segments};
pub use color::{ColorError, Rgb, blend_colors, blend_with_background};
pub use store::DecorationStore;

use std::ops::Range;

use crate::model::{AnchorStatus, AnnotationPosition, Layer, WordSelection};
use crate::panes::PaneIndex;

pub const HIGHLIGHT_OPACITY: f64 = 0.3;
pub const ARROW_ENDPOINT_OPACITY: f64 = 0.6;
pub const SELECTION_OPACITY: f64 = 0.3;
pub const FALLBACK_SELECTION_OPACITY: f64 = 0.25;
/// Selection color when no layer is active
pub const FALLBACK_SELECTION_COLOR: &str = "#3b82f6";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecorationError {
    #[error("Range {from}..{to} exceeds document length {len}")]
    OutOfBounds { from: usize, to: usize, len: usize },
    #[error("Range start {from} is after range end {to}")]
    Inverted { from: usize, to: usize },
    #[error("Empty range at {0}")]
    Empty(usize),
    #[error(transparent)]
    Color(#[from] ColorError),
}

/// What a decoration draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecorationKind {
    Highlight,
    Underline,
    ArrowEndpoint,
    Selection,
    SelectionUnderline,
}

/// Independent decoration slot of one pane; each slot has exactly one writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Concern {
    Selection,
    Highlights,
    Underlines,
    ArrowEndpoints,
}

/// Base color and the opacity it is drawn at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tint {
    pub base: Rgb,
    pub opacity: f64,
}

/// One inline decoration over `range`
#[derive(Debug, Clone, PartialEq)]
pub struct Decoration {
    pub range: Range<usize>,
    pub kind: DecorationKind,
    pub tint: Tint,
    /// Resolved opaque CSS color
    pub color: String,
}

impl Decoration {
    /// Build an inline decoration, rejecting ranges the document cannot hold
    pub fn inline(
        range: Range<usize>,
        doc_len: usize,
        kind: DecorationKind,
        hex: &str,
        opacity: f64,
        dark_mode: bool,
    ) -> Result<Self, DecorationError> {
        if range.start > range.end {
            return Err(DecorationError::Inverted {
                from: range.start,
                to: range.end,
            });
        }
        if range.end > doc_len {
            return Err(DecorationError::OutOfBounds {
                from: range.start,
                to: range.end,
                len: doc_len,
            });
        }
        if range.is_empty() {
            return Err(DecorationError::Empty(range.start));
        }

        let base = Rgb::from_hex(hex)?;
        let color = if opacity >= 1.0 {
            base.to_string()
        } else {
            base.over(color::background(dark_mode), opacity).to_string()
        };
        Ok(Self {
            range,
            kind,
            tint: Tint { base, opacity },
            color,
        })
    }

    /// Inline CSS for the decoration
    pub fn style(&self) -> String {
        match self.kind {
            DecorationKind::Underline | DecorationKind::SelectionUnderline => format!(
                "text-decoration: underline; text-decoration-color: {}; text-decoration-thickness: 2px; text-underline-offset: 2px",
                self.color
            ),
            DecorationKind::Selection => {
                format!("background-color: {}; border-radius: 2px", self.color)
            }
            DecorationKind::Highlight | DecorationKind::ArrowEndpoint => {
                format!("background-color: {}", self.color)
            }
        }
    }
}

/// Immutable, position-ordered decorations for one concern of one pane
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecorationSet {
    decorations: Vec<Decoration>,
}

impl DecorationSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(mut decorations: Vec<Decoration>) -> Self {
        decorations.sort_by_key(|d| (d.range.start, d.range.end));
        Self { decorations }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decoration> {
        self.decorations.iter()
    }

    pub fn len(&self) -> usize {
        self.decorations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }

    pub fn ranges(&self) -> Vec<Range<usize>> {
        self.decorations.iter().map(|d| d.range.clone()).collect()
    }
}

/// The layer-derived concerns of one pane
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaneDecorations {
    pub highlights: DecorationSet,
    pub underlines: DecorationSet,
    pub arrow_endpoints: DecorationSet,
}

impl PaneDecorations {
    pub fn get(&self, concern: Concern) -> Option<&DecorationSet> {
        match concern {
            Concern::Highlights => Some(&self.highlights),
            Concern::Underlines => Some(&self.underlines),
            Concern::ArrowEndpoints => Some(&self.arrow_endpoints),
            Concern::Selection => None,
        }
    }

    pub fn len(&self) -> usize {
        self.highlights.len() + self.underlines.len() + self.arrow_endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Render-time inputs shared by every pane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderMode {
    /// Text editing frozen; annotations only render while locked
    pub locked: bool,
    pub dark_mode: bool,
}

fn push_candidate(
    out: &mut Vec<Decoration>,
    position: &AnnotationPosition,
    doc_len: usize,
    kind: DecorationKind,
    hex: &str,
    opacity: f64,
    dark_mode: bool,
) {
    match Decoration::inline(position.range(), doc_len, kind, hex, opacity, dark_mode) {
        Ok(decoration) => out.push(decoration),
        Err(err) => log::trace!("skipping {kind:?} decoration in pane {}: {err}", position.pane_index),
    }
}

/// Build the layer decorations of one pane
///
/// Nothing renders while the pane is unlocked or its section is hidden.
/// Hidden layers, hidden annotations and stale anchors are skipped, and a
/// candidate whose range does not fit the document is dropped on its own
/// without affecting the rest.
pub fn compute_decorations(
    pane_index: PaneIndex,
    doc_len: usize,
    layers: &[Layer],
    section_visible: bool,
    mode: RenderMode,
) -> PaneDecorations {
    if !mode.locked || !section_visible {
        return PaneDecorations::default();
    }

    let mut highlights = Vec::new();
    let mut underlines = Vec::new();
    let mut arrow_endpoints = Vec::new();

    for layer in layers.iter().filter(|l| l.visible) {
        for highlight in &layer.highlights {
            if !highlight.visible
                || highlight.status == AnchorStatus::Stale
                || highlight.position.pane_index != pane_index
            {
                continue;
            }
            push_candidate(
                &mut highlights,
                &highlight.position,
                doc_len,
                DecorationKind::Highlight,
                &layer.color,
                HIGHLIGHT_OPACITY,
                mode.dark_mode,
            );
        }

        for underline in &layer.underlines {
            if !underline.visible
                || underline.status == AnchorStatus::Stale
                || underline.position.pane_index != pane_index
            {
                continue;
            }
            // Underlines use the layer color as is
            push_candidate(
                &mut underlines,
                &underline.position,
                doc_len,
                DecorationKind::Underline,
                &layer.color,
                1.0,
                mode.dark_mode,
            );
        }

        for arrow in &layer.arrows {
            if !arrow.visible || arrow.status == AnchorStatus::Stale {
                continue;
            }
            for endpoint in [&arrow.from, &arrow.to] {
                if endpoint.pane_index == pane_index {
                    push_candidate(
                        &mut arrow_endpoints,
                        endpoint,
                        doc_len,
                        DecorationKind::ArrowEndpoint,
                        &layer.color,
                        ARROW_ENDPOINT_OPACITY,
                        mode.dark_mode,
                    );
                }
            }
        }
    }

    PaneDecorations {
        highlights: DecorationSet::new(highlights),
        underlines: DecorationSet::new(underlines),
        arrow_endpoints: DecorationSet::new(arrow_endpoints),
    }
}

/// How the in-progress word selection is previewed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPreview {
    #[default]
    Background,
    Underline,
}

/// Decoration for the transient word selection of one pane
///
/// Uses the active layer's color, or a fallback blue when no layer is active.
pub fn selection_decoration(
    selection: Option<&WordSelection>,
    pane_index: PaneIndex,
    doc_len: usize,
    active_color: Option<&str>,
    preview: SelectionPreview,
    mode: RenderMode,
) -> DecorationSet {
    let Some(selection) = selection.filter(|s| mode.locked && s.pane_index == pane_index) else {
        return DecorationSet::empty();
    };

    let (hex, kind, opacity) = match (preview, active_color) {
        (SelectionPreview::Underline, color) => (
            color.unwrap_or(FALLBACK_SELECTION_COLOR),
            DecorationKind::SelectionUnderline,
            1.0,
        ),
        (SelectionPreview::Background, Some(color)) => {
            (color, DecorationKind::Selection, SELECTION_OPACITY)
        }
        (SelectionPreview::Background, None) => (
            FALLBACK_SELECTION_COLOR,
            DecorationKind::Selection,
            FALLBACK_SELECTION_OPACITY,
        ),
    };

    let mut out = Vec::new();
    push_candidate(
        &mut out,
        &selection.position(),
        doc_len,
        kind,
        hex,
        opacity,
        mode.dark_mode,
    );
    DecorationSet::new(out)
}
