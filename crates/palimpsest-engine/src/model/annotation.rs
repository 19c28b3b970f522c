use serde::{Deserialize, Serialize};

use crate::panes::PaneIndex;

pub type LayerId = String;
pub type AnnotationId = String;

fn default_visible() -> bool {
    true
}

fn is_live(status: &AnchorStatus) -> bool {
    *status == AnchorStatus::Live
}

/// A half-open range `[from, to)` inside one pane's document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationPosition {
    #[serde(alias = "editorIndex")]
    pub pane_index: PaneIndex,
    pub from: usize,
    pub to: usize,
}

impl AnnotationPosition {
    pub fn new(pane_index: PaneIndex, from: usize, to: usize) -> Self {
        Self {
            pane_index,
            from,
            to,
        }
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.from..self.to
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    /// Whether the range can be resolved against a document of length `doc_len`
    pub fn fits(&self, doc_len: usize) -> bool {
        self.from <= self.to && self.to <= doc_len
    }
}

/// Whether a stored range still resolves against its pane's document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorStatus {
    #[default]
    Live,
    /// Invalidated by an edit; kept for identity but never rendered
    Stale,
}

/// The three annotation collections inside a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Highlight,
    Underline,
    Arrow,
}

impl AnnotationKind {
    pub const ALL: [AnnotationKind; 3] = [
        AnnotationKind::Highlight,
        AnnotationKind::Underline,
        AnnotationKind::Arrow,
    ];

    /// Tag used in visibility keys
    pub fn tag(self) -> &'static str {
        match self {
            AnnotationKind::Highlight => "highlight",
            AnnotationKind::Underline => "underline",
            AnnotationKind::Arrow => "arrow",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "highlight" => Some(AnnotationKind::Highlight),
            "underline" => Some(AnnotationKind::Underline),
            "arrow" => Some(AnnotationKind::Arrow),
            _ => None,
        }
    }

    /// Name of the layer collection holding this kind
    pub fn collection(self) -> &'static str {
        match self {
            AnnotationKind::Highlight => "highlights",
            AnnotationKind::Underline => "underlines",
            AnnotationKind::Arrow => "arrows",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub id: AnnotationId,
    #[serde(flatten)]
    pub position: AnnotationPosition,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "is_live")]
    pub status: AnchorStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Underline {
    pub id: AnnotationId,
    #[serde(flatten)]
    pub position: AnnotationPosition,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "is_live")]
    pub status: AnchorStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    Double,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrow {
    pub id: AnnotationId,
    pub from: AnnotationPosition,
    pub to: AnnotationPosition,
    #[serde(default)]
    pub arrow_style: ArrowStyle,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "is_live")]
    pub status: AnchorStatus,
}

impl Arrow {
    /// Whether both ends live in the same pane
    pub fn is_same_pane(&self) -> bool {
        self.from.pane_index == self.to.pane_index
    }

    pub fn touches_pane(&self, pane_index: PaneIndex) -> bool {
        self.from.pane_index == pane_index || self.to.pane_index == pane_index
    }
}

/// In-progress anchor or target pick, never persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSelection {
    pub pane_index: PaneIndex,
    pub from: usize,
    pub to: usize,
}

impl WordSelection {
    pub fn position(&self) -> AnnotationPosition {
        AnnotationPosition::new(self.pane_index, self.from, self.to)
    }
}
