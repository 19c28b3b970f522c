//! Annotation layers over live rich-text panes.
//!
//! Data flows one way. The document provider reports a change, [`anchors`]
//! remaps stored ranges, [`decorations`] rebuilds that pane's decoration
//! sets, and the renderer reads them. [`arrows`] is a pure function of the
//! annotation model and current pane layout. [`recording`] drives visibility
//! changes through the [`visibility::VisibilityTarget`] seam, which
//! [`workspace::Workspace`] implements.

pub mod anchors;
pub mod arrows;
pub mod decorations;
pub mod document;
pub mod io;
pub mod model;
pub mod panes;
pub mod recording;
pub mod visibility;
pub mod workspace;

// Re-export key types for easier usage
pub use anchors::{Reconciliation, reconcile};
pub use arrows::{ArrowPath, ArrowRenderInput, arrow_opacity, compute_arrow_path};
pub use decorations::{
    Concern, Decoration, DecorationSet, DecorationStore, PaneDecorations, RenderMode,
    compute_decorations,
};
pub use document::{Bias, Edit, MonospaceLayout, PaneSurface, PositionMap, TextPane};
pub use io::*;
pub use model::*;
pub use panes::{PaneArena, PaneHandle, PaneIndex};
pub use recording::{
    EngineState, PlaybackDefaults, PlaybackEvent, Recording, RecordingEngine, RecordingLibrary,
    TransitionType,
};
pub use visibility::{VisibilityDelta, VisibilityKey, VisibilitySnapshot, VisibilityTarget};
pub use workspace::{ArrowRender, EditorSettings, Workspace, WorkspaceError};
