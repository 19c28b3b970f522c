//! Layers and the annotations they own.
//!
//! Annotations have no back-pointer to their layer: a layer owns its
//! highlights, underlines and arrows outright, so deleting a layer drops
//! everything in it.

pub mod annotation;
pub mod layer;

pub use annotation::*;
pub use layer::{LAYER_PALETTE, Layer, LayerError, LayerStore};
