//! Document provider seam.
//!
//! The engine never owns document text. Each pane is backed by some provider
//! that can tell us two things:
//!
//! - how old offsets map to new offsets after an edit ([`PositionMap`])
//! - where a position lands on screen and which part of the pane is
//!   currently visible ([`PaneSurface`])
//!
//! [`RopeDocument`] and [`TextPane`] are the in-process provider used by the
//! CLI and the tests. Replicated stores plug in by implementing the same
//! two traits.

pub mod pane;
pub mod rope;

pub use pane::{MonospaceLayout, TextPane};
pub use rope::{DocumentError, Edit, RopeDocument};

use kurbo::Rect;
use xi_rope::delta::Transformer;
use xi_rope::{Delta, RopeInfo};

/// Which side of an insertion at exactly this position the mapped position sticks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    /// Stay before text inserted at the position (used for range ends)
    Before,
    /// Move past text inserted at the position (used for range starts)
    After,
}

/// Translates positions in the old document to positions in the new one
pub trait PositionMap {
    /// Map an old offset; `None` when the offset did not exist in the old document
    fn map(&self, pos: usize, bias: Bias) -> Option<usize>;

    /// Length of the document after the change
    fn new_len(&self) -> usize;
}

impl PositionMap for Delta<RopeInfo> {
    fn map(&self, pos: usize, bias: Bias) -> Option<usize> {
        if pos > self.base_len {
            return None;
        }
        let mut transformer = Transformer::new(self);
        Some(transformer.transform(pos, bias == Bias::After))
    }

    fn new_len(&self) -> usize {
        self.new_document_len()
    }
}

/// Layout queries for one pane, in container coordinates
pub trait PaneSurface {
    /// Current document length in offset units
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Caret box at `pos`, or `None` if the position is not laid out
    fn coords_at(&self, pos: usize) -> Option<Rect>;

    /// The part of the pane currently scrolled into view
    fn visible_viewport(&self) -> Rect;
}
