use kurbo::{Point, Rect, Size, Vec2};
use xi_rope::{Delta, RopeInfo};

use crate::document::{DocumentError, Edit, PaneSurface, RopeDocument};

/// Fixed-pitch layout: every character occupies one `cell_width` by `line_height` cell
#[derive(Debug, Clone, PartialEq)]
pub struct MonospaceLayout {
    /// Top-left of the pane's viewport in container coordinates
    pub origin: Point,
    /// Size of the visible viewport
    pub size: Size,
    /// Scroll offset of the content inside the viewport
    pub scroll: Vec2,
    pub cell_width: f64,
    pub line_height: f64,
}

impl MonospaceLayout {
    pub fn new(origin: Point, size: Size) -> Self {
        Self {
            origin,
            size,
            scroll: Vec2::ZERO,
            cell_width: 8.0,
            line_height: 18.0,
        }
    }

    pub fn with_cell(mut self, cell_width: f64, line_height: f64) -> Self {
        self.cell_width = cell_width;
        self.line_height = line_height;
        self
    }

    fn viewport(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size)
    }

    fn caret(&self, line: usize, column: usize) -> Rect {
        let x = self.origin.x + column as f64 * self.cell_width - self.scroll.x;
        let y = self.origin.y + line as f64 * self.line_height - self.scroll.y;
        Rect::new(x, y, x, y + self.line_height)
    }
}

/// A pane whose text lives in a [`RopeDocument`] and is laid out on a fixed grid
#[derive(Debug, Clone)]
pub struct TextPane {
    pub document: RopeDocument,
    pub layout: MonospaceLayout,
}

impl TextPane {
    pub fn new(text: &str, layout: MonospaceLayout) -> Self {
        Self {
            document: RopeDocument::new(text),
            layout,
        }
    }

    /// Apply an edit to the pane's text
    pub fn apply(&mut self, edit: &Edit) -> Result<Delta<RopeInfo>, DocumentError> {
        self.document.apply(edit)
    }

    pub fn scroll_to(&mut self, scroll: Vec2) {
        self.layout.scroll = scroll;
    }
}

impl PaneSurface for TextPane {
    fn len(&self) -> usize {
        self.document.len()
    }

    fn coords_at(&self, pos: usize) -> Option<Rect> {
        if !self.document.is_char_boundary(pos) {
            return None;
        }
        let line = self.document.line_of_offset(pos);
        let line_start = self.document.offset_of_line(line);
        let column = self.document.slice(line_start..pos).chars().count();
        Some(self.layout.caret(line, column))
    }

    fn visible_viewport(&self) -> Rect {
        self.layout.viewport()
    }
}
