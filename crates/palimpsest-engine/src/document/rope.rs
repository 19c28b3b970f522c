use xi_rope::delta::Builder;
use xi_rope::{Delta, Rope, RopeInfo};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Range {start}..{end} is out of bounds for document of length {len}")]
    OutOfBounds { start: usize, end: usize, len: usize },
    #[error("Range start {start} is after range end {end}")]
    InvertedRange { start: usize, end: usize },
    #[error("Offset {0} is not on a character boundary")]
    NotCharBoundary(usize),
}

/// Edits a pane's text
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    Insert {
        at: usize,
        text: String,
    },
    Delete {
        range: std::ops::Range<usize>,
    },
    Replace {
        range: std::ops::Range<usize>,
        text: String,
    },
}

impl Edit {
    fn range(&self) -> std::ops::Range<usize> {
        match self {
            Edit::Insert { at, .. } => *at..*at,
            Edit::Delete { range } | Edit::Replace { range, .. } => range.clone(),
        }
    }
}

/// Pane text backed by an xi-rope buffer
///
/// Offsets are UTF-8 byte offsets into the buffer. Every applied edit returns
/// the [`Delta`] that produced it, which doubles as the [`PositionMap`] for
/// anchor reconciliation.
///
/// [`PositionMap`]: crate::document::PositionMap
#[derive(Debug, Clone)]
pub struct RopeDocument {
    buffer: Rope,
    version: u64,
}

impl RopeDocument {
    pub fn new(text: &str) -> Self {
        Self {
            buffer: Rope::from(text),
            version: 0,
        }
    }

    /// Apply an edit, returning the delta so callers can remap anchors
    pub fn apply(&mut self, edit: &Edit) -> Result<Delta<RopeInfo>, DocumentError> {
        let delta = self.compile(edit)?;
        self.buffer = delta.apply(&self.buffer);
        self.version += 1;
        Ok(delta)
    }

    fn compile(&self, edit: &Edit) -> Result<Delta<RopeInfo>, DocumentError> {
        let range = edit.range();
        self.check_range(&range)?;

        let mut builder = Builder::new(self.len());
        match edit {
            Edit::Insert { text, .. } | Edit::Replace { text, .. } => {
                builder.replace(range, Rope::from(text.as_str()));
            }
            Edit::Delete { .. } => {
                builder.delete(range);
            }
        }
        Ok(builder.build())
    }

    fn check_range(&self, range: &std::ops::Range<usize>) -> Result<(), DocumentError> {
        let len = self.len();
        if range.start > range.end {
            return Err(DocumentError::InvertedRange {
                start: range.start,
                end: range.end,
            });
        }
        if range.end > len {
            return Err(DocumentError::OutOfBounds {
                start: range.start,
                end: range.end,
                len,
            });
        }
        for offset in [range.start, range.end] {
            if !self.is_char_boundary(offset) {
                return Err(DocumentError::NotCharBoundary(offset));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    /// Version counter incremented on each edit
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    /// Slice text, clamping the range to the buffer
    pub fn slice(&self, range: std::ops::Range<usize>) -> std::borrow::Cow<'_, str> {
        let len = self.buffer.len();
        let start = range.start.min(len);
        let end = range.end.min(len).max(start);
        self.buffer.slice_to_cow(start..end)
    }

    /// Whether `offset` is inside the buffer and between two characters
    pub fn is_char_boundary(&self, offset: usize) -> bool {
        let len = self.len();
        offset == 0 || offset == len || (offset < len && self.buffer.is_codepoint_boundary(offset))
    }

    /// Zero-based line containing `offset`
    pub fn line_of_offset(&self, offset: usize) -> usize {
        self.buffer.line_of_offset(offset.min(self.len()))
    }

    /// Offset of the first byte of `line`
    pub fn offset_of_line(&self, line: usize) -> usize {
        self.buffer.offset_of_line(line)
    }
}
