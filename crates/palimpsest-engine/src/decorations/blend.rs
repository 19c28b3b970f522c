use std::collections::BTreeSet;
use std::ops::Range;

use crate::decorations::{Decoration, DecorationKind, PaneDecorations, blend_colors};

/// A sub-range covered by one or more background decorations, with their colors composited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlendedSegment {
    pub range: Range<usize>,
    pub color: String,
    pub has_arrow_endpoint: bool,
}

/// Split overlapping highlight and arrow-endpoint backgrounds at every boundary
///
/// Each resulting segment gets a single color blended from every decoration
/// covering it, so overlapping layers read as a mix instead of the topmost
/// one winning.
pub fn blended_segments(decorations: &PaneDecorations, dark_mode: bool) -> Vec<BlendedSegment> {
    let backgrounds: Vec<&Decoration> = decorations
        .highlights
        .iter()
        .chain(decorations.arrow_endpoints.iter())
        .collect();

    let breakpoints: BTreeSet<usize> = backgrounds
        .iter()
        .flat_map(|d| [d.range.start, d.range.end])
        .collect();
    let breakpoints: Vec<usize> = breakpoints.into_iter().collect();

    breakpoints
        .windows(2)
        .filter_map(|pair| {
            let (start, end) = (pair[0], pair[1]);
            let contributors: Vec<&Decoration> = backgrounds
                .iter()
                .copied()
                .filter(|d| d.range.start <= start && d.range.end >= end)
                .collect();
            if contributors.is_empty() {
                return None;
            }
            let tints: Vec<_> = contributors
                .iter()
                .map(|d| (d.tint.base, d.tint.opacity))
                .collect();
            Some(BlendedSegment {
                range: start..end,
                color: blend_colors(&tints, dark_mode).to_string(),
                has_arrow_endpoint: contributors
                    .iter()
                    .any(|d| d.kind == DecorationKind::ArrowEndpoint),
            })
        })
        .collect()
}
