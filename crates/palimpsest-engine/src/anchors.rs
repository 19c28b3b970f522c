//! Remapping stored annotation ranges through document changes.
//!
//! The document provider's [`PositionMap`] is authoritative. This module only
//! applies it to every live anchor in the changed pane and decides which
//! anchors no longer resolve. Those are marked [`AnchorStatus::Stale`] and
//! kept, so their identity and recorded visibility survive.

use crate::document::{Bias, PositionMap};
use crate::model::{AnchorStatus, AnnotationKind, AnnotationPosition, Layer};
use crate::panes::PaneIndex;
use crate::visibility::VisibilityKey;

/// Outcome of reconciling one pane's anchors against one change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Anchors whose range moved
    pub remapped: usize,
    /// Anchors in the pane the change left where they were
    pub unchanged: usize,
    /// Annotations invalidated by this change
    pub stale: Vec<VisibilityKey>,
}

impl Reconciliation {
    pub fn is_noop(&self) -> bool {
        self.remapped == 0 && self.stale.is_empty()
    }
}

enum Mapped {
    Moved(AnnotationPosition),
    Unchanged,
    Stale,
}

/// Map one range; starts stick after insertions at the edge, ends stick before
fn map_position(position: &AnnotationPosition, map: &dyn PositionMap) -> Mapped {
    let (Some(from), Some(to)) = (
        map.map(position.from, Bias::After),
        map.map(position.to, Bias::Before),
    ) else {
        return Mapped::Stale;
    };

    if to > map.new_len() || from > to || (from == to && !position.is_empty()) {
        return Mapped::Stale;
    }
    if from == position.from && to == position.to {
        Mapped::Unchanged
    } else {
        Mapped::Moved(AnnotationPosition::new(position.pane_index, from, to))
    }
}

/// Remap every live anchor in `pane_index` through `map`
///
/// Anchors in other panes and anchors that are already stale are not touched.
pub fn reconcile(
    layers: &mut [Layer],
    pane_index: PaneIndex,
    map: &dyn PositionMap,
) -> Reconciliation {
    let mut result = Reconciliation::default();

    for layer in layers.iter_mut() {
        for highlight in &mut layer.highlights {
            if highlight.status == AnchorStatus::Stale || highlight.position.pane_index != pane_index
            {
                continue;
            }
            match map_position(&highlight.position, map) {
                Mapped::Moved(position) => {
                    highlight.position = position;
                    result.remapped += 1;
                }
                Mapped::Unchanged => result.unchanged += 1,
                Mapped::Stale => {
                    highlight.status = AnchorStatus::Stale;
                    result.stale.push(VisibilityKey::annotation(
                        AnnotationKind::Highlight,
                        layer.id.as_str(),
                        highlight.id.as_str(),
                    ));
                }
            }
        }

        for underline in &mut layer.underlines {
            if underline.status == AnchorStatus::Stale || underline.position.pane_index != pane_index
            {
                continue;
            }
            match map_position(&underline.position, map) {
                Mapped::Moved(position) => {
                    underline.position = position;
                    result.remapped += 1;
                }
                Mapped::Unchanged => result.unchanged += 1,
                Mapped::Stale => {
                    underline.status = AnchorStatus::Stale;
                    result.stale.push(VisibilityKey::annotation(
                        AnnotationKind::Underline,
                        layer.id.as_str(),
                        underline.id.as_str(),
                    ));
                }
            }
        }

        for arrow in &mut layer.arrows {
            if arrow.status == AnchorStatus::Stale || !arrow.touches_pane(pane_index) {
                continue;
            }
            // Endpoints remap independently; both must survive
            let from = if arrow.from.pane_index == pane_index {
                map_position(&arrow.from, map)
            } else {
                Mapped::Unchanged
            };
            let to = if arrow.to.pane_index == pane_index {
                map_position(&arrow.to, map)
            } else {
                Mapped::Unchanged
            };

            match (from, to) {
                (Mapped::Stale, _) | (_, Mapped::Stale) => {
                    arrow.status = AnchorStatus::Stale;
                    result.stale.push(VisibilityKey::annotation(
                        AnnotationKind::Arrow,
                        layer.id.as_str(),
                        arrow.id.as_str(),
                    ));
                }
                (Mapped::Unchanged, Mapped::Unchanged) => result.unchanged += 1,
                (from, to) => {
                    if let Mapped::Moved(position) = from {
                        arrow.from = position;
                    }
                    if let Mapped::Moved(position) = to {
                        arrow.to = position;
                    }
                    result.remapped += 1;
                }
            }
        }
    }

    for key in &result.stale {
        log::debug!("anchor {key} went stale after change in pane {pane_index}");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Edit, RopeDocument};
    use crate::model::{Arrow, ArrowStyle, Highlight, Underline};
    use pretty_assertions::assert_eq;

    fn highlight(id: &str, pane: PaneIndex, from: usize, to: usize) -> Highlight {
        Highlight {
            id: id.to_string(),
            position: AnnotationPosition::new(pane, from, to),
            visible: true,
            status: AnchorStatus::Live,
        }
    }

    fn layer_with(highlights: Vec<Highlight>) -> Layer {
        let mut layer = Layer::new("L1", "Layer 1", "#fca5a5");
        layer.highlights = highlights;
        layer
    }

    #[test]
    fn test_insert_before_range_shifts_it() {
        let mut doc = RopeDocument::new("alpha beta gamma");
        let mut layers = vec![layer_with(vec![highlight("h1", 0, 6, 10)])];

        let delta = doc
            .apply(&Edit::Insert {
                at: 0,
                text: ">> ".to_string(),
            })
            .unwrap();
        let result = reconcile(&mut layers, 0, &delta);

        assert_eq!(result.remapped, 1);
        assert!(result.stale.is_empty());
        let position = &layers[0].highlights[0].position;
        assert_eq!(doc.slice(position.range()), "beta");
    }

    #[test]
    fn test_insert_at_edges_does_not_grow_range() {
        let mut doc = RopeDocument::new("alpha beta gamma");
        let mut layers = vec![layer_with(vec![highlight("h1", 0, 6, 10)])];

        let delta = doc
            .apply(&Edit::Insert {
                at: 10,
                text: "!".to_string(),
            })
            .unwrap();
        let result = reconcile(&mut layers, 0, &delta);
        assert_eq!(result.unchanged, 1);

        let delta = doc
            .apply(&Edit::Insert {
                at: 6,
                text: "_".to_string(),
            })
            .unwrap();
        reconcile(&mut layers, 0, &delta);
        assert_eq!(layers[0].highlights[0].position.range(), 7..11);
        assert_eq!(doc.slice(7..11), "beta");
    }

    #[test]
    fn test_other_panes_are_untouched() {
        let mut doc = RopeDocument::new("abcdef");
        let mut layers = vec![layer_with(vec![highlight("h1", 1, 2, 4)])];
        let delta = doc.apply(&Edit::Delete { range: 0..6 }).unwrap();

        let result = reconcile(&mut layers, 0, &delta);
        assert!(result.is_noop());
        assert_eq!(result.unchanged, 0);
        assert_eq!(layers[0].highlights[0].position.range(), 2..4);
        assert_eq!(layers[0].highlights[0].status, AnchorStatus::Live);
    }

    #[test]
    fn test_deleting_covered_text_marks_stale() {
        let mut doc = RopeDocument::new("keep remove keep");
        let mut layers = vec![layer_with(vec![
            highlight("gone", 0, 5, 11),
            highlight("kept", 0, 12, 16),
        ])];
        layers[0].highlights[0].visible = false;

        let delta = doc.apply(&Edit::Delete { range: 4..11 }).unwrap();
        let result = reconcile(&mut layers, 0, &delta);

        assert_eq!(
            result.stale,
            vec![VisibilityKey::annotation(AnnotationKind::Highlight, "L1", "gone")]
        );
        let gone = &layers[0].highlights[0];
        assert_eq!(gone.status, AnchorStatus::Stale);
        // identity and recorded visibility survive
        assert_eq!(gone.id, "gone");
        assert!(!gone.visible);
        assert_eq!(doc.slice(layers[0].highlights[1].position.range()), "keep");
    }

    #[test]
    fn test_stale_anchors_are_skipped_later() {
        let mut doc = RopeDocument::new("abcdef");
        let mut layers = vec![layer_with(vec![highlight("h1", 0, 1, 3)])];
        let delta = doc.apply(&Edit::Delete { range: 0..4 }).unwrap();
        assert_eq!(reconcile(&mut layers, 0, &delta).stale.len(), 1);

        let delta = doc
            .apply(&Edit::Insert {
                at: 0,
                text: "xyz".to_string(),
            })
            .unwrap();
        let result = reconcile(&mut layers, 0, &delta);
        assert!(result.stale.is_empty());
        assert_eq!(result.remapped + result.unchanged, 0);
    }

    #[test]
    fn test_range_outside_old_document_is_stale() {
        let mut doc = RopeDocument::new("abc");
        let mut layers = vec![layer_with(vec![highlight("h1", 0, 2, 9)])];
        let delta = doc
            .apply(&Edit::Insert {
                at: 0,
                text: "x".to_string(),
            })
            .unwrap();
        assert_eq!(reconcile(&mut layers, 0, &delta).stale.len(), 1);
    }

    #[test]
    fn test_empty_range_stays_live() {
        let mut doc = RopeDocument::new("abc");
        let mut layers = vec![layer_with(vec![highlight("caret", 0, 1, 1)])];
        let delta = doc
            .apply(&Edit::Insert {
                at: 0,
                text: "x".to_string(),
            })
            .unwrap();
        let result = reconcile(&mut layers, 0, &delta);
        assert!(result.stale.is_empty());
        assert_eq!(layers[0].highlights[0].position.range(), 2..2);
    }

    #[test]
    fn test_underlines_are_reconciled() {
        let mut doc = RopeDocument::new("one two");
        let mut layer = Layer::new("L1", "Layer 1", "#fca5a5");
        layer.underlines.push(Underline {
            id: "u1".to_string(),
            position: AnnotationPosition::new(0, 4, 7),
            visible: true,
            status: AnchorStatus::Live,
        });
        let mut layers = vec![layer];

        let delta = doc
            .apply(&Edit::Replace {
                range: 0..3,
                text: "three".to_string(),
            })
            .unwrap();
        reconcile(&mut layers, 0, &delta);
        assert_eq!(doc.slice(layers[0].underlines[0].position.range()), "two");
    }

    #[test]
    fn test_cross_pane_arrow_goes_stale_when_one_end_does() {
        let mut doc = RopeDocument::new("source text");
        let mut layer = Layer::new("L1", "Layer 1", "#fca5a5");
        layer.arrows.push(Arrow {
            id: "a1".to_string(),
            from: AnnotationPosition::new(0, 0, 6),
            to: AnnotationPosition::new(1, 3, 5),
            arrow_style: ArrowStyle::Solid,
            visible: true,
            status: AnchorStatus::Live,
        });
        let mut layers = vec![layer];

        let delta = doc
            .apply(&Edit::Insert {
                at: 0,
                text: "new ".to_string(),
            })
            .unwrap();
        let result = reconcile(&mut layers, 0, &delta);
        assert_eq!(result.remapped, 1);
        assert_eq!(layers[0].arrows[0].from.range(), 4..10);
        assert_eq!(layers[0].arrows[0].to.range(), 3..5);

        let delta = doc.apply(&Edit::Delete { range: 0..15 }).unwrap();
        let result = reconcile(&mut layers, 0, &delta);
        assert_eq!(
            result.stale,
            vec![VisibilityKey::annotation(AnnotationKind::Arrow, "L1", "a1")]
        );
        // the untouched end keeps its range
        assert_eq!(layers[0].arrows[0].to.range(), 3..5);
    }
}
