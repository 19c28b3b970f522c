use crate::model::Layer;
use crate::visibility::{VisibilityDelta, VisibilityKey};

fn verb(visible: bool) -> &'static str {
    if visible { "Show" } else { "Hide" }
}

/// One-line summary of a step, e.g. `Show layer Notes, Hide section 2`
///
/// Sections are numbered from 1. Layers that no longer exist are named
/// "Unknown".
pub fn describe_delta(delta: &VisibilityDelta, layers: &[Layer]) -> String {
    let parts: Vec<String> = delta
        .iter()
        .map(|(raw, visible)| match raw.parse::<VisibilityKey>() {
            Ok(VisibilityKey::Layer(id)) => {
                let name = layers
                    .iter()
                    .find(|l| l.id == id)
                    .map_or("Unknown", |l| l.name.as_str());
                format!("{} layer {name}", verb(visible))
            }
            Ok(VisibilityKey::Section(index)) => {
                format!("{} section {}", verb(visible), index + 1)
            }
            Ok(VisibilityKey::Annotation { .. }) | Err(_) => {
                format!("{} annotation", verb(visible))
            }
        })
        .collect();

    if parts.is_empty() {
        "No changes".to_string()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn layers() -> Vec<Layer> {
        vec![
            Layer::new("layer-1", "Notes", "#ff0000"),
            Layer::new("layer-2", "Questions", "#00ff00"),
        ]
    }

    fn delta(entries: &[(&str, bool)]) -> VisibilityDelta {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_layer_entries_use_names() {
        assert_eq!(
            describe_delta(&delta(&[("layer:layer-1", true)]), &layers()),
            "Show layer Notes"
        );
        assert_eq!(
            describe_delta(&delta(&[("layer:layer-2", false)]), &layers()),
            "Hide layer Questions"
        );
        assert_eq!(
            describe_delta(&delta(&[("layer:nonexistent", true)]), &layers()),
            "Show layer Unknown"
        );
    }

    #[test]
    fn test_sections_are_one_based() {
        assert_eq!(
            describe_delta(&delta(&[("section:0", true)]), &layers()),
            "Show section 1"
        );
        assert_eq!(
            describe_delta(&delta(&[("section:2", false)]), &layers()),
            "Hide section 3"
        );
    }

    #[test]
    fn test_multiple_entries_and_empty() {
        assert_eq!(
            describe_delta(
                &delta(&[("highlight:layer-1:h1", false), ("layer:layer-1", true)]),
                &layers()
            ),
            "Hide annotation, Show layer Notes"
        );
        assert_eq!(describe_delta(&VisibilityDelta::new(), &layers()), "No changes");
    }
}
