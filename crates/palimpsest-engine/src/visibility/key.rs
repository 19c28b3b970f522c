use std::fmt;
use std::str::FromStr;

use crate::model::{AnnotationKind, LayerId};
use crate::panes::PaneIndex;

/// Separator between key segments
pub const KEY_SEPARATOR: char = ':';

const LAYER_TAG: &str = "layer";
const SECTION_TAG: &str = "section";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("Visibility key {0:?} has no kind prefix")]
    MissingKind(String),
    #[error("Unknown visibility key kind {kind:?} in {key:?}")]
    UnknownKind { kind: String, key: String },
    #[error("Malformed visibility key {0:?}")]
    Malformed(String),
}

/// Something whose visibility can be toggled and recorded
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VisibilityKey {
    Layer(LayerId),
    /// A whole pane
    Section(PaneIndex),
    Annotation {
        kind: AnnotationKind,
        layer_id: LayerId,
        annotation_id: String,
    },
}

impl VisibilityKey {
    pub fn annotation(
        kind: AnnotationKind,
        layer_id: impl Into<LayerId>,
        annotation_id: impl Into<String>,
    ) -> Self {
        VisibilityKey::Annotation {
            kind,
            layer_id: layer_id.into(),
            annotation_id: annotation_id.into(),
        }
    }

    pub fn layer(layer_id: impl Into<LayerId>) -> Self {
        VisibilityKey::Layer(layer_id.into())
    }

    /// Layer this key belongs to, if any
    pub fn layer_id(&self) -> Option<&str> {
        match self {
            VisibilityKey::Layer(id) => Some(id),
            VisibilityKey::Annotation { layer_id, .. } => Some(layer_id),
            VisibilityKey::Section(_) => None,
        }
    }
}

impl fmt::Display for VisibilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisibilityKey::Layer(id) => write!(f, "{LAYER_TAG}{KEY_SEPARATOR}{id}"),
            VisibilityKey::Section(index) => write!(f, "{SECTION_TAG}{KEY_SEPARATOR}{index}"),
            VisibilityKey::Annotation {
                kind,
                layer_id,
                annotation_id,
            } => write!(
                f,
                "{}{KEY_SEPARATOR}{layer_id}{KEY_SEPARATOR}{annotation_id}",
                kind.tag()
            ),
        }
    }
}

impl FromStr for VisibilityKey {
    type Err = KeyError;

    /// Only the first two separators are significant; the annotation id is
    /// the rest of the string verbatim.
    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let malformed = || KeyError::Malformed(key.to_string());
        let (tag, rest) = key
            .split_once(KEY_SEPARATOR)
            .ok_or_else(|| KeyError::MissingKind(key.to_string()))?;

        match tag {
            LAYER_TAG => {
                if rest.is_empty() || rest.contains(KEY_SEPARATOR) {
                    return Err(malformed());
                }
                Ok(VisibilityKey::Layer(rest.to_string()))
            }
            SECTION_TAG => rest
                .parse::<PaneIndex>()
                .map(VisibilityKey::Section)
                .map_err(|_| malformed()),
            _ => {
                let kind = AnnotationKind::from_tag(tag).ok_or_else(|| KeyError::UnknownKind {
                    kind: tag.to_string(),
                    key: key.to_string(),
                })?;
                let (layer_id, annotation_id) =
                    rest.split_once(KEY_SEPARATOR).ok_or_else(malformed)?;
                if layer_id.is_empty() || annotation_id.is_empty() {
                    return Err(malformed());
                }
                Ok(VisibilityKey::annotation(kind, layer_id, annotation_id))
            }
        }
    }
}
