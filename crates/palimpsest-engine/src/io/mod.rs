//! Reading and writing workspace files.
//!
//! A workspace file is one JSON document holding pane texts, layers, section
//! visibility and the recording library. Recordings can also be stored on
//! their own as a JSON array.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::document::{MonospaceLayout, TextPane};
use crate::model::{Layer, LayerError, LayerId, LayerStore};
use crate::panes::PaneIndex;
use crate::recording::RecordingLibrary;
use crate::workspace::{EditorSettings, Workspace};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid layers: {0}")]
    Layers(#[from] LayerError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneFile {
    pub text: String,
}

/// On-disk shape of a workspace
///
/// `panes` is indexed by pane index. A `null` entry keeps the index of a
/// pane that was torn down so annotations in later panes still line up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceFile {
    #[serde(default)]
    pub panes: Vec<Option<PaneFile>>,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_layer_id: Option<LayerId>,
    #[serde(default)]
    pub sections: BTreeMap<PaneIndex, bool>,
    #[serde(default)]
    pub recordings: RecordingLibrary,
}

impl WorkspaceFile {
    /// Capture a text workspace and its recordings for saving
    pub fn from_workspace(workspace: &Workspace<TextPane>, recordings: &RecordingLibrary) -> Self {
        let mut panes: Vec<Option<PaneFile>> = Vec::new();
        let mut sections = BTreeMap::new();
        for (handle, pane) in workspace.panes().iter() {
            panes.resize(handle.index, None);
            panes.push(Some(PaneFile {
                text: pane.document.text(),
            }));
            sections.insert(handle.index, workspace.is_section_visible(handle.index));
        }

        Self {
            panes,
            layers: workspace.layers().layers().to_vec(),
            active_layer_id: workspace.layers().active_layer().map(|l| l.id.clone()),
            sections,
            recordings: recordings.clone(),
        }
    }

    /// Build a live workspace, laying out pane `i` with `layout(i)`
    pub fn into_workspace(
        self,
        settings: EditorSettings,
        layout: impl Fn(PaneIndex) -> MonospaceLayout,
    ) -> Result<(Workspace<TextPane>, RecordingLibrary), IoError> {
        let mut layers = LayerStore::from_layers(self.layers)?;
        match self.active_layer_id.as_deref() {
            Some(id) => layers.set_active(id)?,
            None => layers.clear_active(),
        }

        let mut workspace = Workspace::new(layers, settings);
        for (index, pane) in self.panes.into_iter().enumerate() {
            match pane {
                Some(pane) => {
                    workspace.add_pane(TextPane::new(&pane.text, layout(index)));
                }
                None => {
                    // reserve the index, then vacate it
                    workspace.add_pane(TextPane::new("", layout(index)));
                    workspace.remove_pane(index);
                }
            }
        }
        for (index, visible) in self.sections {
            if !visible && !workspace.set_section_visible(index, false) {
                log::warn!("ignoring section state for missing pane {index}");
            }
        }

        log::debug!(
            "loaded workspace with {} panes and {} layers",
            workspace.panes().len(),
            workspace.layers().layers().len()
        );
        Ok((workspace, self.recordings))
    }

    /// Number of live panes and their total text length
    pub fn text_stats(&self) -> (usize, usize) {
        self.panes
            .iter()
            .flatten()
            .fold((0, 0), |(count, len), pane| (count + 1, len + pane.text.len()))
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|source| IoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| IoError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), IoError> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| IoError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let content = serde_json::to_string_pretty(value).map_err(|source| IoError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, content).map_err(|source| IoError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_workspace_file(path: &Path) -> Result<WorkspaceFile, IoError> {
    read_json(path)
}

pub fn write_workspace_file(path: &Path, file: &WorkspaceFile) -> Result<(), IoError> {
    write_json(path, file)
}

/// Read a standalone recordings file; a missing file is an empty library
pub fn read_recordings(path: &Path) -> Result<RecordingLibrary, IoError> {
    match read_json(path) {
        Err(IoError::NotFound(_)) => Ok(RecordingLibrary::new()),
        other => other,
    }
}

pub fn write_recordings(path: &Path, recordings: &RecordingLibrary) -> Result<(), IoError> {
    write_json(path, recordings)
}
