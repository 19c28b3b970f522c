use palimpsest_engine::recording::{DEFAULT_GLOBAL_DELAY_MS, PlaybackDefaults, TransitionType};
use palimpsest_engine::workspace::EditorSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub default_delay_ms: u64,
    pub default_transition: TransitionType,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            default_delay_ms: DEFAULT_GLOBAL_DELAY_MS,
            default_transition: TransitionType::Instant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub dark_mode: bool,
    pub hide_offscreen_arrows: bool,
    /// Monospace cell size used to lay out panes in the CLI
    pub cell_width: f64,
    pub line_height: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            dark_mode: false,
            hide_offscreen_arrows: false,
            cell_width: 8.0,
            line_height: 18.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Standalone recordings library, used instead of the workspace file's own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recordings_path: Option<PathBuf>,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the loaded recordings path
        config.recordings_path = config
            .recordings_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/palimpsest");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Engine settings for a locked, read-only workspace
    pub fn settings(&self) -> (EditorSettings, PlaybackDefaults) {
        let settings = EditorSettings {
            locked: true,
            dark_mode: self.display.dark_mode,
            hide_offscreen_arrows: self.display.hide_offscreen_arrows,
        };
        let defaults = PlaybackDefaults {
            global_delay_ms: self.playback.default_delay_ms,
            transition_type: self.playback.default_transition,
        };
        (settings, defaults)
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
