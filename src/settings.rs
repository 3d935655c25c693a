use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Editor settings, read from `settings.toml`.
///
/// Only ambient behaviour lives here. Parameter slider values are never persisted.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EditorSettings {
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default)]
    pub file_logging: bool,
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64, // UI redraw tick
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64, // serial poll timeout, not a read deadline
}

fn default_log_dir() -> String {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("t10-editor")
        .join("Reports")
        .to_string_lossy()
        .to_string()
}
fn default_refresh_interval_ms() -> u64 {
    50
}
fn default_read_timeout_ms() -> u64 {
    50
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            file_logging: false,
            refresh_interval_ms: default_refresh_interval_ms(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

/// Default location of the settings file: `<config dir>/t10-editor/settings.toml`.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("t10-editor").join("settings.toml"))
}

/// Load settings from `path`. A missing file yields the defaults; nothing is written back.
pub fn load_settings(path: &Path) -> Result<EditorSettings, String> {
    if !path.exists() {
        return Ok(EditorSettings::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read settings: {}", e))?;

    let settings: EditorSettings =
        toml::from_str(&content).map_err(|e| format!("Failed to parse settings: {}", e))?;

    if settings.refresh_interval_ms == 0 {
        return Err("Failed to parse settings: refresh_interval_ms must be greater than 0".to_string());
    }
    if settings.read_timeout_ms == 0 {
        return Err("Failed to parse settings: read_timeout_ms must be greater than 0".to_string());
    }

    Ok(settings)
}
