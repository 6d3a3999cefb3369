use crate::color::TypeColor;
use crate::error::ConfigError;
use crate::settings::{Params, DEFAULT_TEXT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Complete application configuration for export/import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Version field for future compatibility
    pub version: u32,
    /// Simulation tunables
    pub params: Params,
    /// Text laid along new strokes
    pub text: String,
    /// Base font size in canvas pixels
    pub font_size: f32,
    pub font_weight: u16,
    /// Type colour (app-level)
    pub type_color: TypeColor,
    /// Spring links overlay (app-level)
    pub show_links: bool,
    /// Simulation steps per frame (app-level)
    pub steps_per_frame: usize,
}

impl AppConfig {
    /// `<config_dir>/text-rope/config.json`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join("text-rope").join("config.json"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Export config to a JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Import config from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            params: Params::default(),
            text: DEFAULT_TEXT.to_string(),
            font_size: 24.0,
            font_weight: 400,
            type_color: TypeColor::default(),
            show_links: false,
            steps_per_frame: 1,
        }
    }
}
