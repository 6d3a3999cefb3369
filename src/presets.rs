use crate::error::ConfigError;
use crate::settings::Params;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A named set of simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub description: String,
    pub params: Params,
}

impl Preset {
    pub fn new(name: impl Into<String>, description: impl Into<String>, params: Params) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params,
        }
    }
}

/// Manager for loading and saving presets
pub struct PresetManager {
    /// Built-in presets that ship with the app
    pub builtin: Vec<Preset>,
    /// User-created presets loaded from disk
    pub user: Vec<Preset>,
    /// Where user presets live; `None` when no config directory exists
    dir: Option<PathBuf>,
}

impl Default for PresetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetManager {
    pub fn new() -> Self {
        Self::with_dir(Self::presets_dir())
    }

    /// Manager reading user presets from `dir` instead of the config directory
    pub fn with_dir(dir: Option<PathBuf>) -> Self {
        let mut manager = Self {
            builtin: Self::builtin_presets(),
            user: Vec::new(),
            dir,
        };
        manager.load_user_presets();
        manager
    }

    fn builtin_presets() -> Vec<Preset> {
        vec![
            // Default - gentle fall, firm links
            Preset::new("Default", "Balanced gravity and spring", Params::default()),
            // Silk - soft springs, drifting
            Preset::new(
                "Silk",
                "Loose, slowly drifting ribbons",
                Params {
                    gravity: 0.08,
                    stiffness: 0.12,
                    damping: 0.02,
                    bounce: 0.2,
                    ..Default::default()
                },
            ),
            // Chain - stiff links, heavy fall
            Preset::new(
                "Chain",
                "Stiff links that hang like a chain",
                Params {
                    gravity: 0.5,
                    stiffness: 0.9,
                    damping: 0.08,
                    bounce: 0.1,
                    ..Default::default()
                },
            ),
            // Zero-G - strokes float where drawn
            Preset::new(
                "Zero-G",
                "No gravity; strokes float and jostle",
                Params {
                    gravity: 0.0,
                    stiffness: 0.3,
                    damping: 0.06,
                    ..Default::default()
                },
            ),
            // Bouncy - lively walls
            Preset::new(
                "Bouncy",
                "Walls keep almost all of the speed",
                Params {
                    gravity: 0.35,
                    damping: 0.01,
                    bounce: 0.9,
                    collision_strength: 1.0,
                    ..Default::default()
                },
            ),
            // Heavy - large glyphs, strong pull
            Preset::new(
                "Heavy",
                "Large glyphs under strong gravity",
                Params {
                    text_size: 1.8,
                    gravity: 0.9,
                    stiffness: 0.6,
                    damping: 0.1,
                    bounce: 0.05,
                    ..Default::default()
                },
            ),
        ]
    }

    /// Get the presets directory path
    fn presets_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("text-rope").join("presets"))
    }

    /// Load user presets from disk; unreadable files are skipped
    fn load_user_presets(&mut self) {
        let Some(dir) = self.dir.as_deref().filter(|d| d.exists()) else {
            return;
        };
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }
            match Self::read_preset(&path) {
                Ok(preset) => self.user.push(preset),
                Err(err) => tracing::warn!(%err, "skipping user preset"),
            }
        }
        self.user.sort_by(|a, b| a.name.cmp(&b.name));
    }

    fn read_preset(path: &Path) -> Result<Preset, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn file_name(name: &str) -> String {
        let stem: String = name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        format!("{}.json", stem)
    }

    /// Save a preset to disk, replacing a user preset of the same name
    pub fn save_preset(&mut self, preset: Preset) -> Result<PathBuf, ConfigError> {
        let dir = self.dir.clone().ok_or(ConfigError::NoConfigDir)?;
        fs::create_dir_all(&dir).map_err(|source| ConfigError::Write {
            path: dir.clone(),
            source,
        })?;

        let path = dir.join(Self::file_name(&preset.name));
        let json = serde_json::to_string_pretty(&preset)?;
        fs::write(&path, json).map_err(|source| ConfigError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::info!(name = %preset.name, path = %path.display(), "preset saved");

        match self.user.iter_mut().find(|p| p.name == preset.name) {
            Some(existing) => *existing = preset,
            None => self.user.push(preset),
        }
        Ok(path)
    }

    /// Get all presets (builtin + user)
    pub fn all_presets(&self) -> impl Iterator<Item = &Preset> {
        self.builtin.iter().chain(self.user.iter())
    }

    pub fn len(&self) -> usize {
        self.builtin.len() + self.user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Preset at a position in `all_presets` order
    pub fn get(&self, index: usize) -> Option<&Preset> {
        self.all_presets().nth(index)
    }

    /// Position of a preset by name, ignoring case
    pub fn position(&self, name: &str) -> Option<usize> {
        self.all_presets()
            .position(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Get preset names for display
    pub fn preset_names(&self) -> Vec<&str> {
        self.all_presets().map(|p| p.name.as_str()).collect()
    }
}
