//! Settings persistence using TOML
//!
//! Stores settings in ~/.config/tetrs-engine/settings.toml (or platform equivalent)

use crate::config::{Difficulty, SessionConfig};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Persisted settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Gameplay settings
    pub gameplay: GameplaySettings,
    /// Visual settings
    pub visual: VisualSettings,
    /// Audio settings
    pub audio: AudioSettings,
    /// Best score so far
    pub high_score: u64,
}

/// Gameplay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    pub difficulty: Difficulty,
    /// Delayed Auto Shift in milliseconds
    pub das_ms: u64,
    /// Auto Repeat Rate in milliseconds, 0 shifts straight to the wall
    pub arr_ms: u64,
    /// Time between soft-drop steps in milliseconds
    pub soft_drop_ms: u64,
}

/// Visual settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualSettings {
    /// Brightness (0-100)
    pub brightness: u32,
    /// Ghost piece visibility
    pub ghost_piece: bool,
}

/// Audio settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Music volume (0-100)
    pub music_volume: u32,
    /// SFX volume (0-100)
    pub sfx_volume: u32,
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            das_ms: 133,
            arr_ms: 0,
            soft_drop_ms: 30,
        }
    }
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            brightness: 100,
            ghost_piece: true,
        }
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            music_volume: 25,
            sfx_volume: 50,
        }
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "tetrs", "tetrs-engine")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Load settings from the config directory, or defaults
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load settings from `path`. A missing or unreadable file gives defaults.
    pub fn load_from(path: &Path) -> Self {
        let Ok(contents) = fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Ignoring malformed settings at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings to the config directory
    pub fn save(&self) -> Result<(), String> {
        let Some(path) = Self::settings_path() else {
            return Err("Could not determine settings path".to_string());
        };
        self.save_to(&path)
    }

    /// Save settings to `path`, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| format!("Failed to create config dir: {}", e))?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize: {}", e))?;

        fs::write(path, contents).map_err(|e| format!("Failed to write settings: {}", e))?;

        Ok(())
    }

    /// Keep `score` if it beats the stored best. Returns true on a new record.
    pub fn record_high_score(&mut self, score: u64) -> bool {
        if score <= self.high_score {
            return false;
        }
        info!("New high score: {} (was {})", score, self.high_score);
        self.high_score = score;
        true
    }
}

impl From<&Settings> for SessionConfig {
    fn from(settings: &Settings) -> Self {
        let gameplay = &settings.gameplay;
        Self {
            difficulty: gameplay.difficulty,
            das: gameplay.das_ms as f32 / 1000.0,
            arr: gameplay.arr_ms as f32 / 1000.0,
            soft_drop_interval: gameplay.soft_drop_ms as f32 / 1000.0,
            ..SessionConfig::default()
        }
    }
}
