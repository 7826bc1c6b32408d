/// Editor configuration: load, save, and sanitize.
use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Log levels accepted by `log_level`.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Environment override for the local track directory.
pub const DATA_DIR_ENV: &str = "TRACK_EDIT_DATA_DIR";

/// Smallest history depth that still leaves room for one undoable edit.
const MIN_HISTORY_DEPTH: usize = 2;

/// Top-level editor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Max history entries kept per session (minimum 2).
    pub history_max_depth: usize,
    /// Directory for locally stored tracks. Empty = platform data directory.
    pub data_dir: String,
    /// Default tracing filter when `RUST_LOG` is not set.
    pub log_level: String,
    /// Routing profile for newly created tracks.
    pub default_profile: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_max_depth: 10_000,
            data_dir: String::new(),
            log_level: "info".to_string(),
            default_profile: "car".to_string(),
        }
    }
}

impl EditorConfig {
    /// Returns the config file path: exe directory + `track-edit.json`.
    pub fn config_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|d| d.join("track-edit.json")))
            .unwrap_or_else(|| PathBuf::from("track-edit.json"))
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any error (missing file, parse error, etc.).
    pub fn load_or_create(path: &std::path::Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str::<EditorConfig>(&contents) {
                    Ok(mut config) => {
                        config.sanitize();
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {}: {e}", path.display());
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {}: {e}", path.display());
                }
            }
            // Return defaults on error (don't overwrite broken file)
            Self::default()
        } else {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e:#}", path.display());
            }
            config
        }
    }

    /// Saves config to `path` as pretty-printed JSON.
    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config: {}", path.display()))
    }

    /// Returns the directory for locally stored tracks.
    ///
    /// Resolution order:
    /// 1. `TRACK_EDIT_DATA_DIR` environment variable (if non-empty)
    /// 2. `data_dir` (if non-empty)
    /// 3. Platform local data directory + `track-edit`
    /// 4. `.data` in the working directory
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
            return PathBuf::from(dir);
        }
        if !self.data_dir.is_empty() {
            return PathBuf::from(&self.data_dir);
        }
        dirs::data_local_dir()
            .map(|d| d.join("track-edit"))
            .unwrap_or_else(|| PathBuf::from(".data"))
    }

    /// Clamps values to valid ranges and resets invalid fields.
    pub fn sanitize(&mut self) {
        self.history_max_depth = self.history_max_depth.max(MIN_HISTORY_DEPTH);

        self.log_level = self.log_level.trim().to_ascii_lowercase();
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            self.log_level = "info".to_string();
        }
        if self.default_profile.trim().is_empty() {
            self.default_profile = "car".to_string();
        }
    }
}
