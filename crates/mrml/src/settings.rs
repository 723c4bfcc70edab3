//! Scene settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};

fn default_undo_stack_size() -> usize {
    100
}

fn default_true() -> bool {
    true
}

fn default_version() -> String {
    shared::CURRENT_MRML_VERSION.to_string()
}

/// Persisted scene configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSettings {
    /// Maximum number of undo levels; the oldest is evicted first
    #[serde(default = "default_undo_stack_size")]
    pub undo_stack_size: usize,
    /// Record undo checkpoints at all
    #[serde(default = "default_true")]
    pub undo_enabled: bool,
    /// Indent committed documents
    #[serde(default = "default_true")]
    pub pretty_documents: bool,
    /// Version written on commit
    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            undo_stack_size: default_undo_stack_size(),
            undo_enabled: true,
            pretty_documents: true,
            version: default_version(),
        }
    }
}

impl SceneSettings {
    /// `settings.json` in the platform config directory
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("org", "mrml", "mrml")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from the config file, or defaults if missing or unreadable
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        if let Ok(json) = std::fs::read_to_string(path) {
            match serde_json::from_str(&json) {
                Ok(settings) => return settings,
                Err(e) => tracing::warn!("Ignoring malformed {}: {e}", path.display()),
            }
        }
        Self::default()
    }

    /// Save settings to the config file
    pub fn save(&self) -> SceneResult<()> {
        match Self::config_path() {
            Some(path) => self.save_to(&path),
            None => Err(SceneError::NoUrl),
        }
    }

    pub fn save_to(&self, path: &Path) -> SceneResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
