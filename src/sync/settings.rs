//! Settings cache - remembered input fields between runs.
//!
//! A single JSON object on disk. Missing or malformed entries fall back
//! to empty defaults per field and never fail the caller.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Errors writing the settings cache. Loading never fails.
#[derive(Error, Diagnostic, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    #[diagnostic(code(vaultsync::settings::io))]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    #[diagnostic(code(vaultsync::settings::serialize))]
    Serialize(#[from] serde_json::Error),
}

/// Cached input fields, all defaulting to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub username: String,
    pub email: String,
    pub repo_url: String,
    pub commit_message: String,
    pub vault_dir: String,
    pub mirror_dir: String,
    pub branch: String,
}

impl Settings {
    /// Load the cache from `path`, falling back to defaults on a
    /// missing or malformed file.
    pub fn load(path: &Path) -> Self {
        let Ok(raw) = fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring malformed settings cache");
                Self::default()
            }
        }
    }

    /// Write the cache to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Remove the cache file. Returns whether one existed.
    pub fn clear(path: &Path) -> Result<bool, SettingsError> {
        if path.exists() {
            fs::remove_file(path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
