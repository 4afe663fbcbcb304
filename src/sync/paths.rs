//! Path resolution for vaultsync directories.
//!
//! Provides XDG-compliant path resolution for the data directory and
//! the settings cache.

use std::env;
use std::path::PathBuf;

/// Get XDG-compliant data directory for vaultsync.
///
/// # Returns
/// Path to data directory: `~/.local/share/vaultsync/`
///
/// # Panics
/// Panics if HOME environment variable is not set and XDG_DATA_HOME is also not set.
pub fn get_data_dir() -> PathBuf {
    let data_home = env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".local/share")
        });

    data_home.join("vaultsync")
}

/// Get the settings cache path (data_dir/settings.json).
///
/// # Returns
/// Path to settings cache: `~/.local/share/vaultsync/settings.json`
pub fn get_settings_path() -> PathBuf {
    get_data_dir().join("settings.json")
}
