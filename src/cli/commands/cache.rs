//! Settings cache command.

use std::path::Path;

use crate::cli::error::CliResult;
use crate::sync::Settings;

/// Remove the settings cache.
pub fn clear(settings_path: &Path) -> CliResult<String> {
    if Settings::clear(settings_path)? {
        Ok("✓ Cache cleared\n".to_string())
    } else {
        Ok("No cache found\n".to_string())
    }
}
