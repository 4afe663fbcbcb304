//! Shared utilities for CLI commands

use crate::sync::{Level, Outcome, Settings, SyncReport, SyncTarget};

/// Render a run report as printable text: one line per log entry with a
/// level icon, then the terminal outcome.
pub fn render_report(report: &SyncReport) -> String {
    let mut out = String::new();
    for entry in report.log.entries() {
        match entry.level {
            Level::Info => out.push_str(&format!("  {}\n", entry.message)),
            Level::Success => out.push_str(&format!("✓ {}\n", entry.message)),
            Level::Error => out.push_str(&format!("✗ {}\n", entry.message)),
        }
    }
    out.push('\n');
    out.push_str(match report.outcome {
        Outcome::Succeeded => "✓ Completed successfully",
        Outcome::Failed => "✗ Failed",
        Outcome::TimedOut => "ℹ Timed out; the remote job may still be running",
    });
    out.push('\n');
    out
}

/// Map a run's inputs back into the cached settings shape.
pub fn settings_from(target: &SyncTarget) -> Settings {
    Settings {
        username: target.username.clone(),
        email: target.email.clone(),
        repo_url: target.repo_url.clone(),
        commit_message: target.commit_message.clone().unwrap_or_default(),
        vault_dir: target.vault_dir.to_string_lossy().to_string(),
        mirror_dir: target
            .mirror_dir
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default(),
        branch: target.branch.clone().unwrap_or_default(),
    }
}
