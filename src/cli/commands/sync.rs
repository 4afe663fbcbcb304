//! Sync command implementation.

use clap::ValueEnum;
use std::path::Path;

use crate::cli::error::CliResult;
use crate::cli::utils::{render_report, settings_from};
use crate::remote::RemoteOps;
use crate::sync::{GitOps, SyncManager, SyncTarget};

/// Which sync path to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Drive the local git tool against the working copy.
    Local,
    /// Upload through the hosting API and dispatch the sync workflow.
    Remote,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Local => write!(f, "local"),
            Mode::Remote => write!(f, "remote"),
        }
    }
}

/// Run a sync, remembering the inputs once they validate.
pub async fn run<G: GitOps, R: RemoteOps>(
    manager: &SyncManager<G, R>,
    target: &SyncTarget,
    mode: Mode,
    settings_path: &Path,
) -> CliResult<String> {
    // The forms cached their fields after a successful validation pass;
    // the CLI does the same so the next invocation can omit the flags.
    if target.validate().is_ok() {
        settings_from(target).save(settings_path)?;
    }

    let report = match mode {
        Mode::Local => manager.sync_local(target).await,
        Mode::Remote => manager.sync_remote(target).await,
    };
    Ok(render_report(&report))
}
