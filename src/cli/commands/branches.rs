//! Branch listing command.

use crate::cli::error::CliResult;
use crate::cli::utils::render_report;
use crate::remote::RemoteOps;
use crate::sync::{GitOps, SyncManager, SyncTarget};

/// List the remote repository's branches.
pub async fn run<G: GitOps, R: RemoteOps>(
    manager: &SyncManager<G, R>,
    target: &SyncTarget,
) -> CliResult<String> {
    let report = manager.fetch_branches(target).await;
    Ok(render_report(&report))
}
