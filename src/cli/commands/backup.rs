//! Backup and restore commands.

use std::path::Path;

use crate::cli::error::{CliError, CliResult};
use crate::cli::utils::render_report;
use crate::remote::RemoteOps;
use crate::sync::{GitOps, SyncManager, SyncTarget};

/// Back up the vault, either onto the remote backup branch or into a
/// local destination directory.
pub async fn backup<G: GitOps, R: RemoteOps>(
    manager: &SyncManager<G, R>,
    target: &SyncTarget,
    remote: bool,
    dest: Option<&Path>,
) -> CliResult<String> {
    let report = if remote {
        manager.backup_remote(target).await
    } else {
        let dest = dest.ok_or(CliError::MissingDest)?;
        manager.backup_local(target, dest)
    };
    Ok(render_report(&report))
}

/// Restore the vault from the latest remote backup or a named local
/// archive.
pub async fn restore<G: GitOps, R: RemoteOps>(
    manager: &SyncManager<G, R>,
    target: &SyncTarget,
    remote: bool,
    archive: Option<&Path>,
) -> CliResult<String> {
    let report = if remote {
        manager.restore_remote(target).await
    } else {
        let archive = archive.ok_or(CliError::MissingArchive)?;
        manager.restore_local(target, archive)
    };
    Ok(render_report(&report))
}
