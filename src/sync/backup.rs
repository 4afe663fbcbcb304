//! Vault backup and restore, local and through the remote.
//!
//! Remote backups live as timestamped archives on a dedicated branch.
//! Before each new backup the branch head is rotated into a secondary
//! branch, so exactly one current and one previous backup stay
//! reachable. Restore picks the lexicographically greatest artifact
//! name, which sorts by timestamp.

use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::remote::{RemoteOps, RepoRef};

use super::archive::{create_archive, extract_archive};
use super::log::SyncLog;
use super::manager::SyncError;

/// Branch holding the current backup artifacts.
pub const BACKUP_BRANCH: &str = "backup";

/// Branch the prior backup head is rotated into.
pub const PREV_BACKUP_BRANCH: &str = "backup-prev";

/// Artifact name prefix; the timestamp suffix makes names sort by time.
pub const BACKUP_PREFIX: &str = "backup_";

/// Timestamped artifact name, e.g. `backup_20240601_120000.zip`.
fn backup_name() -> String {
    format!(
        "{BACKUP_PREFIX}{}.zip",
        Local::now().format("%Y%m%d_%H%M%S")
    )
}

/// Archive the vault and upload it to the backup branch, rotating the
/// prior head into the secondary branch first.
pub async fn backup_remote<R: RemoteOps>(
    remote: &R,
    repo: &RepoRef,
    vault: &Path,
    log: &mut SyncLog,
) -> Result<(), SyncError> {
    let scratch = tempfile::tempdir()?;
    let zip_path = scratch.path().join("backup.zip");
    create_archive(vault, &zip_path)?;
    log.success(format!("Created archive of {}", vault.display()));

    match remote.get_ref(repo, BACKUP_BRANCH).await {
        Ok(head) => {
            if remote.get_ref(repo, PREV_BACKUP_BRANCH).await.is_ok() {
                remote
                    .update_ref(repo, PREV_BACKUP_BRANCH, &head, true)
                    .await?;
            } else {
                remote.create_branch(repo, PREV_BACKUP_BRANCH, &head).await?;
            }
            log.info(format!(
                "Rotated {BACKUP_BRANCH} head into {PREV_BACKUP_BRANCH}"
            ));
        }
        Err(_) => {
            let base = remote.get_ref(repo, &repo.default_branch).await?;
            remote.create_branch(repo, BACKUP_BRANCH, &base).await?;
            log.success(format!("Created {BACKUP_BRANCH} branch"));
        }
    }

    let bytes = fs::read(&zip_path)?;
    let name = backup_name();
    remote
        .put_file(
            repo,
            BACKUP_BRANCH,
            &name,
            &bytes,
            &format!("Remote backup {name}"),
        )
        .await?;
    log.success(format!("Uploaded remote backup {name}"));
    Ok(())
}

/// Download the latest backup artifact and replace the vault with its
/// contents.
///
/// Fails clearly when the backup branch holds no artifact; never a
/// silent no-op.
pub async fn restore_remote<R: RemoteOps>(
    remote: &R,
    repo: &RepoRef,
    vault: &Path,
    log: &mut SyncLog,
) -> Result<(), SyncError> {
    let entries = remote.list_contents(repo, BACKUP_BRANCH).await?;
    let latest = entries
        .iter()
        .filter(|e| e.name.starts_with(BACKUP_PREFIX) && e.name.ends_with(".zip"))
        .max_by(|a, b| a.name.cmp(&b.name))
        .ok_or(SyncError::NoBackup)?;
    let url = latest.download_url.as_deref().ok_or(SyncError::NoBackup)?;

    let bytes = remote.download(url).await?;
    let scratch = tempfile::tempdir()?;
    let zip_path = scratch.path().join(&latest.name);
    fs::write(&zip_path, &bytes)?;
    log.info(format!("Downloaded backup {}", latest.name));

    replace_with_archive(&zip_path, vault)?;
    log.success(format!("Restored vault from {}", latest.name));
    Ok(())
}

/// Archive the vault into `dest_dir` under a timestamped name.
///
/// Local backups accumulate; nothing is rotated or overwritten.
pub fn backup_local(vault: &Path, dest_dir: &Path, log: &mut SyncLog) -> Result<PathBuf, SyncError> {
    fs::create_dir_all(dest_dir)?;
    let dest = dest_dir.join(backup_name());
    create_archive(vault, &dest)?;
    log.success(format!("Created local backup {}", dest.display()));
    Ok(dest)
}

/// Replace the vault with the contents of a local backup archive.
pub fn restore_local(archive: &Path, vault: &Path, log: &mut SyncLog) -> Result<(), SyncError> {
    if !archive.is_file() {
        return Err(SyncError::NoBackup);
    }
    replace_with_archive(archive, vault)?;
    log.success(format!(
        "Restored vault from {}",
        archive.display()
    ));
    Ok(())
}

/// Remove the target directory wholesale, recreate it, and extract.
fn replace_with_archive(archive: &Path, target: &Path) -> Result<(), SyncError> {
    debug!(target = %target.display(), "replacing directory from archive");
    if target.exists() {
        fs::remove_dir_all(target)?;
    }
    fs::create_dir_all(target)?;
    extract_archive(archive, target)?;
    Ok(())
}
