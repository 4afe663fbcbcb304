//! Local sync path: drive the git tool against a working copy.
//!
//! Steps run strictly in sequence; the first fatal failure becomes the
//! terminal log entry for the directory.

use std::path::Path;
use tracing::debug;

use super::git::{GitError, GitOps};
use super::log::SyncLog;
use super::target::SyncTarget;

const REMOTE_NAME: &str = "origin";

/// Register `url` as the `origin` remote, rewriting it if one exists.
///
/// Idempotent: a second call with the same URL is a no-op rewrite.
pub fn ensure_remote<G: GitOps>(
    git: &G,
    dir: &Path,
    url: &str,
    log: &mut SyncLog,
) -> Result<(), GitError> {
    if git.remote_get_url(dir, REMOTE_NAME).is_ok() {
        step(log, "update remote origin", git.set_remote_url(dir, REMOTE_NAME, url))?;
        log.success(format!("Updated remote origin to {url}"));
    } else {
        step(log, "add remote origin", git.add_remote(dir, REMOTE_NAME, url))?;
        log.success(format!("Added remote origin {url}"));
    }
    Ok(())
}

/// Whether the working tree has uncommitted changes.
pub fn has_pending_changes<G: GitOps>(git: &G, dir: &Path) -> Result<bool, GitError> {
    let output = git.status_porcelain(dir)?;
    Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
}

/// Merge the local folder's contents into the remote history of one
/// working copy: identity, remote, fetch, commit, merge, push.
pub fn sync_directory<G: GitOps>(
    git: &G,
    dir: &Path,
    target: &SyncTarget,
    log: &mut SyncLog,
) -> Result<(), GitError> {
    debug!(dir = %dir.display(), "starting local sync");
    log.info(format!("Processing {}", dir.display()));

    step(
        log,
        "configure git identity",
        git.config_user(dir, &target.username, &target.email),
    )?;
    log.success(format!(
        "Configured git user {} <{}>",
        target.username, target.email
    ));

    ensure_remote(git, dir, &target.repo_url, log)?;

    step(log, "fetch from origin", git.fetch(dir, REMOTE_NAME))?;
    log.success("Fetched origin");

    let message = target.commit_message();
    if step(log, "check working tree status", has_pending_changes(git, dir))? {
        step(log, "stage local changes", git.add_all(dir))?;
        step(log, "commit before merge", git.commit(dir, message))?;
        log.success(format!("Committed local changes before merge with message '{message}'"));
    } else {
        log.info("No local changes to commit before merge");
    }

    merge_with_fallback(git, dir, &format!("{REMOTE_NAME}/{}", target.branch()), log)?;

    if step(log, "check working tree status", has_pending_changes(git, dir))? {
        step(log, "stage merged changes", git.add_all(dir))?;
        step(log, "commit after merge", git.commit(dir, message))?;
        log.success(format!("Committed changes after merge with message '{message}'"));
    } else {
        log.info("No changes to commit after merge");
    }

    step(
        log,
        "push to origin",
        git.push(dir, REMOTE_NAME, target.branch()),
    )?;
    log.success(format!("Pushed to {REMOTE_NAME}/{}", target.branch()));

    log.success(format!("Git operations completed in {}", dir.display()));
    Ok(())
}

/// Try each merge strategy in order, stopping at the first success.
///
/// The plain merge rejects histories with no common ancestor; the second
/// strategy joins them. A failure of the last strategy is fatal.
fn merge_with_fallback<G: GitOps>(
    git: &G,
    dir: &Path,
    refspec: &str,
    log: &mut SyncLog,
) -> Result<(), GitError> {
    let strategies = [false, true];
    let mut last_err = None;

    for (attempt, &allow_unrelated) in strategies.iter().enumerate() {
        match git.merge(dir, refspec, allow_unrelated) {
            Ok(_) => {
                if allow_unrelated {
                    log.success(format!("Merged {refspec} after joining unrelated histories"));
                } else {
                    log.success(format!("Merged {refspec}"));
                }
                return Ok(());
            }
            Err(e) => {
                if attempt + 1 < strategies.len() {
                    log.info("Standard merge failed, retrying while allowing unrelated histories");
                }
                last_err = Some(e);
            }
        }
    }

    let e = last_err.unwrap_or(GitError::CommandFailed("merge".to_string()));
    log.error(format!("Failed to merge {refspec}: {e}"));
    Err(e)
}

/// Record a step failure as the terminal log line and pass the error on.
fn step<T>(log: &mut SyncLog, what: &str, result: Result<T, GitError>) -> Result<T, GitError> {
    result.map_err(|e| {
        log.error(format!("Failed to {what}: {e}"));
        e
    })
}
