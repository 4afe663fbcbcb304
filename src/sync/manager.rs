//! Sync manager - the orchestrator behind every CLI action.
//!
//! Sequences the local git driver and the remote repository client into
//! complete runs: branch listing, local and remote sync, backup and
//! restore. Every entry point returns a [`SyncReport`] holding the
//! ordered run log and a terminal outcome; failures never raise past
//! this boundary.

use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::remote::{RemoteError, RemoteOps, RepoRef, WorkflowInputs};

use super::{
    archive::ArchiveError,
    backup,
    git::{GitError, GitOps},
    local,
    log::{Outcome, SyncLog, SyncReport},
    target::{SyncTarget, ValidationError},
    upload,
};

/// Fixed delay between workflow status checks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Number of status checks before a run is declared timed out.
pub const POLL_ATTEMPTS: u32 = 12;

/// Errors that can occur during sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Git error: {0}")]
    Git(#[from] GitError),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("No backup artifact found")]
    NoBackup,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Sync manager handles all sync operations.
///
/// Generic over both backends so tests can drive it with mocks.
pub struct SyncManager<G: GitOps, R: RemoteOps> {
    git: G,
    remote: R,
    poll_interval: Duration,
    poll_attempts: u32,
}

impl<G: GitOps, R: RemoteOps> SyncManager<G, R> {
    /// Create a manager with the default polling policy.
    pub fn new(git: G, remote: R) -> Self {
        Self::with_polling(git, remote, POLL_INTERVAL, POLL_ATTEMPTS)
    }

    /// Create a manager with a custom polling policy (for testing).
    pub fn with_polling(git: G, remote: R, poll_interval: Duration, poll_attempts: u32) -> Self {
        Self {
            git,
            remote,
            poll_interval,
            poll_attempts,
        }
    }

    /// List the remote repository's branches.
    ///
    /// Listing is advisory: an empty result is not a failure, only an
    /// unresolvable repository is.
    pub async fn fetch_branches(&self, target: &SyncTarget) -> SyncReport {
        let mut log = SyncLog::new();
        if let Err(e) = target.validate_credentials() {
            log.error(format!("Error: {e}"));
            return report(log, Outcome::Failed);
        }
        let Some(repo) = self.resolve(target, &mut log).await else {
            return report(log, Outcome::Failed);
        };
        let branches = self.remote.list_branches(&repo).await;
        if branches.is_empty() {
            log.info("No branches found");
        } else {
            log.success(format!("Available branches: {}", branches.join(", ")));
        }
        report(log, Outcome::Succeeded)
    }

    /// Sync by driving the local git tool against each configured
    /// working copy.
    pub async fn sync_local(&self, target: &SyncTarget) -> SyncReport {
        let mut log = SyncLog::new();
        if let Err(e) = target.validate() {
            log.error(format!("Error: {e}"));
            return report(log, Outcome::Failed);
        }

        let mut failed = false;
        for dir in target.directories() {
            if local::sync_directory(&self.git, dir, target, &mut log).is_err() {
                failed = true;
            }
        }
        if failed {
            report(log, Outcome::Failed)
        } else {
            log.success("All operations completed");
            report(log, Outcome::Succeeded)
        }
    }

    /// Sync by uploading the vault through the hosting API and driving
    /// the remote sync workflow to completion.
    pub async fn sync_remote(&self, target: &SyncTarget) -> SyncReport {
        let mut log = SyncLog::new();
        if let Err(e) = target.validate() {
            log.error(format!("Error: {e}"));
            return report(log, Outcome::Failed);
        }
        let Some(repo) = self.resolve(target, &mut log).await else {
            return report(log, Outcome::Failed);
        };

        let files = upload::vault_files(&target.vault_dir);
        if files.is_empty() {
            log.error(format!("No files found in {}", target.vault_dir.display()));
            return report(log, Outcome::Failed);
        }
        log.info(format!("Found {} file(s)", files.len()));

        let branch = target.branch();
        if let Err(e) = upload::ensure_branch(&self.remote, &repo, branch, &mut log).await {
            log.error(format!("Error preparing branch {branch}: {e}"));
            return report(log, Outcome::Failed);
        }

        let summary =
            upload::upload_tree(&self.remote, &repo, branch, &target.vault_dir, &files, &mut log)
                .await;
        if summary.uploaded() == 0 {
            log.error("No files uploaded");
            return report(log, Outcome::Failed);
        }
        if summary.any_failed() {
            log.error(format!(
                "{} of {} files failed to upload",
                summary.failed(),
                summary.outcomes.len()
            ));
            return report(log, Outcome::Failed);
        }

        let inputs = WorkflowInputs {
            username: target.username.clone(),
            email: target.email.clone(),
            commit_message: target.commit_message().to_string(),
            default_branch: repo.default_branch.clone(),
        };
        if let Err(e) = self.remote.dispatch_workflow(&repo, branch, &inputs).await {
            log.error(format!("Error triggering workflow: {e}"));
            return report(log, Outcome::Failed);
        }
        log.success("Triggered workflow");

        let outcome = upload::poll_workflow(
            &self.remote,
            &repo,
            branch,
            self.poll_attempts,
            self.poll_interval,
            &mut log,
        )
        .await;

        // Best effort, appended regardless of the workflow outcome.
        self.auto_merge_pulls(&repo, &mut log).await;
        report(log, outcome)
    }

    /// Archive the vault onto the remote backup branch, rotating the
    /// prior backup head first.
    pub async fn backup_remote(&self, target: &SyncTarget) -> SyncReport {
        let mut log = SyncLog::new();
        if let Err(e) = target.validate_for_backup() {
            log.error(format!("Error: {e}"));
            return report(log, Outcome::Failed);
        }
        let Some(repo) = self.resolve(target, &mut log).await else {
            return report(log, Outcome::Failed);
        };
        match backup::backup_remote(&self.remote, &repo, &target.vault_dir, &mut log).await {
            Ok(()) => {
                self.auto_merge_pulls(&repo, &mut log).await;
                report(log, Outcome::Succeeded)
            }
            Err(e) => {
                log.error(format!("Remote backup error: {e}"));
                report(log, Outcome::Failed)
            }
        }
    }

    /// Replace the vault with the latest remote backup artifact.
    pub async fn restore_remote(&self, target: &SyncTarget) -> SyncReport {
        let mut log = SyncLog::new();
        if let Err(e) = target.validate_credentials() {
            log.error(format!("Error: {e}"));
            return report(log, Outcome::Failed);
        }
        if target.vault_dir.as_os_str().is_empty() {
            log.error("Error: vault directory is required");
            return report(log, Outcome::Failed);
        }
        let Some(repo) = self.resolve(target, &mut log).await else {
            return report(log, Outcome::Failed);
        };
        match backup::restore_remote(&self.remote, &repo, &target.vault_dir, &mut log).await {
            Ok(()) => report(log, Outcome::Succeeded),
            Err(e) => {
                log.error(format!("Restore error: {e}"));
                report(log, Outcome::Failed)
            }
        }
    }

    /// Archive the vault into a local directory.
    pub fn backup_local(&self, target: &SyncTarget, dest_dir: &Path) -> SyncReport {
        let mut log = SyncLog::new();
        if !target.vault_dir.is_dir() {
            log.error(format!(
                "Error: vault directory {} does not exist",
                target.vault_dir.display()
            ));
            return report(log, Outcome::Failed);
        }
        match backup::backup_local(&target.vault_dir, dest_dir, &mut log) {
            Ok(_) => report(log, Outcome::Succeeded),
            Err(e) => {
                log.error(format!("Local backup error: {e}"));
                report(log, Outcome::Failed)
            }
        }
    }

    /// Replace the vault with the contents of a local backup archive.
    pub fn restore_local(&self, target: &SyncTarget, archive: &Path) -> SyncReport {
        let mut log = SyncLog::new();
        if target.vault_dir.as_os_str().is_empty() {
            log.error("Error: vault directory is required");
            return report(log, Outcome::Failed);
        }
        match backup::restore_local(archive, &target.vault_dir, &mut log) {
            Ok(()) => report(log, Outcome::Succeeded),
            Err(e) => {
                log.error(format!("Restore error: {e}"));
                report(log, Outcome::Failed)
            }
        }
    }

    async fn resolve(&self, target: &SyncTarget, log: &mut SyncLog) -> Option<RepoRef> {
        match self.remote.resolve_repo(&target.repo_url).await {
            Ok(repo) => {
                info!(owner = %repo.owner, repo = %repo.repo, "resolved repository");
                log.info(format!(
                    "Validated repository {}/{} (default branch {})",
                    repo.owner, repo.repo, repo.default_branch
                ));
                Some(repo)
            }
            Err(e) => {
                log.error(format!("Error resolving repository: {e}"));
                None
            }
        }
    }

    /// Merge every open pull request; each outcome is logged and no
    /// failure stops the rest.
    async fn auto_merge_pulls(&self, repo: &RepoRef, log: &mut SyncLog) {
        let pulls = match self.remote.list_pulls(repo).await {
            Ok(pulls) => pulls,
            Err(e) => {
                log.error(format!("Error fetching pull requests: {e}"));
                return;
            }
        };
        for pr in pulls {
            match self.remote.merge_pull(repo, pr.number).await {
                Ok(()) => log.success(format!("Merged PR #{}", pr.number)),
                Err(e) => log.error(format!("Error merging PR #{}: {e}", pr.number)),
            }
        }
    }
}

fn report(log: SyncLog, outcome: Outcome) -> SyncReport {
    SyncReport { log, outcome }
}
