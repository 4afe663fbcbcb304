//! Remote upload path: enumerate the vault, ensure the target branch,
//! push files one at a time, and drive the sync workflow to completion.

use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::remote::{RemoteError, RemoteOps, RepoRef, RunConclusion, RunStatus};

use super::archive::walk_files;
use super::log::{Outcome, SyncLog};

/// Outcome of one file's upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Uploaded,
    Failed(String),
}

/// Per-file outcome, in vault walk order.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub path: String,
    pub status: FileStatus,
}

/// Ordered per-file outcomes of an upload pass.
#[derive(Debug, Default)]
pub struct UploadSummary {
    pub outcomes: Vec<UploadOutcome>,
}

impl UploadSummary {
    pub fn uploaded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == FileStatus::Uploaded)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.uploaded()
    }

    pub fn any_failed(&self) -> bool {
        self.failed() > 0
    }
}

/// Relative paths of every file in the vault, in sorted walk order.
///
/// Order is significant: upload log lines replay it.
pub fn vault_files(dir: &Path) -> Vec<String> {
    walk_files(dir)
        .into_iter()
        .filter_map(|path| {
            path.strip_prefix(dir)
                .ok()
                .map(|rel| rel.to_string_lossy().replace('\\', "/"))
        })
        .collect()
}

/// Make the target branch exist, reusing it or creating it from the
/// default branch's head.
///
/// A branch is only ever created from a resolved base commit.
pub async fn ensure_branch<R: RemoteOps>(
    remote: &R,
    repo: &RepoRef,
    branch: &str,
    log: &mut SyncLog,
) -> Result<(), RemoteError> {
    if remote.get_ref(repo, branch).await.is_ok() {
        log.info(format!("Branch {branch} exists, updating"));
        return Ok(());
    }
    let base = remote.get_ref(repo, &repo.default_branch).await?;
    remote.create_branch(repo, branch, &base).await?;
    log.success(format!("Created branch {branch}"));
    Ok(())
}

/// Upload every file, one PUT per file, never aborting early.
///
/// Each failure is recorded and logged; the caller decides whether the
/// collected outcomes block further progress.
pub async fn upload_tree<R: RemoteOps>(
    remote: &R,
    repo: &RepoRef,
    branch: &str,
    dir: &Path,
    files: &[String],
    log: &mut SyncLog,
) -> UploadSummary {
    let mut summary = UploadSummary::default();
    for rel in files {
        let status = match std::fs::read(dir.join(rel)) {
            Err(e) => {
                log.error(format!("Error reading {rel}: {e}"));
                FileStatus::Failed(e.to_string())
            }
            Ok(bytes) => {
                match remote
                    .put_file(repo, branch, rel, &bytes, &format!("Add {rel}"))
                    .await
                {
                    Ok(()) => {
                        log.success(format!("Uploaded: {rel}"));
                        FileStatus::Uploaded
                    }
                    Err(e) => {
                        log.error(format!("Error uploading {rel}: {e}"));
                        FileStatus::Failed(e.to_string())
                    }
                }
            }
        };
        summary.outcomes.push(UploadOutcome {
            path: rel.clone(),
            status,
        });
    }
    debug!(
        uploaded = summary.uploaded(),
        failed = summary.failed(),
        "upload pass finished"
    );
    summary
}

/// Poll the branch's latest workflow run until it completes or the
/// attempt budget runs out.
///
/// Budget exhaustion is a soft `TimedOut`, not an error: the remote job
/// may still be running.
pub async fn poll_workflow<R: RemoteOps>(
    remote: &R,
    repo: &RepoRef,
    branch: &str,
    attempts: u32,
    interval: Duration,
    log: &mut SyncLog,
) -> Outcome {
    for _ in 0..attempts {
        match remote.latest_run(repo, branch).await {
            Ok(Some(run)) if run.status == RunStatus::Completed => {
                if run.conclusion == Some(RunConclusion::Success) {
                    log.success("Workflow completed successfully");
                    return Outcome::Succeeded;
                }
                // Pull per-job detail for the failure report; best effort.
                if let Ok(jobs) = remote.run_jobs(repo, run.id).await {
                    for job in jobs
                        .iter()
                        .filter(|j| j.conclusion == Some(RunConclusion::Failure))
                    {
                        log.error(format!("Workflow job failed: {}", job.name));
                        log.info(format!("Logs: {}", job.html_url));
                    }
                }
                log.error(format!(
                    "Workflow failed: {}",
                    conclusion_label(run.conclusion)
                ));
                return Outcome::Failed;
            }
            Ok(_) => {}
            Err(e) => {
                log.error(format!("Error checking workflow status: {e}"));
                return Outcome::Failed;
            }
        }
        tokio::time::sleep(interval).await;
    }
    log.info("Workflow timed out; the remote job may still be running");
    Outcome::TimedOut
}

fn conclusion_label(conclusion: Option<RunConclusion>) -> &'static str {
    match conclusion {
        Some(RunConclusion::Success) => "success",
        Some(RunConclusion::Failure) => "failure",
        Some(RunConclusion::Unknown) | None => "unknown",
    }
}
