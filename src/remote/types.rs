//! Payload types for the hosting API.

use serde::{Deserialize, Serialize};

/// A resolved remote repository.
///
/// Built once per run by [`super::RemoteOps::resolve_repo`]; owner and
/// repo are guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
    pub default_branch: String,
}

/// An open pull request, as returned by the pulls listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default)]
    pub title: String,
}

/// Status of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
}

/// Conclusion of a completed workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunConclusion {
    Success,
    Failure,
    #[serde(other)]
    Unknown,
}

/// A single workflow run from the runs listing.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    pub status: RunStatus,
    pub conclusion: Option<RunConclusion>,
}

/// A job within a workflow run, used for failure diagnostics.
#[derive(Debug, Clone, Deserialize)]
pub struct RunJob {
    pub name: String,
    pub conclusion: Option<RunConclusion>,
    pub html_url: String,
}

/// Inputs passed to the sync workflow on dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowInputs {
    pub username: String,
    pub email: String,
    pub commit_message: String,
    pub default_branch: String,
}

/// An entry in a branch's contents listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub download_url: Option<String>,
}
