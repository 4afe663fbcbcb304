//! Remote hosting API client.
//!
//! A thin, retry-free client over the hosting provider's JSON API:
//! repository metadata, branch refs, file contents, pull requests, and
//! workflow dispatch/polling. All operations are exposed through the
//! [`RemoteOps`] trait so the orchestrator can be tested against mocks.

mod client;
mod types;
mod url;
#[cfg(test)]
mod url_test;

#[cfg(test)]
pub use client::MockRemoteOps;
pub use client::{HttpRemote, RemoteError, RemoteOps};
pub use types::{
    ContentEntry, PullRequest, RepoRef, RunConclusion, RunJob, RunStatus, WorkflowInputs,
    WorkflowRun,
};
pub use url::parse_repo_url;
