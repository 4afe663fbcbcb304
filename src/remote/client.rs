//! HTTP client for the hosting provider's JSON API.
//!
//! Each operation is a single request with no retries; failure semantics
//! (strict vs soft) are decided by the orchestrator, not here.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use miette::Diagnostic;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use super::types::{
    ContentEntry, PullRequest, RepoRef, RunJob, WorkflowInputs, WorkflowRun,
};
use super::url::parse_repo_url;

/// Branch the provider conventionally treats as primary.
const PRIMARY_BRANCH: &str = "main";

/// Workflow file driven by the remote sync path.
const SYNC_WORKFLOW: &str = "git-sync.yml";

const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Errors from the remote repository client.
///
/// [`RemoteError::Network`] covers transport failures; all other variants
/// are API-level rejections carrying the provider's message where one was
/// returned.
#[derive(Error, Diagnostic, Debug)]
pub enum RemoteError {
    #[error("Invalid repository URL: {0}")]
    #[diagnostic(
        code(vaultsync::remote::invalid_url),
        help("Use the form https://host/owner/repo")
    )]
    InvalidUrl(String),

    #[error("Authentication failed: invalid token or insufficient scopes")]
    #[diagnostic(code(vaultsync::remote::auth_failed))]
    AuthFailed,

    #[error("API rate limit exceeded or access denied")]
    #[diagnostic(code(vaultsync::remote::rate_limited))]
    RateLimited,

    #[error("Repository not found: {0}")]
    #[diagnostic(code(vaultsync::remote::not_found))]
    NotFound(String),

    #[error("API error ({status}): {message}")]
    #[diagnostic(code(vaultsync::remote::api))]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    #[diagnostic(code(vaultsync::remote::network))]
    Network(#[from] reqwest::Error),
}

/// Operations against the hosting API. Mocked in orchestrator tests.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RemoteOps {
    /// Resolve a repository web URL into a [`RepoRef`].
    ///
    /// Bootstraps the primary branch if the repository has none.
    async fn resolve_repo(&self, url: &str) -> Result<RepoRef, RemoteError>;

    /// List branch names. Advisory only: any failure yields an empty list.
    async fn list_branches(&self, repo: &RepoRef) -> Vec<String>;

    /// Get the head commit SHA of a branch ref.
    async fn get_ref(&self, repo: &RepoRef, branch: &str) -> Result<String, RemoteError>;

    /// Create a branch pointing at an existing commit.
    async fn create_branch(
        &self,
        repo: &RepoRef,
        name: &str,
        from_sha: &str,
    ) -> Result<(), RemoteError>;

    /// Move an existing branch ref to a commit.
    async fn update_ref(
        &self,
        repo: &RepoRef,
        branch: &str,
        sha: &str,
        force: bool,
    ) -> Result<(), RemoteError>;

    /// Upload one file to a branch via the contents endpoint.
    async fn put_file(
        &self,
        repo: &RepoRef,
        branch: &str,
        path: &str,
        bytes: &[u8],
        message: &str,
    ) -> Result<(), RemoteError>;

    /// List the root contents of a branch.
    async fn list_contents(
        &self,
        repo: &RepoRef,
        branch: &str,
    ) -> Result<Vec<ContentEntry>, RemoteError>;

    /// List open pull requests.
    async fn list_pulls(&self, repo: &RepoRef) -> Result<Vec<PullRequest>, RemoteError>;

    /// Squash-merge a pull request.
    async fn merge_pull(&self, repo: &RepoRef, number: u64) -> Result<(), RemoteError>;

    /// Trigger the sync workflow on a branch.
    async fn dispatch_workflow(
        &self,
        repo: &RepoRef,
        branch: &str,
        inputs: &WorkflowInputs,
    ) -> Result<(), RemoteError>;

    /// Fetch the most recent workflow run for a branch, if any.
    async fn latest_run(
        &self,
        repo: &RepoRef,
        branch: &str,
    ) -> Result<Option<WorkflowRun>, RemoteError>;

    /// Fetch the jobs of a workflow run, for failure diagnostics.
    async fn run_jobs(&self, repo: &RepoRef, run_id: u64) -> Result<Vec<RunJob>, RemoteError>;

    /// Download raw bytes from a content URL.
    async fn download(&self, url: &str) -> Result<Vec<u8>, RemoteError>;
}

#[derive(Deserialize)]
struct RepoInfo {
    default_branch: Option<String>,
}

#[derive(Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Deserialize)]
struct RefInfo {
    object: GitObject,
}

#[derive(Deserialize)]
struct BranchItem {
    name: String,
}

#[derive(Deserialize)]
struct RunsPage {
    #[serde(default)]
    workflow_runs: Vec<WorkflowRun>,
}

#[derive(Deserialize)]
struct JobsPage {
    #[serde(default)]
    jobs: Vec<RunJob>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Real implementation of [`RemoteOps`] over reqwest.
pub struct HttpRemote {
    api_base: String,
    token: String,
    client: Client,
}

impl HttpRemote {
    /// Create a client authenticating with the given bearer token.
    pub fn new(token: &str) -> Result<Self, RemoteError> {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Create a client against a custom API base URL (for testing).
    pub fn with_api_base(token: &str, api_base: &str) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .user_agent(concat!("vaultsync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
            client,
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.api_base, path))
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github.v3+json")
    }

    fn repo_path(repo: &RepoRef, rest: &str) -> String {
        format!("/repos/{}/{}{}", repo.owner, repo.repo, rest)
    }

    /// Extract the provider's `message` field from an error response.
    async fn api_message(response: Response) -> String {
        response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| "Unknown error".to_string())
    }

    async fn api_error(response: Response) -> RemoteError {
        let status = response.status().as_u16();
        RemoteError::Api {
            status,
            message: Self::api_message(response).await,
        }
    }

    /// Commit a placeholder file and mark the primary branch as default.
    ///
    /// Called at most once per `resolve_repo`; never recurses.
    async fn bootstrap_primary(&self, owner: &str, repo: &str) -> Result<(), RemoteError> {
        let body = json!({
            "message": "Initialize repository",
            "content": BASE64.encode("Initial commit"),
            "branch": PRIMARY_BRANCH,
        });
        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/repos/{owner}/{repo}/contents/.init"),
            )
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let response = self
            .request(reqwest::Method::PATCH, &format!("/repos/{owner}/{repo}"))
            .json(&json!({ "default_branch": PRIMARY_BRANCH }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteOps for HttpRemote {
    async fn resolve_repo(&self, url: &str) -> Result<RepoRef, RemoteError> {
        let (owner, repo) = parse_repo_url(url)?;

        let response = self
            .request(reqwest::Method::GET, &format!("/repos/{owner}/{repo}"))
            .send()
            .await?;
        match response.status().as_u16() {
            401 => return Err(RemoteError::AuthFailed),
            403 => return Err(RemoteError::RateLimited),
            code if code != 200 => {
                return Err(RemoteError::NotFound(Self::api_message(response).await));
            }
            _ => {}
        }
        let info: RepoInfo = response.json().await?;
        let mut default_branch = info
            .default_branch
            .unwrap_or_else(|| PRIMARY_BRANCH.to_string());

        let check = self
            .request(
                reqwest::Method::GET,
                &format!("/repos/{owner}/{repo}/branches/{PRIMARY_BRANCH}"),
            )
            .send()
            .await?;
        if !check.status().is_success() {
            self.bootstrap_primary(&owner, &repo).await?;
            default_branch = PRIMARY_BRANCH.to_string();
        }

        Ok(RepoRef {
            owner,
            repo,
            default_branch,
        })
    }

    async fn list_branches(&self, repo: &RepoRef) -> Vec<String> {
        let response = self
            .request(reqwest::Method::GET, &Self::repo_path(repo, "/branches"))
            .send()
            .await;
        let Ok(response) = response else {
            return Vec::new();
        };
        if !response.status().is_success() {
            return Vec::new();
        }
        response
            .json::<Vec<BranchItem>>()
            .await
            .map(|items| items.into_iter().map(|b| b.name).collect())
            .unwrap_or_default()
    }

    async fn get_ref(&self, repo: &RepoRef, branch: &str) -> Result<String, RemoteError> {
        let response = self
            .request(
                reqwest::Method::GET,
                &Self::repo_path(repo, &format!("/git/ref/heads/{branch}")),
            )
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(RemoteError::NotFound(Self::api_message(response).await));
        }
        let info: RefInfo = response.json().await?;
        Ok(info.object.sha)
    }

    async fn create_branch(
        &self,
        repo: &RepoRef,
        name: &str,
        from_sha: &str,
    ) -> Result<(), RemoteError> {
        let body = json!({
            "ref": format!("refs/heads/{name}"),
            "sha": from_sha,
        });
        let response = self
            .request(reqwest::Method::POST, &Self::repo_path(repo, "/git/refs"))
            .json(&body)
            .send()
            .await?;
        if response.status().as_u16() != 201 {
            return Err(Self::api_error(response).await);
        }
        Ok(())
    }

    async fn update_ref(
        &self,
        repo: &RepoRef,
        branch: &str,
        sha: &str,
        force: bool,
    ) -> Result<(), RemoteError> {
        let response = self
            .request(
                reqwest::Method::PATCH,
                &Self::repo_path(repo, &format!("/git/refs/heads/{branch}")),
            )
            .json(&json!({ "sha": sha, "force": force }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(())
    }

    async fn put_file(
        &self,
        repo: &RepoRef,
        branch: &str,
        path: &str,
        bytes: &[u8],
        message: &str,
    ) -> Result<(), RemoteError> {
        let body = json!({
            "message": message,
            "content": BASE64.encode(bytes),
            "branch": branch,
        });
        let response = self
            .request(
                reqwest::Method::PUT,
                &Self::repo_path(repo, &format!("/contents/{path}")),
            )
            .json(&body)
            .send()
            .await?;
        if !matches!(response.status().as_u16(), 200 | 201) {
            return Err(Self::api_error(response).await);
        }
        Ok(())
    }

    async fn list_contents(
        &self,
        repo: &RepoRef,
        branch: &str,
    ) -> Result<Vec<ContentEntry>, RemoteError> {
        let response = self
            .request(
                reqwest::Method::GET,
                &Self::repo_path(repo, &format!("/contents?ref={branch}")),
            )
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(response.json().await?)
    }

    async fn list_pulls(&self, repo: &RepoRef) -> Result<Vec<PullRequest>, RemoteError> {
        let response = self
            .request(reqwest::Method::GET, &Self::repo_path(repo, "/pulls"))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(response.json().await?)
    }

    async fn merge_pull(&self, repo: &RepoRef, number: u64) -> Result<(), RemoteError> {
        let response = self
            .request(
                reqwest::Method::PUT,
                &Self::repo_path(repo, &format!("/pulls/{number}/merge")),
            )
            .json(&json!({ "merge_method": "squash" }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(())
    }

    async fn dispatch_workflow(
        &self,
        repo: &RepoRef,
        branch: &str,
        inputs: &WorkflowInputs,
    ) -> Result<(), RemoteError> {
        let body = json!({ "ref": branch, "inputs": inputs });
        let response = self
            .request(
                reqwest::Method::POST,
                &Self::repo_path(
                    repo,
                    &format!("/actions/workflows/{SYNC_WORKFLOW}/dispatches"),
                ),
            )
            .json(&body)
            .send()
            .await?;
        if response.status().as_u16() != 204 {
            return Err(Self::api_error(response).await);
        }
        Ok(())
    }

    async fn latest_run(
        &self,
        repo: &RepoRef,
        branch: &str,
    ) -> Result<Option<WorkflowRun>, RemoteError> {
        let response = self
            .request(reqwest::Method::GET, &Self::repo_path(repo, "/actions/runs"))
            .query(&[("branch", branch)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        let page: RunsPage = response.json().await?;
        Ok(page.workflow_runs.into_iter().next())
    }

    async fn run_jobs(&self, repo: &RepoRef, run_id: u64) -> Result<Vec<RunJob>, RemoteError> {
        let response = self
            .request(
                reqwest::Method::GET,
                &Self::repo_path(repo, &format!("/actions/runs/{run_id}/jobs")),
            )
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        let page: JobsPage = response.json().await?;
        Ok(page.jobs)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, RemoteError> {
        // Download URLs are pre-signed; no auth header.
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(response.bytes().await?.to_vec())
    }
}
