//! Validated input for one sync run.

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fallback commit message when none is supplied.
pub const DEFAULT_COMMIT_MESSAGE: &str = "Auto sync";

/// Fallback branch when none is supplied.
pub const DEFAULT_BRANCH: &str = "main";

/// Input validation failures. Non-retryable: the user must fix the input.
#[derive(Error, Diagnostic, Debug)]
pub enum ValidationError {
    #[error("Required field missing: {0}")]
    #[diagnostic(code(vaultsync::target::missing_field))]
    MissingField(&'static str),

    #[error("Invalid email address: {0}")]
    #[diagnostic(
        code(vaultsync::target::invalid_email),
        help("The git identity email must contain '@'")
    )]
    InvalidEmail(String),

    #[error("Vault directory does not exist: {0}")]
    #[diagnostic(code(vaultsync::target::vault_missing))]
    VaultMissing(PathBuf),

    #[error("Mirror directory does not exist: {0}")]
    #[diagnostic(code(vaultsync::target::mirror_missing))]
    MirrorMissing(PathBuf),

    #[error("Vault and mirror directories must be different")]
    #[diagnostic(code(vaultsync::target::same_directories))]
    SameDirectories,
}

/// Inputs for a sync run. Immutable for the run's duration.
///
/// `username` doubles as the bearer token on the remote path, matching
/// how the hosting provider authenticates personal access tokens.
#[derive(Debug, Clone, Default)]
pub struct SyncTarget {
    pub username: String,
    pub email: String,
    pub repo_url: String,
    pub vault_dir: PathBuf,
    /// Optional second working copy synced after the vault (local path only).
    pub mirror_dir: Option<PathBuf>,
    pub commit_message: Option<String>,
    pub branch: Option<String>,
}

impl SyncTarget {
    /// The commit message, or the fixed default.
    pub fn commit_message(&self) -> &str {
        match self.commit_message.as_deref() {
            Some(m) if !m.trim().is_empty() => m,
            _ => DEFAULT_COMMIT_MESSAGE,
        }
    }

    /// The target branch, or the fixed default.
    pub fn branch(&self) -> &str {
        match self.branch.as_deref() {
            Some(b) if !b.trim().is_empty() => b,
            _ => DEFAULT_BRANCH,
        }
    }

    /// Full validation for a sync run. No side effects.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::MissingField("username"));
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingField("email"));
        }
        if !self.email.contains('@') {
            return Err(ValidationError::InvalidEmail(self.email.clone()));
        }
        self.validate_dirs()
    }

    /// Lighter check for entry points that never touch the git identity
    /// (backup, restore): credentials and directories only.
    pub fn validate_for_backup(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::MissingField("username"));
        }
        self.validate_dirs()
    }

    /// Credentials needed just to talk to the hosting API.
    pub fn validate_credentials(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::MissingField("username"));
        }
        if self.repo_url.trim().is_empty() {
            return Err(ValidationError::MissingField("repository URL"));
        }
        Ok(())
    }

    fn validate_dirs(&self) -> Result<(), ValidationError> {
        if self.repo_url.trim().is_empty() {
            return Err(ValidationError::MissingField("repository URL"));
        }
        if self.vault_dir.as_os_str().is_empty() {
            return Err(ValidationError::MissingField("vault directory"));
        }
        if !self.vault_dir.is_dir() {
            return Err(ValidationError::VaultMissing(self.vault_dir.clone()));
        }
        if let Some(mirror) = &self.mirror_dir {
            if normalize(mirror) == normalize(&self.vault_dir) {
                return Err(ValidationError::SameDirectories);
            }
            if !mirror.is_dir() {
                return Err(ValidationError::MirrorMissing(mirror.clone()));
            }
        }
        Ok(())
    }

    /// The directories a local sync processes, vault first.
    pub fn directories(&self) -> Vec<&Path> {
        let mut dirs = vec![self.vault_dir.as_path()];
        if let Some(mirror) = &self.mirror_dir {
            dirs.push(mirror.as_path());
        }
        dirs
    }
}

/// Compare paths by their lexically-cleaned components.
fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}
