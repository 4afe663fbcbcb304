//! Sync module - vault synchronization against a remote repository.
//!
//! Two interchangeable paths merge a local folder into a shared remote
//! history: driving the local git tool directly, or uploading through
//! the hosting API and dispatching a remote workflow. The
//! [`SyncManager`] sequences either path and returns an ordered run log
//! plus a terminal outcome.

mod archive;
mod backup;
mod git;
#[cfg(test)]
mod git_test;
mod local;
mod log;
mod manager;
#[cfg(test)]
mod manager_test;
mod paths;
mod settings;
mod target;
mod upload;

pub use archive::{ArchiveError, ROOT_LABEL, create_archive, extract_archive};
pub use backup::{BACKUP_BRANCH, BACKUP_PREFIX, PREV_BACKUP_BRANCH};
#[cfg(test)]
pub use git::MockGitOps;
pub use git::{GitError, GitOps, RealGit};
pub use log::{Level, LogEntry, Outcome, SyncLog, SyncReport};
pub use manager::{POLL_ATTEMPTS, POLL_INTERVAL, SyncError, SyncManager};
pub use paths::{get_data_dir, get_settings_path};
pub use settings::{Settings, SettingsError};
pub use target::{DEFAULT_BRANCH, DEFAULT_COMMIT_MESSAGE, SyncTarget, ValidationError};
pub use upload::{FileStatus, UploadOutcome, UploadSummary};
