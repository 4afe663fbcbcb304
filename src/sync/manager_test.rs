use crate::remote::{
    MockRemoteOps, RemoteError, RepoRef, RunConclusion, RunStatus, WorkflowRun,
};
use crate::sync::git::{GitError, MockGitOps};
use crate::sync::log::{Level, Outcome};
use crate::sync::manager::*;
use std::fs;
use std::io::Write;
use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Output};
use std::time::Duration;
use tempfile::TempDir;

fn mock_output(code: i32, stdout: &str, stderr: &str) -> Output {
    Output {
        status: ExitStatus::from_raw(code),
        stdout: stdout.as_bytes().to_vec(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

fn repo_ref() -> RepoRef {
    RepoRef {
        owner: "octo".to_string(),
        repo: "vault".to_string(),
        default_branch: "main".to_string(),
    }
}

fn target(vault: &TempDir) -> crate::sync::target::SyncTarget {
    crate::sync::target::SyncTarget {
        username: "octo".to_string(),
        email: "octo@example.com".to_string(),
        repo_url: "https://github.com/octo/vault".to_string(),
        vault_dir: vault.path().to_path_buf(),
        mirror_dir: None,
        commit_message: None,
        branch: None,
    }
}

fn manager(
    git: MockGitOps,
    remote: MockRemoteOps,
) -> SyncManager<MockGitOps, MockRemoteOps> {
    SyncManager::with_polling(git, remote, Duration::ZERO, POLL_ATTEMPTS)
}

fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    let mut writer = zip::ZipWriter::new(&mut cursor);
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
    cursor.into_inner()
}

#[tokio::test]
async fn test_validation_failure_performs_no_side_effects() {
    let vault = TempDir::new().unwrap();
    let mut bad = target(&vault);
    bad.email = "no-at-sign".to_string();

    // Unconfigured mocks panic on any call, so reaching a backend at all
    // would fail this test.
    let manager = manager(MockGitOps::new(), MockRemoteOps::new());
    let report = manager.sync_remote(&bad).await;

    assert_eq!(report.outcome, Outcome::Failed);
    assert_eq!(report.log.entries().len(), 1);
    assert_eq!(report.log.last().unwrap().level, Level::Error);
}

#[tokio::test]
async fn test_sync_remote_end_to_end_happy_path() {
    let vault = TempDir::new().unwrap();
    fs::write(vault.path().join("note.md"), "hello").unwrap();

    let mut remote = MockRemoteOps::new();
    remote
        .expect_resolve_repo()
        .times(1)
        .returning(|_| Ok(repo_ref()));
    // "main" already exists and is reused.
    remote
        .expect_get_ref()
        .withf(|_, branch| branch == "main")
        .times(1)
        .returning(|_, _| Ok("head123".to_string()));
    remote
        .expect_put_file()
        .withf(|_, branch, path, _, _| branch == "main" && path == "note.md")
        .times(1)
        .returning(|_, _, _, _, _| Ok(()));
    remote
        .expect_dispatch_workflow()
        .withf(|_, branch, inputs| {
            branch == "main"
                && inputs.username == "octo"
                && inputs.commit_message == "Auto sync"
                && inputs.default_branch == "main"
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    remote.expect_latest_run().times(1).returning(|_, _| {
        Ok(Some(WorkflowRun {
            id: 1,
            status: RunStatus::Completed,
            conclusion: Some(RunConclusion::Success),
        }))
    });
    remote.expect_list_pulls().times(1).returning(|_| Ok(vec![]));

    let manager = manager(MockGitOps::new(), remote);
    let report = manager.sync_remote(&target(&vault)).await;

    assert_eq!(report.outcome, Outcome::Succeeded);
    let last = report.log.last().unwrap();
    assert_eq!(last.level, Level::Success);
    assert!(last.message.contains("Workflow completed successfully"));
}

#[tokio::test]
async fn test_sync_remote_empty_vault_is_fatal() {
    let vault = TempDir::new().unwrap();

    let mut remote = MockRemoteOps::new();
    remote
        .expect_resolve_repo()
        .times(1)
        .returning(|_| Ok(repo_ref()));

    let manager = manager(MockGitOps::new(), remote);
    let report = manager.sync_remote(&target(&vault)).await;

    assert_eq!(report.outcome, Outcome::Failed);
    assert!(report.log.last().unwrap().message.contains("No files found"));
}

#[tokio::test]
async fn test_sync_remote_partial_upload_failure_blocks_workflow() {
    let vault = TempDir::new().unwrap();
    fs::write(vault.path().join("a.md"), "a").unwrap();
    fs::write(vault.path().join("b.md"), "b").unwrap();
    fs::write(vault.path().join("c.md"), "c").unwrap();

    let mut remote = MockRemoteOps::new();
    remote
        .expect_resolve_repo()
        .times(1)
        .returning(|_| Ok(repo_ref()));
    remote
        .expect_get_ref()
        .times(1)
        .returning(|_, _| Ok("head123".to_string()));
    remote
        .expect_put_file()
        .withf(|_, _, path, _, _| path == "b.md")
        .times(1)
        .returning(|_, _, _, _, _| {
            Err(RemoteError::Api {
                status: 422,
                message: "too large".to_string(),
            })
        });
    // The two other uploads are still attempted: no early abort.
    remote
        .expect_put_file()
        .withf(|_, _, path, _, _| path != "b.md")
        .times(2)
        .returning(|_, _, _, _, _| Ok(()));
    remote.expect_dispatch_workflow().times(0);

    let manager = manager(MockGitOps::new(), remote);
    let report = manager.sync_remote(&target(&vault)).await;

    assert_eq!(report.outcome, Outcome::Failed);
    assert!(
        report
            .log
            .last()
            .unwrap()
            .message
            .contains("1 of 3 files failed")
    );
}

#[tokio::test]
async fn test_sync_remote_poll_budget_exhaustion_is_timed_out() {
    let vault = TempDir::new().unwrap();
    fs::write(vault.path().join("note.md"), "hello").unwrap();

    let mut remote = MockRemoteOps::new();
    remote
        .expect_resolve_repo()
        .times(1)
        .returning(|_| Ok(repo_ref()));
    remote
        .expect_get_ref()
        .times(1)
        .returning(|_, _| Ok("head123".to_string()));
    remote
        .expect_put_file()
        .times(1)
        .returning(|_, _, _, _, _| Ok(()));
    remote
        .expect_dispatch_workflow()
        .times(1)
        .returning(|_, _, _| Ok(()));
    remote.expect_latest_run().times(12).returning(|_, _| {
        Ok(Some(WorkflowRun {
            id: 1,
            status: RunStatus::InProgress,
            conclusion: None,
        }))
    });
    // PR auto-merge still runs after a timeout.
    remote.expect_list_pulls().times(1).returning(|_| Ok(vec![]));

    let manager = manager(MockGitOps::new(), remote);
    let report = manager.sync_remote(&target(&vault)).await;

    assert_eq!(report.outcome, Outcome::TimedOut);
}

#[tokio::test]
async fn test_first_backup_creates_branch_from_default_head() {
    let vault = TempDir::new().unwrap();
    fs::write(vault.path().join("note.md"), "hello").unwrap();

    let mut remote = MockRemoteOps::new();
    remote
        .expect_resolve_repo()
        .times(1)
        .returning(|_| Ok(repo_ref()));
    remote
        .expect_get_ref()
        .withf(|_, branch| branch == "backup")
        .times(1)
        .returning(|_, _| Err(RemoteError::NotFound("Not Found".to_string())));
    remote
        .expect_get_ref()
        .withf(|_, branch| branch == "main")
        .times(1)
        .returning(|_, _| Ok("base123".to_string()));
    remote
        .expect_create_branch()
        .withf(|_, name, sha| name == "backup" && sha == "base123")
        .times(1)
        .returning(|_, _, _| Ok(()));
    remote
        .expect_put_file()
        .withf(|_, branch, path, _, _| {
            branch == "backup" && path.starts_with("backup_") && path.ends_with(".zip")
        })
        .times(1)
        .returning(|_, _, _, _, _| Ok(()));
    remote.expect_list_pulls().times(1).returning(|_| Ok(vec![]));

    let manager = manager(MockGitOps::new(), remote);
    let report = manager.backup_remote(&target(&vault)).await;

    assert_eq!(report.outcome, Outcome::Succeeded);
}

#[tokio::test]
async fn test_second_backup_rotates_head_into_previous_branch() {
    let vault = TempDir::new().unwrap();
    fs::write(vault.path().join("note.md"), "hello").unwrap();

    let mut remote = MockRemoteOps::new();
    remote
        .expect_resolve_repo()
        .times(1)
        .returning(|_| Ok(repo_ref()));
    remote
        .expect_get_ref()
        .withf(|_, branch| branch == "backup")
        .times(1)
        .returning(|_, _| Ok("firsthead".to_string()));
    // No previous-backup branch yet: the old head is parked there.
    remote
        .expect_get_ref()
        .withf(|_, branch| branch == "backup-prev")
        .times(1)
        .returning(|_, _| Err(RemoteError::NotFound("Not Found".to_string())));
    remote
        .expect_create_branch()
        .withf(|_, name, sha| name == "backup-prev" && sha == "firsthead")
        .times(1)
        .returning(|_, _, _| Ok(()));
    remote
        .expect_put_file()
        .withf(|_, branch, path, _, _| branch == "backup" && path.starts_with("backup_"))
        .times(1)
        .returning(|_, _, _, _, _| Ok(()));
    remote.expect_list_pulls().times(1).returning(|_| Ok(vec![]));

    let manager = manager(MockGitOps::new(), remote);
    let report = manager.backup_remote(&target(&vault)).await;

    assert_eq!(report.outcome, Outcome::Succeeded);
}

#[tokio::test]
async fn test_third_backup_force_updates_previous_branch() {
    let vault = TempDir::new().unwrap();
    fs::write(vault.path().join("note.md"), "hello").unwrap();

    let mut remote = MockRemoteOps::new();
    remote
        .expect_resolve_repo()
        .times(1)
        .returning(|_| Ok(repo_ref()));
    remote
        .expect_get_ref()
        .withf(|_, branch| branch == "backup")
        .times(1)
        .returning(|_, _| Ok("secondhead".to_string()));
    remote
        .expect_get_ref()
        .withf(|_, branch| branch == "backup-prev")
        .times(1)
        .returning(|_, _| Ok("firsthead".to_string()));
    remote
        .expect_update_ref()
        .withf(|_, branch, sha, force| branch == "backup-prev" && sha == "secondhead" && *force)
        .times(1)
        .returning(|_, _, _, _| Ok(()));
    remote
        .expect_put_file()
        .times(1)
        .returning(|_, _, _, _, _| Ok(()));
    remote.expect_list_pulls().times(1).returning(|_| Ok(vec![]));

    let manager = manager(MockGitOps::new(), remote);
    let report = manager.backup_remote(&target(&vault)).await;

    assert_eq!(report.outcome, Outcome::Succeeded);
}

#[tokio::test]
async fn test_restore_selects_lexicographically_greatest_artifact() {
    let vault = TempDir::new().unwrap();
    fs::write(vault.path().join("old.md"), "stale").unwrap();

    // Name sort doubles as time sort only while clocks agree; preserved
    // as documented behavior rather than corrected here.
    let mut remote = MockRemoteOps::new();
    remote
        .expect_resolve_repo()
        .times(1)
        .returning(|_| Ok(repo_ref()));
    remote.expect_list_contents().times(1).returning(|_, _| {
        Ok(vec![
            crate::remote::ContentEntry {
                name: "backup_20240101_000000.zip".to_string(),
                download_url: Some("https://example.com/jan.zip".to_string()),
            },
            crate::remote::ContentEntry {
                name: "backup_20240601_000000.zip".to_string(),
                download_url: Some("https://example.com/june.zip".to_string()),
            },
        ])
    });
    remote
        .expect_download()
        .withf(|url| url == "https://example.com/june.zip")
        .times(1)
        .returning(|_| Ok(zip_bytes(&[("vault/june.md", "june")])));

    let manager = manager(MockGitOps::new(), remote);
    let report = manager.restore_remote(&target(&vault)).await;

    assert_eq!(report.outcome, Outcome::Succeeded);
    // The directory was replaced wholesale with the artifact contents.
    assert!(!vault.path().join("old.md").exists());
    assert_eq!(
        fs::read_to_string(vault.path().join("vault/june.md")).unwrap(),
        "june"
    );
}

#[tokio::test]
async fn test_restore_with_no_artifacts_fails_clearly() {
    let vault = TempDir::new().unwrap();

    let mut remote = MockRemoteOps::new();
    remote
        .expect_resolve_repo()
        .times(1)
        .returning(|_| Ok(repo_ref()));
    remote
        .expect_list_contents()
        .times(1)
        .returning(|_, _| Ok(vec![]));

    let manager = manager(MockGitOps::new(), remote);
    let report = manager.restore_remote(&target(&vault)).await;

    assert_eq!(report.outcome, Outcome::Failed);
    assert!(
        report
            .log
            .last()
            .unwrap()
            .message
            .contains("No backup artifact found")
    );
}

#[tokio::test]
async fn test_fetch_branches_listing_is_soft() {
    let vault = TempDir::new().unwrap();

    let mut remote = MockRemoteOps::new();
    remote
        .expect_resolve_repo()
        .times(1)
        .returning(|_| Ok(repo_ref()));
    remote
        .expect_list_branches()
        .times(1)
        .returning(|_| Vec::new());

    let manager = manager(MockGitOps::new(), remote);
    let report = manager.fetch_branches(&target(&vault)).await;

    // An empty listing is advisory, not a failure.
    assert_eq!(report.outcome, Outcome::Succeeded);
    assert!(report.log.last().unwrap().message.contains("No branches found"));
}

#[tokio::test]
async fn test_fetch_branches_resolve_failure_is_fatal() {
    let vault = TempDir::new().unwrap();

    let mut remote = MockRemoteOps::new();
    remote
        .expect_resolve_repo()
        .times(1)
        .returning(|_| Err(RemoteError::AuthFailed));

    let manager = manager(MockGitOps::new(), remote);
    let report = manager.fetch_branches(&target(&vault)).await;

    assert_eq!(report.outcome, Outcome::Failed);
}

#[tokio::test]
async fn test_sync_local_processes_mirror_after_vault_failure() {
    let vault = TempDir::new().unwrap();
    let mirror = TempDir::new().unwrap();
    let mut t = target(&vault);
    t.mirror_dir = Some(mirror.path().to_path_buf());

    let vault_dir = vault.path().to_path_buf();
    let mut git = MockGitOps::new();
    // The vault's identity step fails; the mirror still gets a full run.
    git.expect_config_user()
        .times(2)
        .returning(move |path, _, _| {
            if path == vault_dir {
                Err(GitError::NonZeroExit {
                    code: 1,
                    output: "could not lock config file".to_string(),
                })
            } else {
                Ok(mock_output(0, "", ""))
            }
        });
    git.expect_remote_get_url()
        .times(1)
        .returning(|_, _| Err(GitError::GitNotFound));
    git.expect_add_remote()
        .times(1)
        .returning(|_, _, _| Ok(mock_output(0, "", "")));
    git.expect_fetch()
        .times(1)
        .returning(|_, _| Ok(mock_output(0, "", "")));
    git.expect_status_porcelain()
        .times(2)
        .returning(|_| Ok(mock_output(0, "", "")));
    git.expect_merge()
        .times(1)
        .returning(|_, _, _| Ok(mock_output(0, "", "")));
    git.expect_push()
        .times(1)
        .returning(|_, _, _| Ok(mock_output(0, "", "")));

    let manager = manager(git, MockRemoteOps::new());
    let report = manager.sync_local(&t).await;

    // The mirror succeeded but the run as a whole is failed.
    assert_eq!(report.outcome, Outcome::Failed);
}

#[tokio::test]
async fn test_sync_local_happy_path_ends_with_success() {
    let vault = TempDir::new().unwrap();

    let mut git = MockGitOps::new();
    git.expect_config_user()
        .times(1)
        .returning(|_, _, _| Ok(mock_output(0, "", "")));
    git.expect_remote_get_url()
        .times(1)
        .returning(|_, _| Err(GitError::GitNotFound));
    git.expect_add_remote()
        .times(1)
        .returning(|_, _, _| Ok(mock_output(0, "", "")));
    git.expect_fetch()
        .times(1)
        .returning(|_, _| Ok(mock_output(0, "", "")));
    git.expect_status_porcelain()
        .times(2)
        .returning(|_| Ok(mock_output(0, "", "")));
    git.expect_merge()
        .times(1)
        .returning(|_, _, _| Ok(mock_output(0, "", "")));
    git.expect_push()
        .times(1)
        .returning(|_, _, _| Ok(mock_output(0, "", "")));

    let manager = manager(git, MockRemoteOps::new());
    let report = manager.sync_local(&target(&vault)).await;

    assert_eq!(report.outcome, Outcome::Succeeded);
    assert!(report.log.last().unwrap().message.contains("All operations completed"));
}
