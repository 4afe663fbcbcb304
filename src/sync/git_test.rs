use crate::sync::git::*;
use mockall::predicate::*;
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{ExitStatus, Output};

/// Helper to create a mock Output
fn mock_output(code: i32, stdout: &str, stderr: &str) -> Output {
    Output {
        status: ExitStatus::from_raw(code),
        stdout: stdout.as_bytes().to_vec(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

#[test]
fn test_mock_config_user_success() {
    let mut mock = MockGitOps::new();

    mock.expect_config_user()
        .with(eq(Path::new("/tmp/vault")), eq("octo"), eq("octo@example.com"))
        .times(1)
        .returning(|_, _, _| Ok(mock_output(0, "", "")));

    let result = mock.config_user(Path::new("/tmp/vault"), "octo", "octo@example.com");
    assert!(result.is_ok());
}

#[test]
fn test_mock_status_clean() {
    let mut mock = MockGitOps::new();

    mock.expect_status_porcelain()
        .with(eq(Path::new("/tmp/vault")))
        .times(1)
        .returning(|_| Ok(mock_output(0, "", "")));

    let result = mock.status_porcelain(Path::new("/tmp/vault"));
    assert!(result.is_ok());
    assert!(result.unwrap().stdout.is_empty());
}

#[test]
fn test_mock_status_dirty() {
    let mut mock = MockGitOps::new();

    mock.expect_status_porcelain()
        .with(eq(Path::new("/tmp/vault")))
        .times(1)
        .returning(|_| Ok(mock_output(0, " M note.md\n?? daily/today.md\n", "")));

    let result = mock.status_porcelain(Path::new("/tmp/vault"));
    let status = String::from_utf8_lossy(&result.unwrap().stdout).to_string();
    assert!(status.contains("M note.md"));
    assert!(status.contains("?? daily/today.md"));
}

#[test]
fn test_mock_merge_plain_rejects_unrelated_histories() {
    let mut mock = MockGitOps::new();

    mock.expect_merge()
        .with(eq(Path::new("/tmp/vault")), eq("origin/main"), eq(false))
        .times(1)
        .returning(|_, _, _| {
            Err(GitError::NonZeroExit {
                code: 128,
                output: "fatal: refusing to merge unrelated histories\n".to_string(),
            })
        });
    mock.expect_merge()
        .with(eq(Path::new("/tmp/vault")), eq("origin/main"), eq(true))
        .times(1)
        .returning(|_, _, _| Ok(mock_output(0, "Merge made by the 'ort' strategy.\n", "")));

    let plain = mock.merge(Path::new("/tmp/vault"), "origin/main", false);
    assert!(plain.is_err());

    let unrelated = mock.merge(Path::new("/tmp/vault"), "origin/main", true);
    assert!(unrelated.is_ok());
}

#[test]
fn test_mock_commit_success() {
    let mut mock = MockGitOps::new();

    mock.expect_commit()
        .with(eq(Path::new("/tmp/vault")), eq("Auto sync"))
        .times(1)
        .returning(|_, _| {
            Ok(mock_output(
                0,
                "[main abc1234] Auto sync\n 2 files changed, 10 insertions(+)\n",
                "",
            ))
        });

    let result = mock.commit(Path::new("/tmp/vault"), "Auto sync");
    assert!(result.is_ok());
}

#[test]
fn test_mock_push_network_failure() {
    let mut mock = MockGitOps::new();

    mock.expect_push()
        .with(eq(Path::new("/tmp/vault")), eq("origin"), eq("main"))
        .times(1)
        .returning(|_, _, _| {
            Err(GitError::NonZeroExit {
                code: 128,
                output: "fatal: unable to access 'https://...': Could not resolve host\n"
                    .to_string(),
            })
        });

    let result = mock.push(Path::new("/tmp/vault"), "origin", "main");
    assert!(result.is_err());

    if let Err(GitError::NonZeroExit { code, output }) = result {
        assert_eq!(code, 128);
        assert!(output.contains("Could not resolve host"));
    } else {
        panic!("Expected NonZeroExit error");
    }
}

#[test]
fn test_mock_git_not_found() {
    let mut mock = MockGitOps::new();

    mock.expect_fetch()
        .with(eq(Path::new("/tmp/vault")), eq("origin"))
        .times(1)
        .returning(|_, _| Err(GitError::GitNotFound));

    let result = mock.fetch(Path::new("/tmp/vault"), "origin");
    assert!(matches!(result.unwrap_err(), GitError::GitNotFound));
}
