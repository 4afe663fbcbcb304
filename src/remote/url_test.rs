use super::url::parse_repo_url;

#[test]
fn test_parse_basic_https_url() {
    let (owner, repo) = parse_repo_url("https://github.com/octo/vault").unwrap();
    assert_eq!(owner, "octo");
    assert_eq!(repo, "vault");
}

#[test]
fn test_parse_strips_trailing_slash_and_git_suffix() {
    let (owner, repo) = parse_repo_url("https://github.com/octo/vault.git/").unwrap();
    assert_eq!(owner, "octo");
    assert_eq!(repo, "vault");

    let (owner, repo) = parse_repo_url("  https://github.com/octo/vault.git  ").unwrap();
    assert_eq!(owner, "octo");
    assert_eq!(repo, "vault");
}

#[test]
fn test_parse_accepts_http_scheme() {
    let (owner, repo) = parse_repo_url("http://git.example.org/me/notes").unwrap();
    assert_eq!(owner, "me");
    assert_eq!(repo, "notes");
}

#[test]
fn test_parse_rejects_extra_path_segments() {
    assert!(parse_repo_url("https://github.com/octo/vault/tree/main").is_err());
}

#[test]
fn test_parse_rejects_missing_parts() {
    assert!(parse_repo_url("https://github.com/octo").is_err());
    assert!(parse_repo_url("https://github.com/").is_err());
    assert!(parse_repo_url("https://").is_err());
    assert!(parse_repo_url("").is_err());
}

#[test]
fn test_parse_rejects_other_schemes() {
    assert!(parse_repo_url("git@github.com:octo/vault.git").is_err());
    assert!(parse_repo_url("ssh://github.com/octo/vault").is_err());
}
