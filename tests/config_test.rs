// tests/config_test.rs
use mono_release::config::{load_config, Config, CONFIG_FILE_NAME};
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_load_default_config() {
    let config = Config::default();
    assert_eq!(config.tag_scheme, "release");
    assert_eq!(config.remote, "origin");
    assert_eq!(config.branch, "main");
    assert_eq!(config.packages.descriptor, "pyproject.toml");
    assert_eq!(config.packages.version_constant, "__version__");
    assert_eq!(config.conventional_commits.minor_types, vec!["feat"]);
    assert_eq!(config.conventional_commits.patch_types, vec!["fix", "perf"]);
}

#[test]
fn test_load_from_explicit_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
tag_scheme = "better-mcps"
branch = "trunk"

[packages]
source_dir = "lib"

[conventional_commits]
patch_types = ["fix", "perf", "refactor"]
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let repo_root = TempDir::new().unwrap();
    let config = load_config(Some(temp_file.path()), repo_root.path()).unwrap();
    assert_eq!(config.tag_scheme, "better-mcps");
    assert_eq!(config.branch, "trunk");
    assert_eq!(config.remote, "origin");
    assert_eq!(config.packages.source_dir, "lib");
    assert_eq!(config.packages.descriptor, "pyproject.toml");
    assert!(config
        .conventional_commits
        .patch_types
        .contains(&"refactor".to_string()));
}

#[test]
fn test_repository_config_file_is_found() {
    let repo_root = TempDir::new().unwrap();
    fs::write(
        repo_root.path().join(CONFIG_FILE_NAME),
        "remote = \"upstream\"\n",
    )
    .unwrap();

    let config = load_config(None, repo_root.path()).unwrap();
    assert_eq!(config.remote, "upstream");
}

#[test]
fn test_explicit_file_wins_over_repository_file() {
    let repo_root = TempDir::new().unwrap();
    fs::write(
        repo_root.path().join(CONFIG_FILE_NAME),
        "remote = \"upstream\"\n",
    )
    .unwrap();
    let explicit = repo_root.path().join("other.toml");
    fs::write(&explicit, "remote = \"fork\"\n").unwrap();

    let config = load_config(Some(&explicit), repo_root.path()).unwrap();
    assert_eq!(config.remote, "fork");
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let repo_root = TempDir::new().unwrap();
    let missing = repo_root.path().join("nope.toml");
    assert!(load_config(Some(&missing), repo_root.path()).is_err());
}

#[test]
fn test_invalid_file_is_an_error() {
    let repo_root = TempDir::new().unwrap();
    fs::write(
        repo_root.path().join(CONFIG_FILE_NAME),
        "tag_scheme = \"\"\n",
    )
    .unwrap();
    assert!(load_config(None, repo_root.path()).is_err());
}
