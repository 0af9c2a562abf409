//! End-to-end tests for the `ssprompt` binary.
//!
//! Nothing here touches the network: every command under test either
//! works on local files only or fails before the first request.

use std::fs;
use std::path::Path;

use assert_cmd::cargo;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command isolated from the user's config, token, and pip.
fn ssprompt(workdir: &Path) -> assert_cmd::Command {
    let config = workdir.join("ssprompt-test.toml");
    if !config.exists() {
        fs::write(&config, "").unwrap();
    }
    let mut cmd = cargo::cargo_bin_cmd!("ssprompt");
    cmd.current_dir(workdir)
        .env_remove("GITHUB_ACCESS_KEY")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .env("SSPROMPT__INSTALLER__PROGRAM", "ssprompt-test-missing-pip")
        .arg("--config")
        .arg(&config);
    cmd
}

fn project_dir(root: &TempDir, name: &str) -> std::path::PathBuf {
    let dir = root.path().join(name);
    fs::create_dir(&dir).unwrap();
    dir
}

#[test]
fn help_lists_subcommands() {
    let temp = TempDir::new().unwrap();
    ssprompt(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pull"))
        .stdout(predicate::str::contains("deps"))
        .stdout(predicate::str::contains("add"));
}

#[test]
fn version_flag() {
    let temp = TempDir::new().unwrap();
    ssprompt(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn pull_help_shows_retry_flags() {
    let temp = TempDir::new().unwrap();
    ssprompt(temp.path())
        .args(["pull", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--retries"))
        .stdout(predicate::str::contains("--no-install"));
}

#[test]
fn add_creates_descriptor_named_after_directory() {
    let temp = TempDir::new().unwrap();
    let dir = project_dir(&temp, "chatbot");

    ssprompt(&dir)
        .args(["add", "-t", "yaml", "-d", "openai@latest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 1 dependency entries"));

    let text = fs::read_to_string(dir.join("chatbot.yaml")).unwrap();
    assert!(text.contains("name: chatbot"));
    assert!(text.contains("yaml_prompt"));
    assert!(text.contains("openai"));
}

#[test]
fn add_twice_adds_nothing_new() {
    let temp = TempDir::new().unwrap();
    let dir = project_dir(&temp, "chatbot");

    ssprompt(&dir).args(["add", "-t", "python"]).assert().success();
    ssprompt(&dir)
        .args(["add", "-t", "python"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 0 dependency entries"));
}

#[test]
fn show_prints_meta_and_dependencies() {
    let temp = TempDir::new().unwrap();
    let dir = project_dir(&temp, "summariser");
    ssprompt(&dir)
        .args(["add", "-t", "json", "-d", "tiktoken@~0.4.0"])
        .assert()
        .success();

    ssprompt(&dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("summariser"))
        .stdout(predicate::str::contains("0.0.1"))
        .stdout(predicate::str::contains("tiktoken"));
}

#[test]
fn show_json_is_machine_readable() {
    let temp = TempDir::new().unwrap();
    let dir = project_dir(&temp, "demo");
    ssprompt(&dir).args(["add", "-t", "yaml"]).assert().success();

    let out = ssprompt(&dir)
        .args(["--output-format", "json", "show"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["meta"]["name"], "demo");
}

#[test]
fn deps_reports_missing_packages_without_failing() {
    let temp = TempDir::new().unwrap();
    let dir = project_dir(&temp, "demo");
    ssprompt(&dir)
        .args(["add", "-t", "yaml", "-d", "langchain@^0.0.266"])
        .assert()
        .success();

    ssprompt(&dir)
        .arg("deps")
        .assert()
        .success()
        .stdout(predicate::str::contains("langchain@^0.0.266 (not installed)"));
}

#[test]
fn deps_without_descriptor_is_not_found() {
    let temp = TempDir::new().unwrap();
    let dir = project_dir(&temp, "empty");

    ssprompt(&dir)
        .arg("deps")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("descriptor not found"));
}

#[test]
fn dependency_without_constraint_is_user_error() {
    let temp = TempDir::new().unwrap();
    let dir = project_dir(&temp, "demo");

    ssprompt(&dir)
        .args(["add", "-d", "langchain"])
        .assert()
        .code(2);
    assert!(!dir.join("demo.yaml").exists());
}

#[test]
fn malformed_constraint_is_configuration_error() {
    let temp = TempDir::new().unwrap();
    let dir = project_dir(&temp, "demo");

    ssprompt(&dir)
        .args(["add", "-d", "langchain@^1..2"])
        .assert()
        .code(4);
}

#[test]
fn pull_rejects_bad_project_name_before_network() {
    let temp = TempDir::new().unwrap();
    ssprompt(temp.path())
        .args(["pull", "not-a-repo"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("owner/repository"));
}

#[test]
fn bad_config_file_exits_four() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("ssprompt-test.toml");
    fs::write(&config, "[hub]\nplatform = \"sourceforge\"\n").unwrap();

    ssprompt(temp.path()).arg("deps").assert().code(4);
}

#[test]
fn config_get_reads_environment_override() {
    let temp = TempDir::new().unwrap();
    ssprompt(temp.path())
        .env("SSPROMPT__NETWORK__MAX_RETRIES", "9")
        .args(["config", "get", "network.max_retries"])
        .assert()
        .success()
        .stdout(predicate::str::diff("9\n"));
}

#[test]
fn completions_bash() {
    let temp = TempDir::new().unwrap();
    ssprompt(temp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ssprompt"));
}
