//! End-to-end tests for the kg binary
//!
//! Each test runs the binary inside its own temp directory, which acts as the
//! working directory holding the template and receiving the manifests.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const TEMPLATE: &str = "blockscape-client.yaml";

fn kg(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kg").expect("kg binary should be built");
    // Keep the user's own kubegen config out of the run
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"));
    cmd
}

fn workspace(template: &str) -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp dir");
    fs::write(temp.path().join(TEMPLATE), template).expect("Failed to write template");
    temp
}

fn manifests(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with("blockscape-client-"))
        .collect();
    names.sort();
    names
}

// =============================================================================
// Expansion
// =============================================================================

#[test]
fn test_generates_numbered_manifests() {
    let temp = workspace("replicas: %%\nname: node-%%\n");

    kg(temp.path())
        .arg("3")
        .assert()
        .success()
        .stdout(predicate::str::contains("blockscape-client-2.yaml"))
        .stdout(predicate::str::contains("Generated"));

    assert_eq!(
        manifests(temp.path()),
        vec![
            "blockscape-client-0.yaml",
            "blockscape-client-1.yaml",
            "blockscape-client-2.yaml"
        ]
    );
    for i in 0..3 {
        let content = fs::read_to_string(temp.path().join(format!("blockscape-client-{i}.yaml"))).unwrap();
        assert_eq!(content, format!("replicas: {i}\nname: node-{i}\n"));
    }
}

#[test]
fn test_zero_count_succeeds_without_files() {
    let temp = workspace("replicas: %%\n");

    kg(temp.path()).arg("0").assert().success();

    assert!(manifests(temp.path()).is_empty());
}

#[test]
fn test_negative_count_generates_nothing() {
    let temp = workspace("replicas: %%\n");

    kg(temp.path()).arg("-1").assert().success();
    kg(temp.path()).args(["--", "-4"]).assert().success();

    assert!(manifests(temp.path()).is_empty());
}

#[test]
#[cfg(target_os = "linux")]
fn test_user_config_dir_is_consulted() {
    let temp = workspace("id: %%\n");
    let user_config = temp.path().join(".config").join("kubegen");
    fs::create_dir_all(&user_config).unwrap();
    fs::write(user_config.join("config.yml"), "jobs: [not, a, number]\n").unwrap();

    kg(temp.path())
        .arg("1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_template_without_placeholder_is_copied_verbatim() {
    let template = "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: static\n";
    let temp = workspace(template);

    kg(temp.path()).arg("2").assert().success();

    for name in manifests(temp.path()) {
        assert_eq!(fs::read_to_string(temp.path().join(name)).unwrap(), template);
    }
}

#[test]
fn test_placeholder_in_unrelated_value_is_replaced() {
    let temp = workspace("discount: 100%%\n");

    kg(temp.path()).arg("1").assert().success();

    let content = fs::read_to_string(temp.path().join("blockscape-client-0.yaml")).unwrap();
    assert_eq!(content, "discount: 1000\n");
}

#[test]
fn test_parallel_jobs_match_sequential_output() {
    let temp = workspace("id: %%\n");

    kg(temp.path()).args(["--jobs", "4", "--quiet", "12"]).assert().success();

    let names = manifests(temp.path());
    assert_eq!(names.len(), 12);
    for i in 0..12 {
        let content = fs::read_to_string(temp.path().join(format!("blockscape-client-{i}.yaml"))).unwrap();
        assert_eq!(content, format!("id: {i}\n"));
    }
}

#[test]
fn test_quiet_suppresses_per_file_lines() {
    let temp = workspace("id: %%\n");

    kg(temp.path())
        .args(["-q", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("blockscape-client-0.yaml").not());
}

#[test]
fn test_jobs_from_config_file() {
    let temp = workspace("id: %%\n");
    fs::write(temp.path().join("kg.yml"), "jobs: 3\nlog_level: error\n").unwrap();

    kg(temp.path()).args(["--config", "kg.yml", "5"]).assert().success();

    assert_eq!(manifests(temp.path()).len(), 5);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_missing_count_is_usage_error() {
    let temp = workspace("id: %%\n");

    kg(temp.path())
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("COUNT"));

    assert!(manifests(temp.path()).is_empty());
}

#[test]
fn test_non_numeric_count_is_usage_error() {
    let temp = workspace("id: %%\n");

    kg(temp.path()).arg("many").assert().failure().code(2);

    assert!(manifests(temp.path()).is_empty());
}

#[test]
fn test_missing_template_fails() {
    let temp = TempDir::new().unwrap();

    kg(temp.path())
        .arg("2")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(TEMPLATE));

    assert!(manifests(temp.path()).is_empty());
}

#[test]
fn test_write_failure_keeps_earlier_manifests() {
    let temp = workspace("id: %%\n");
    fs::create_dir(temp.path().join("blockscape-client-1.yaml")).unwrap();

    kg(temp.path())
        .arg("3")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("blockscape-client-1.yaml"));

    assert!(temp.path().join("blockscape-client-0.yaml").is_file());
    assert!(!temp.path().join("blockscape-client-2.yaml").exists());
}
