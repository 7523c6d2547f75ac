//! CLI integration tests using the REAL sip-composer binary

mod common;

use assert_cmd::Command;
use common::TestWorkspace;
use predicates::prelude::*;

// Temporary fix for deprecated cargo_bin - will be updated when build-dir issues are resolved
#[allow(deprecated)]
fn sip_cmd() -> Command {
    let mut cmd = Command::cargo_bin("sip-composer").unwrap();
    cmd.env_remove("SIP_PROJECT").env("RUST_LOG", "warn");
    cmd
}

#[test]
fn test_help_output() {
    sip_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("glob-pattern collectors"))
        .stdout(predicate::str::contains("compose"))
        .stdout(predicate::str::contains("describe"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_version_output() {
    sip_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sip-composer"))
        .stdout(predicate::str::contains("Build info"));
}

#[test]
fn test_compose_help_lists_options() {
    sip_cmd()
        .args(["compose", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--project"))
        .stdout(predicate::str::contains("--collectors-base"))
        .stdout(predicate::str::contains("--format"))
        .stdout(predicate::str::contains("EXAMPLES"));
}

#[test]
fn test_compose_requires_project() {
    sip_cmd()
        .arg("compose")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--project"));
}

#[test]
fn test_compose_missing_project_file() {
    let workspace = TestWorkspace::new();
    sip_cmd()
        .args(["compose", "--project"])
        .arg(workspace.path.join("absent.yaml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_compose_invalid_descriptor_file() {
    let workspace = TestWorkspace::new();
    workspace.write_file("eo.yaml", "identification: { descriptor_id: EO }\n");
    workspace.write_file("project.yaml", "descriptors:\n  files: [eo.yaml]\n");

    sip_cmd()
        .args(["compose", "--project"])
        .arg(workspace.project())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse configuration file"))
        .stderr(predicate::str::contains("eo.yaml"));
}

#[test]
fn test_project_from_environment() {
    let workspace = TestWorkspace::with_eo_project();
    sip_cmd()
        .arg("describe")
        .env("SIP_PROJECT", workspace.project())
        .assert()
        .success()
        .stdout(predicate::str::contains("Transfer Object Type: \"EO\""));
}

#[test]
fn test_describe_prints_descriptor_tree() {
    let workspace = TestWorkspace::with_eo_project();
    sip_cmd()
        .args(["describe", "--project"])
        .arg(workspace.project())
        .assert()
        .success()
        .stdout(predicate::str::contains("Descriptor tree:"))
        .stdout(predicate::str::contains("\"PRODUCT\""))
        .stdout(predicate::str::contains("\"MEASUREMENT\""))
        .stdout(predicate::str::contains("Content types:"))
        .stdout(predicate::str::contains("MAIN"));
}

#[test]
fn test_completions_bash() {
    sip_cmd()
        .args(["completions", "--shell", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sip-composer"));
}

#[test]
fn test_completions_unknown_shell() {
    sip_cmd()
        .args(["completions", "--shell", "tcsh"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown shell: tcsh"));
}
