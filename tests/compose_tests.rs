//! End-to-end composition tests through the compose command

mod common;

use assert_cmd::Command;
use common::TestWorkspace;
use predicates::prelude::*;

#[allow(deprecated)]
fn sip_cmd() -> Command {
    let mut cmd = Command::cargo_bin("sip-composer").unwrap();
    cmd.env_remove("SIP_PROJECT").env("RUST_LOG", "warn");
    cmd
}

fn compose_json(workspace: &TestWorkspace) -> serde_json::Value {
    let output = sip_cmd()
        .args(["compose", "--format", "json", "--project"])
        .arg(workspace.project())
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_compose_text_tree() {
    let workspace = TestWorkspace::with_eo_project();
    sip_cmd()
        .args(["compose", "--project"])
        .arg(workspace.project())
        .assert()
        .success()
        .stdout(predicate::str::contains("PROJ-SIP-0001 [MAIN]"))
        .stdout(predicate::str::contains("EO-0001 (EO)"))
        .stdout(predicate::str::contains("CU-PRODUCT-0001 (PRODUCT) P1"))
        .stdout(predicate::str::contains("CU-PRODUCT-0002 (PRODUCT) P2"))
        .stdout(predicate::str::contains("DO-MEASUREMENT-0001"))
        .stderr(predicate::str::contains(
            "1 package(s), 1 transfer object(s), 2 file(s), 0 warning(s), 0 error(s)",
        ));
}

#[test]
fn test_compose_json_document() {
    let workspace = TestWorkspace::with_eo_project();
    let json = compose_json(&workspace);

    let packages = json["packages"].as_array().unwrap();
    assert_eq!(packages.len(), 1);
    assert_eq!(packages[0]["identifier"], "PROJ-SIP-0001");

    let root = &packages[0]["transfer_objects"][0];
    assert_eq!(root["descriptor_id"], "EO");
    assert_eq!(root["last_in_type"], true);

    let products = root["children"].as_array().unwrap();
    assert_eq!(products.len(), 2);
    for product in products {
        let data = &product["children"][0];
        assert_eq!(data["kind"], "data_object");
        assert_eq!(data["files"].as_array().unwrap().len(), 1);
    }
    assert!(json["diagnostics"].as_array().unwrap().is_empty());
}

#[test]
fn test_file_occurrence_rolls_over_containers() {
    let workspace = TestWorkspace::with_eo_project();
    workspace.write_file(
        "eo.yaml",
        "kind: type_descriptor
identification: { descriptor_id: EO }
description:
  title: Earth observation
  occurrence: { min_occurrence: 1 }
group_types:
  - id: PRODUCT
    description: One acquisition
    data_object_types:
      - id: MEASUREMENT
        description: Raw measurement
        file_occurrence: { max_occurrence: 2 }
",
    );
    for name in ["a", "b", "c", "d", "e"] {
        workspace.write_file(&format!("data/P1/{name}.dat"), name);
    }

    let json = compose_json(&workspace);
    let products = json["packages"][0]["transfer_objects"][0]["children"]
        .as_array()
        .unwrap()
        .clone();
    let first = products
        .iter()
        .find(|p| p["package_path"].as_str().is_some_and(|path| path.contains("P1")))
        .unwrap();

    // m.dat plus five new files, two per container
    let containers = first["children"].as_array().unwrap();
    assert_eq!(containers.len(), 3);
    let counts: Vec<usize> = containers
        .iter()
        .map(|c| c["files"].as_array().unwrap().len())
        .collect();
    assert_eq!(counts, vec![2, 2, 2]);
}

#[test]
fn test_constraint_violation_does_not_fail() {
    let workspace = TestWorkspace::with_eo_project();
    workspace.write_file(
        "eo.yaml",
        &common::EO_DESCRIPTOR.replace("{ min_occurrence: 1 }", "{ min_occurrence: 5 }"),
    );

    sip_cmd()
        .args(["compose", "--project"])
        .arg(workspace.project())
        .assert()
        .success()
        .stdout(predicate::str::contains("Diagnostics:"))
        .stdout(predicate::str::contains("a minimum of 5 required"))
        .stderr(predicate::str::contains("1 warning(s)"));
}

#[test]
fn test_collectors_base_override() {
    let workspace = TestWorkspace::with_eo_project();
    workspace.write_file("other/P9/x.dat", "x");
    workspace.write_file("other/P9/y.dat", "y");

    sip_cmd()
        .args(["compose", "--project"])
        .arg(workspace.project())
        .arg("--collectors-base")
        .arg(workspace.path.join("other"))
        .assert()
        .success()
        .stdout(predicate::str::contains("CU-PRODUCT-0001 (PRODUCT) P9"))
        .stdout(predicate::str::contains("CU-PRODUCT-0002").not())
        .stderr(predicate::str::contains("2 file(s)"));
}

#[test]
fn test_output_file_is_written() {
    let workspace = TestWorkspace::with_eo_project();
    sip_cmd()
        .args(["compose", "--format", "json", "--output"])
        .arg(workspace.path.join("sips.json"))
        .arg("--project")
        .arg(workspace.project())
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Composition written to"));

    let json: serde_json::Value = serde_json::from_str(&workspace.read_file("sips.json")).unwrap();
    assert_eq!(json["packages"][0]["identifier"], "PROJ-SIP-0001");
}

#[test]
fn test_output_into_missing_directory_fails() {
    let workspace = TestWorkspace::with_eo_project();
    sip_cmd()
        .args(["compose", "--output"])
        .arg(workspace.path.join("missing/sips.txt"))
        .arg("--project")
        .arg(workspace.project())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid output directory"));
    assert!(!workspace.file_exists("missing"));
}

#[test]
fn test_project_without_constraints_composes_nothing() {
    let workspace = TestWorkspace::with_eo_project();
    workspace.write_file(
        "project.yaml",
        &common::PROJECT.replace("[eo.yaml, constraints.yaml]", "[eo.yaml]"),
    );

    sip_cmd()
        .args(["compose", "--project"])
        .arg(workspace.project())
        .assert()
        .success()
        .stderr(predicate::str::contains("0 package(s)"));
}
