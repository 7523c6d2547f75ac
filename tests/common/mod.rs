//! Common test utilities for sip-composer integration tests

use std::path::PathBuf;
use tempfile::TempDir;

/// Type descriptor used by most tests: one `EO` transfer object type with a
/// `PRODUCT` group holding `MEASUREMENT` data objects.
#[allow(dead_code)]
pub const EO_DESCRIPTOR: &str = "\
kind: type_descriptor
identification:
  descriptor_id: EO
description:
  title: Earth observation
  transfer_object_type_occurrence: { min_occurrence: 1 }
group_types:
  - id: PRODUCT
    description: One acquisition
    data_object_types:
      - id: MEASUREMENT
        description: Raw measurement
";

#[allow(dead_code)]
pub const CONSTRAINTS: &str = "\
kind: constraints
producer_archive_project_id: PROJ
sip_content_types:
  - sip_content_type_id: MAIN
    authorized_descriptors:
      - descriptor_id: EO
";

#[allow(dead_code)]
pub const PROJECT: &str = "\
descriptors:
  files: [eo.yaml, constraints.yaml]
collectors:
  base_directory: data
  collector:
    - type_id: PRODUCT
      include: ['P*']
    - type_id: MEASUREMENT
      include: ['*.dat']
";

/// A test workspace for integration tests
pub struct TestWorkspace {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

impl TestWorkspace {
    /// Create a new test workspace
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Workspace holding the `EO` project and two products with one file each
    #[allow(dead_code)]
    pub fn with_eo_project() -> Self {
        let workspace = Self::new();
        workspace.write_file("eo.yaml", EO_DESCRIPTOR);
        workspace.write_file("constraints.yaml", CONSTRAINTS);
        workspace.write_file("project.yaml", PROJECT);
        workspace.write_file("data/P1/m.dat", "1234");
        workspace.write_file("data/P2/m.dat", "5678");
        workspace
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from workspace
    #[allow(dead_code)]
    pub fn read_file(&self, path: &str) -> String {
        let file_path = self.path.join(path);
        std::fs::read_to_string(&file_path).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    #[allow(dead_code)]
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Path of the project file
    pub fn project(&self) -> PathBuf {
        self.path.join("project.yaml")
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_creation() {
        let workspace = TestWorkspace::new();
        assert!(workspace.path.exists());
    }

    #[test]
    fn test_workspace_file_operations() {
        let workspace = TestWorkspace::new();
        workspace.write_file("test/file.txt", "hello");
        assert!(workspace.file_exists("test/file.txt"));
        assert_eq!(workspace.read_file("test/file.txt"), "hello");
    }

    #[test]
    fn test_workspace_with_eo_project() {
        let workspace = TestWorkspace::with_eo_project();
        assert!(workspace.project().is_file());
        assert!(workspace.file_exists("data/P2/m.dat"));
    }
}
