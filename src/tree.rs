//! Content container tree
//!
//! Containers live in an arena ([`ContainerTree`]) and refer to each other by
//! [`ContainerId`]. A child is owned by exactly one parent; the parent index
//! stored on the child is only used to resolve package-relative paths.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use serde::Serialize;

/// Index of a container inside its [`ContainerTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ContainerId(usize);

impl ContainerId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Descriptor level a container was created for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// Top-level container of a type descriptor
    TransferObject,
    Group,
    DataObject,
}

/// A collected file placed in a container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// Absolute filesystem path
    pub path: PathBuf,

    /// Forward-slash path relative to the collector base, used for in-package placement
    pub instance_path: String,

    /// Assigned by the naming pass
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_object_id: Option<String>,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>, instance_path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            instance_path: instance_path.into(),
            data_object_id: None,
        }
    }

    /// Size on disk; directories and unreadable entries count as zero
    pub fn size(&self) -> u64 {
        fs::metadata(&self.path)
            .ok()
            .filter(fs::Metadata::is_file)
            .map_or(0, |metadata| metadata.len())
    }
}

/// A node of the composed tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentContainer {
    pub kind: ContainerKind,

    /// Identifier of the descriptor this container was created for
    pub descriptor_id: String,

    pub text: Option<String>,

    /// Path segment this container contributes to its descendants' package paths
    pub instance_path: Option<String>,

    /// Assigned by the naming pass
    pub instance_id: Option<String>,

    /// Last transfer object of its type across the whole run
    pub last_in_type: bool,

    parent: Option<ContainerId>,
    children: Vec<ContainerId>,
    files: Vec<FileEntry>,
}

impl ContentContainer {
    pub fn parent(&self) -> Option<ContainerId> {
        self.parent
    }

    pub fn children(&self) -> &[ContainerId] {
        &self.children
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.files.is_empty()
    }
}

/// Arena of containers for one composition run
#[derive(Debug, Clone, Default)]
pub struct ContainerTree {
    nodes: Vec<ContentContainer>,
}

impl ContainerTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        kind: ContainerKind,
        descriptor_id: impl Into<String>,
        text: Option<String>,
    ) -> ContainerId {
        let id = ContainerId(self.nodes.len());
        self.nodes.push(ContentContainer {
            kind,
            descriptor_id: descriptor_id.into(),
            text,
            instance_path: None,
            instance_id: None,
            last_in_type: false,
            parent: None,
            children: Vec::new(),
            files: Vec::new(),
        });
        id
    }

    /// Set the instance path; an empty path contributes nothing and is stored as `None`
    pub fn set_instance_path(&mut self, id: ContainerId, path: &str) {
        self.nodes[id.0].instance_path = (!path.is_empty()).then(|| path.replace('\\', "/"));
    }

    /// Make `child` the last child of `parent`.
    ///
    /// # Panics
    ///
    /// When `child` already has a parent or `parent` already holds files.
    pub fn attach(&mut self, parent: ContainerId, child: ContainerId) {
        assert_ne!(parent, child, "container {parent} cannot contain itself");
        assert!(
            self.nodes[child.0].parent.is_none(),
            "container {child} is already owned by {:?}",
            self.nodes[child.0].parent
        );
        assert!(
            self.nodes[parent.0].files.is_empty(),
            "container {parent} holds files and cannot take child containers"
        );
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// # Panics
    ///
    /// When `id` already has child containers.
    pub fn add_file(&mut self, id: ContainerId, entry: FileEntry) {
        assert!(
            self.nodes[id.0].children.is_empty(),
            "container {id} has child containers and cannot take files"
        );
        self.nodes[id.0].files.push(entry);
    }

    pub fn get(&self, id: ContainerId) -> &ContentContainer {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: ContainerId) -> &mut ContentContainer {
        &mut self.nodes[id.0]
    }

    pub fn file_mut(&mut self, id: ContainerId, index: usize) -> &mut FileEntry {
        &mut self.nodes[id.0].files[index]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ancestors of `id`, nearest first, excluding `id`
    pub fn ancestors(&self, id: ContainerId) -> impl Iterator<Item = ContainerId> + '_ {
        std::iter::successors(self.nodes[id.0].parent, |current| {
            self.nodes[current.0].parent
        })
    }

    pub fn root(&self, id: ContainerId) -> ContainerId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// Instance paths from the root down to `id`, joined with `/`
    pub fn package_relative_path(&self, id: ContainerId) -> String {
        let mut segments: Vec<&str> = std::iter::once(id)
            .chain(self.ancestors(id))
            .filter_map(|current| self.nodes[current.0].instance_path.as_deref())
            .filter(|segment| !segment.is_empty())
            .collect();
        segments.reverse();
        segments.join("/")
    }

    /// In-package path of a file attached to `id`
    pub fn file_package_path(&self, id: ContainerId, entry: &FileEntry) -> String {
        let container_path = self.package_relative_path(id);
        match (container_path.is_empty(), entry.instance_path.is_empty()) {
            (true, _) => entry.instance_path.clone(),
            (false, true) => container_path,
            (false, false) => format!("{container_path}/{}", entry.instance_path),
        }
    }

    /// Pre-order traversal of the subtree rooted at `id`
    pub fn depth_first(&self, id: ContainerId) -> Vec<ContainerId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(self.nodes[current.0].children.iter().rev().copied());
        }
        order
    }

    /// Every file of the subtree, in container order
    pub fn files_below(&self, id: ContainerId) -> Vec<&FileEntry> {
        self.depth_first(id)
            .into_iter()
            .flat_map(|current| self.nodes[current.0].files.iter())
            .collect()
    }

    /// Total byte size of the files attached below `id`
    pub fn total_size(&self, id: ContainerId) -> u64 {
        self.files_below(id).iter().map(|entry| entry.size()).sum()
    }
}

/// A top-level output package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencedPackage {
    /// Producer archive project identifier, stem of the package identifier
    pub project_id: String,

    pub content_type_id: String,

    /// Declared serial number of the content type, if any
    pub order_key: Option<u64>,

    /// Assigned by the naming pass, e.g. `PROJ-SIP-0001`
    pub identifier: Option<String>,

    transfer_objects: Vec<ContainerId>,
}

impl SequencedPackage {
    pub fn new(
        project_id: impl Into<String>,
        content_type_id: impl Into<String>,
        order_key: Option<u64>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            content_type_id: content_type_id.into(),
            order_key,
            identifier: None,
            transfer_objects: Vec::new(),
        }
    }

    pub fn push(&mut self, transfer_object: ContainerId) {
        self.transfer_objects.push(transfer_object);
    }

    pub fn transfer_objects(&self) -> &[ContainerId] {
        &self.transfer_objects
    }

    pub fn is_empty(&self) -> bool {
        self.transfer_objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (ContainerTree, ContainerId, ContainerId, ContainerId) {
        let mut tree = ContainerTree::new();
        let root = tree.create(ContainerKind::TransferObject, "EO", None);
        let group = tree.create(ContainerKind::Group, "PRODUCT", None);
        tree.set_instance_path(group, "S1_001");
        let data = tree.create(ContainerKind::DataObject, "MEASUREMENT", None);
        tree.attach(root, group);
        tree.attach(group, data);
        (tree, root, group, data)
    }

    #[test]
    fn test_package_relative_path() {
        let (mut tree, root, group, data) = sample();
        let inner = tree.create(ContainerKind::Group, "SUB", None);
        tree.set_instance_path(inner, "measurement");
        tree.attach(group, inner);

        assert_eq!(tree.package_relative_path(root), "");
        assert_eq!(tree.package_relative_path(group), "S1_001");
        assert_eq!(tree.package_relative_path(data), "S1_001");
        assert_eq!(tree.package_relative_path(inner), "S1_001/measurement");
    }

    #[test]
    fn test_file_package_path() {
        let (mut tree, _, _, data) = sample();
        let entry = FileEntry::new("/data/S1_001/a.dat", "a.dat");
        tree.add_file(data, entry.clone());
        assert_eq!(tree.file_package_path(data, &entry), "S1_001/a.dat");

        let placeholder = FileEntry::new("/data/S1_001", "");
        assert_eq!(tree.file_package_path(data, &placeholder), "S1_001");
    }

    #[test]
    fn test_empty_instance_path_is_ignored() {
        let mut tree = ContainerTree::new();
        let group = tree.create(ContainerKind::Group, "G", None);
        tree.set_instance_path(group, "");
        assert_eq!(tree.get(group).instance_path, None);
    }

    #[test]
    fn test_depth_first_order() {
        let (mut tree, root, group, data) = sample();
        let second = tree.create(ContainerKind::Group, "OTHER", None);
        tree.attach(root, second);

        assert_eq!(tree.depth_first(root), vec![root, group, data, second]);
        assert_eq!(tree.root(data), root);
    }

    #[test]
    #[should_panic(expected = "already owned")]
    fn test_child_has_single_owner() {
        let (mut tree, root, _, data) = sample();
        tree.attach(root, data);
    }

    #[test]
    #[should_panic(expected = "cannot take files")]
    fn test_container_with_children_rejects_files() {
        let (mut tree, root, _, _) = sample();
        tree.add_file(root, FileEntry::new("/x", "x"));
    }

    #[test]
    fn test_total_size_counts_files_only() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.bin"), vec![0u8; 100]).unwrap();
        std::fs::write(temp.path().join("b.bin"), vec![0u8; 24]).unwrap();

        let (mut tree, root, _, data) = sample();
        tree.add_file(data, FileEntry::new(temp.path().join("a.bin"), "a.bin"));
        tree.add_file(data, FileEntry::new(temp.path().join("b.bin"), "b.bin"));
        tree.add_file(data, FileEntry::new(temp.path(), ""));

        assert_eq!(tree.total_size(root), 124);
    }
}
