//! Human-readable and JSON views of a composition

use std::fmt::Write as _;

use console::Style;
use serde::Serialize;

use crate::compose::Composition;
use crate::diagnostics::{Diagnostics, Severity};
use crate::error::Result;
use crate::project::Project;
use crate::tree::{ContainerId, ContainerKind, ContainerTree, SequencedPackage};

/// JSON document of a composition
#[derive(Debug, Serialize)]
pub struct CompositionView<'a> {
    pub packages: Vec<PackageView<'a>>,
    pub diagnostics: &'a Diagnostics,
}

#[derive(Debug, Serialize)]
pub struct PackageView<'a> {
    pub identifier: Option<&'a str>,
    pub content_type_id: &'a str,
    pub order_key: Option<u64>,
    pub transfer_objects: Vec<ContainerView<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ContainerView<'a> {
    pub kind: ContainerKind,
    pub descriptor_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
    pub instance_id: Option<&'a str>,
    pub package_path: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub last_in_type: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ContainerView<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileView<'a>>,
}

#[derive(Debug, Serialize)]
pub struct FileView<'a> {
    pub data_object_id: Option<&'a str>,
    pub path: String,
    pub package_path: String,
}

impl<'a> CompositionView<'a> {
    pub fn new(composition: &'a Composition) -> Self {
        let tree = composition.tree();
        Self {
            packages: composition
                .packages()
                .iter()
                .map(|package| package_view(tree, package))
                .collect(),
            diagnostics: composition.diagnostics(),
        }
    }
}

fn package_view<'a>(tree: &'a ContainerTree, package: &'a SequencedPackage) -> PackageView<'a> {
    PackageView {
        identifier: package.identifier.as_deref(),
        content_type_id: &package.content_type_id,
        order_key: package.order_key,
        transfer_objects: package
            .transfer_objects()
            .iter()
            .map(|&id| container_view(tree, id))
            .collect(),
    }
}

fn container_view(tree: &ContainerTree, id: ContainerId) -> ContainerView<'_> {
    let container = tree.get(id);
    ContainerView {
        kind: container.kind,
        descriptor_id: &container.descriptor_id,
        text: container.text.as_deref(),
        instance_id: container.instance_id.as_deref(),
        package_path: tree.package_relative_path(id),
        last_in_type: container.last_in_type,
        children: container
            .children()
            .iter()
            .map(|&child| container_view(tree, child))
            .collect(),
        files: container
            .files()
            .iter()
            .map(|entry| FileView {
                data_object_id: entry.data_object_id.as_deref(),
                path: entry.path.display().to_string(),
                package_path: tree.file_package_path(id, entry),
            })
            .collect(),
    }
}

/// Pretty-printed JSON of a composition
pub fn to_json(composition: &Composition) -> Result<String> {
    Ok(serde_json::to_string_pretty(&CompositionView::new(composition))?)
}

/// Indented tree of packages, containers and files
pub fn tree_text(composition: &Composition) -> String {
    let tree = composition.tree();
    let mut out = String::new();

    for package in composition.packages() {
        let _ = writeln!(
            out,
            "{} {}",
            Style::new()
                .bold()
                .yellow()
                .apply_to(package.identifier.as_deref().unwrap_or("<unnamed>")),
            Style::new()
                .dim()
                .apply_to(format!("[{}]", package.content_type_id))
        );
        for &root in package.transfer_objects() {
            container_text(&mut out, tree, root, 1);
        }
    }

    out
}

fn container_text(out: &mut String, tree: &ContainerTree, id: ContainerId, depth: usize) {
    let indent = "  ".repeat(depth);
    let container = tree.get(id);
    let name = container.instance_id.as_deref().unwrap_or(&container.descriptor_id);

    let mut line = format!(
        "{indent}{} ({})",
        Style::new().bold().apply_to(name),
        container.descriptor_id
    );
    if let Some(path) = &container.instance_path {
        let _ = write!(line, " {}", Style::new().cyan().apply_to(path));
    }
    if container.last_in_type {
        let _ = write!(line, " {}", Style::new().green().apply_to("last"));
    }
    let _ = writeln!(out, "{line}");

    for &child in container.children() {
        container_text(out, tree, child, depth + 1);
    }
    for entry in container.files() {
        let _ = writeln!(
            out,
            "{indent}  {} {} <- {}",
            entry.data_object_id.as_deref().unwrap_or("-"),
            tree.file_package_path(id, entry),
            Style::new().dim().apply_to(entry.path.display())
        );
    }
}

/// One-line counts of a composition
pub fn summary(composition: &Composition) -> String {
    let diagnostics = composition.diagnostics();
    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    format!(
        "{} package(s), {} transfer object(s), {} file(s), {} warning(s), {} error(s)",
        composition.packages().len(),
        composition.transfer_objects().count(),
        composition.file_count(),
        diagnostics.len() - errors,
        errors
    )
}

/// Diagnostics, one per line
pub fn diagnostics_text(diagnostics: &Diagnostics) -> String {
    let mut out = String::new();
    for diagnostic in diagnostics {
        let label = match diagnostic.severity {
            Severity::Warning => Style::new().yellow().apply_to("warning"),
            Severity::Error => Style::new().red().apply_to("error"),
        };
        let _ = writeln!(out, "{label}: {}", diagnostic.message);
    }
    out
}

/// Descriptor tree, collectors and content types of a project
pub fn describe(project: &Project) -> String {
    let bold = Style::new().bold();
    let mut out = String::new();

    let _ = writeln!(out, "{} {}", bold.apply_to("Project:"), project.path().display());
    let _ = writeln!(out, "{} {}", bold.apply_to("Packaging:"), project.packaging());
    let _ = writeln!(
        out,
        "{} {}",
        bold.apply_to("Collectors base:"),
        project.collectors_base().display()
    );
    let _ = writeln!(
        out,
        "{} {}",
        bold.apply_to("Output directory:"),
        project.output_directory().display()
    );

    let _ = writeln!(out, "\n{}", bold.apply_to("Descriptor tree:"));
    for line in project.model().outline().lines() {
        let _ = writeln!(out, "  {line}");
    }

    if let Some(constraints) = project.model().constraints() {
        let _ = writeln!(out, "\n{}", bold.apply_to("Content types:"));
        for content_type in constraints.sorted_content_types() {
            let sequence = constraints
                .sequence_number(&content_type.sip_content_type_id)
                .map_or_else(|| "-".to_string(), |n| n.to_string());
            let descriptors: Vec<&str> = content_type
                .authorized_descriptors
                .iter()
                .filter_map(|a| a.descriptor_id.as_deref())
                .collect();
            let _ = writeln!(
                out,
                "  {} [{}] {}",
                content_type.sip_content_type_id,
                sequence,
                descriptors.join(", ")
            );
        }
    }

    out
}
