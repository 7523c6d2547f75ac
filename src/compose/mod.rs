//! Composition engine
//!
//! Walks the descriptor model depth-first and builds the container tree:
//!
//! ```text
//! content type (sorted by serial number)
//! └── authorized descriptor ──► packages      (package-level occurrence)
//!     └── type descriptor ────► transfer objects
//!         └── group type ─────► group containers, one set per collected context
//!             ├── group type ...
//!             └── data object type ──► data-object containers holding files
//! ```
//!
//! At every level the children produced by a nested descriptor are spread over
//! parent containers sized by that descriptor's maximum occurrence. Parents are
//! shared between sibling descriptors: the engine only creates the parents that
//! are still missing and always dispatches from the first one.
//!
//! Constraint violations are recorded in [`Diagnostics`] and never stop a run.

pub mod occurrence;
pub mod validation;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::collector::CollectorRegistry;
use crate::descriptor::{
    ChildDescriptor, DataObjectType, DescriptorModel, GroupType, OccurrenceRange, SipConstraints,
    SipContentType, TypeDescriptor,
};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::index::{IdAllocator, format_id};
use crate::tree::{ContainerId, ContainerKind, ContainerTree, FileEntry, SequencedPackage};
use occurrence::{Capacity, check_maximum, check_minimum, dispatch};

/// Outcome of one composition run
#[derive(Debug, Clone)]
pub struct Composition {
    tree: ContainerTree,
    packages: Vec<SequencedPackage>,
    diagnostics: Diagnostics,
}

impl Composition {
    pub fn tree(&self) -> &ContainerTree {
        &self.tree
    }

    /// Packages in packaging order
    pub fn packages(&self) -> &[SequencedPackage] {
        &self.packages
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Transfer objects of every package, in packaging order
    pub fn transfer_objects(&self) -> impl Iterator<Item = ContainerId> + '_ {
        self.packages
            .iter()
            .flat_map(|package| package.transfer_objects().iter().copied())
    }

    /// Transfer objects created for one type descriptor
    pub fn transfer_objects_of(&self, descriptor_id: &str) -> Vec<ContainerId> {
        self.transfer_objects()
            .filter(|&id| self.tree.get(id).descriptor_id == descriptor_id)
            .collect()
    }

    /// Number of file entries placed in any package
    pub fn file_count(&self) -> usize {
        self.transfer_objects()
            .map(|id| self.tree.files_below(id).len())
            .sum()
    }

    pub fn into_parts(self) -> (ContainerTree, Vec<SequencedPackage>, Diagnostics) {
        (self.tree, self.packages, self.diagnostics)
    }
}

/// Compose the packages of a descriptor model.
///
/// `collectors_base` is the directory every top-level collector scans from.
pub fn compose(
    model: &DescriptorModel,
    collectors: &mut CollectorRegistry,
    collectors_base: &Path,
) -> Composition {
    let mut composer = Composer::new(model, collectors);
    let packages = composer.packages(collectors_base);
    composer.finish(packages)
}

/// A collected path and the directory it designates
struct Context {
    relative: String,
    directory: PathBuf,
}

/// State of one composition run
pub struct Composer<'a> {
    model: &'a DescriptorModel,
    collectors: &'a mut CollectorRegistry,
    tree: ContainerTree,
    diagnostics: Diagnostics,
    allocator: IdAllocator,
    /// Package-level occurrence checks done per type descriptor
    type_checks: HashMap<String, usize>,
}

impl<'a> Composer<'a> {
    pub fn new(model: &'a DescriptorModel, collectors: &'a mut CollectorRegistry) -> Self {
        Self {
            model,
            collectors,
            tree: ContainerTree::new(),
            diagnostics: Diagnostics::new(),
            allocator: IdAllocator::new(),
            type_checks: HashMap::new(),
        }
    }

    /// Start from diagnostics recorded before composing, e.g. while loading
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn tree(&self) -> &ContainerTree {
        &self.tree
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Packages of every declared content type, in packaging order
    pub fn packages(&mut self, base: &Path) -> Vec<SequencedPackage> {
        let model = self.model;
        let Some(constraints) = model.constraints() else {
            tracing::info!("No SIP constraints defined");
            return Vec::new();
        };

        let content_types = constraints.sorted_content_types();
        if content_types.is_empty() {
            tracing::info!("No SIP content type defined");
            return Vec::new();
        }

        let mut packages = Vec::new();
        for content_type in content_types {
            tracing::info!(content_type = %content_type.sip_content_type_id, "Processing SIP content type");
            let current = self.content_type_packages(constraints, content_type, base);
            if current.is_empty() {
                self.diagnostics.error(
                    DiagnosticKind::EmptyContentType,
                    format!(
                        "Could not derive packages from content type \"{}\" (skipped)",
                        content_type.sip_content_type_id
                    ),
                );
                continue;
            }
            packages.extend(current);
        }
        packages
    }

    /// Packages of one content type.
    ///
    /// Transfer objects of every authorized descriptor are spread over the
    /// same list of packages, sized by the package-level occurrence.
    pub fn content_type_packages(
        &mut self,
        constraints: &SipConstraints,
        content_type: &SipContentType,
        base: &Path,
    ) -> Vec<SequencedPackage> {
        let model = self.model;
        let content_type_id = content_type.sip_content_type_id.as_str();
        let order_key = constraints.sequence_number(content_type_id);
        let mut packages: Vec<SequencedPackage> = Vec::new();

        for authorized in &content_type.authorized_descriptors {
            let Some(descriptor_id) = authorized
                .descriptor_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
            else {
                self.diagnostics.error(
                    DiagnosticKind::MissingIdentifier,
                    format!(
                        "Invalid authorized descriptor identifier (null or zero length) for SIP \
                         content type \"{content_type_id}\" (skipped)"
                    ),
                );
                continue;
            };

            let Some(descriptor) = model.type_descriptor(descriptor_id) else {
                self.diagnostics.error(
                    DiagnosticKind::UnknownDescriptor,
                    format!(
                        "Cannot retrieve a descriptor identified by \"{descriptor_id}\" for SIP \
                         content type \"{content_type_id}\""
                    ),
                );
                continue;
            };

            tracing::info!(descriptor_id, "Processing transfer object descriptor");
            let transfer_objects = self.transfer_objects(descriptor, base);
            self.check_type_occurrence(descriptor_id, descriptor.type_occurrence(), transfer_objects.len());

            let capacity = Capacity::from_range(authorized.occurrence.as_ref(), &mut self.diagnostics);
            let required = capacity.required_parents(transfer_objects.len());
            while packages.len() < required {
                packages.push(SequencedPackage::new(
                    constraints.project_id(),
                    content_type_id,
                    order_key,
                ));
            }
            dispatch(&mut packages, capacity, transfer_objects, SequencedPackage::push);
        }

        packages
    }

    fn check_type_occurrence(
        &mut self,
        descriptor_id: &str,
        range: Option<&OccurrenceRange>,
        count: usize,
    ) {
        *self.type_checks.entry(descriptor_id.to_string()).or_insert(0) += 1;
        if range.is_none() {
            return;
        }

        let what = format!("type \"{descriptor_id}\"");
        let within_min = check_minimum(range, count, &what, &mut self.diagnostics);
        let within_max = check_maximum(range, count, &what, &mut self.diagnostics);
        if within_min && within_max {
            tracing::info!(
                descriptor_id,
                count,
                "Collected objects are within the authorized range of occurrences"
            );
        }
    }

    /// Transfer objects (root containers) of a type descriptor
    pub fn transfer_objects(&mut self, descriptor: &TypeDescriptor, base: &Path) -> Vec<ContainerId> {
        let descriptor_id = descriptor.descriptor_id().unwrap_or_default().to_string();
        let title = descriptor.display_title().map(str::to_string);
        let mut roots = Vec::new();

        for group in &descriptor.group_types {
            tracing::info!(group_type = %group.id, "Processing group type");
            let units = self.group_units(group, base);
            if units.is_empty() {
                continue;
            }

            let range = group.occurrence.as_ref();
            check_minimum(range, units.len(), &format!("group type \"{}\"", group.id), &mut self.diagnostics);
            self.fill_parents(&mut roots, range, units, |tree| {
                tree.create(ContainerKind::TransferObject, descriptor_id.clone(), title.clone())
            });
        }

        roots
    }

    /// Group containers of a group type below `base`.
    ///
    /// Every path the group's collector yields is an independent context:
    /// its containers are never merged with another context's.
    pub fn group_units(&mut self, group: &GroupType, base: &Path) -> Vec<ContainerId> {
        let mut units = Vec::new();

        for context in self.contexts(&group.id, base) {
            tracing::debug!(group_type = %group.id, context = %context.relative, "Processing collected context");
            let mut context_units = Vec::new();

            for child in group.children() {
                tracing::info!(id = child.id(), "Processing {}", child.kind_label());
                let nested = match child {
                    ChildDescriptor::Group(sub_group) => self.group_units(sub_group, &context.directory),
                    ChildDescriptor::DataObject(data_object) => {
                        self.data_object_units(data_object, &context.directory)
                    }
                };
                if nested.is_empty() {
                    continue;
                }

                let what = format!("{} \"{}\"", child.kind_label(), child.id());
                check_minimum(child.occurrence(), nested.len(), &what, &mut self.diagnostics);
                self.fill_parents(&mut context_units, child.occurrence(), nested, |tree| {
                    let id = tree.create(ContainerKind::Group, group.id.clone(), group.description.clone());
                    tree.set_instance_path(id, &context.relative);
                    id
                });
            }

            units.extend(context_units);
        }

        units
    }

    /// Data-object containers of a data object type below `base`.
    ///
    /// A container takes files until it holds the per-container maximum, then
    /// the next file opens a new one.
    pub fn data_object_units(&mut self, data_object: &DataObjectType, base: &Path) -> Vec<ContainerId> {
        let capacity =
            Capacity::files_per_container(data_object.file_occurrence.as_ref(), &mut self.diagnostics);
        let mut units = Vec::new();
        let mut current: Option<ContainerId> = None;

        for context in self.contexts(&data_object.id, base) {
            tracing::debug!(data_object_type = %data_object.id, file = %context.relative, "Processing collected file");
            let container = match current {
                Some(id) if !capacity.is_full(self.tree.get(id).files().len()) => id,
                _ => {
                    let id = self.tree.create(
                        ContainerKind::DataObject,
                        data_object.id.clone(),
                        data_object.description.clone(),
                    );
                    units.push(id);
                    current = Some(id);
                    id
                }
            };
            let entry = FileEntry::new(absolute(&context.directory), context.relative.replace('\\', "/"));
            self.tree.add_file(container, entry);
        }

        units
    }

    /// Paths a type's collector yields below `base`.
    ///
    /// Without a collector the base directory itself is the single context.
    /// A collector that matches nothing yields no context at all.
    fn contexts(&mut self, type_id: &str, base: &Path) -> Vec<Context> {
        let Some(collector) = self.collectors.get_mut(type_id) else {
            return vec![Context {
                relative: String::new(),
                directory: base.to_path_buf(),
            }];
        };

        let resolved = collector.resolve_base_directory(base);
        let paths = collector.collect(base, &mut self.diagnostics);
        if paths.is_empty() {
            tracing::info!(type_id, base = %resolved.display(), "Collector matched nothing");
        }

        paths
            .iter()
            .map(|relative| Context {
                directory: join_relative(&resolved, relative),
                relative: relative.clone(),
            })
            .collect()
    }

    /// Create the parents still missing for `children`, then dispatch them
    fn fill_parents(
        &mut self,
        parents: &mut Vec<ContainerId>,
        range: Option<&OccurrenceRange>,
        children: Vec<ContainerId>,
        mut new_parent: impl FnMut(&mut ContainerTree) -> ContainerId,
    ) {
        let capacity = Capacity::from_range(range, &mut self.diagnostics);
        let required = capacity.required_parents(children.len());
        while parents.len() < required {
            parents.push(new_parent(&mut self.tree));
        }

        let tree = &mut self.tree;
        dispatch(parents, capacity, children, |parent, child| {
            tree.attach(*parent, child);
        });
    }

    /// Name every node, flag last transfer objects, validate, and hand the result over
    pub fn finish(mut self, mut packages: Vec<SequencedPackage>) -> Composition {
        assign_identifiers(&mut self.tree, &mut packages, &mut self.allocator);
        flag_last_in_type(&mut self.tree, &packages);
        validation::validate_project(
            self.model,
            &self.tree,
            &packages,
            &self.type_checks,
            &mut self.diagnostics,
        );

        tracing::info!(
            packages = packages.len(),
            containers = self.tree.len(),
            diagnostics = self.diagnostics.len(),
            "Composition complete"
        );

        Composition {
            tree: self.tree,
            packages,
            diagnostics: self.diagnostics,
        }
    }
}

/// Naming pass, in package order and depth-first inside each package:
/// packages `<project>-SIP-nnnn`, transfer objects `<descriptor>-nnnn`,
/// other containers `CU-<id>-nnnn`, files `DO-<id>-nnnn`.
fn assign_identifiers(
    tree: &mut ContainerTree,
    packages: &mut [SequencedPackage],
    allocator: &mut IdAllocator,
) {
    for package in packages.iter_mut() {
        let key = format!("{}-SIP", package.project_id);
        package.identifier = Some(format_id(&key, allocator.next(&key)));

        for &root in package.transfer_objects() {
            for id in tree.depth_first(root) {
                let container = tree.get(id);
                let key = match container.kind {
                    ContainerKind::TransferObject => container.descriptor_id.clone(),
                    ContainerKind::Group | ContainerKind::DataObject => {
                        format!("CU-{}", container.descriptor_id)
                    }
                };
                let file_key = format!("DO-{}", container.descriptor_id);
                let file_count = container.files().len();

                tree.get_mut(id).instance_id = Some(allocator.next_id(&key));
                for index in 0..file_count {
                    tree.file_mut(id, index).data_object_id = Some(allocator.next_id(&file_key));
                }
            }
        }
    }
}

/// Flag the last transfer object of each type across all packages
fn flag_last_in_type(tree: &mut ContainerTree, packages: &[SequencedPackage]) {
    let mut last: HashMap<String, ContainerId> = HashMap::new();
    for &root in packages.iter().flat_map(SequencedPackage::transfer_objects) {
        last.insert(tree.get(root).descriptor_id.clone(), root);
    }
    for id in last.into_values() {
        tree.get_mut(id).last_in_type = true;
    }
}

fn join_relative(base: &Path, relative: &str) -> PathBuf {
    if relative.is_empty() {
        base.to_path_buf()
    } else {
        base.join(relative)
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
