//! Project-wide checks over a finished composition
//!
//! Runs once every package is built. Nothing here changes the tree; problems
//! are only recorded as diagnostics.

use std::collections::HashMap;

use crate::descriptor::{DescriptorModel, SizeConstraint, SizeUnit, TypeDescriptor};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::tree::{ContainerId, ContainerTree, SequencedPackage};

use super::occurrence::{check_maximum, check_minimum};

/// Check every type descriptor against the transfer objects produced for it.
///
/// `checked` counts the package-level occurrence checks already done per
/// descriptor. When a descriptor was checked exactly once that check covered
/// its whole population, so the count is not reported a second time.
pub fn validate_project(
    model: &DescriptorModel,
    tree: &ContainerTree,
    packages: &[SequencedPackage],
    checked: &HashMap<String, usize>,
    diagnostics: &mut Diagnostics,
) {
    let mut by_type: HashMap<&str, Vec<ContainerId>> = HashMap::new();
    for &root in packages.iter().flat_map(SequencedPackage::transfer_objects) {
        by_type
            .entry(tree.get(root).descriptor_id.as_str())
            .or_default()
            .push(root);
    }

    for descriptor in model.type_descriptors() {
        let Some(descriptor_id) = descriptor.descriptor_id() else {
            continue;
        };
        // Types without transfer objects are not counted
        let transfer_objects = by_type.get(descriptor_id).map_or(&[][..], Vec::as_slice);
        let already_checked =
            transfer_objects.is_empty() || checked.get(descriptor_id) == Some(&1);

        validate_type(
            descriptor,
            descriptor_id,
            tree,
            transfer_objects,
            already_checked,
            diagnostics,
        );
    }
}

fn validate_type(
    descriptor: &TypeDescriptor,
    descriptor_id: &str,
    tree: &ContainerTree,
    transfer_objects: &[ContainerId],
    already_checked: bool,
    diagnostics: &mut Diagnostics,
) {
    if descriptor.description.is_none() {
        diagnostics.warn(
            DiagnosticKind::MissingDescription,
            format!("The transfer object type descriptor \"{descriptor_id}\" has no description"),
        );
        return;
    }

    match descriptor.type_occurrence() {
        None => diagnostics.warn(
            DiagnosticKind::MissingOccurrence,
            format!(
                "The transfer object type descriptor \"{descriptor_id}\" has no occurrence constraints"
            ),
        ),
        Some(range) => {
            if range.min.is_none_or(|min| min <= 0) {
                diagnostics.warn(
                    DiagnosticKind::InvalidMinimum,
                    format!(
                        "The transfer object type descriptor \"{descriptor_id}\" shall not declare a \
                         null or negative minimum occurrence"
                    ),
                );
            }
            if range.max.is_some_and(|max| max <= 0) {
                diagnostics.warn(
                    DiagnosticKind::InvalidMaximum,
                    format!(
                        "The transfer object type descriptor \"{descriptor_id}\" shall not declare a \
                         negative maximum occurrence"
                    ),
                );
            }
            if !already_checked {
                let what = format!("type \"{descriptor_id}\" across all packages");
                check_minimum(Some(range), transfer_objects.len(), &what, diagnostics);
                check_maximum(Some(range), transfer_objects.len(), &what, diagnostics);
            }
        }
    }

    if let Some(size) = descriptor.size_constraint() {
        validate_sizes(size, descriptor_id, tree, transfer_objects, diagnostics);
    }
}

fn validate_sizes(
    size: &SizeConstraint,
    descriptor_id: &str,
    tree: &ContainerTree,
    transfer_objects: &[ContainerId],
    diagnostics: &mut Diagnostics,
) {
    let units = size.units_type.as_deref().map(str::trim).unwrap_or_default();
    if units.is_empty() {
        diagnostics.warn(
            DiagnosticKind::SizeConstraint,
            format!("\"{descriptor_id}\" provides size constraints without units"),
        );
        return;
    }
    let unit: SizeUnit = match units.parse() {
        Ok(unit) => unit,
        Err(_) => {
            diagnostics.warn(
                DiagnosticKind::SizeConstraint,
                format!("\"{descriptor_id}\" declares an invalid unit: \"{units}\""),
            );
            return;
        }
    };

    let min_size = non_negative(size.min_size, "minimum", descriptor_id, diagnostics);
    let max_size = non_negative(size.max_size, "maximum", descriptor_id, diagnostics);

    for &transfer_object in transfer_objects {
        let current = unit.from_bytes(tree.total_size(transfer_object));

        if let Some(min) = min_size.filter(|&min| current < min) {
            diagnostics.error(
                DiagnosticKind::SizeConstraint,
                format!(
                    "A transfer object has a {current} {unit} size, lower than the minimum {min} \
                     {unit} required by the \"{descriptor_id}\" type descriptor"
                ),
            );
        }
        if let Some(max) = max_size.filter(|&max| current > max) {
            diagnostics.error(
                DiagnosticKind::SizeConstraint,
                format!(
                    "A transfer object has a {current} {unit} size, greater than the maximum {max} \
                     {unit} allowed by the \"{descriptor_id}\" type descriptor"
                ),
            );
        }
    }
}

fn non_negative(
    value: Option<f64>,
    label: &str,
    descriptor_id: &str,
    diagnostics: &mut Diagnostics,
) -> Option<f64> {
    match value {
        Some(v) if v < 0.0 => {
            diagnostics.warn(
                DiagnosticKind::SizeConstraint,
                format!("\"{descriptor_id}\" declares a negative {label} size: {v}"),
            );
            None
        }
        other => other,
    }
}
