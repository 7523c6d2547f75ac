//! Descriptor model
//!
//! The typed, already-parsed descriptor graph a composition runs over:
//!
//! ```text
//! TypeDescriptor
//! └── GroupType*            (nestable)
//!     ├── GroupType*
//!     └── DataObjectType*   (leaf, owns files)
//! ```
//!
//! plus the package-level [`SipConstraints`]. The model is built once and is
//! read-only afterwards.

pub mod constraints;
pub mod occurrence;
pub mod size;

use std::collections::HashMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{DiagnosticKind, Diagnostics};

pub use constraints::{
    AuthorizedDescriptor, ConstraintItem, SequencingConstraintGroup, SipConstraints,
    SipContentType,
};
pub use occurrence::OccurrenceRange;
pub use size::{SizeConstraint, SizeUnit};

/// Identification block of a type descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identification {
    #[serde(default)]
    pub descriptor_id: Option<String>,

    #[serde(default)]
    pub producer_source_id: Option<String>,
}

/// Description block of a type descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Description {
    #[serde(default)]
    pub title: Option<String>,

    /// How many transfer objects of this type may exist
    #[serde(default, alias = "transfer_object_type_occurrence")]
    pub occurrence: Option<OccurrenceRange>,

    #[serde(default, alias = "transfer_object_type_size")]
    pub size: Option<SizeConstraint>,
}

/// Root of a descriptor tree; its instances are transfer objects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    #[serde(default)]
    pub identification: Option<Identification>,

    #[serde(default)]
    pub description: Option<Description>,

    #[serde(default)]
    pub group_types: Vec<GroupType>,
}

impl TypeDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            identification: Some(Identification {
                descriptor_id: Some(id.into()),
                producer_source_id: None,
            }),
            description: Some(Description::default()),
            group_types: Vec::new(),
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.description.get_or_insert_with(Description::default).title = Some(title.into());
        self
    }

    #[must_use]
    pub fn occurrence(mut self, range: OccurrenceRange) -> Self {
        self.description
            .get_or_insert_with(Description::default)
            .occurrence = Some(range);
        self
    }

    #[must_use]
    pub fn size(mut self, size: SizeConstraint) -> Self {
        self.description.get_or_insert_with(Description::default).size = Some(size);
        self
    }

    #[must_use]
    pub fn group(mut self, group: GroupType) -> Self {
        self.group_types.push(group);
        self
    }

    /// Trimmed identifier, `None` when missing or blank
    pub fn descriptor_id(&self) -> Option<&str> {
        self.identification
            .as_ref()
            .and_then(|i| i.descriptor_id.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn producer_source_id(&self) -> Option<&str> {
        self.identification
            .as_ref()
            .and_then(|i| i.producer_source_id.as_deref())
            .map(str::trim)
    }

    pub fn display_title(&self) -> Option<&str> {
        self.description.as_ref().and_then(|d| d.title.as_deref())
    }

    pub fn type_occurrence(&self) -> Option<&OccurrenceRange> {
        self.description.as_ref().and_then(|d| d.occurrence.as_ref())
    }

    pub fn size_constraint(&self) -> Option<&SizeConstraint> {
        self.description.as_ref().and_then(|d| d.size.as_ref())
    }
}

/// A nestable grouping level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupType {
    pub id: String,

    #[serde(default)]
    pub description: Option<String>,

    /// How many instances of this group fit in one parent
    #[serde(default)]
    pub occurrence: Option<OccurrenceRange>,

    #[serde(default)]
    pub group_types: Vec<GroupType>,

    #[serde(default)]
    pub data_object_types: Vec<DataObjectType>,
}

impl GroupType {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn occurrence(mut self, range: OccurrenceRange) -> Self {
        self.occurrence = Some(range);
        self
    }

    #[must_use]
    pub fn group(mut self, group: GroupType) -> Self {
        self.group_types.push(group);
        self
    }

    #[must_use]
    pub fn data_object(mut self, data_object: DataObjectType) -> Self {
        self.data_object_types.push(data_object);
        self
    }

    /// Nested descriptors: sub-groups first, then data-object types
    pub fn children(&self) -> impl Iterator<Item = ChildDescriptor<'_>> {
        self.group_types
            .iter()
            .map(ChildDescriptor::Group)
            .chain(self.data_object_types.iter().map(ChildDescriptor::DataObject))
    }
}

/// A leaf level whose instances hold files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataObjectType {
    pub id: String,

    #[serde(default)]
    pub description: Option<String>,

    /// How many instances of this data object fit in one parent
    #[serde(default)]
    pub occurrence: Option<OccurrenceRange>,

    /// How many files one instance holds
    #[serde(default)]
    pub file_occurrence: Option<OccurrenceRange>,
}

impl DataObjectType {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn occurrence(mut self, range: OccurrenceRange) -> Self {
        self.occurrence = Some(range);
        self
    }

    #[must_use]
    pub fn file_occurrence(mut self, range: OccurrenceRange) -> Self {
        self.file_occurrence = Some(range);
        self
    }
}

/// Borrowed view of a node nested under a group
#[derive(Debug, Clone, Copy)]
pub enum ChildDescriptor<'a> {
    Group(&'a GroupType),
    DataObject(&'a DataObjectType),
}

impl<'a> ChildDescriptor<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            ChildDescriptor::Group(group) => &group.id,
            ChildDescriptor::DataObject(data_object) => &data_object.id,
        }
    }

    pub fn occurrence(&self) -> Option<&'a OccurrenceRange> {
        match self {
            ChildDescriptor::Group(group) => group.occurrence.as_ref(),
            ChildDescriptor::DataObject(data_object) => data_object.occurrence.as_ref(),
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            ChildDescriptor::Group(_) => "group type",
            ChildDescriptor::DataObject(_) => "data object type",
        }
    }
}

/// All type descriptors of a project plus its package constraints
#[derive(Debug, Clone, Default)]
pub struct DescriptorModel {
    type_descriptors: Vec<TypeDescriptor>,
    by_id: HashMap<String, usize>,
    constraints: Option<SipConstraints>,
}

impl DescriptorModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a type descriptor, keyed by its trimmed identifier.
    ///
    /// A descriptor that cannot be keyed is reported and skipped.
    pub fn insert_type_descriptor(
        &mut self,
        descriptor: TypeDescriptor,
        diagnostics: &mut Diagnostics,
    ) -> bool {
        let Some(id) = descriptor.descriptor_id().map(str::to_string) else {
            let reason = if descriptor.identification.is_none() {
                "no identification"
            } else {
                "a null or zero length identifier"
            };
            diagnostics.warn(
                DiagnosticKind::MissingIdentifier,
                format!("One transfer object type descriptor has {reason} (skipped)"),
            );
            return false;
        };

        if let Some(&index) = self.by_id.get(&id) {
            tracing::warn!(descriptor_id = %id, "Type descriptor replaced");
            self.type_descriptors[index] = descriptor;
        } else {
            self.by_id.insert(id, self.type_descriptors.len());
            self.type_descriptors.push(descriptor);
        }
        true
    }

    /// Builder form of [`Self::insert_type_descriptor`] for descriptors known to be keyed
    #[must_use]
    pub fn with_type_descriptor(mut self, descriptor: TypeDescriptor) -> Self {
        let mut diagnostics = Diagnostics::new();
        self.insert_type_descriptor(descriptor, &mut diagnostics);
        self
    }

    #[must_use]
    pub fn with_constraints(mut self, constraints: SipConstraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    pub fn set_constraints(&mut self, constraints: SipConstraints) {
        self.constraints = Some(constraints);
    }

    pub fn constraints(&self) -> Option<&SipConstraints> {
        self.constraints.as_ref()
    }

    /// Type descriptors in insertion order
    pub fn type_descriptors(&self) -> &[TypeDescriptor] {
        &self.type_descriptors
    }

    pub fn type_descriptor(&self, id: &str) -> Option<&TypeDescriptor> {
        self.by_id
            .get(id.trim())
            .map(|&index| &self.type_descriptors[index])
    }

    /// First producer source identifier declared by any descriptor
    pub fn producer_source_id(&self) -> Option<&str> {
        self.type_descriptors
            .iter()
            .find_map(TypeDescriptor::producer_source_id)
    }

    /// Indented outline of the descriptor tree
    pub fn outline(&self) -> String {
        let mut out = String::new();
        for descriptor in &self.type_descriptors {
            let _ = writeln!(
                out,
                "Transfer Object Type: \"{}\"",
                descriptor.descriptor_id().unwrap_or_default()
            );
            outline_groups(&mut out, &descriptor.group_types, "   ");
        }
        out
    }
}

fn outline_groups(out: &mut String, groups: &[GroupType], indent: &str) {
    for group in groups {
        let _ = writeln!(out, "{indent}Group Type: \"{}\"", group.id);
        let nested = format!("{indent}   ");
        for data_object in &group.data_object_types {
            let _ = writeln!(out, "{nested}Data Object Type: \"{}\"", data_object.id);
        }
        outline_groups(out, &group.group_types, &nested);
    }
}
