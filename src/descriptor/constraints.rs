//! SIP constraints: content types, authorized descriptors, sequencing

use serde::{Deserialize, Serialize};

use super::occurrence::OccurrenceRange;

/// Package-level constraints of a project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SipConstraints {
    /// Used as the identifier stem of every produced package
    #[serde(default)]
    pub producer_archive_project_id: Option<String>,

    #[serde(default)]
    pub sip_content_types: Vec<SipContentType>,

    #[serde(default)]
    pub sip_sequencing_constraint_groups: Vec<SequencingConstraintGroup>,
}

/// One kind of package and the descriptors allowed inside it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SipContentType {
    pub sip_content_type_id: String,

    #[serde(default)]
    pub authorized_descriptors: Vec<AuthorizedDescriptor>,
}

/// Reference to a type descriptor, with how many of its transfer objects fit in one package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedDescriptor {
    #[serde(default)]
    pub descriptor_id: Option<String>,

    #[serde(default)]
    pub occurrence: Option<OccurrenceRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencingConstraintGroup {
    #[serde(default)]
    pub constraint_items: Vec<ConstraintItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintItem {
    pub sip_content_type_id: String,

    #[serde(default)]
    pub constraint_serial_number: Option<u64>,
}

impl SipConstraints {
    /// First serial number declared for a content type, across all groups
    pub fn sequence_number(&self, content_type_id: &str) -> Option<u64> {
        self.sip_sequencing_constraint_groups
            .iter()
            .flat_map(|group| &group.constraint_items)
            .find(|item| item.sip_content_type_id == content_type_id)
            .and_then(|item| item.constraint_serial_number)
    }

    /// Content types in packaging order.
    ///
    /// Ascending serial number; content types without one come after every
    /// sequenced type and keep their declared order among themselves.
    pub fn sorted_content_types(&self) -> Vec<&SipContentType> {
        let mut sorted: Vec<&SipContentType> = self.sip_content_types.iter().collect();
        sorted.sort_by_key(|content_type| {
            let sequence = self.sequence_number(&content_type.sip_content_type_id);
            (sequence.is_none(), sequence)
        });
        sorted
    }

    pub fn project_id(&self) -> &str {
        self.producer_archive_project_id
            .as_deref()
            .map_or("", str::trim)
    }
}
