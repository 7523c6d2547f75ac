//! Diagnostics collected during a composition run
//!
//! Configuration problems and constraint violations never abort a run. They
//! are normalized to a safe default at the point of detection, recorded here,
//! and mirrored to `tracing` so they also show up in the log.

use std::fmt;

use serde::Serialize;

/// Severity of a recorded diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// What a diagnostic is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A declared maximum occurrence was zero or negative
    InvalidMaximum,
    /// A declared minimum occurrence was zero or negative
    InvalidMinimum,
    /// Fewer instances than the declared minimum
    BelowMinimum,
    /// More instances than the declared maximum
    AboveMaximum,
    /// A descriptor without identification or with an empty identifier
    MissingIdentifier,
    /// An authorized descriptor reference that resolves to nothing
    UnknownDescriptor,
    MissingDescription,
    MissingOccurrence,
    UnreadableDirectory,
    MissingBaseDirectory,
    SymlinkLoop,
    /// A content type that produced no package
    EmptyContentType,
    /// A transfer object outside the declared size range, or a bad size declaration
    SizeConstraint,
    UnsupportedDescriptor,
}

/// A single recorded diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Ordered collection of diagnostics for one run
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and emit it through `tracing`
    pub fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(kind = ?kind, "{message}");
        self.entries.push(Diagnostic {
            severity: Severity::Warning,
            kind,
            message,
        });
    }

    /// Record an error and emit it through `tracing`
    pub fn error(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(kind = ?kind, "{message}");
        self.entries.push(Diagnostic {
            severity: Severity::Error,
            kind,
            message,
        });
    }

    /// Append every entry of another collection, keeping order
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count entries of a given kind
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
