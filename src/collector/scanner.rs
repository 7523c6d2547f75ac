//! Directory scanning against a pattern set
//!
//! The scan walks the base directory depth-first, visiting the entries of
//! each directory in file-name order so repeated scans agree. Directories
//! that are not selected are only descended into when an include pattern
//! could still match below them. Symlinks are followed and
//! symlink cycles are detected by `walkdir`; unreadable entries and cycles are
//! reported and contribute nothing.

use std::path::{Component, Path};

use walkdir::WalkDir;

use super::pattern::PatternSet;
use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// Relative paths selected by one scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub files: Vec<String>,
    pub directories: Vec<String>,
}

impl ScanResult {
    /// Files first, then directories, each in walk order
    pub fn into_paths(self) -> Vec<String> {
        let mut paths = self.files;
        paths.extend(self.directories);
        paths
    }

    pub fn len(&self) -> usize {
        self.files.len() + self.directories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.directories.is_empty()
    }
}

/// Scanner bound to a pattern set
pub struct DirectoryScanner<'a> {
    patterns: &'a PatternSet,
}

impl<'a> DirectoryScanner<'a> {
    pub fn new(patterns: &'a PatternSet) -> Self {
        Self { patterns }
    }

    /// Scan `base`, returning selected files and directories.
    ///
    /// The base directory itself is a candidate under the empty path `""`.
    /// A missing or non-directory base yields an empty result.
    pub fn scan(&self, base: &Path, diagnostics: &mut Diagnostics) -> ScanResult {
        let mut result = ScanResult::default();

        if !base.is_dir() {
            diagnostics.warn(
                DiagnosticKind::MissingBaseDirectory,
                format!(
                    "Cannot scan \"{}\": does not exist or is not a directory",
                    base.display()
                ),
            );
            return result;
        }

        if self.patterns.is_selected("") {
            result.directories.push(String::new());
        }

        let patterns = self.patterns;
        let walker = WalkDir::new(base)
            .follow_links(true)
            .sort_by_file_name()
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                let name = relative_name(base, entry.path());
                patterns.is_selected(&name) || patterns.could_hold_included(&name)
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    report_walk_error(&err, diagnostics);
                    continue;
                }
            };

            let name = relative_name(base, entry.path());
            let file_type = entry.file_type();
            if file_type.is_dir() {
                if patterns.is_selected(&name) {
                    result.directories.push(name);
                }
            } else if file_type.is_file() && patterns.is_selected(&name) {
                result.files.push(name);
            }
        }

        tracing::debug!(
            base = %base.display(),
            files = result.files.len(),
            directories = result.directories.len(),
            "Scan complete"
        );
        result
    }
}

fn report_walk_error(err: &walkdir::Error, diagnostics: &mut Diagnostics) {
    let path = err
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    if let Some(ancestor) = err.loop_ancestor() {
        diagnostics.warn(
            DiagnosticKind::SymlinkLoop,
            format!(
                "Symlink loop at \"{path}\" back to \"{}\" (not descended)",
                ancestor.display()
            ),
        );
        return;
    }

    // Dangling symlinks are neither files nor directories
    if err
        .io_error()
        .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
    {
        tracing::debug!(path = %path, "Skipping dangling entry");
        return;
    }

    diagnostics.warn(
        DiagnosticKind::UnreadableDirectory,
        format!("Cannot read \"{path}\" (treated as empty): {err}"),
    );
}

/// Forward-slash path of `path` relative to `base`
fn relative_name(base: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
