//! Pattern-based file collection
//!
//! A [`Collector`] enumerates the files and directories below a base
//! directory that match its [`CollectorSpec`]. Results are memoized per
//! resolved absolute base directory in an injected [`ScanCache`]: the
//! filesystem is assumed not to change during one composition run, so a base
//! directory is scanned at most once.
//!
//! ## Base directory resolution
//!
//! ```text
//! declared base   caller base   scanned directory
//! (none)          /data         /data
//! sub/dir         /data         /data/sub/dir
//! /elsewhere      /data         /data            (absolute declaration ignored)
//! ```

pub mod pattern;
pub mod scanner;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use pattern::PatternSet;
use scanner::DirectoryScanner;

fn default_case_sensitive() -> bool {
    true
}

/// Declarative file-collection rule for one descriptor type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorSpec {
    /// Descriptor type identifier this rule serves
    pub type_id: String,

    /// Include patterns, in order (empty means everything)
    #[serde(default)]
    pub include: Vec<String>,

    /// Exclude patterns (empty means nothing)
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default = "default_case_sensitive")]
    pub case_sensitive: bool,

    /// Optional base directory, relative to the caller-supplied one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_directory: Option<PathBuf>,

    /// Also exclude the usual VCS and editor droppings
    #[serde(default)]
    pub default_excludes: bool,
}

impl CollectorSpec {
    pub fn new(type_id: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            include: Vec::new(),
            exclude: Vec::new(),
            case_sensitive: true,
            base_directory: None,
            default_excludes: false,
        }
    }

    #[must_use]
    pub fn include<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = patterns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = patterns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    #[must_use]
    pub fn base_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.base_directory = Some(directory.into());
        self
    }
}

/// Scan results keyed by absolute base directory
#[derive(Debug, Default, Clone)]
pub struct ScanCache {
    results: HashMap<String, Rc<[String]>>,
}

impl ScanCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Rc<[String]>> {
        self.results.get(key).cloned()
    }

    pub fn insert(&mut self, key: String, paths: Rc<[String]>) {
        self.results.insert(key, paths);
    }

    /// Record the result for a directory under its absolute key
    pub fn insert_directory(&mut self, directory: &Path, paths: impl Into<Rc<[String]>>) {
        self.results.insert(cache_key(directory), paths.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.results.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }
}

/// A collector: immutable spec, compiled patterns, and its own cache
#[derive(Debug, Clone)]
pub struct Collector {
    spec: CollectorSpec,
    patterns: PatternSet,
    cache: ScanCache,
}

impl Collector {
    pub fn new(spec: CollectorSpec) -> Self {
        Self::with_cache(spec, ScanCache::new())
    }

    /// Build a collector around an existing cache
    pub fn with_cache(spec: CollectorSpec, cache: ScanCache) -> Self {
        let mut patterns = PatternSet::new(&spec.include, &spec.exclude, spec.case_sensitive);
        if spec.default_excludes {
            patterns = patterns.with_default_excludes();
        }
        Self {
            spec,
            patterns,
            cache,
        }
    }

    pub fn spec(&self) -> &CollectorSpec {
        &self.spec
    }

    pub fn type_id(&self) -> &str {
        &self.spec.type_id
    }

    pub fn cache(&self) -> &ScanCache {
        &self.cache
    }

    /// Directory actually scanned for a caller-supplied base.
    ///
    /// A relative declared base is joined onto `base`; an absolute declared
    /// base is ignored and `base` is used as is.
    pub fn resolve_base_directory(&self, base: &Path) -> PathBuf {
        match &self.spec.base_directory {
            Some(declared) if declared.is_relative() => base.join(declared),
            _ => base.to_path_buf(),
        }
    }

    /// Relative paths of matching files, then matching directories.
    ///
    /// Served from the cache when this resolved base directory was already
    /// scanned.
    pub fn collect(&mut self, base: &Path, diagnostics: &mut Diagnostics) -> Rc<[String]> {
        let resolved = self.resolve_base_directory(base);
        let key = cache_key(&resolved);

        if let Some(paths) = self.cache.get(&key) {
            tracing::debug!(type_id = %self.spec.type_id, base = %key, "Scan served from cache");
            return paths;
        }

        tracing::info!(type_id = %self.spec.type_id, base = %key, "Collecting files");
        let paths: Rc<[String]> = DirectoryScanner::new(&self.patterns)
            .scan(&resolved, diagnostics)
            .into_paths()
            .into();
        self.cache.insert(key, Rc::clone(&paths));
        paths
    }
}

/// Absolute, lossy string form of a directory
fn cache_key(directory: &Path) -> String {
    std::path::absolute(directory)
        .unwrap_or_else(|_| directory.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

/// Collectors keyed by the type identifier they serve
#[derive(Debug, Default, Clone)]
pub struct CollectorRegistry {
    collectors: HashMap<String, Collector>,
}

impl CollectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from specs; a later spec for the same type id replaces an earlier one
    pub fn from_specs(specs: impl IntoIterator<Item = CollectorSpec>) -> Self {
        let mut registry = Self::new();
        for spec in specs {
            registry.insert(Collector::new(spec));
        }
        registry
    }

    pub fn insert(&mut self, collector: Collector) {
        let type_id = collector.type_id().to_string();
        tracing::info!(type_id = %type_id, "Collector added");
        if self.collectors.insert(type_id.clone(), collector).is_some() {
            tracing::warn!(type_id = %type_id, "Collector replaced an earlier one for the same type");
        }
    }

    pub fn get(&self, type_id: &str) -> Option<&Collector> {
        self.collectors.get(type_id)
    }

    pub fn get_mut(&mut self, type_id: &str) -> Option<&mut Collector> {
        self.collectors.get_mut(type_id)
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.collectors.contains_key(type_id)
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }
}
