//! Project file (project.yaml) loading
//!
//! A project names the descriptor files to load, the collectors to scan with,
//! and where output goes. Relative paths are resolved like this:
//!
//! ```text
//! descriptors.base_directory   against the project file's directory (default: that directory)
//! descriptors.files            against the descriptor base directory
//! collectors.base_directory    against the project file's directory (default: that directory)
//! output_directory             against the project file's directory (default: that directory)
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::collector::{CollectorRegistry, CollectorSpec};
use crate::compose::{Composer, Composition};
use crate::descriptor::{DescriptorModel, SipConstraints, TypeDescriptor};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{Result, config_invalid, config_not_found, config_parse_failed, config_read_failed};

/// Archive format requested for the produced packages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Packaging {
    None,
    Dir,
    #[default]
    Zip,
    Tar,
    Tgz,
}

impl fmt::Display for Packaging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Packaging::None => "none",
            Packaging::Dir => "dir",
            Packaging::Zip => "zip",
            Packaging::Tar => "tar",
            Packaging::Tgz => "tgz",
        };
        f.write_str(label)
    }
}

/// Descriptor files section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorsSection {
    #[serde(default)]
    pub base_directory: Option<PathBuf>,

    #[serde(default)]
    pub files: Vec<PathBuf>,
}

/// Collectors section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorsSection {
    #[serde(default)]
    pub base_directory: Option<PathBuf>,

    #[serde(default)]
    pub collector: Vec<CollectorSpec>,
}

/// Parsed project.yaml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub output_directory: Option<PathBuf>,

    #[serde(default)]
    pub packaging: Option<Packaging>,

    #[serde(default)]
    pub descriptors: DescriptorsSection,

    #[serde(default)]
    pub collectors: CollectorsSection,
}

impl ProjectConfig {
    /// Parse project configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (index, spec) in self.collectors.collector.iter().enumerate() {
            if spec.type_id.trim().is_empty() {
                return Err(config_invalid(format!(
                    "collector #{} has an empty type_id",
                    index + 1
                )));
            }
        }
        Ok(())
    }
}

/// One descriptor file, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DescriptorDocument {
    TypeDescriptor(TypeDescriptor),
    Constraints(SipConstraints),
    /// Accepted for compatibility, not composed
    CollectionDescriptor(serde_yaml::Mapping),
}

impl DescriptorDocument {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| config_read_failed(path.display().to_string(), e.to_string()))?;
        serde_yaml::from_str(&content)
            .map_err(|e| config_parse_failed(path.display().to_string(), e.to_string()))
    }
}

/// A loaded project, ready to compose
#[derive(Debug)]
pub struct Project {
    path: PathBuf,
    config: ProjectConfig,
    model: DescriptorModel,
    collectors: CollectorRegistry,
    collectors_base: PathBuf,
    output_directory: PathBuf,
    diagnostics: Diagnostics,
}

impl Project {
    /// Load a project file and every descriptor file it names
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(config_not_found(path.display().to_string()));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| config_read_failed(path.display().to_string(), e.to_string()))?;
        let config = ProjectConfig::from_yaml(&content).map_err(|e| match e {
            crate::error::SipError::ConfigParseFailed { reason, .. } => {
                config_parse_failed(path.display().to_string(), reason)
            }
            other => other,
        })?;

        tracing::info!(project = %path.display(), "Loading project");
        Self::from_config(path, config)
    }

    /// Build a project from an already parsed configuration.
    ///
    /// `path` is the project file location relative paths are resolved against.
    pub fn from_config(path: &Path, config: ProjectConfig) -> Result<Self> {
        config.validate()?;
        let project_dir = project_directory(path);
        let mut diagnostics = Diagnostics::new();

        let descriptor_base = resolve(&project_dir, config.descriptors.base_directory.as_deref());
        let mut model = DescriptorModel::new();
        for file in &config.descriptors.files {
            let file = resolve(&descriptor_base, Some(file));
            load_descriptor(&file, &mut model, &mut diagnostics)?;
        }

        let collectors_base = resolve(&project_dir, config.collectors.base_directory.as_deref());
        if !collectors_base.is_dir() {
            diagnostics.warn(
                DiagnosticKind::MissingBaseDirectory,
                format!(
                    "Collectors base directory \"{}\" does not exist",
                    collectors_base.display()
                ),
            );
        }
        let collectors = CollectorRegistry::from_specs(config.collectors.collector.iter().cloned());
        let output_directory = resolve(&project_dir, config.output_directory.as_deref());

        Ok(Self {
            path: path.to_path_buf(),
            config,
            model,
            collectors,
            collectors_base,
            output_directory,
            diagnostics,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn model(&self) -> &DescriptorModel {
        &self.model
    }

    pub fn collectors(&self) -> &CollectorRegistry {
        &self.collectors
    }

    pub fn collectors_base(&self) -> &Path {
        &self.collectors_base
    }

    /// Scan from another directory than the configured one
    pub fn set_collectors_base(&mut self, directory: impl Into<PathBuf>) {
        self.collectors_base = directory.into();
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn packaging(&self) -> Packaging {
        self.config.packaging.unwrap_or_default()
    }

    /// Diagnostics recorded while loading
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Run a composition; loading diagnostics come first in the result
    pub fn compose(&mut self) -> Composition {
        let mut composer = Composer::new(&self.model, &mut self.collectors)
            .with_diagnostics(self.diagnostics.clone());
        let packages = composer.packages(&self.collectors_base);
        composer.finish(packages)
    }
}

fn load_descriptor(
    file: &Path,
    model: &mut DescriptorModel,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    tracing::debug!(file = %file.display(), "Loading descriptor");
    match DescriptorDocument::from_file(file)? {
        DescriptorDocument::TypeDescriptor(descriptor) => {
            if model.insert_type_descriptor(descriptor, diagnostics) {
                tracing::info!(file = %file.display(), "Type descriptor loaded");
            }
        }
        DescriptorDocument::Constraints(constraints) => {
            if model.constraints().is_some() {
                tracing::warn!(file = %file.display(), "SIP constraints replaced");
            }
            model.set_constraints(constraints);
        }
        DescriptorDocument::CollectionDescriptor(_) => {
            diagnostics.warn(
                DiagnosticKind::UnsupportedDescriptor,
                format!(
                    "Collection descriptor \"{}\" is not supported (skipped)",
                    file.display()
                ),
            );
        }
    }
    Ok(())
}

fn project_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn resolve(base: &Path, declared: Option<&Path>) -> PathBuf {
    match declared {
        Some(declared) if declared.is_absolute() => declared.to_path_buf(),
        Some(declared) => base.join(declared),
        None => base.to_path_buf(),
    }
}
