//! Error types and handling for sip-composer
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Only the outer surfaces (project loading, output writing) fail with a
//! [`SipError`]. Constraint violations found while composing are recorded as
//! [`crate::diagnostics::Diagnostics`] and never abort a composition run.
//!
//! This module is organized into sub-modules by error domain:
//! - [`config`]: Project and descriptor configuration errors
//! - [`fs`]: File system errors
//! - [`output`]: Output rendering errors

pub mod config;
pub mod fs;
pub mod output;

pub use config::{
    invalid as config_invalid, not_found as config_not_found, parse_failed as config_parse_failed,
    read_failed as config_read_failed,
};
pub use fs::write_failed as file_write_failed;
pub use output::{invalid_directory as invalid_output_directory, render_failed};

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for sip-composer operations
#[derive(Error, Diagnostic, Debug)]
pub enum SipError {
    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(sip::config::not_found),
        help("Pass the project file with --project or the SIP_PROJECT environment variable")
    )]
    ConfigNotFound { path: String },

    #[error("Failed to read configuration file: {path}: {reason}")]
    #[diagnostic(code(sip::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(
        code(sip::config::parse_failed),
        help("Descriptor files must declare a `kind` of type_descriptor, constraints or collection_descriptor")
    )]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(sip::config::invalid))]
    ConfigInvalid { message: String },

    // File system errors
    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(sip::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(sip::fs::io_error))]
    IoError { message: String },

    // Output errors
    #[error("Invalid output directory: {path}")]
    #[diagnostic(
        code(sip::output::invalid_directory),
        help("The output directory must exist and be a directory")
    )]
    InvalidOutputDirectory { path: String },

    #[error("Failed to render composition: {reason}")]
    #[diagnostic(code(sip::output::render_failed))]
    RenderFailed { reason: String },

    // CLI errors
    #[error("Unknown shell: {shell}")]
    #[diagnostic(
        code(sip::cli::unsupported_shell),
        help("Supported shells: bash, elvish, fish, powershell, zsh")
    )]
    UnsupportedShell { shell: String },
}

impl From<std::io::Error> for SipError {
    fn from(err: std::io::Error) -> Self {
        SipError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for SipError {
    fn from(err: serde_yaml::Error) -> Self {
        SipError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for SipError {
    fn from(err: serde_json::Error) -> Self {
        render_failed(err.to_string())
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, SipError>;
