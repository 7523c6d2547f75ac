//! sip-composer - submission information package composer
//!
//! Collects files with glob-pattern collectors and composes them into trees
//! of packages and content containers whose shape honors the minimum and
//! maximum occurrences declared by a descriptor model.
//!
//! The usual entry point is [`project::Project`]: load a project file, then
//! call [`project::Project::compose`]. Library callers that build a
//! [`descriptor::DescriptorModel`] in code can use [`compose::compose`] or a
//! [`compose::Composer`] directly.

pub mod cli;
pub mod collector;
pub mod commands;
pub mod compose;
pub mod descriptor;
pub mod diagnostics;
pub mod error;
pub mod index;
pub mod project;
pub mod render;
pub mod tree;
