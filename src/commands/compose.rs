//! Compose command implementation
//!
//! Loads a project, runs one composition and prints or writes the result.
//! Constraint violations are reported but never change the exit status.

use std::fs;
use std::path::Path;

use crate::cli::{ComposeArgs, OutputFormat};
use crate::compose::Composition;
use crate::error::{Result, file_write_failed, invalid_output_directory};
use crate::project::Project;
use crate::render;

/// Run compose command
pub fn run(args: ComposeArgs) -> Result<()> {
    let mut project = Project::load(&args.project)?;
    if let Some(base) = args.collectors_base {
        tracing::info!(base = %base.display(), "Collectors base overridden");
        project.set_collectors_base(base);
    }

    let composition = project.compose();
    let rendered = render_output(&composition, args.format)?;

    match args.output {
        Some(path) => {
            write_output(&path, &rendered)?;
            eprintln!("Composition written to {}", path.display());
        }
        None => print!("{rendered}"),
    }

    eprintln!("{}", render::summary(&composition));
    Ok(())
}

fn render_output(composition: &Composition, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => render::to_json(composition),
        OutputFormat::Text => {
            let mut text = render::tree_text(composition);
            if !composition.diagnostics().is_empty() {
                text.push_str("\nDiagnostics:\n");
                text.push_str(&render::diagnostics_text(composition.diagnostics()));
            }
            Ok(text)
        }
    }
}

/// Write rendered output; the parent directory must already exist
fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            return Err(invalid_output_directory(parent.display().to_string()));
        }
    }

    let plain = console::strip_ansi_codes(content);
    fs::write(path, plain.as_bytes())
        .map_err(|e| file_write_failed(path.display().to_string(), e.to_string()))
}
