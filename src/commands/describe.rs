//! Describe command implementation
//!
//! Prints the descriptor tree, collectors base and content types of a
//! project without scanning anything.

use crate::cli::DescribeArgs;
use crate::error::Result;
use crate::project::Project;
use crate::render;

/// Run describe command
pub fn run(args: DescribeArgs) -> Result<()> {
    let project = Project::load(&args.project)?;
    print!("{}", render::describe(&project));

    let diagnostics = project.diagnostics();
    if !diagnostics.is_empty() {
        eprint!("{}", render::diagnostics_text(diagnostics));
    }

    Ok(())
}
