//! sip-composer - submission information package composer
//!
//! Command line front end: parses arguments, sets up logging and dispatches
//! to the command implementations.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sip_composer::cli::{Cli, Commands};
use sip_composer::commands;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Compose(args) => commands::compose::run(args),
        Commands::Describe(args) => commands::describe::run(args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
