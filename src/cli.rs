//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// sip-composer - submission information package composer
///
/// Collect files and compose them into constrained package trees.
#[derive(Parser, Debug)]
#[command(
    name = "sip-composer",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Composes submission information packages from descriptor models",
    long_about = "sip-composer collects files with glob-pattern collectors and composes them \
                  into a tree of packages and content containers that honors the minimum and \
                  maximum occurrences declared by the project's descriptors.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  sip-composer compose --project project.yaml\n    \
                  sip-composer compose --project project.yaml --format json --output sips.json\n    \
                  sip-composer describe --project project.yaml"
)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect files and compose packages
    Compose(ComposeArgs),

    /// Show the descriptor tree of a project
    Describe(DescribeArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Output format of the compose command
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Arguments for the compose command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Compose and print the package tree:\n    sip-composer compose --project project.yaml\n\n\
                  Scan another data directory:\n    sip-composer compose --project project.yaml --collectors-base /data/incoming\n\n\
                  Write the composition as JSON:\n    sip-composer compose --project project.yaml --format json --output sips.json")]
pub struct ComposeArgs {
    /// Project file
    #[arg(long, short = 'p', env = "SIP_PROJECT", value_name = "FILE")]
    pub project: PathBuf,

    /// Collectors base directory (overrides the project's)
    #[arg(long, value_name = "DIR")]
    pub collectors_base: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write the output to a file instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments for the describe command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show the descriptor tree:\n    sip-composer describe --project project.yaml")]
pub struct DescribeArgs {
    /// Project file
    #[arg(long, short = 'p', env = "SIP_PROJECT", value_name = "FILE")]
    pub project: PathBuf,
}

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    sip-composer completions --shell bash > ~/.bash_completion.d/sip-composer\n\n\
                  Generate zsh completions:\n    sip-composer completions --shell zsh > ~/.zfunc/_sip-composer\n\n\
                  Generate fish completions:\n    sip-composer completions --shell fish > ~/.config/fish/completions/sip-composer.fish")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    #[arg(long)]
    pub shell: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_compose() {
        let cli = Cli::try_parse_from(["sip-composer", "compose", "--project", "project.yaml"]).unwrap();
        match cli.command {
            Commands::Compose(args) => {
                assert_eq!(args.project, PathBuf::from("project.yaml"));
                assert_eq!(args.collectors_base, None);
                assert_eq!(args.format, OutputFormat::Text);
                assert_eq!(args.output, None);
            }
            _ => panic!("Expected Compose command"),
        }
    }

    #[test]
    fn test_cli_parsing_compose_with_options() {
        let cli = Cli::try_parse_from([
            "sip-composer",
            "compose",
            "-p",
            "project.yaml",
            "--collectors-base",
            "/data",
            "--format",
            "json",
            "-o",
            "out.json",
        ])
        .unwrap();
        match cli.command {
            Commands::Compose(args) => {
                assert_eq!(args.collectors_base, Some(PathBuf::from("/data")));
                assert_eq!(args.format, OutputFormat::Json);
                assert_eq!(args.output, Some(PathBuf::from("out.json")));
            }
            _ => panic!("Expected Compose command"),
        }
    }

    #[test]
    fn test_cli_parsing_describe() {
        let cli = Cli::try_parse_from(["sip-composer", "describe", "--project", "p.yaml"]).unwrap();
        match cli.command {
            Commands::Describe(args) => {
                assert_eq!(args.project, PathBuf::from("p.yaml"));
            }
            _ => panic!("Expected Describe command"),
        }
    }

    #[test]
    fn test_cli_parsing_version() {
        let cli = Cli::try_parse_from(["sip-composer", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_cli_global_verbose() {
        let cli = Cli::try_parse_from(["sip-composer", "version", "-v"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        let result = Cli::try_parse_from([
            "sip-composer",
            "compose",
            "--project",
            "p.yaml",
            "--format",
            "xml",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parsing_completions() {
        let cli = Cli::try_parse_from(["sip-composer", "completions", "--shell", "bash"]).unwrap();
        match cli.command {
            Commands::Completions(args) => {
                assert_eq!(args.shell, "bash");
            }
            _ => panic!("Expected Completions command"),
        }
    }
}
