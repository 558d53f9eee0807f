//! Doctor CLI - Markdown page publisher.
//!
//! Provides commands for:
//! - `render`: Convert a markdown file to page HTML, expanding shortcodes
//! - `shortcodes`: List the registered shortcodes

mod commands;
mod error;
mod output;
mod pipeline;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{RenderArgs, ShortcodesArgs};
use error::CliError;
use output::Output;

/// Doctor - Markdown page publisher.
#[derive(Parser)]
#[command(name = "doctor", version, about)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a markdown file to HTML.
    Render(RenderArgs),
    /// List registered shortcodes.
    Shortcodes(ShortcodesArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli.command) {
        output.failure(&error_chain(&err));
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    let rt = tokio::runtime::Runtime::new()?;
    match command {
        Commands::Render(args) => rt.block_on(args.execute()),
        Commands::Shortcodes(args) => rt.block_on(args.execute()),
    }
}

/// Join an error and its sources with `: `.
///
/// Sources whose text the message already ends with are skipped.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use doctor_shortcodes::{RenderError, ShortcodeError};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_chain_includes_sources() {
        let err = CliError::from(ShortcodeError::Renderer {
            tag: "badge".to_owned(),
            source: RenderError::MissingAttribute("type"),
        });
        assert_eq!(
            error_chain(&err),
            "shortcode \"badge\" failed to render: missing required attribute \"type\""
        );
    }

    #[test]
    fn test_error_chain_skips_repeated_source() {
        let err = CliError::from(doctor_config::ConfigError::Io(std::io::Error::other("denied")));
        assert_eq!(error_chain(&err), "I/O error: denied");
    }

    #[test]
    fn test_cli_parses_render_args() {
        let cli = Cli::try_parse_from([
            "doctor",
            "render",
            "page.md",
            "--strict",
            "--shortcodes-dir",
            "plugins",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Render(_)));
    }

    #[test]
    fn test_cli_verbose_applies_to_every_command() {
        let cli = Cli::try_parse_from(["doctor", "shortcodes", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Shortcodes(_)));

        let cli = Cli::try_parse_from(["doctor", "--verbose", "shortcodes"]).unwrap();
        assert!(cli.verbose);

        let cli = Cli::try_parse_from(["doctor", "shortcodes"]).unwrap();
        assert!(!cli.verbose);
    }
}
