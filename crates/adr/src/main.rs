//! ADR CLI - Architecture Decision Record site generator.
//!
//! Provides commands for:
//! - `build`: Write the static site
//! - `serve`: Start the development server
//! - `validate`: Check records against the authoring conventions
//! - `new`: Create the next numbered record

mod commands;
mod error;
mod output;
mod settings;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, NewArgs, ServeArgs, ValidateArgs};
use error::CliError;
use output::Output;
use settings::CommonArgs;

/// Application version from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// ADR - Architecture Decision Record site generator.
#[derive(Parser)]
#[command(name = "adr", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the static site.
    Build(BuildArgs),
    /// Start the development server.
    Serve(ServeArgs),
    /// Validate ADR files.
    Validate(ValidateArgs),
    /// Create a new ADR from the built-in template.
    New(NewArgs),
}

impl Commands {
    fn common(&self) -> &CommonArgs {
        match self {
            Self::Build(args) => &args.common,
            Self::Serve(args) => &args.common,
            Self::Validate(args) => &args.common,
            Self::New(args) => &args.common,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.common().verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Serve(args) => tokio::runtime::Runtime::new()
            .map_err(CliError::from)
            .and_then(|rt| rt.block_on(args.execute(VERSION))),
        Commands::Validate(args) => args.execute(),
        Commands::New(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_new_with_multiword_title() {
        let cli = Cli::try_parse_from(["adr", "new", "Use", "Postgres", "--status", "Accepted"])
            .unwrap();
        let Commands::New(args) = cli.command else {
            panic!("expected new command");
        };
        assert!(!args.common.verbose);
    }

    #[test]
    fn test_parse_verbose_flag_per_command() {
        let cli = Cli::try_parse_from(["adr", "validate", "--strict", "-v"]).unwrap();
        assert!(cli.command.common().verbose);

        let cli = Cli::try_parse_from(["adr", "serve", "--port", "9000"]).unwrap();
        assert!(!cli.command.common().verbose);
    }

    #[test]
    fn test_serve_cache_flags_conflict() {
        let result = Cli::try_parse_from(["adr", "serve", "--cache", "true", "--no-cache"]);
        assert!(result.is_err());
    }
}
