//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let debug = match &cli.command {
        Commands::Update(args) => args.target.debug,
        Commands::Show(args) => args.debug,
        Commands::Config(_) => 0,
    };
    init_logging(debug);

    // Load configuration
    let config_path = Config::resolve_path(cli.config.as_deref())?;
    let config = Config::load_from(&config_path)?;

    // Create context for commands
    let ctx = commands::Context {
        config,
        config_path,
        output_format: cli.output.unwrap_or_default(),
        explain: cli.explain,
    };

    // Dispatch to appropriate command
    match cli.command {
        Commands::Update(args) => commands::update::execute(ctx, args).await,
        Commands::Show(args) => commands::show::execute(ctx, args).await,
        Commands::Config(args) => commands::config::execute(&ctx, args),
    }
}

/// Filter directive for a `--debug` level.
pub const fn log_level(debug: u8) -> &'static str {
    match debug {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Install the stderr log subscriber; `RUST_LOG` wins over `--debug`.
fn init_logging(debug: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(debug)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(0), "warn");
        assert_eq!(log_level(1), "info");
        assert_eq!(log_level(2), "debug");
    }
}
