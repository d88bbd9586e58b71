//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Create and update DANE TLSA records
///
/// Derives a TLSA record from a certificate issued by an ACME client such as
/// dehydrated, or from the chain a server currently presents, and publishes
/// it at your DNS provider.
#[derive(Parser, Debug)]
#[command(name = "update-tlsa")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (default: platform config directory)
    #[arg(short, long, env = "UPDATE_TLSA_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Explain what the requested TLSA type code means
    #[arg(long, global = true)]
    pub explain: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Derive a TLSA record and publish it in DNS
    Update(UpdateArgs),

    /// Derive a TLSA record and print it, without touching DNS
    Show(TargetArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),
}

// ============================================================================
// Shared target arguments
// ============================================================================

#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Fully qualified domain name of the host certificate
    #[arg(short = 'H', long)]
    pub host: String,

    /// TLSA record type, e.g. 311 for "3 1 1"
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub code: String,

    /// TCP port used by the service
    #[arg(short, long, default_value = "443")]
    pub port: u16,

    /// IP address to fetch the published certificate from.
    /// Useful in split DNS setups where no local certificate is available.
    #[arg(short, long, value_name = "IP")]
    pub ip: Option<String>,

    /// Debug level: 0 quiet, 1 info, 2 also show certificates
    #[arg(
        short,
        long,
        default_value = "0",
        value_parser = clap::value_parser!(u8).range(0..=2)
    )]
    pub debug: u8,
}

// ============================================================================
// Update command
// ============================================================================

#[derive(Args, Debug)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Reconcile against the zone but do not write it
    #[arg(long)]
    pub dry_run: bool,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (managed_zones, ttl, publish, cert_store,
        /// probe_timeout_secs, provider.base_url, provider.token,
        /// provider.token_env, provider.timeout_secs)
        key: String,

        /// Value to set
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_update_short_flags() {
        let cli = Cli::parse_from([
            "update-tlsa", "update", "-H", "www.example.com", "-t", "311", "-p", "25", "-i",
            "192.0.2.1", "-d", "2", "--dry-run",
        ]);
        match cli.command {
            Commands::Update(args) => {
                assert_eq!(args.target.host, "www.example.com");
                assert_eq!(args.target.code, "311");
                assert_eq!(args.target.port, 25);
                assert_eq!(args.target.ip.as_deref(), Some("192.0.2.1"));
                assert_eq!(args.target.debug, 2);
                assert!(args.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["update-tlsa", "show", "-H", "example.com", "-t", "301"]);
        match cli.command {
            Commands::Show(args) => {
                assert_eq!(args.port, 443);
                assert_eq!(args.debug, 0);
                assert!(args.ip.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_debug_level_is_bounded() {
        let result = Cli::try_parse_from([
            "update-tlsa", "update", "-H", "example.com", "-t", "311", "-d", "3",
        ]);
        assert!(result.is_err());
    }
}
