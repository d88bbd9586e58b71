//! `update-tlsa config` - CLI configuration management.

use anyhow::Result;
use colored::Colorize;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::output::OutputFormat;

pub fn execute(ctx: &Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(ctx),
        ConfigCommands::Set { key, value } => set_config(ctx, &key, &value),
        ConfigCommands::Path => {
            println!("{}", ctx.config_path.display());
            Ok(())
        }
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&masked(config))?);
        }
        OutputFormat::Pretty => {
            println!("{}", "Current Configuration:".bold());
            println!();

            let zones = if config.managed_zones.is_empty() {
                "(none)".dimmed().to_string()
            } else {
                config.managed_zones.join(", ")
            };
            println!("  {} {}", "managed_zones:".bold(), zones);
            println!("  {} {}", "ttl:".bold(), config.ttl);
            println!("  {} {}", "publish:".bold(), config.publish);
            println!("  {} {}", "cert_store:".bold(), config.cert_store.display());
            println!("  {} {}", "probe_timeout_secs:".bold(), config.probe_timeout_secs);

            match &config.provider {
                Some(provider) => {
                    println!("  {}", "provider:".bold());
                    println!("    {} {}", "base_url:".bold(), provider.base_url);
                    let token = match (&provider.token, &provider.token_env) {
                        (Some(t), _) => mask(t),
                        (None, Some(var)) => format!("${var}"),
                        (None, None) => format!("${}", tlsa::DEFAULT_TOKEN_ENV),
                    };
                    println!("    {} {}", "token:".bold(), token);
                    println!("    {} {}", "timeout_secs:".bold(), provider.timeout_secs);
                }
                None => {
                    println!(
                        "  {} {}",
                        "provider:".bold(),
                        "(not set, records are printed for manual entry)".dimmed()
                    );
                }
            }
        }
    }

    Ok(())
}

fn set_config(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let mut config = ctx.config.clone();
    config.set(key, value)?;
    config.save_to(&ctx.config_path)?;

    let shown = if key == "provider.token" { mask(value) } else { value.to_string() };
    println!("{} {} set to {}.", "Success:".green().bold(), key, shown.cyan());
    Ok(())
}

fn masked(config: &crate::config::Config) -> crate::config::Config {
    let mut config = config.clone();
    if let Some(provider) = config.provider.as_mut() {
        provider.token = provider.token.as_deref().map(mask);
    }
    config
}

fn mask(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "****".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask() {
        assert_eq!(mask("abcdefghijkl"), "abcd...ijkl");
        assert_eq!(mask("short"), "****");
    }

    #[test]
    fn test_masked_config_hides_token() {
        let mut config = crate::config::Config::default();
        config.set("provider.token", "supersecrettoken").unwrap();
        let shown = masked(&config);
        assert_eq!(
            shown.provider.and_then(|p| p.token).as_deref(),
            Some("supe...oken")
        );
    }
}
