//! Output formatting for records and outcomes.

use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use tlsa::{Action, Outcome, Prepared, TlsaError};

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human readable lines with colors
    #[default]
    Pretty,
    /// JSON output
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!(
                "Unknown output format: {}\n\
                 Valid formats: pretty, json",
                s
            ),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// JSON view of a derived record.
#[derive(Debug, Serialize)]
pub struct RecordView<'a> {
    pub zone: &'a str,
    pub name: &'a str,
    #[serde(rename = "type")]
    pub record_type: &'static str,
    pub content: String,
    pub certificate_index: usize,
    pub source: String,
}

impl<'a> RecordView<'a> {
    pub fn new(prepared: &'a Prepared) -> Self {
        Self {
            zone: &prepared.parts.zone,
            name: prepared.owner_name.as_str(),
            record_type: tlsa::TLSA_TYPE,
            content: prepared.record.content(),
            certificate_index: prepared.position,
            source: prepared.source.to_string(),
        }
    }
}

/// JSON view of an update run.
#[derive(Debug, Serialize)]
pub struct UpdateView<'a> {
    #[serde(flatten)]
    pub record: RecordView<'a>,
    /// `noop`, `update` or `insert`; null without a provider
    pub action: Option<&'static str>,
    pub published: bool,
    pub publish_enabled: bool,
}

/// Print the result of `update` as JSON.
pub fn print_update(prepared: &Prepared, outcome: &Outcome, publish_enabled: bool) -> anyhow::Result<()> {
    let view = UpdateView {
        record: RecordView::new(prepared),
        action: outcome.action.map(action_name),
        published: outcome.published,
        publish_enabled,
    };
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

/// Print a derived record.
pub fn print_record(prepared: &Prepared, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&RecordView::new(prepared))?);
        }
        OutputFormat::Pretty => {
            println!("{} {}", "zone:   ".bold(), prepared.parts.zone);
            println!("{} {}", "name:   ".bold(), prepared.owner_name.as_str().cyan());
            println!("{} {}", "content:".bold(), prepared.record.content().green());
        }
    }
    Ok(())
}

/// Print the record for manual entry at the DNS provider.
pub fn print_manual(prepared: &Prepared) {
    println!("create manually the following TLSA record:");
    println!("name:    {}", prepared.owner_name);
    println!("content: {}", prepared.record.content());
}

/// Print the certificates at debug level 2.
pub fn print_certificates(prepared: &Prepared) {
    println!("{}", "Certificate chain:".bold());
    for (index, cert) in prepared.chain.iter().enumerate() {
        let marker = if index == prepared.position {
            " (selected)".green().to_string()
        } else {
            String::new()
        };
        println!("{}{}", format!("[{index}]").dimmed(), marker);
        println!("{}", cert.pem().trim_end());
    }
}

/// Machine-readable name of a reconciliation decision.
pub const fn action_name(action: Action) -> &'static str {
    match action {
        Action::Noop => "noop",
        Action::Update => "update",
        Action::Insert => "insert",
    }
}

/// One-line status of a reconciliation.
pub fn action_message(action: Action) -> &'static str {
    match action {
        Action::Noop => "This TLSA record is already published",
        Action::Update => "TLSA record found but needs to be updated",
        Action::Insert => "Entry not found, adding new one",
    }
}

/// Headline for a failed publish, with the provider's HTTP status when known.
pub fn publish_failure(err: &TlsaError) -> String {
    match err.status_code() {
        Some(status) => format!("DNS not updated (HTTP {status}):"),
        None => "DNS not updated:".to_string(),
    }
}

/// Print the outcome of a publish run.
pub fn print_outcome(outcome: &Outcome, publish_enabled: bool) {
    let Some(action) = outcome.action else {
        return;
    };

    println!("{}", action_message(action));
    if action.needs_publish() && !publish_enabled {
        println!(
            "{}",
            "Publishing is currently turned off, so this DNS update is NOT committed".yellow()
        );
    }
    if outcome.published {
        println!("{}", "DNS updated with new TLSA record".green().bold());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Pretty);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_action_messages() {
        assert!(action_message(Action::Noop).contains("already published"));
        assert!(action_message(Action::Update).contains("needs to be updated"));
        assert!(action_message(Action::Insert).contains("adding"));
        assert_eq!(action_name(Action::Update), "update");
    }

    #[test]
    fn test_publish_failure_names_status() {
        let conflict = TlsaError::Api {
            code: 409,
            message: "conflict".into(),
        };
        assert_eq!(publish_failure(&conflict), "DNS not updated (HTTP 409):");
        assert_eq!(publish_failure(&TlsaError::Unauthorized), "DNS not updated (HTTP 401):");
        assert_eq!(publish_failure(&TlsaError::Timeout(30)), "DNS not updated:");
    }
}
