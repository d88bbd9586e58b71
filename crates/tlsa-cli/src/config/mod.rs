//! Configuration management.

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tlsa::{ClientConfig, ProviderClient, UpdaterConfig, DEFAULT_TOKEN_ENV};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Zones whose certificates live in the local store.
    #[serde(default)]
    pub managed_zones: Vec<String>,

    /// TTL of published TLSA records, in seconds.
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Write changes to DNS. When false, updates are only reported.
    #[serde(default = "default_true")]
    pub publish: bool,

    /// Directory holding `<domain>/fullchain.pem`.
    #[serde(default = "default_cert_store")]
    pub cert_store: PathBuf,

    /// Bound on each network step of the live probe, in seconds.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// DNS provider; without it records are printed for manual entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ClientConfig>,
}

fn default_ttl() -> u32 {
    3600
}

fn default_true() -> bool {
    true
}

fn default_cert_store() -> PathBuf {
    PathBuf::from("certs")
}

fn default_probe_timeout() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            managed_zones: Vec::new(),
            ttl: default_ttl(),
            publish: true,
            cert_store: default_cert_store(),
            probe_timeout_secs: default_probe_timeout(),
            provider: None,
        }
    }
}

impl Config {
    /// Get the default config file path.
    pub fn path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("nl", "update-tlsa", "update-tlsa")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Resolve an optional `--config` override to a path.
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        explicit.map_or_else(Self::path, |p| Ok(p.to_path_buf()))
    }

    /// Load configuration from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("invalid configuration in {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Settings for the update pipeline.
    pub fn updater_config(&self) -> UpdaterConfig {
        UpdaterConfig {
            managed_zones: self.managed_zones.clone(),
            ttl: self.ttl,
            publish: self.publish,
            cert_store: self.cert_store.clone(),
            probe_timeout: Duration::from_secs(self.probe_timeout_secs),
        }
    }

    /// Build the provider client.
    ///
    /// Without a `[provider]` table the default provider is used only when
    /// its token environment variable is set; otherwise there is no
    /// publisher and the tool runs in manual mode.
    pub fn publisher(&self) -> Result<Option<ProviderClient>> {
        let provider = match &self.provider {
            Some(provider) => provider.clone(),
            None if std::env::var_os(DEFAULT_TOKEN_ENV).is_some() => ClientConfig::default(),
            None => return Ok(None),
        };

        let client = ProviderClient::from_config(&provider)
            .context("failed to set up the DNS provider client")?;
        Ok(Some(client))
    }

    /// Apply `key = value`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "managed_zones" | "zones" => {
                self.managed_zones = value
                    .split(',')
                    .map(str::trim)
                    .filter(|z| !z.is_empty())
                    .map(String::from)
                    .collect();
            }
            "ttl" => self.ttl = value.parse().context("ttl must be a number of seconds")?,
            "publish" => self.publish = value.parse().context("publish must be true or false")?,
            "cert_store" => self.cert_store = PathBuf::from(value),
            "probe_timeout_secs" => {
                self.probe_timeout_secs = value
                    .parse()
                    .context("probe_timeout_secs must be a number of seconds")?;
            }
            "provider.base_url" => self.provider_mut().base_url = value.to_string(),
            "provider.token" => self.provider_mut().token = Some(value.to_string()),
            "provider.token_env" => self.provider_mut().token_env = Some(value.to_string()),
            "provider.timeout_secs" => {
                self.provider_mut().timeout_secs = value
                    .parse()
                    .context("provider.timeout_secs must be a number of seconds")?;
            }
            _ => {
                anyhow::bail!(
                    "Unknown config key: {}\n\n\
                     Available keys:\n  \
                     managed_zones          - Comma separated zones in the local store\n  \
                     ttl                    - TTL of published records in seconds\n  \
                     publish                - Write changes to DNS (true/false)\n  \
                     cert_store             - Directory holding <domain>/fullchain.pem\n  \
                     probe_timeout_secs     - Live probe timeout in seconds\n  \
                     provider.base_url      - DNS provider API endpoint\n  \
                     provider.token         - DNS provider access token\n  \
                     provider.token_env     - Environment variable holding the token\n  \
                     provider.timeout_secs  - DNS provider request timeout",
                    key
                );
            }
        }
        Ok(())
    }

    fn provider_mut(&mut self) -> &mut ClientConfig {
        self.provider.get_or_insert_with(ClientConfig::default)
    }
}
