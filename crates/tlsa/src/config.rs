//! Updater settings.

use std::path::PathBuf;
use std::time::Duration;

/// Default TTL of published TLSA records, in seconds
pub const DEFAULT_TTL: u32 = 3600;

/// Default per-step bound for the live probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for one [`Updater`](crate::Updater)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdaterConfig {
    /// Zones the operator manages. When set, domains outside these zones are
    /// refused for local retrieval and the zone split follows the list.
    pub managed_zones: Vec<String>,

    /// TTL written on inserted or updated records
    pub ttl: u32,

    /// When false the zone is read and reconciled but never written
    pub publish: bool,

    /// Root of the per-domain certificate store
    pub cert_store: PathBuf,

    /// Bound on each network step of the live probe
    pub probe_timeout: Duration,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            managed_zones: Vec::new(),
            ttl: DEFAULT_TTL,
            publish: true,
            cert_store: PathBuf::from("certs"),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}
