//! DNS zone endpoints.

use crate::ProviderClient;
use serde::{Deserialize, Serialize};
use tlsa_core::{DnsEntry, Result};
use tracing::info;

/// Wire envelope for a zone's record set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsEntries {
    /// Every record of the zone
    #[serde(default)]
    pub dns_entries: Vec<DnsEntry>,
}

/// DNS zone endpoints
pub struct DnsApi<'a> {
    client: &'a ProviderClient,
}

impl<'a> DnsApi<'a> {
    pub(crate) const fn new(client: &'a ProviderClient) -> Self {
        Self { client }
    }

    /// Fetch every record of `zone`
    pub async fn entries(&self, zone: &str) -> Result<Vec<DnsEntry>> {
        let envelope: DnsEntries = self.client.get(&zone_path(zone), zone).await?;
        Ok(envelope.dns_entries)
    }

    /// Replace the complete record set of `zone`.
    ///
    /// The provider drops every record not present in `entries`.
    pub async fn replace_entries(&self, zone: &str, entries: &[DnsEntry]) -> Result<()> {
        let envelope = DnsEntries {
            dns_entries: entries.to_vec(),
        };
        self.client.put(&zone_path(zone), &envelope, zone).await?;
        info!(zone, entries = entries.len(), "replaced zone record set");
        Ok(())
    }
}

fn zone_path(zone: &str) -> String {
    format!("/domains/{}/dns", zone.trim_end_matches('.'))
}
