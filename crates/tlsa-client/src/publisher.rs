//! The zone publisher seam.

use async_trait::async_trait;
use tlsa_core::{DnsEntry, Result};

use crate::ProviderClient;

/// An authoritative DNS provider whose zones are replaced as a whole.
///
/// There is no row-level update: [`set_record_set`](Self::set_record_set)
/// must receive the full set, including records this tool does not manage.
/// Two writers interleaving a read and a write on the same zone will lose
/// one of the changes.
#[async_trait]
pub trait ZonePublisher: Send + Sync {
    /// Fetch all current records of `zone`
    async fn get_record_set(&self, zone: &str) -> Result<Vec<DnsEntry>>;

    /// Atomically replace the record set of `zone`
    async fn set_record_set(&self, zone: &str, records: &[DnsEntry]) -> Result<()>;
}

#[async_trait]
impl ZonePublisher for ProviderClient {
    async fn get_record_set(&self, zone: &str) -> Result<Vec<DnsEntry>> {
        self.dns().entries(zone).await
    }

    async fn set_record_set(&self, zone: &str, records: &[DnsEntry]) -> Result<()> {
        self.dns().replace_entries(zone, records).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_read_modify_write_through_trait_object() {
        tokio_test::block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/domains/example.com/dns"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "dnsEntries": [
                        {"name": "@", "expire": 86400, "type": "MX", "content": "10 mx.example.com."}
                    ]
                })))
                .expect(1)
                .mount(&server)
                .await;
            Mock::given(method("PUT"))
                .and(path("/domains/example.com/dns"))
                .respond_with(ResponseTemplate::new(204))
                .expect(1)
                .mount(&server)
                .await;

            let client = ProviderClient::builder("token")
                .base_url(server.uri())
                .build()
                .unwrap();
            let publisher: &dyn ZonePublisher = &client;

            let mut records = publisher.get_record_set("example.com").await.unwrap();
            assert_eq!(records.len(), 1);
            records.push(DnsEntry::tlsa("_443._tcp.www", 3600, "3 1 1 ab"));
            publisher
                .set_record_set("example.com", &records)
                .await
                .unwrap();
        });
    }
}
