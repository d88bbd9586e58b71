use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TlsaError};

/// Record type string for TLSA entries
pub const TLSA_TYPE: &str = "TLSA";

/// A single resource record as held by the zone provider.
///
/// Names are relative to the zone (`_443._tcp.www`), the TTL travels as
/// `expire` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsEntry {
    /// Owner name relative to the zone
    pub name: String,

    /// Time to live in seconds
    #[serde(rename = "expire")]
    pub ttl: u32,

    /// Record type (A, MX, TLSA, ...)
    #[serde(rename = "type")]
    pub record_type: String,

    /// Record content in presentation format
    pub content: String,
}

impl DnsEntry {
    /// Create a TLSA entry
    #[must_use]
    pub fn tlsa(name: impl Into<String>, ttl: u32, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ttl,
            record_type: TLSA_TYPE.to_string(),
            content: content.into(),
        }
    }

    /// Returns true if this is a TLSA record
    #[must_use]
    pub fn is_tlsa(&self) -> bool {
        self.record_type.eq_ignore_ascii_case(TLSA_TYPE)
    }
}

/// TLSA owner name relative to its zone, `_<port>._tcp.<subdomain>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnerName(String);

impl OwnerName {
    /// Owner name for `port` below `subdomain`; an empty subdomain is the apex
    #[must_use]
    pub fn new(port: u16, subdomain: &str) -> Self {
        if subdomain.is_empty() {
            Self(format!("_{port}._tcp"))
        } else {
            Self(format!("_{port}._tcp.{subdomain}"))
        }
    }

    /// Borrow the name
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A domain split into the managed zone and the host part below it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainParts {
    /// Zone apex, e.g. `example.com`
    pub zone: String,
    /// Part left of the zone, e.g. `www`; empty at the apex
    pub subdomain: String,
}

impl DomainParts {
    /// Split `domain` against the configured managed zones.
    ///
    /// The longest matching zone wins. With no managed zones configured the
    /// naive split of [`DomainParts::split_naive`] is used.
    pub fn resolve(domain: &str, managed_zones: &[String]) -> Result<Self> {
        if managed_zones.is_empty() {
            return Self::split_naive(domain);
        }

        let domain = normalize(domain);
        managed_zones
            .iter()
            .map(|z| normalize(z))
            .filter_map(|zone| {
                if domain == zone {
                    Some((zone, String::new()))
                } else {
                    domain
                        .strip_suffix(&zone)
                        .and_then(|rest| rest.strip_suffix('.'))
                        .filter(|sub| !sub.is_empty())
                        .map(|sub| (zone.clone(), sub.to_string()))
                }
            })
            .max_by_key(|(zone, _)| zone.len())
            .map(|(zone, subdomain)| Self { zone, subdomain })
            .ok_or(TlsaError::ZoneNotManaged { domain })
    }

    /// Treat the last two labels as the zone and everything else as host part
    pub fn split_naive(domain: &str) -> Result<Self> {
        let domain = normalize(domain);
        let labels: Vec<&str> = domain.split('.').collect();
        if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
            return Err(TlsaError::InvalidDomain(domain));
        }

        let split = labels.len() - 2;
        Ok(Self {
            zone: labels[split..].join("."),
            subdomain: labels[..split].join("."),
        })
    }

    /// TLSA owner name for a service on `port`
    #[must_use]
    pub fn owner_name(&self, port: u16) -> OwnerName {
        OwnerName::new(port, &self.subdomain)
    }
}

fn normalize(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zones(list: &[&str]) -> Vec<String> {
        list.iter().map(|z| (*z).to_string()).collect()
    }

    #[test]
    fn test_owner_name() {
        assert_eq!(OwnerName::new(443, "www").as_str(), "_443._tcp.www");
        assert_eq!(OwnerName::new(25, "mail.eu").to_string(), "_25._tcp.mail.eu");
        assert_eq!(OwnerName::new(443, "").as_str(), "_443._tcp");
    }

    #[test]
    fn test_resolve_against_managed_zones() {
        let parts =
            DomainParts::resolve("www.example.com", &zones(&["example.org", "example.com"]))
                .unwrap();
        assert_eq!(parts.zone, "example.com");
        assert_eq!(parts.subdomain, "www");
        assert_eq!(parts.owner_name(443).as_str(), "_443._tcp.www");
    }

    #[test]
    fn test_resolve_longest_zone_wins() {
        let parts = DomainParts::resolve(
            "mx.mail.example.co.uk",
            &zones(&["co.uk", "example.co.uk"]),
        )
        .unwrap();
        assert_eq!(parts.zone, "example.co.uk");
        assert_eq!(parts.subdomain, "mx.mail");
    }

    #[test]
    fn test_resolve_apex_and_case() {
        let parts = DomainParts::resolve("Example.COM.", &zones(&["example.com"])).unwrap();
        assert_eq!(parts.zone, "example.com");
        assert_eq!(parts.subdomain, "");
    }

    #[test]
    fn test_resolve_does_not_match_label_fragments() {
        let err = DomainParts::resolve("www.notexample.com", &zones(&["example.com"]))
            .unwrap_err();
        assert!(matches!(err, TlsaError::ZoneNotManaged { .. }));
    }

    #[test]
    fn test_naive_split() {
        let parts = DomainParts::resolve("smtp.mx.example.net", &[]).unwrap();
        assert_eq!(parts.zone, "example.net");
        assert_eq!(parts.subdomain, "smtp.mx");

        assert!(DomainParts::split_naive("localhost").is_err());
        assert!(DomainParts::split_naive("a..b").is_err());
    }

    #[test]
    fn test_dns_entry_wire_names() {
        let entry = DnsEntry::tlsa("_443._tcp.www", 3600, "3 1 1 ab");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["expire"], 3600);
        assert_eq!(json["type"], "TLSA");
        assert!(entry.is_tlsa());
    }
}
