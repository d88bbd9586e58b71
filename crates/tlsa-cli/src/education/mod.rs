//! Educational features: what a TLSA type code asks for.

use colored::Colorize;

use tlsa::{CertificateUsage, MatchingType, Selector, TlsaTypeCode};

/// Command explanation builder.
pub struct Explain {
    description: String,
    record: Option<String>,
    what_happens: Vec<String>,
    learn_more: Option<String>,
}

impl Explain {
    fn new() -> Self {
        Self {
            description: String::new(),
            record: None,
            what_happens: Vec::new(),
            learn_more: None,
        }
    }

    fn description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }

    fn record(mut self, owner: &str) -> Self {
        self.record = Some(owner.to_string());
        self
    }

    fn step(mut self, step: &str) -> Self {
        self.what_happens.push(step.to_string());
        self
    }

    fn rfc(mut self, number: u32, section: &str) -> Self {
        self.learn_more = Some(format!(
            "https://www.rfc-editor.org/rfc/rfc{number}#section-{section}"
        ));
        self
    }

    /// Print the explanation to stdout.
    pub fn print(&self) {
        println!();
        println!("{}", "=== What This Does ===".bold().cyan());
        println!("{}", self.description);
        println!();

        if !self.what_happens.is_empty() {
            println!("{}", "How it works:".bold());
            for (i, step) in self.what_happens.iter().enumerate() {
                println!("  {}. {}", i + 1, step);
            }
            println!();
        }

        if let Some(record) = &self.record {
            println!("{} {}", "Record:".bold(), record.dimmed());
        }

        if let Some(url) = &self.learn_more {
            println!();
            println!("{} {}", "Learn more:".bold(), url.cyan().underline());
        }

        println!();
        println!("{}", "=== Results ===".bold().cyan());
        println!();
    }

    /// Explain `code` for a service on `port`.
    pub fn type_code(code: TlsaTypeCode, port: u16) -> Self {
        Self::new()
            .description(&format!(
                "Publishes a TLSA {} ({} {} {}) record for the service on TCP port {}.",
                code.presentation(),
                code.usage.acronym(),
                code.selector.acronym(),
                code.matching_type.acronym(),
                port
            ))
            .record(&format!("_{port}._tcp.<host> TLSA {} <data>", code.presentation()))
            .step(usage_step(code.usage))
            .step(selector_step(code.selector))
            .step(matching_step(code.matching_type))
            .step("Compares with the zone and writes the whole record set back if it changed")
            .rfc(6698, "2.1")
    }
}

fn usage_step(usage: CertificateUsage) -> &'static str {
    match usage {
        CertificateUsage::CaConstraint => {
            "Usage 0 (PKIX-TA): pins a CA from the chain; the first certificate after the leaf is used"
        }
        CertificateUsage::ServiceCertificateConstraint => {
            "Usage 1 (PKIX-EE): pins the server certificate, which must also pass PKIX validation"
        }
        CertificateUsage::TrustAnchorAssertion => {
            "Usage 2 (DANE-TA): pins the issuing CA as trust anchor; the first certificate after the leaf is used"
        }
        CertificateUsage::DomainIssuedCertificate => {
            "Usage 3 (DANE-EE): pins the server certificate itself, no CA involved"
        }
    }
}

fn selector_step(selector: Selector) -> &'static str {
    match selector {
        Selector::FullCertificate => {
            "Selector 0: hashes the full certificate, so the record changes on every renewal"
        }
        Selector::SubjectPublicKeyInfo => {
            "Selector 1: hashes only the public key, so the record survives renewals that keep the key"
        }
    }
}

fn matching_step(matching: MatchingType) -> &'static str {
    match matching {
        MatchingType::Exact => "Matching type 0: publishes the selected bytes unhashed",
        MatchingType::Sha256 => "Matching type 1: publishes a SHA-256 digest (64 hex digits)",
        MatchingType::Sha512 => "Matching type 2: publishes a SHA-512 digest (128 hex digits)",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explain_type_code() {
        let explain = Explain::type_code("311".parse().unwrap(), 25);
        assert!(explain.description.contains("3 1 1"));
        assert!(explain.description.contains("DANE-EE SPKI SHA2-256"));
        assert_eq!(explain.record.as_deref(), Some("_25._tcp.<host> TLSA 3 1 1 <data>"));
        assert_eq!(explain.what_happens.len(), 4);
        assert!(explain.what_happens[1].starts_with("Selector 1"));
    }
}
