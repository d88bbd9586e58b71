use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TlsaError};

/// TLSA certificate usage as described in
/// [RFC 6698 section 2.1.1](https://datatracker.ietf.org/doc/html/rfc6698#section-2.1.1)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CertificateUsage {
    /// PKIX-TA: a CA certificate that must appear in the PKIX path
    CaConstraint = 0,
    /// PKIX-EE: the end-entity certificate, PKIX validation still applies
    ServiceCertificateConstraint = 1,
    /// DANE-TA: a certificate acting as trust anchor for the path
    TrustAnchorAssertion = 2,
    /// DANE-EE: the end-entity certificate, no PKIX validation
    DomainIssuedCertificate = 3,
}

impl CertificateUsage {
    /// Numeric value as written in the record
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Usages 1 and 3 point at the end-entity (leaf) certificate
    #[must_use]
    pub const fn targets_end_entity(self) -> bool {
        matches!(
            self,
            Self::ServiceCertificateConstraint | Self::DomainIssuedCertificate
        )
    }

    /// Short mnemonic from RFC 7218
    #[must_use]
    pub const fn acronym(self) -> &'static str {
        match self {
            Self::CaConstraint => "PKIX-TA",
            Self::ServiceCertificateConstraint => "PKIX-EE",
            Self::TrustAnchorAssertion => "DANE-TA",
            Self::DomainIssuedCertificate => "DANE-EE",
        }
    }
}

impl TryFrom<u8> for CertificateUsage {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, u8> {
        match value {
            0 => Ok(Self::CaConstraint),
            1 => Ok(Self::ServiceCertificateConstraint),
            2 => Ok(Self::TrustAnchorAssertion),
            3 => Ok(Self::DomainIssuedCertificate),
            other => Err(other),
        }
    }
}

/// Which part of the certificate is matched
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selector {
    /// The full DER-encoded certificate
    FullCertificate = 0,
    /// The DER-encoded SubjectPublicKeyInfo
    SubjectPublicKeyInfo = 1,
}

impl Selector {
    /// Numeric value as written in the record
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Short mnemonic from RFC 7218
    #[must_use]
    pub const fn acronym(self) -> &'static str {
        match self {
            Self::FullCertificate => "Cert",
            Self::SubjectPublicKeyInfo => "SPKI",
        }
    }
}

impl TryFrom<u8> for Selector {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, u8> {
        match value {
            0 => Ok(Self::FullCertificate),
            1 => Ok(Self::SubjectPublicKeyInfo),
            other => Err(other),
        }
    }
}

/// How the selected content is presented in the record
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchingType {
    /// The selected bytes themselves
    Exact = 0,
    /// SHA-256 of the selected bytes
    Sha256 = 1,
    /// SHA-512 of the selected bytes
    Sha512 = 2,
}

impl MatchingType {
    /// Numeric value as written in the record
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Short mnemonic from RFC 7218
    #[must_use]
    pub const fn acronym(self) -> &'static str {
        match self {
            Self::Exact => "Full",
            Self::Sha256 => "SHA2-256",
            Self::Sha512 => "SHA2-512",
        }
    }
}

impl TryFrom<u8> for MatchingType {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, u8> {
        match value {
            0 => Ok(Self::Exact),
            1 => Ok(Self::Sha256),
            2 => Ok(Self::Sha512),
            other => Err(other),
        }
    }
}

/// A three digit TLSA type code such as `311`.
///
/// Digit one is the usage, digit two the selector and digit three the
/// matching type. Parsing rejects anything that is not exactly three ASCII
/// digits within the assigned ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TlsaTypeCode {
    /// Certificate usage
    pub usage: CertificateUsage,
    /// Selector
    pub selector: Selector,
    /// Matching type
    pub matching_type: MatchingType,
}

impl TlsaTypeCode {
    /// Create a code from its parts
    #[must_use]
    pub const fn new(
        usage: CertificateUsage,
        selector: Selector,
        matching_type: MatchingType,
    ) -> Self {
        Self {
            usage,
            selector,
            matching_type,
        }
    }

    /// The three numeric fields, as they lead the record content
    #[must_use]
    pub const fn fields(&self) -> (u8, u8, u8) {
        (
            self.usage.value(),
            self.selector.value(),
            self.matching_type.value(),
        )
    }

    /// Space separated presentation, e.g. `3 1 1`
    #[must_use]
    pub fn presentation(&self) -> String {
        let (u, s, m) = self.fields();
        format!("{u} {s} {m}")
    }
}

impl FromStr for TlsaTypeCode {
    type Err = TlsaError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 3 {
            return Err(TlsaError::invalid_code(
                s,
                "expected exactly three digits, e.g. 311",
            ));
        }
        if let Some(bad) = bytes.iter().find(|b| !b.is_ascii_digit()) {
            return Err(TlsaError::invalid_code(
                s,
                format!("{:?} is not a digit", char::from(*bad)),
            ));
        }

        let usage = CertificateUsage::try_from(bytes[0] - b'0')
            .map_err(|v| TlsaError::invalid_code(s, format!("usage {v} is not one of 0-3")))?;
        let selector = Selector::try_from(bytes[1] - b'0')
            .map_err(|v| TlsaError::invalid_code(s, format!("selector {v} is not 0 or 1")))?;
        let matching_type = MatchingType::try_from(bytes[2] - b'0').map_err(|v| {
            TlsaError::invalid_code(s, format!("matching type {v} is not one of 0-2"))
        })?;

        Ok(Self::new(usage, selector, matching_type))
    }
}

impl fmt::Display for TlsaTypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (u, s, m) = self.fields();
        write!(f, "{u}{s}{m}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_codes() {
        let code: TlsaTypeCode = "311".parse().unwrap();
        assert_eq!(code.usage, CertificateUsage::DomainIssuedCertificate);
        assert_eq!(code.selector, Selector::SubjectPublicKeyInfo);
        assert_eq!(code.matching_type, MatchingType::Sha256);
        assert_eq!(code.to_string(), "311");
        assert_eq!(code.presentation(), "3 1 1");

        let code: TlsaTypeCode = "202".parse().unwrap();
        assert_eq!(code.fields(), (2, 0, 2));
    }

    #[test]
    fn test_every_assigned_code_parses() {
        for u in 0..=3 {
            for s in 0..=1 {
                for m in 0..=2 {
                    let text = format!("{u}{s}{m}");
                    let code: TlsaTypeCode = text.parse().unwrap();
                    assert_eq!(code.to_string(), text);
                }
            }
        }
    }

    #[test]
    fn test_reject_non_digits() {
        let err = "3a1".parse::<TlsaTypeCode>().unwrap_err();
        assert!(matches!(err, TlsaError::InvalidTypeCode { .. }));
        assert!(err.to_string().contains("'a'"));
        assert!(" 31".parse::<TlsaTypeCode>().is_err());
        assert!("3 1 1".parse::<TlsaTypeCode>().is_err());
        assert!("٣١١".parse::<TlsaTypeCode>().is_err());
    }

    #[test]
    fn test_reject_wrong_length() {
        assert!("".parse::<TlsaTypeCode>().is_err());
        assert!("31".parse::<TlsaTypeCode>().is_err());
        assert!("3111".parse::<TlsaTypeCode>().is_err());
    }

    #[test]
    fn test_reject_out_of_range_digits() {
        assert!("411".parse::<TlsaTypeCode>().is_err());
        assert!("321".parse::<TlsaTypeCode>().is_err());
        assert!("313".parse::<TlsaTypeCode>().is_err());
    }

    #[test]
    fn test_end_entity_usages() {
        assert!(CertificateUsage::ServiceCertificateConstraint.targets_end_entity());
        assert!(CertificateUsage::DomainIssuedCertificate.targets_end_entity());
        assert!(!CertificateUsage::CaConstraint.targets_end_entity());
        assert!(!CertificateUsage::TrustAnchorAssertion.targets_end_entity());
    }
}
