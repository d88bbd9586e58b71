use std::fmt;

use super::code::{CertificateUsage, MatchingType, Selector, TlsaTypeCode};

/// A derived TLSA record value.
///
/// Its [`Display`](fmt::Display) form is the RFC 6698 presentation format
/// used as DNS record content: `"<usage> <selector> <matching-type> <hex>"`
/// with a lowercase hex digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TlsaRecord {
    /// Certificate usage
    pub usage: CertificateUsage,
    /// Selector
    pub selector: Selector,
    /// Matching type
    pub matching_type: MatchingType,
    /// Lowercase hex certificate association data
    pub digest_hex: String,
}

impl TlsaRecord {
    /// Build a record for `code` with the given association data
    #[must_use]
    pub fn new(code: TlsaTypeCode, digest_hex: impl Into<String>) -> Self {
        Self {
            usage: code.usage,
            selector: code.selector,
            matching_type: code.matching_type,
            digest_hex: digest_hex.into(),
        }
    }

    /// The type code this record was derived for
    #[must_use]
    pub const fn code(&self) -> TlsaTypeCode {
        TlsaTypeCode::new(self.usage, self.selector, self.matching_type)
    }

    /// Record content as stored in the zone
    #[must_use]
    pub fn content(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TlsaRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.usage.value(),
            self.selector.value(),
            self.matching_type.value(),
            self.digest_hex
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presentation_format() {
        let code: TlsaTypeCode = "301".parse().unwrap();
        let record = TlsaRecord::new(code, "abcdef0123");
        assert_eq!(record.content(), "3 0 1 abcdef0123");
        assert_eq!(record.code(), code);
    }
}
