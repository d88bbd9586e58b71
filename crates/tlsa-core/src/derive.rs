//! TLSA record derivation (RFC 6698 section 2.1).
//!
//! Certificate selection walks the chain in presentation order. The leaf is
//! eligible for the end-entity usages 1 and 3; every later certificate is
//! eligible for the CA usages 0 and 2. The first eligible certificate wins.

use ring::digest::{digest, SHA256, SHA512};
use tracing::debug;
use x509_parser::prelude::*;

use crate::chain::{Certificate, CertificateChain};
use crate::error::{Result, TlsaError};
use crate::types::{CertificateUsage, MatchingType, Selector, TlsaRecord, TlsaTypeCode};

/// A derived record together with the certificate it was computed from
#[derive(Debug, Clone)]
pub struct Derivation<'a> {
    /// The record value
    pub record: TlsaRecord,
    /// Position of the selected certificate in the chain
    pub position: usize,
    /// The selected certificate
    pub certificate: &'a Certificate,
}

/// Derive the TLSA record for `code` from `chain`.
pub fn derive(chain: &CertificateChain, code: TlsaTypeCode) -> Result<TlsaRecord> {
    derive_detailed(chain, code).map(|d| d.record)
}

/// Like [`derive`], but also reports which certificate was used.
pub fn derive_detailed(chain: &CertificateChain, code: TlsaTypeCode) -> Result<Derivation<'_>> {
    let (position, certificate) = select(chain, code.usage)?;
    let der = certificate.to_der()?;
    let selected = selector_bytes(&der, code.selector)?;
    let digest_hex = association_data(&selected, code.matching_type);

    debug!(
        code = %code,
        position,
        selected_len = selected.len(),
        "derived TLSA record"
    );

    Ok(Derivation {
        record: TlsaRecord::new(code, digest_hex),
        position,
        certificate,
    })
}

/// Pick the first certificate whose tier admits `usage`.
///
/// The leaf admits only end-entity usages, every later certificate only the
/// CA usages.
pub fn select(chain: &CertificateChain, usage: CertificateUsage) -> Result<(usize, &Certificate)> {
    let wants_leaf = usage.targets_end_entity();

    if let Some((position, certificate)) = chain
        .iter()
        .enumerate()
        .find(|(position, _)| (*position == 0) == wants_leaf)
    {
        return Ok((position, certificate));
    }

    Err(TlsaError::NoMatchingCertificate {
        usage: usage.value(),
        chain_len: chain.len(),
    })
}

/// Extract the bytes a selector refers to from a DER certificate.
///
/// The certificate is parsed in both cases so that a block which is not an
/// X.509 certificate is rejected rather than hashed.
pub fn selector_bytes(der: &[u8], selector: Selector) -> Result<Vec<u8>> {
    let (_, cert) = X509Certificate::from_der(der)
        .map_err(|e| TlsaError::CertificateDecode(e.to_string()))?;

    Ok(match selector {
        Selector::FullCertificate => der.to_vec(),
        Selector::SubjectPublicKeyInfo => cert.public_key().raw.to_vec(),
    })
}

/// Apply the matching type, returning lowercase hex.
#[must_use]
pub fn association_data(selected: &[u8], matching_type: MatchingType) -> String {
    match matching_type {
        MatchingType::Exact => hex::encode(selected),
        MatchingType::Sha256 => hex::encode(digest(&SHA256, selected)),
        MatchingType::Sha512 => hex::encode(digest(&SHA512, selected)),
    }
}
