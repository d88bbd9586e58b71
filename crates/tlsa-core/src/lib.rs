//! Core types and algorithms for keeping DANE TLSA records in sync.
//!
//! This crate provides the pieces of the updater that carry actual semantics:
//!
//! - **Chain parsing**: [`CertificateChain::parse`] turns a PEM bundle or a
//!   TLS probe transcript into an ordered chain
//! - **Derivation**: [`derive`] selects the certificate matching the TLSA
//!   usage, extracts the selector bytes and applies the matching type
//! - **Reconciliation**: [`reconcile`] decides whether a zone's record set
//!   needs no change, an in-place update or a new entry
//! - **Errors**: [`TlsaError`] with the [`ErrorKind`] taxonomy
//!
//! # Example
//!
//! ```rust,ignore
//! use tlsa_core::{derive, CertificateChain, TlsaTypeCode};
//!
//! let chain = CertificateChain::parse(&std::fs::read("fullchain.pem")?)?;
//! let record = derive(&chain, "311".parse::<TlsaTypeCode>()?)?;
//! println!("{record}"); // 3 1 1 5c1b...
//! ```

#![doc(html_root_url = "https://docs.rs/tlsa-core/0.4.0")]

pub mod chain;
pub mod derive;
mod error;
pub mod reconcile;
pub mod types;

#[cfg(test)]
pub(crate) mod test_util;

pub use chain::{Certificate, CertificateChain};
pub use derive::{derive, derive_detailed, Derivation};
pub use error::{ErrorKind, Result, TlsaError};
pub use reconcile::{reconcile, Action, Reconciliation};
pub use types::*;
