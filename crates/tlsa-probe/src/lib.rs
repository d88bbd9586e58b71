//! Certificate chain sources for the TLSA updater.
//!
//! Two adapters produce the raw text that [`tlsa_core::CertificateChain::parse`]
//! consumes:
//!
//! - [`LocalStore`] reads `fullchain.pem` from a per-domain directory
//! - [`LiveProbe`] connects to a server, negotiates STARTTLS where the port
//!   calls for it, and captures the chain presented during the handshake

#![doc(html_root_url = "https://docs.rs/tlsa-probe/0.4.0")]

mod error;
pub mod probe;
pub mod starttls;
pub mod store;

pub use error::{ProbeError, ProbeResult};
pub use probe::{LiveProbe, ProbeTarget};
pub use starttls::StartTls;
pub use store::LocalStore;
