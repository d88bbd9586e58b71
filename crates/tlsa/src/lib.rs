//! Keep DANE TLSA records in sync with the certificates a service presents.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tlsa::{ProviderClient, Request, Updater, UpdaterConfig};
//!
//! #[tokio::main]
//! async fn main() -> tlsa::Result<()> {
//!     let config = UpdaterConfig {
//!         managed_zones: vec!["example.com".into()],
//!         ..UpdaterConfig::default()
//!     };
//!     let publisher = ProviderClient::new("your-access-token")?;
//!     let updater = Updater::new(config)?.with_publisher(publisher);
//!
//!     let outcome = updater
//!         .run(&Request::new("www.example.com", "311".parse()?))
//!         .await?;
//!     println!("{} {:?}", outcome.owner_name, outcome.action);
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for the provider client
//! - `rustls` - Use rustls for HTTPS to the provider (recommended)
//! - `native-tls` - Use system native TLS for HTTPS to the provider

#![doc(html_root_url = "https://docs.rs/tlsa/0.4.0")]

mod config;
mod updater;

pub use config::UpdaterConfig;
pub use updater::{Outcome, Prepared, Request, Source, Updater};

// Re-export core types
pub use tlsa_core::*;

// Re-export source adapters and the provider client
pub use tlsa_client::{
    ClientConfig, ProviderClient, ProviderClientBuilder, ZonePublisher, DEFAULT_BASE_URL,
    DEFAULT_TOKEN_ENV,
};
pub use tlsa_probe::{LiveProbe, LocalStore, ProbeError, ProbeTarget, StartTls};

// Re-export runtime for convenience
pub use tokio;
