//! DNS provider client for publishing TLSA record sets.
//!
//! This crate provides the [`ZonePublisher`] seam used by the updater and
//! [`ProviderClient`], an implementation for REST providers that expose a
//! zone as one replace-on-write list of entries.

#![doc(html_root_url = "https://docs.rs/tlsa-client/0.4.0")]

mod client;
mod config;
pub mod api;
mod publisher;

pub use client::{ProviderClient, ProviderClientBuilder};
pub use config::*;
pub use publisher::ZonePublisher;
pub use tlsa_core::{Result, TlsaError};
