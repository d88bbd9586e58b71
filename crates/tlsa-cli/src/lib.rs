//! # tlsa-cli
//!
//! Command-line interface for keeping DANE TLSA records up to date.
//!
//! ## Features
//!
//! - **Update**: derive a record from a local `fullchain.pem` or the chain a
//!   server presents, and publish it at the DNS provider
//! - **Show**: derive and print a record without touching DNS
//! - **Manual mode**: without a provider, print the record to add by hand
//! - **Educational mode**: `--explain` spells out what a type code means

pub mod cli;
pub mod config;
pub mod education;
pub mod output;

pub use cli::run;
