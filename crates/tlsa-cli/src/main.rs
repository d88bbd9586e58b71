//! update-tlsa - create and update DANE TLSA records
//!
//! Derives a TLSA record from a local or published certificate chain and
//! keeps the zone at the DNS provider in sync with it.

use anyhow::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tlsa_cli::run().await
}
