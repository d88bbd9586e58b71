//! API endpoint modules.

mod dns;

pub use dns::{DnsApi, DnsEntries};
