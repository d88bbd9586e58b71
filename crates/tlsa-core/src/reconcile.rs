//! Reconciling a derived record against a zone's current record set.
//!
//! Providers replace the whole record set on write, so reconciliation works
//! on the complete set and hands the complete set back.

use tracing::debug;

use crate::types::{DnsEntry, OwnerName, TlsaRecord};

/// What reconciliation decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The record is already published
    Noop,
    /// An existing entry with the same type code was replaced in place
    Update,
    /// A new entry was appended
    Insert,
}

impl Action {
    /// Returns true if the record set has to be written back
    #[must_use]
    pub const fn needs_publish(self) -> bool {
        !matches!(self, Self::Noop)
    }
}

/// Outcome of [`reconcile`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Decision taken
    pub action: Action,
    /// Full resulting record set
    pub records: Vec<DnsEntry>,
    /// Index of the entry that matched, was updated or was inserted
    pub index: usize,
}

/// Reconcile `derived` for `owner` into `current`.
///
/// Only TLSA entries of `owner` whose leading `usage selector matching-type`
/// fields equal the derived record's are candidates. If any candidate
/// already carries the derived content (compared case-insensitively) nothing
/// changes. Otherwise the first candidate is replaced in place, or a new
/// entry is appended when there is none. Entries of the same owner with a
/// different type code are left alone.
#[must_use]
pub fn reconcile(
    mut current: Vec<DnsEntry>,
    owner: &OwnerName,
    ttl: u32,
    derived: &TlsaRecord,
) -> Reconciliation {
    let content = derived.content();
    let fields = derived.code().fields();

    let candidates: Vec<usize> = current
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_tlsa() && e.name == owner.as_str())
        .filter(|(_, e)| type_fields(&e.content) == Some(fields))
        .map(|(i, _)| i)
        .collect();

    if let Some(&index) = candidates
        .iter()
        .find(|&&i| current[i].content.trim().eq_ignore_ascii_case(&content))
    {
        debug!(owner = %owner, index, "TLSA record already published");
        return Reconciliation {
            action: Action::Noop,
            records: current,
            index,
        };
    }

    let entry = DnsEntry::tlsa(owner.as_str(), ttl, content);

    if let Some(&index) = candidates.first() {
        debug!(owner = %owner, index, old = %current[index].content, "replacing TLSA record");
        current[index] = entry;
        Reconciliation {
            action: Action::Update,
            records: current,
            index,
        }
    } else {
        debug!(owner = %owner, "appending TLSA record");
        current.push(entry);
        let index = current.len() - 1;
        Reconciliation {
            action: Action::Insert,
            records: current,
            index,
        }
    }
}

/// Leading `usage selector matching-type` fields of TLSA content
fn type_fields(content: &str) -> Option<(u8, u8, u8)> {
    let mut parts = content.split_whitespace().map(str::parse::<u8>);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(u)), Some(Ok(s)), Some(Ok(m))) => Some((u, s, m)),
        _ => None,
    }
}
