//! Local certificate store.
//!
//! Certificates are kept in one directory per domain, the layout written by
//! ACME clients such as dehydrated:
//!
//! ```text
//! certs/
//!   www.example.com/
//!     fullchain.pem
//!     cert.pem
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ProbeResult;

/// Bundle holding the leaf followed by its intermediates
pub const FULLCHAIN_FILE: &str = "fullchain.pem";

/// Leaf certificate only
pub const CERT_FILE: &str = "cert.pem";

/// Per-domain directory tree of PEM files
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open a store rooted at `root`. The directory need not exist.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the files of `domain`
    #[must_use]
    pub fn domain_dir(&self, domain: &str) -> PathBuf {
        self.root.join(domain.trim_end_matches('.'))
    }

    /// Read the stored chain of `domain`.
    ///
    /// Prefers `fullchain.pem` and falls back to `cert.pem`. Returns
    /// `Ok(None)` when neither exists; any other I/O failure is an error.
    pub fn lookup(&self, domain: &str) -> ProbeResult<Option<Vec<u8>>> {
        let dir = self.domain_dir(domain);
        for name in [FULLCHAIN_FILE, CERT_FILE] {
            let path = dir.join(name);
            match std::fs::read(&path) {
                Ok(bytes) => {
                    debug!(path = %path.display(), bytes = bytes.len(), "read local certificate");
                    return Ok(Some(bytes));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        debug!(domain, root = %self.root.display(), "no local certificate");
        Ok(None)
    }
}
