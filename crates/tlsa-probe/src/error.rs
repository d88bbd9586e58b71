use thiserror::Error;

/// Result type alias for probe operations
pub type ProbeResult<T> = std::result::Result<T, ProbeError>;

/// Errors from certificate sources
#[derive(Error, Debug)]
pub enum ProbeError {
    /// TCP connection could not be established
    #[error("connection to {addr} failed: {reason}")]
    Connect {
        /// Address that was dialed
        addr: String,
        /// Underlying failure
        reason: String,
    },

    /// Connect, STARTTLS or handshake exceeded the probe timeout
    #[error("probe timed out after {0} seconds")]
    Timeout(u64),

    /// Server answered the STARTTLS dialogue unexpectedly
    #[error("{protocol} STARTTLS failed: {reply}")]
    StartTls {
        /// Protocol being negotiated
        protocol: &'static str,
        /// Offending server reply
        reply: String,
    },

    /// TLS handshake failed
    #[error("TLS handshake failed: {0}")]
    Tls(String),

    /// Handshake completed without a certificate from the server
    #[error("server presented no certificates")]
    NoPeerCertificates,

    /// Host is not usable as a TLS server name
    #[error("invalid server name: {0}")]
    InvalidServerName(String),

    /// Network or filesystem I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ProbeError> for tlsa_core::TlsaError {
    fn from(err: ProbeError) -> Self {
        match err {
            ProbeError::Io(e) => Self::Io(e),
            other => Self::SourceUnavailable(other.to_string()),
        }
    }
}
