use thiserror::Error;

/// Result type alias for TLSA operations
pub type Result<T> = std::result::Result<T, TlsaError>;

/// Errors that can occur while deriving or publishing a TLSA record
#[derive(Error, Debug)]
pub enum TlsaError {
    /// TLSA type code is not three valid digits
    #[error("invalid TLSA type code {code:?}: {reason}")]
    InvalidTypeCode {
        /// The rejected input
        code: String,
        /// Why it was rejected
        reason: String,
    },

    /// A required argument was not supplied
    #[error("missing required argument: {0}")]
    MissingArgument(String),

    /// Domain name cannot be split into zone and host part
    #[error("invalid domain name: {0}")]
    InvalidDomain(String),

    /// Domain is not below any managed zone
    #[error("{domain} is not part of any managed zone")]
    ZoneNotManaged {
        /// Domain that was looked up
        domain: String,
    },

    /// Live retrieval was requested for a port it does not support
    #[error("port {port} is not supported when using published certificates, only 443 is")]
    UnsupportedPort {
        /// Rejected port
        port: u16,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// No certificate source produced a chain
    #[error("certificate source unavailable: {0}")]
    SourceUnavailable(String),

    /// Input contained no complete PEM certificate block
    #[error("no certificate found")]
    NoCertificateFound,

    /// A certificate block could not be decoded
    #[error("certificate decode failed: {0}")]
    CertificateDecode(String),

    /// No certificate in the chain satisfies the requested usage
    #[error("no matching certificate for usage {usage} in a chain of {chain_len}")]
    NoMatchingCertificate {
        /// Requested certificate usage
        usage: u8,
        /// Number of certificates inspected
        chain_len: usize,
    },

    /// Authentication against the DNS provider failed
    #[error("authentication failed: provider rejected the access token")]
    Unauthorized,

    /// The DNS provider does not know the zone
    #[error("zone not found at provider: {zone}")]
    ZoneNotFound {
        /// Zone that was requested
        zone: String,
    },

    /// DNS provider returned an error response
    #[error("provider error ({code}): {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Error message from the provider
        message: String,
    },

    /// HTTP request to the provider failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Operation timed out
    #[error("timed out after {0} seconds")]
    Timeout(u64),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error while reading a certificate store
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`TlsaError`], used for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad operator input or configuration; nothing was contacted
    Input,
    /// No certificate chain could be obtained
    SourceUnavailable,
    /// A chain was obtained but no record could be derived from it
    Derivation,
    /// Reading or replacing the zone's record set failed
    Publish,
}

impl TlsaError {
    /// Build an [`TlsaError::InvalidTypeCode`]
    pub fn invalid_code(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTypeCode {
            code: code.into(),
            reason: reason.into(),
        }
    }

    /// Classify this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTypeCode { .. }
            | Self::MissingArgument(_)
            | Self::InvalidDomain(_)
            | Self::ZoneNotManaged { .. }
            | Self::UnsupportedPort { .. }
            | Self::Config(_) => ErrorKind::Input,
            Self::SourceUnavailable(_) | Self::NoCertificateFound | Self::Io(_) => {
                ErrorKind::SourceUnavailable
            }
            Self::CertificateDecode(_) | Self::NoMatchingCertificate { .. } => {
                ErrorKind::Derivation
            }
            Self::Unauthorized
            | Self::ZoneNotFound { .. }
            | Self::Api { .. }
            | Self::Http(_)
            | Self::Timeout(_)
            | Self::Json(_) => ErrorKind::Publish,
        }
    }

    /// Returns true if the error is due to authentication
    #[must_use]
    pub const fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Returns the HTTP status code if this is a provider error
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::ZoneNotFound { .. } => Some(404),
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}
