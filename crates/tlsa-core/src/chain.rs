//! Splitting a PEM stream into an ordered certificate chain.
//!
//! The input is either a PEM bundle (`fullchain.pem`) or the transcript of a
//! live TLS probe, which may carry connection banners and a
//! `Certificate chain` header before the first block and a `---` separator
//! after the last one. Parsing is a two state machine:
//!
//! ```text
//!                 BeginMarker
//!   SeekingBegin ------------> Accumulating
//!        ^                          |
//!        +------- EndMarker --------+   (block closed, pushed to chain)
//!
//!   SeparatorLine with >= 1 closed block: stop
//! ```

use tracing::debug;

use crate::error::{Result, TlsaError};

/// Line opening a certificate block
pub const BEGIN_MARKER: &str = "-----BEGIN CERTIFICATE-----";

/// Line closing a certificate block
pub const END_MARKER: &str = "-----END CERTIFICATE-----";

/// Line ending the certificate section of a probe transcript
pub const SEPARATOR: &str = "---";

/// Header preceding the certificates in a probe transcript
pub const CHAIN_BANNER: &str = "Certificate chain";

/// One PEM-encoded X.509 certificate, markers included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pem: String,
}

impl Certificate {
    /// Wrap a PEM block without validating it
    #[must_use]
    pub fn from_pem(pem: impl Into<String>) -> Self {
        Self { pem: pem.into() }
    }

    /// The PEM text
    #[must_use]
    pub fn pem(&self) -> &str {
        &self.pem
    }

    /// Decode the block into its DER bytes
    pub fn to_der(&self) -> Result<Vec<u8>> {
        let block =
            pem::parse(&self.pem).map_err(|e| TlsaError::CertificateDecode(e.to_string()))?;
        if block.tag() != "CERTIFICATE" {
            return Err(TlsaError::CertificateDecode(format!(
                "unexpected PEM tag {}",
                block.tag()
            )));
        }
        Ok(block.into_contents())
    }
}

/// Ordered, non-empty certificate chain; index 0 is the leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateChain {
    certificates: Vec<Certificate>,
}

impl CertificateChain {
    /// Build a chain from already separated certificates
    pub fn new(certificates: Vec<Certificate>) -> Result<Self> {
        if certificates.is_empty() {
            return Err(TlsaError::NoCertificateFound);
        }
        Ok(Self { certificates })
    }

    /// Parse a PEM bundle or probe transcript.
    ///
    /// Order is kept exactly as received. Input without a single complete
    /// begin/end pair is an error.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let text = String::from_utf8_lossy(raw);
        let mut parser = ChainParser::default();

        for line in text.lines() {
            if parser.feed(line.trim_end()) == Flow::Stop {
                break;
            }
        }

        debug!(certificates = parser.closed.len(), "parsed certificate chain");
        Self::new(parser.closed)
    }

    /// The end-entity certificate
    #[must_use]
    pub fn leaf(&self) -> &Certificate {
        &self.certificates[0]
    }

    /// Certificate at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Certificate> {
        self.certificates.get(index)
    }

    /// Number of certificates
    #[must_use]
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    /// Always false, a chain holds at least the leaf
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    /// Iterate in presentation order
    pub fn iter(&self) -> std::slice::Iter<'_, Certificate> {
        self.certificates.iter()
    }
}

impl<'a> IntoIterator for &'a CertificateChain {
    type Item = &'a Certificate;
    type IntoIter = std::slice::Iter<'a, Certificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    BeginMarker,
    EndMarker,
    SeparatorLine,
    OtherLine,
}

impl Event {
    fn classify(line: &str) -> Self {
        match line {
            BEGIN_MARKER => Self::BeginMarker,
            END_MARKER => Self::EndMarker,
            SEPARATOR => Self::SeparatorLine,
            _ => Self::OtherLine,
        }
    }
}

#[derive(Debug, Default)]
enum State {
    #[default]
    SeekingBegin,
    Accumulating(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

#[derive(Debug, Default)]
struct ChainParser {
    state: State,
    closed: Vec<Certificate>,
}

impl ChainParser {
    fn feed(&mut self, line: &str) -> Flow {
        let event = Event::classify(line);

        if event == Event::SeparatorLine && !self.closed.is_empty() {
            return Flow::Stop;
        }

        self.state = match (std::mem::take(&mut self.state), event) {
            (State::SeekingBegin | State::Accumulating(_), Event::BeginMarker) => {
                State::Accumulating(vec![line.to_string()])
            }
            (State::SeekingBegin, _) => State::SeekingBegin,
            (State::Accumulating(mut lines), Event::EndMarker) => {
                lines.push(line.to_string());
                let mut pem = lines.join("\n");
                pem.push('\n');
                self.closed.push(Certificate::from_pem(pem));
                State::SeekingBegin
            }
            // an open block cannot contain a separator, drop it
            (State::Accumulating(_), Event::SeparatorLine) => State::SeekingBegin,
            (State::Accumulating(mut lines), Event::OtherLine) => {
                lines.push(line.to_string());
                State::Accumulating(lines)
            }
        };

        Flow::Continue
    }
}
