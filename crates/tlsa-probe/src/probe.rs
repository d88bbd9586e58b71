//! Live TLS probe.
//!
//! Connects to a server, upgrades the connection with STARTTLS when the port
//! belongs to a mail protocol, completes a TLS handshake and records the
//! certificates the server presented. The chain is **not** verified: the
//! point is to publish whatever the server actually serves, even when it is
//! self-signed or expired.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use pem::{EncodeConfig, LineEnding, Pem};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{ring, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};
use tlsa_core::chain::{CHAIN_BANNER, SEPARATOR};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tracing::{debug, info};

use crate::error::{ProbeError, ProbeResult};
use crate::starttls::StartTls;

/// Default bound on connect, STARTTLS and handshake, each
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Server to probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    host: String,
    address: Option<IpAddr>,
    port: u16,
    starttls: Option<StartTls>,
}

impl ProbeTarget {
    /// Probe `host` on `port`, resolving the host name to connect.
    ///
    /// The STARTTLS protocol is picked from the port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            address: None,
            port,
            starttls: StartTls::from_port(port),
        }
    }

    /// Connect to `address` instead of resolving the host name.
    /// The host name is still sent as SNI.
    #[must_use]
    pub const fn with_address(mut self, address: IpAddr) -> Self {
        self.address = Some(address);
        self
    }

    /// Override the STARTTLS protocol chosen from the port
    #[must_use]
    pub const fn with_starttls(mut self, starttls: Option<StartTls>) -> Self {
        self.starttls = starttls;
        self
    }

    /// Host name used for SNI
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// `host:port` or `ip:port` string handed to the resolver
    #[must_use]
    pub fn connect_addr(&self) -> String {
        match self.address {
            Some(IpAddr::V6(ip)) => format!("[{ip}]:{}", self.port),
            Some(IpAddr::V4(ip)) => format!("{ip}:{}", self.port),
            None => format!("{}:{}", self.host.trim_end_matches('.'), self.port),
        }
    }
}

/// TLS client that captures unverified peer chains
#[derive(Clone)]
pub struct LiveProbe {
    connector: TlsConnector,
    timeout: Duration,
}

impl std::fmt::Debug for LiveProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveProbe")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl LiveProbe {
    /// Create a probe whose network steps are each bounded by `timeout`
    pub fn new(timeout: Duration) -> ProbeResult<Self> {
        let provider = Arc::new(ring::default_provider());
        let config = rustls::ClientConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()
            .map_err(|e| ProbeError::Tls(e.to_string()))?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate { provider }))
            .with_no_client_auth();

        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
            timeout,
        })
    }

    /// Configured per-step timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch the presented chain as a transcript of PEM blocks, leaf first
    pub async fn fetch(&self, target: &ProbeTarget) -> ProbeResult<String> {
        let certs = self.peer_certificates(target).await?;
        info!(
            host = %target.host,
            port = target.port,
            certificates = certs.len(),
            "captured peer chain"
        );
        Ok(transcript(target, &certs))
    }

    /// Handshake with `target` and return the DER certificates it presented
    pub async fn peer_certificates(
        &self,
        target: &ProbeTarget,
    ) -> ProbeResult<Vec<CertificateDer<'static>>> {
        let server_name = ServerName::try_from(target.host.trim_end_matches('.').to_string())
            .map_err(|_| ProbeError::InvalidServerName(target.host.clone()))?;

        let addr = target.connect_addr();
        debug!(addr = %addr, sni = %target.host, "connecting");
        let mut stream = self
            .bounded(TcpStream::connect(&addr))
            .await?
            .map_err(|e| ProbeError::Connect {
                addr: addr.clone(),
                reason: e.to_string(),
            })?;

        if let Some(protocol) = target.starttls {
            self.bounded(protocol.negotiate(&mut stream, &target.host))
                .await??;
        }

        let tls = self
            .bounded(self.connector.connect(server_name, stream))
            .await?
            .map_err(|e| ProbeError::Tls(e.to_string()))?;

        let (_, conn) = tls.get_ref();
        match conn.peer_certificates() {
            Some(certs) if !certs.is_empty() => Ok(certs.to_vec()),
            _ => Err(ProbeError::NoPeerCertificates),
        }
    }

    async fn bounded<F: std::future::Future>(&self, fut: F) -> ProbeResult<F::Output> {
        timeout(self.timeout, fut)
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout.as_secs()))
    }
}

/// Render `certs` the way an interactive TLS client prints a session
fn transcript(target: &ProbeTarget, certs: &[CertificateDer<'_>]) -> String {
    let config = EncodeConfig::new().set_line_ending(LineEnding::LF);
    let mut out = format!("CONNECTED({})\n{SEPARATOR}\n{CHAIN_BANNER}\n", target.connect_addr());
    for (depth, der) in certs.iter().enumerate() {
        out.push_str(&format!(" {depth}\n"));
        out.push_str(&pem::encode_config(
            &Pem::new("CERTIFICATE", der.as_ref().to_vec()),
            config,
        ));
    }
    out.push_str(SEPARATOR);
    out.push('\n');
    out
}

/// Verifier that accepts any chain while still checking handshake
/// signatures with the provider's algorithms.
#[derive(Debug)]
struct AcceptAnyCertificate {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcgen::{CertificateParams, KeyPair};
    use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
    use tlsa_core::CertificateChain;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;
    use tokio_rustls::TlsAcceptor;

    fn server_identity() -> (CertificateDer<'static>, PrivateKeyDer<'static>) {
        let key = KeyPair::generate().unwrap();
        let cert = CertificateParams::new(vec!["localhost".to_string()])
            .unwrap()
            .self_signed(&key)
            .unwrap();
        (
            CertificateDer::from(cert.der().to_vec()),
            PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key.serialize_der())),
        )
    }

    fn acceptor(cert: CertificateDer<'static>, key: PrivateKeyDer<'static>) -> TlsAcceptor {
        let config = rustls::ServerConfig::builder_with_provider(Arc::new(ring::default_provider()))
            .with_safe_default_protocol_versions()
            .unwrap()
            .with_no_client_auth()
            .with_single_cert(vec![cert], key)
            .unwrap();
        TlsAcceptor::from(Arc::new(config))
    }

    #[test]
    fn test_target_addresses() {
        let target = ProbeTarget::new("www.example.com.", 443);
        assert_eq!(target.connect_addr(), "www.example.com:443");

        let target = ProbeTarget::new("www.example.com", 443)
            .with_address("2001:db8::1".parse().unwrap());
        assert_eq!(target.connect_addr(), "[2001:db8::1]:443");
        assert_eq!(target.host(), "www.example.com");

        assert_eq!(ProbeTarget::new("mx.example.com", 25).starttls, Some(StartTls::Smtp));
    }

    #[test]
    fn test_transcript_parses_as_chain() {
        let (cert, _) = server_identity();
        let target = ProbeTarget::new("localhost", 443);
        let text = transcript(&target, &[cert.clone(), cert.clone()]);

        assert!(text.starts_with("CONNECTED(localhost:443)\n---\nCertificate chain\n"));
        let chain = CertificateChain::parse(text.as_bytes()).unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.leaf().to_der().unwrap(), cert.as_ref());
    }

    #[tokio::test]
    async fn test_fetch_over_tls() {
        let (cert, key) = server_identity();
        let acceptor = acceptor(cert.clone(), key);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let _ = acceptor.accept(stream).await;
        });

        let target = ProbeTarget::new("localhost", port)
            .with_address("127.0.0.1".parse().unwrap())
            .with_starttls(None);
        let probe = LiveProbe::new(DEFAULT_TIMEOUT).unwrap();
        let certs = probe.peer_certificates(&target).await.unwrap();
        server.await.unwrap();

        assert_eq!(certs, vec![cert]);
    }

    #[tokio::test]
    async fn test_fetch_after_smtp_starttls() {
        let (cert, key) = server_identity();
        let acceptor = acceptor(cert.clone(), key);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut stream = BufReader::new(stream);
            let mut line = String::new();

            stream.get_mut().write_all(b"220 localhost ESMTP\r\n").await.unwrap();
            stream.read_line(&mut line).await.unwrap();
            stream
                .get_mut()
                .write_all(b"250-localhost\r\n250 STARTTLS\r\n")
                .await
                .unwrap();
            line.clear();
            stream.read_line(&mut line).await.unwrap();
            assert_eq!(line, "STARTTLS\r\n");
            stream.get_mut().write_all(b"220 go ahead\r\n").await.unwrap();

            let _ = acceptor.accept(stream.into_inner()).await;
        });

        let target = ProbeTarget::new("localhost", port)
            .with_address("127.0.0.1".parse().unwrap())
            .with_starttls(Some(StartTls::Smtp));
        let probe = LiveProbe::new(DEFAULT_TIMEOUT).unwrap();
        let text = probe.fetch(&target).await.unwrap();
        server.await.unwrap();

        let chain = CertificateChain::parse(text.as_bytes()).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.leaf().to_der().unwrap(), cert.as_ref());
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let target = ProbeTarget::new("localhost", port).with_address("127.0.0.1".parse().unwrap());
        let probe = LiveProbe::new(DEFAULT_TIMEOUT).unwrap();
        let err = probe.peer_certificates(&target).await.unwrap_err();
        assert!(matches!(err, ProbeError::Connect { .. }));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(stream);
        });

        let target = ProbeTarget::new("localhost", port)
            .with_address("127.0.0.1".parse().unwrap())
            .with_starttls(Some(StartTls::Pop3));
        let probe = LiveProbe::new(Duration::from_millis(200)).unwrap();
        let err = probe.peer_certificates(&target).await.unwrap_err();
        assert!(matches!(err, ProbeError::Timeout(_)));
        server.abort();
    }
}
