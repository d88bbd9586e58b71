//! The update pipeline: fetch a chain, derive the record, reconcile and
//! publish.
//!
//! Every step runs in sequence. The zone is rewritten as a whole, so two
//! updaters working on the same zone at the same time can lose each other's
//! changes.

use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;

use tlsa_client::ZonePublisher;
use tlsa_core::{
    derive_detailed, reconcile, Action, Certificate, CertificateChain, DomainParts, OwnerName,
    Result, TlsaError, TlsaRecord, TlsaTypeCode,
};
use tlsa_probe::{LiveProbe, LocalStore, ProbeTarget};
use tracing::{debug, info, warn};

use crate::config::UpdaterConfig;

/// The only port the live probe is used for
pub const LIVE_PORT: u16 = 443;

/// One record to keep up to date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Fully qualified name of the service host
    pub host: String,
    /// TLSA usage, selector and matching type
    pub code: TlsaTypeCode,
    /// TCP port of the service
    pub port: u16,
    /// Address to fetch the live certificate from instead of the store.
    /// Kept as given; an unparsable value falls back to the host name.
    pub address: Option<String>,
}

impl Request {
    /// Request for `host` on port 443
    pub fn new(host: impl Into<String>, code: TlsaTypeCode) -> Self {
        Self {
            host: host.into(),
            code,
            port: LIVE_PORT,
            address: None,
        }
    }

    /// Set the service port
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Fetch the live certificate from `address`
    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// Where the certificate chain came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Read from the local store
    Local(PathBuf),
    /// Captured from a TLS handshake with this `addr:port`
    Live(String),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "local certificate {}", path.display()),
            Self::Live(addr) => write!(f, "published certificate at {addr}"),
        }
    }
}

/// A derived record, ready to be published
#[derive(Debug, Clone)]
pub struct Prepared {
    /// Zone the record belongs to
    pub parts: DomainParts,
    /// Owner name relative to the zone
    pub owner_name: OwnerName,
    /// The derived record
    pub record: TlsaRecord,
    /// Where the chain came from
    pub source: Source,
    /// The parsed chain
    pub chain: CertificateChain,
    /// Index of the certificate the record was derived from
    pub position: usize,
}

impl Prepared {
    /// The certificate the record was derived from
    pub fn certificate(&self) -> Option<&Certificate> {
        self.chain.get(self.position)
    }
}

/// Result of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Owner name relative to the zone
    pub owner_name: OwnerName,
    /// Zone the record belongs to
    pub zone: String,
    /// The derived record
    pub record: TlsaRecord,
    /// Reconciliation decision; `None` when no publisher is configured
    pub action: Option<Action>,
    /// Whether the zone was written
    pub published: bool,
}

/// Derives TLSA records and keeps a zone in sync with them
pub struct Updater {
    config: UpdaterConfig,
    store: LocalStore,
    probe: LiveProbe,
    publisher: Option<Box<dyn ZonePublisher>>,
}

impl fmt::Debug for Updater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Updater")
            .field("config", &self.config)
            .field("publisher", &self.publisher.is_some())
            .finish_non_exhaustive()
    }
}

impl Updater {
    /// Create an updater without a publisher; records are only derived
    pub fn new(config: UpdaterConfig) -> Result<Self> {
        let probe = LiveProbe::new(config.probe_timeout)?;
        Ok(Self {
            store: LocalStore::new(config.cert_store.clone()),
            probe,
            config,
            publisher: None,
        })
    }

    /// Publish through `publisher`
    #[must_use]
    pub fn with_publisher(mut self, publisher: impl ZonePublisher + 'static) -> Self {
        self.publisher = Some(Box::new(publisher));
        self
    }

    /// Settings in use
    pub const fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// Returns true if a publisher is configured
    pub const fn has_publisher(&self) -> bool {
        self.publisher.is_some()
    }

    /// Derive and publish in one go
    pub async fn run(&self, request: &Request) -> Result<Outcome> {
        let prepared = self.prepare(request).await?;
        self.publish(&prepared).await
    }

    /// Fetch the chain for `request` and derive its record
    pub async fn prepare(&self, request: &Request) -> Result<Prepared> {
        let (raw, source, parts) = self.fetch(request).await?;

        let chain = CertificateChain::parse(&raw)?;
        let derivation = derive_detailed(&chain, request.code)?;
        let (record, position) = (derivation.record, derivation.position);
        let owner_name = parts.owner_name(request.port);

        info!(
            owner = %owner_name,
            zone = %parts.zone,
            record = %record,
            position,
            "derived TLSA record"
        );

        Ok(Prepared {
            parts,
            owner_name,
            record,
            source,
            chain,
            position,
        })
    }

    /// Reconcile `prepared` against its zone and write the zone if needed.
    ///
    /// Without a publisher nothing is contacted and the outcome carries no
    /// action. With publishing turned off the zone is read and reconciled but
    /// not written.
    pub async fn publish(&self, prepared: &Prepared) -> Result<Outcome> {
        let mut outcome = Outcome {
            owner_name: prepared.owner_name.clone(),
            zone: prepared.parts.zone.clone(),
            record: prepared.record.clone(),
            action: None,
            published: false,
        };

        let Some(publisher) = &self.publisher else {
            debug!("no publisher configured");
            return Ok(outcome);
        };

        let zone = &prepared.parts.zone;
        let current = publisher.get_record_set(zone).await?;
        debug!(zone, entries = current.len(), "fetched zone record set");

        let result = reconcile(
            current,
            &prepared.owner_name,
            self.config.ttl,
            &prepared.record,
        );
        outcome.action = Some(result.action);

        if !result.action.needs_publish() {
            info!(owner = %prepared.owner_name, "TLSA record already published");
            return Ok(outcome);
        }
        if !self.config.publish {
            info!(owner = %prepared.owner_name, action = ?result.action, "publishing is turned off");
            return Ok(outcome);
        }

        publisher.set_record_set(zone, &result.records).await?;
        outcome.published = true;
        info!(owner = %prepared.owner_name, action = ?result.action, "zone updated");
        Ok(outcome)
    }

    /// Locate the chain for `request`: local store first unless an address
    /// is given, the live probe otherwise.
    async fn fetch(&self, request: &Request) -> Result<(Vec<u8>, Source, DomainParts)> {
        let host = request.host.trim_end_matches('.');
        if host.is_empty() {
            return Err(TlsaError::MissingArgument("host".into()));
        }

        let address = match request.address.as_deref() {
            None => {
                let parts = DomainParts::resolve(host, &self.config.managed_zones)?;
                if let Some(raw) = self.store.lookup(host)? {
                    let path = self.store.domain_dir(host);
                    debug!(path = %path.display(), "using local certificate");
                    return Ok((raw, Source::Local(path), parts));
                }
                debug!(host, "no local certificate, trying live certificate");
                None
            }
            Some(given) => match given.parse::<IpAddr>() {
                Ok(ip) => Some(ip),
                Err(_) => {
                    warn!(
                        address = given,
                        host,
                        "invalid IP address, connecting to the host name instead; \
                         incorrect records may be published if its DNS is corrupted"
                    );
                    None
                }
            },
        };

        if request.port != LIVE_PORT {
            return Err(TlsaError::UnsupportedPort { port: request.port });
        }

        let parts = DomainParts::resolve(host, &self.config.managed_zones)
            .or_else(|_| DomainParts::split_naive(host))?;

        let mut target = ProbeTarget::new(host, request.port);
        if let Some(ip) = address {
            target = target.with_address(ip);
        }
        info!(host, port = request.port, "downloading published certificate chain");
        let raw = self.probe.fetch(&target).await?;
        Ok((raw.into_bytes(), Source::Live(target.connect_addr()), parts))
    }
}
