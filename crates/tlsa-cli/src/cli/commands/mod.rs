//! Command implementations.

pub mod config;
pub mod show;
pub mod update;

use std::path::PathBuf;

use anyhow::Context as _;
use tlsa::{Request, TlsaTypeCode};

use crate::cli::args::TargetArgs;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded configuration
    pub config: crate::config::Config,

    /// Where the configuration was loaded from
    pub config_path: PathBuf,

    /// Output format
    pub output_format: OutputFormat,

    /// Whether to explain the type code before running
    pub explain: bool,
}

impl TargetArgs {
    /// Validate the type code and build the pipeline request.
    ///
    /// Runs before any certificate is fetched so a malformed code never
    /// causes network traffic.
    pub fn request(&self) -> anyhow::Result<Request> {
        let code: TlsaTypeCode = self
            .code
            .parse()
            .with_context(|| format!("-t {} is not a TLSA record type such as 311", self.code))?;

        let mut request = Request::new(self.host.clone(), code).port(self.port);
        if let Some(ip) = &self.ip {
            request = request.address(ip.clone());
        }
        Ok(request)
    }
}
