//! Signer configuration.
//!
//! Defaults match the production broker and explorer. Override via
//! environment variables or explicit construction for staging/testing.

use std::time::Duration;

use url::Url;

use crate::{
    frame::OpcodeTable,
    session::{SessionConfig, DEFAULT_REPORT_TIMEOUT},
    types::DEFAULT_EVM_WALLET,
};

pub const DEFAULT_EXPLORER_URL: &str = "https://unchained.timeleap.swiss";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerConfig {
    pub session: SessionConfig,
    /// Base URL of the explorer / signature history service.
    pub explorer_url: Url,
    /// HTTP timeout for explorer requests, in seconds.
    pub http_timeout_secs: u64,
}

impl SignerConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `UNCHAINED_REPORT_TIMEOUT_SECS` (default: 30)
    /// - `UNCHAINED_ATTESTATION_OPCODE` (default: 6; newer brokers use 10)
    /// - `UNCHAINED_EVM_WALLET` (default: `0x...`)
    /// - `UNCHAINED_EXPLORER_URL` (default: `https://unchained.timeleap.swiss`)
    /// - `UNCHAINED_HTTP_TIMEOUT_SECS` (default: 30)
    ///
    /// # Errors
    ///
    /// `ConfigError` if a variable is set but does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let report_timeout = env_parse::<u64>("UNCHAINED_REPORT_TIMEOUT_SECS")?
            .map_or(DEFAULT_REPORT_TIMEOUT, Duration::from_secs);
        let opcodes = env_parse::<u8>("UNCHAINED_ATTESTATION_OPCODE")?
            .map_or_else(OpcodeTable::default, OpcodeTable::with_attestation);
        let evm_wallet =
            std::env::var("UNCHAINED_EVM_WALLET").unwrap_or_else(|_| DEFAULT_EVM_WALLET.to_owned());

        Ok(Self {
            session: SessionConfig { opcodes, report_timeout, evm_wallet },
            explorer_url: env_url("UNCHAINED_EXPLORER_URL", DEFAULT_EXPLORER_URL)?,
            http_timeout_secs: env_parse("UNCHAINED_HTTP_TIMEOUT_SECS")?.unwrap_or(30),
        })
    }

    /// Configuration pointing the explorer at a local mock server.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidUrl` if the localhost URL cannot be parsed.
    pub fn local_mock(port: u16) -> Result<Self, ConfigError> {
        let raw = format!("http://127.0.0.1:{port}");
        let explorer_url =
            Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(raw.clone(), e.to_string()))?;
        Ok(Self {
            session: SessionConfig { report_timeout: Duration::from_secs(5), ..SessionConfig::default() },
            explorer_url,
            http_timeout_secs: 5,
        })
    }
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(var.to_owned(), raw)),
        Err(_) => Ok(None),
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_owned());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_owned(), e.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1:?}")]
    InvalidValue(String, String),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
