//! Read-only client for the explorer's signature history.
//!
//! `GET {explorer}/api/unchained/user/{public_key_hex}` returns every
//! attestation the signer has contributed to.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::config::SignerConfig;

#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    #[error("explorer request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid explorer URL: {0}")]
    InvalidUrl(String),
}

// -- Explorer response schema ------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct UserAttestation {
    #[serde(rename = "_id")]
    id: String,
    hash: String,
    topic: String,
    data: AttestationData,
    timestamp: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
struct AttestationData {
    signers_count: u64,
    meta: AttestationMeta,
}

#[derive(Debug, Clone, Deserialize)]
struct AttestationMeta {
    correct: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Timestamp {
    Text(String),
    Number(u64),
}

// -- Public view ---------------------------------------------------------------

/// A past attestation as shown in the signer's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureRecord {
    pub id: String,
    pub topic: String,
    pub hash: String,
    pub correct: bool,
    pub timestamp: String,
    pub signers_count: u64,
}

impl From<UserAttestation> for SignatureRecord {
    fn from(a: UserAttestation) -> Self {
        Self {
            id: a.id,
            topic: a.topic,
            hash: a.hash,
            correct: a.data.meta.correct,
            timestamp: match a.timestamp {
                Timestamp::Text(s) => s,
                Timestamp::Number(n) => n.to_string(),
            },
            signers_count: a.data.signers_count,
        }
    }
}

/// Look up one record by explorer id.
#[must_use]
pub fn find<'a>(records: &'a [SignatureRecord], id: &str) -> Option<&'a SignatureRecord> {
    records.iter().find(|r| r.id == id)
}

#[derive(Debug, Clone)]
pub struct ExplorerClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ExplorerClient {
    /// # Errors
    ///
    /// `ExplorerError::Http` if the HTTP client cannot be built.
    pub fn new(config: &SignerConfig) -> Result<Self, ExplorerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;
        let mut base_url = config.explorer_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    /// Signature history for the signer identified by `public_key_hex`.
    ///
    /// # Errors
    ///
    /// `ExplorerError` on transport failure, a non-2xx status, or a body that
    /// does not match the explorer schema.
    pub async fn signatures(&self, public_key_hex: &str) -> Result<Vec<SignatureRecord>, ExplorerError> {
        let url = self
            .base_url
            .join(&format!("api/unchained/user/{public_key_hex}"))
            .map_err(|e| ExplorerError::InvalidUrl(e.to_string()))?;
        debug!(url = %url, "fetching signature history");
        let records: Vec<UserAttestation> = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(records.into_iter().map(SignatureRecord::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_explorer_record() {
        let raw = serde_json::json!({
            "_id": "65f0",
            "hash": "ab",
            "topic": "cd",
            "timestamp": 1_700_000_000u64,
            "data": {
                "consensus": true,
                "signers_count": 3,
                "voted": 1,
                "meta": { "correct": false }
            }
        });
        let rec: SignatureRecord = serde_json::from_value::<UserAttestation>(raw).unwrap().into();
        assert_eq!(rec.id, "65f0");
        assert_eq!(rec.timestamp, "1700000000");
        assert_eq!(rec.signers_count, 3);
        assert!(!rec.correct);
        assert_eq!(find(&[rec.clone()], "65f0"), Some(&rec));
        assert_eq!(find(&[rec], "nope"), None);
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let mut cfg = SignerConfig::local_mock(9100).unwrap();
        cfg.explorer_url = Url::parse("http://127.0.0.1:9100/explorer").unwrap();
        let client = ExplorerClient::new(&cfg).unwrap();
        assert_eq!(client.base_url.as_str(), "http://127.0.0.1:9100/explorer/");
    }
}
