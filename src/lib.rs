#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

//! Unchained signer - attestation broker client
//!
//! This crate proves control of a BLS12-381 key to an attestation broker
//! and submits a signed correctness report for a scanned document.
//!
//! Fixed cryptographic choices:
//! - Curve: BLS12-381, short signatures (signature in G1, public key in G2)
//! - Hash-to-curve: `BLS12381G1_XMD:SHA-256_SSWU_RO_` with DST `UNCHAINED`
//! - Wire format: Sia records (LE64, byte-array-8, string-8, bool)
//!
//! Protocol, per session:
//! 1. Hello (name, wallet, public keys)
//! 2. KOSK: sign the broker's random nonce
//! 3. On `kosk.ok`, send the attestation report and wait (bounded) for
//!    `signature.accepted` or `signature.invalid`

// Core modules
pub mod types;
pub mod errors;
pub mod ser;
pub mod frame;
pub mod keys;
pub mod transport;
pub mod session;
pub mod keystore;
pub mod config;
pub mod explorer;

// Re-export commonly used types and functions
pub use types::*;
pub use errors::{KeyError, Reject, RejectReason, WireError};
pub use ser::{
    decode_attestation, decode_attestation_report, decode_challenge, decode_hello, decode_kosk_result,
    decode_qr_data, encode_attestation, encode_attestation_report, encode_challenge, encode_hello,
    encode_kosk_result, encode_qr_data, qr_data_from_base64, qr_data_to_base64,
};
pub use frame::{parse_inbound, Feedback, Inbound, Opcode, OpcodeTable};
pub use keys::{
    derive_public_key, derive_short_public_key, generate_secure_random_scalar, public_key_hex, sign, verify,
    PrivateKey,
};
pub use transport::{normalize_broker_url, Connection, TransportError, WsConnection};
pub use session::{sign_attestation, BrokerClient, BrokerSession, SessionConfig, SessionState};
pub use keystore::{KeyStore, KeyStoreError, MemoryKeyStore};
pub use config::{ConfigError, SignerConfig};
pub use explorer::{ExplorerClient, ExplorerError, SignatureRecord};

// Version constant
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
