//! Device key store port.
//!
//! The real store (secure enclave, keychain) lives outside this crate; the
//! session only needs the private key and the display name out of it.

use thiserror::Error;
use zeroize::Zeroizing;

use crate::{errors::KeyError, keys::PrivateKey};

#[derive(Debug, Error)]
pub enum KeyStoreError {
    #[error("stored private key is unusable: {0}")]
    Corrupt(#[from] KeyError),

    #[error("key store unavailable: {0}")]
    Unavailable(String),
}

/// Atomic, durable, device-exclusive storage for signer secrets.
pub trait KeyStore {
    fn private_key(&self) -> Result<Option<PrivateKey>, KeyStoreError>;
    fn set_private_key(&mut self, key: &PrivateKey) -> Result<(), KeyStoreError>;

    fn pin(&self) -> Result<Option<Zeroizing<String>>, KeyStoreError>;
    fn set_pin(&mut self, pin: &str) -> Result<(), KeyStoreError>;

    fn display_name(&self) -> Result<Option<String>, KeyStoreError>;
    fn set_display_name(&mut self, name: &str) -> Result<(), KeyStoreError>;
}

/// In-process store. Keys are held as hex, the same form a device store keeps.
#[derive(Default)]
pub struct MemoryKeyStore {
    private_key: Option<Zeroizing<String>>,
    pin: Option<Zeroizing<String>>,
    display_name: Option<String>,
}

impl core::fmt::Debug for MemoryKeyStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemoryKeyStore")
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("pin", &self.pin.as_ref().map(|_| "[REDACTED]"))
            .field("display_name", &self.display_name)
            .finish()
    }
}

impl MemoryKeyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a key and a name.
    #[must_use]
    pub fn with_identity(key: &PrivateKey, name: &str) -> Self {
        Self {
            private_key: Some(key.to_hex()),
            pin: None,
            display_name: Some(name.to_owned()),
        }
    }

    /// Store seeded with raw key text, validated only on read.
    #[must_use]
    pub fn with_raw_key(hex_key: &str) -> Self {
        Self { private_key: Some(Zeroizing::new(hex_key.to_owned())), ..Self::default() }
    }
}

impl KeyStore for MemoryKeyStore {
    fn private_key(&self) -> Result<Option<PrivateKey>, KeyStoreError> {
        self.private_key
            .as_ref()
            .map(|h| PrivateKey::from_hex(h).map_err(KeyStoreError::from))
            .transpose()
    }

    fn set_private_key(&mut self, key: &PrivateKey) -> Result<(), KeyStoreError> {
        self.private_key = Some(key.to_hex());
        Ok(())
    }

    fn pin(&self) -> Result<Option<Zeroizing<String>>, KeyStoreError> {
        Ok(self.pin.clone())
    }

    fn set_pin(&mut self, pin: &str) -> Result<(), KeyStoreError> {
        self.pin = Some(Zeroizing::new(pin.to_owned()));
        Ok(())
    }

    fn display_name(&self) -> Result<Option<String>, KeyStoreError> {
        Ok(self.display_name.clone())
    }

    fn set_display_name(&mut self, name: &str) -> Result<(), KeyStoreError> {
        self.display_name = Some(name.to_owned());
        Ok(())
    }
}
