/// Domain separation tag mixed into every hash-to-curve this client performs.
pub const DST: &[u8; 9] = b"UNCHAINED";

/// BLS12-381 scalar field modulus r, big-endian.
/// r = 0x73eda753299d7d483339d80809a1d80553bda402fffe5bfeffffffff00000001
pub const SCALAR_MODULUS: [u8; 32] = [
    0x73, 0xed, 0xa7, 0x53, 0x29, 0x9d, 0x7d, 0x48,
    0x33, 0x39, 0xd8, 0x08, 0x09, 0xa1, 0xd8, 0x05,
    0x53, 0xbd, 0xa4, 0x02, 0xff, 0xfe, 0x5b, 0xfe,
    0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x01,
];

pub const PRIVATE_KEY_LEN: usize = 32;
pub const G1_COMPRESSED_LEN: usize = 48;     // short signature, short public key
pub const G2_COMPRESSED_LEN: usize = 96;     // public key for short signatures
pub const MAX_FIELD_LEN: usize = u8::MAX as usize; // byte-array-8 bound

/// Placeholder wallet the broker expects in `Hello` when the signer has none.
pub const DEFAULT_EVM_WALLET: &str = "0x...";

/// "This document, scanned at this time, matched / did not match."
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attestation {
    pub timestamp: u64,  // unix seconds
    pub hash: Vec<u8>,
    pub topic: Vec<u8>,
    pub correct: bool,
}

/// Payload carried by a scanned QR code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrData {
    pub data: Attestation,
    pub url: String,
}

/// Hello record: who is signing and under which keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signer {
    pub name: String,
    pub evm_wallet: String,
    pub public_key: Vec<u8>,       // G2, verifies short signatures
    pub short_public_key: Vec<u8>, // G1
}

/// KOSK challenge as issued by the broker and echoed back signed.
///
/// `passed` is a protocol placeholder; the client always replies `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub passed: bool,
    pub random: Vec<u8>,
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationReport {
    pub attestation: Attestation,
    pub signature: Vec<u8>,
}

impl Attestation {
    #[must_use]
    pub const fn new(timestamp: u64, hash: Vec<u8>, topic: Vec<u8>, correct: bool) -> Self {
        Self { timestamp, hash, topic, correct }
    }
}

impl Signer {
    /// Build a Hello record. Spaces in the display name become `_`.
    #[must_use]
    pub fn new(name: &str, evm_wallet: &str, public_key: Vec<u8>, short_public_key: Vec<u8>) -> Self {
        Self {
            name: name.replace(' ', "_"),
            evm_wallet: evm_wallet.to_owned(),
            public_key,
            short_public_key,
        }
    }
}
