//! BLS12-381 key handling for the short-signature scheme.
//!
//! Signatures live in G1 (48 bytes compressed), the matching public key in
//! G2 (96 bytes). The G1 public key (`short_public_key`) is sent in Hello
//! alongside it. Every hash-to-curve uses [`DST`].

use blstrs::{pairing, G1Affine, G1Projective, G2Affine, G2Projective, Scalar};
use core::fmt;
use group::Group;
use rand_core::{OsRng, RngCore};
use zeroize::Zeroizing;

use crate::{
    errors::KeyError,
    types::{DST, G1_COMPRESSED_LEN, G2_COMPRESSED_LEN, PRIVATE_KEY_LEN, SCALAR_MODULUS},
};

/// A private scalar in `[1, r)`. `Debug` never prints the key.
#[derive(Clone)]
pub struct PrivateKey {
    bytes: Zeroizing<[u8; PRIVATE_KEY_LEN]>,
    scalar: Scalar,
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey").field("bytes", &"[REDACTED]").finish()
    }
}

impl PrivateKey {
    /// Parse a 32-byte big-endian scalar.
    ///
    /// # Errors
    ///
    /// `KeyError::InvalidLength` for anything but 32 bytes, `KeyError::OutOfRange`
    /// for zero or a value not below the scalar field modulus.
    pub fn from_bytes(b: &[u8]) -> Result<Self, KeyError> {
        let arr: [u8; PRIVATE_KEY_LEN] = b
            .try_into()
            .map_err(|_| KeyError::InvalidLength { expected: PRIVATE_KEY_LEN, got: b.len() })?;
        let bytes = Zeroizing::new(arr);
        if bytes.iter().all(|x| *x == 0) {
            return Err(KeyError::OutOfRange);
        }
        let scalar: Option<Scalar> = Scalar::from_bytes_be(&bytes).into();
        let scalar = scalar.ok_or(KeyError::OutOfRange)?;
        Ok(Self { bytes, scalar })
    }

    /// Parse the hex form held by the key store. A leading `0x` is accepted.
    ///
    /// # Errors
    ///
    /// `KeyError::InvalidHex`, or any error from [`PrivateKey::from_bytes`].
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let s = s.trim();
        let s = s.strip_prefix("0x").unwrap_or(s);
        let raw = Zeroizing::new(hex::decode(s).map_err(|_| KeyError::InvalidHex)?);
        Self::from_bytes(&raw)
    }

    /// Fresh key from the OS RNG.
    #[must_use]
    pub fn generate() -> Self {
        loop {
            let candidate = Zeroizing::new(random_scalar_bytes(&mut OsRng));
            if let Ok(k) = Self::from_bytes(candidate.as_slice()) {
                return k;
            }
        }
    }

    #[must_use]
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(*self.bytes))
    }

    /// G2 public key verifying this key's short signatures.
    #[must_use]
    pub fn public_key(&self) -> [u8; G2_COMPRESSED_LEN] {
        derive_public_key(self)
    }

    /// G1 public key.
    #[must_use]
    pub fn short_public_key(&self) -> [u8; G1_COMPRESSED_LEN] {
        derive_short_public_key(self)
    }
}

/// `sk · G2`, compressed. Verifies signatures produced by [`sign`].
#[must_use]
pub fn derive_public_key(sk: &PrivateKey) -> [u8; G2_COMPRESSED_LEN] {
    G2Affine::from(G2Projective::generator() * sk.scalar).to_compressed()
}

/// `sk · G1`, compressed.
#[must_use]
pub fn derive_short_public_key(sk: &PrivateKey) -> [u8; G1_COMPRESSED_LEN] {
    G1Affine::from(G1Projective::generator() * sk.scalar).to_compressed()
}

/// Hex of [`derive_public_key`]; the lookup key used by the explorer.
#[must_use]
pub fn public_key_hex(sk: &PrivateKey) -> String {
    hex::encode(derive_public_key(sk))
}

/// BLS short signature: `sk · H(message)` with `H` hashing to G1 under [`DST`].
///
/// Deterministic in `(message, sk)`.
#[must_use]
pub fn sign(message: &[u8], sk: &PrivateKey) -> [u8; G1_COMPRESSED_LEN] {
    let h = G1Projective::hash_to_curve(message, DST, &[]);
    G1Affine::from(h * sk.scalar).to_compressed()
}

/// Check `e(signature, G2) == e(H(message), public_key)`.
///
/// # Errors
///
/// `KeyError::InvalidLength` or `KeyError::InvalidPoint` when either input is
/// not a valid compressed point. A well-formed but wrong signature is `Ok(false)`.
pub fn verify(message: &[u8], signature: &[u8], public_key: &[u8]) -> Result<bool, KeyError> {
    let sig: [u8; G1_COMPRESSED_LEN] = signature.try_into().map_err(|_| KeyError::InvalidLength {
        expected: G1_COMPRESSED_LEN,
        got: signature.len(),
    })?;
    let pk: [u8; G2_COMPRESSED_LEN] = public_key.try_into().map_err(|_| KeyError::InvalidLength {
        expected: G2_COMPRESSED_LEN,
        got: public_key.len(),
    })?;
    let sig: Option<G1Affine> = G1Affine::from_compressed(&sig).into();
    let pk: Option<G2Affine> = G2Affine::from_compressed(&pk).into();
    let (Some(sig), Some(pk)) = (sig, pk) else {
        return Err(KeyError::InvalidPoint);
    };
    let h = G1Affine::from(G1Projective::hash_to_curve(message, DST, &[]));
    let g2 = G2Affine::from(G2Projective::generator());
    Ok(pairing(&sig, &g2) == pairing(&h, &pk))
}

/// Rejection-sample 32 bytes until, read big-endian, they are below r.
pub fn random_scalar_bytes<R: RngCore>(rng: &mut R) -> [u8; PRIVATE_KEY_LEN] {
    let mut buf = [0u8; PRIVATE_KEY_LEN];
    loop {
        rng.fill_bytes(&mut buf);
        // Lexicographic order on equal-length big-endian arrays is numeric order.
        if buf < SCALAR_MODULUS {
            return buf;
        }
    }
}

/// Uniform scalar below the BLS12-381 modulus as 64 lowercase hex chars.
/// This is fresh private key material.
#[must_use]
pub fn generate_secure_random_scalar() -> String {
    hex::encode(random_scalar_bytes(&mut OsRng))
}
