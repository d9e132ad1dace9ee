use base64::Engine as _;

use crate::{
    errors::WireError,
    types::{Attestation, AttestationReport, Challenge, QrData, Signer, MAX_FIELD_LEN},
};

#[inline]
#[must_use]
pub const fn le64(x: u64) -> [u8; 8] {
    x.to_le_bytes()
}

/// Append-only writer for the Sia record format.
///
/// Fields carry no tags: a record is its fields concatenated in declared
/// order. `u64` is 8 bytes little-endian, `bool` is one byte (0 or 1),
/// byte arrays and strings are a 1-byte length followed by the raw bytes.
#[derive(Debug, Default, Clone)]
pub struct SiaWriter {
    buf: Vec<u8>,
}

impl SiaWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(cap: usize) -> Self {
        Self { buf: Vec::with_capacity(cap) }
    }

    #[must_use]
    pub fn add_u64(mut self, x: u64) -> Self {
        self.buf.extend_from_slice(&le64(x));
        self
    }

    #[must_use]
    pub fn add_bool(mut self, b: bool) -> Self {
        self.buf.push(u8::from(b));
        self
    }

    /// # Errors
    ///
    /// `WireError::FieldTooLong` when `bytes` exceeds 255 bytes. Nothing is truncated.
    pub fn add_byte_array8(mut self, field: &'static str, bytes: &[u8]) -> Result<Self, WireError> {
        let len = match u8::try_from(bytes.len()) {
            Ok(len) if usize::from(len) <= MAX_FIELD_LEN => len,
            _ => return Err(WireError::FieldTooLong { field, len: bytes.len() }),
        };
        self.buf.push(len);
        self.buf.extend_from_slice(bytes);
        Ok(self)
    }

    /// UTF-8 bytes of `s`, byte-array-8 framed.
    ///
    /// # Errors
    ///
    /// `WireError::FieldTooLong` when the encoded string exceeds 255 bytes.
    pub fn add_string8(self, field: &'static str, s: &str) -> Result<Self, WireError> {
        self.add_byte_array8(field, s.as_bytes())
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over a Sia record. Call [`SiaReader::finish`] once the last field is read.
#[derive(Debug, Clone)]
pub struct SiaReader<'a> {
    data: &'a [u8],
    off: usize,
}

impl<'a> SiaReader<'a> {
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, off: 0 }
    }

    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.off
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        if self.remaining() < n {
            return Err(WireError::UnexpectedEof { needed: n, remaining: self.remaining() });
        }
        let out = &self.data[self.off..self.off + n];
        self.off += n;
        Ok(out)
    }

    /// # Errors
    ///
    /// `WireError::UnexpectedEof` when fewer than 8 bytes remain.
    pub fn read_u64(&mut self) -> Result<u64, WireError> {
        let mut b = [0u8; 8];
        b.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(b))
    }

    /// # Errors
    ///
    /// `WireError::InvalidBool` for any byte other than 0 or 1.
    pub fn read_bool(&mut self) -> Result<bool, WireError> {
        match self.take(1)?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(WireError::InvalidBool(other)),
        }
    }

    /// # Errors
    ///
    /// `WireError::UnexpectedEof` when the length tag claims more bytes than remain.
    pub fn read_byte_array8(&mut self) -> Result<Vec<u8>, WireError> {
        let len = usize::from(self.take(1)?[0]);
        Ok(self.take(len)?.to_vec())
    }

    /// # Errors
    ///
    /// As [`SiaReader::read_byte_array8`], plus `WireError::InvalidUtf8`.
    pub fn read_string8(&mut self) -> Result<String, WireError> {
        String::from_utf8(self.read_byte_array8()?).map_err(|_| WireError::InvalidUtf8)
    }

    /// # Errors
    ///
    /// `WireError::TrailingBytes` if anything is left unread.
    pub fn finish(self) -> Result<(), WireError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(WireError::TrailingBytes(n)),
        }
    }
}

fn write_attestation(w: SiaWriter, a: &Attestation) -> Result<SiaWriter, WireError> {
    w.add_u64(a.timestamp)
        .add_byte_array8("hash", &a.hash)?
        .add_byte_array8("topic", &a.topic)
        .map(|w| w.add_bool(a.correct))
}

fn read_attestation(r: &mut SiaReader<'_>) -> Result<Attestation, WireError> {
    Ok(Attestation {
        timestamp: r.read_u64()?,
        hash: r.read_byte_array8()?,
        topic: r.read_byte_array8()?,
        correct: r.read_bool()?,
    })
}

/// Canonical attestation bytes: `LE64(timestamp) || ba8(hash) || ba8(topic) || bool(correct)`.
/// These are the exact bytes covered by the attestation signature.
///
/// # Errors
///
/// `WireError::FieldTooLong` when `hash` or `topic` exceed 255 bytes.
pub fn encode_attestation(a: &Attestation) -> Result<Vec<u8>, WireError> {
    let w = SiaWriter::with_capacity(8 + 2 + a.hash.len() + a.topic.len() + 1);
    Ok(write_attestation(w, a)?.into_bytes())
}

/// # Errors
///
/// Returns `WireError` on short input, a bad bool byte, or trailing bytes.
pub fn decode_attestation(b: &[u8]) -> Result<Attestation, WireError> {
    let mut r = SiaReader::new(b);
    let a = read_attestation(&mut r)?;
    r.finish()?;
    Ok(a)
}

/// QR payload: the attestation fields followed by the broker URL as string-8.
///
/// # Errors
///
/// `WireError::FieldTooLong` when any byte field or the URL exceeds 255 bytes.
pub fn encode_qr_data(q: &QrData) -> Result<Vec<u8>, WireError> {
    let w = write_attestation(SiaWriter::new(), &q.data)?;
    Ok(w.add_string8("url", &q.url)?.into_bytes())
}

/// # Errors
///
/// Returns `WireError` if a length-prefixed field overruns the input, the URL
/// is not UTF-8, or bytes remain after the URL.
pub fn decode_qr_data(b: &[u8]) -> Result<QrData, WireError> {
    let mut r = SiaReader::new(b);
    let data = read_attestation(&mut r)?;
    let url = r.read_string8()?;
    r.finish()?;
    Ok(QrData { data, url })
}

/// Decode the base64 text a QR scanner hands back.
///
/// # Errors
///
/// `WireError::InvalidBase64`, or any error from [`decode_qr_data`].
pub fn qr_data_from_base64(text: &str) -> Result<QrData, WireError> {
    let raw = base64::engine::general_purpose::STANDARD
        .decode(text.trim())
        .map_err(|_| WireError::InvalidBase64)?;
    decode_qr_data(&raw)
}

/// # Errors
///
/// See [`encode_qr_data`].
pub fn qr_data_to_base64(q: &QrData) -> Result<String, WireError> {
    Ok(base64::engine::general_purpose::STANDARD.encode(encode_qr_data(q)?))
}

/// Hello body: `s8(name) || s8(evm_wallet) || ba8(public_key) || ba8(short_public_key)`.
///
/// # Errors
///
/// `WireError::FieldTooLong` for any field over 255 bytes.
pub fn encode_hello(s: &Signer) -> Result<Vec<u8>, WireError> {
    Ok(SiaWriter::new()
        .add_string8("name", &s.name)?
        .add_string8("evm_wallet", &s.evm_wallet)?
        .add_byte_array8("public_key", &s.public_key)?
        .add_byte_array8("short_public_key", &s.short_public_key)?
        .into_bytes())
}

/// # Errors
///
/// Returns `WireError` on malformed or trailing input.
pub fn decode_hello(b: &[u8]) -> Result<Signer, WireError> {
    let mut r = SiaReader::new(b);
    let s = Signer {
        name: r.read_string8()?,
        evm_wallet: r.read_string8()?,
        public_key: r.read_byte_array8()?,
        short_public_key: r.read_byte_array8()?,
    };
    r.finish()?;
    Ok(s)
}

/// KOSK body, shared by the broker's challenge and the client's result:
/// `bool(passed) || ba8(random) || ba8(signature)`.
///
/// # Errors
///
/// `WireError::FieldTooLong` for `random` or `signature` over 255 bytes.
pub fn encode_kosk_result(passed: bool, random: &[u8], signature: &[u8]) -> Result<Vec<u8>, WireError> {
    Ok(SiaWriter::new()
        .add_bool(passed)
        .add_byte_array8("random", random)?
        .add_byte_array8("signature", signature)?
        .into_bytes())
}

/// # Errors
///
/// See [`encode_kosk_result`].
pub fn encode_challenge(c: &Challenge) -> Result<Vec<u8>, WireError> {
    encode_kosk_result(c.passed, &c.random, &c.signature)
}

/// # Errors
///
/// Returns `WireError` on malformed or trailing input.
pub fn decode_challenge(b: &[u8]) -> Result<Challenge, WireError> {
    let mut r = SiaReader::new(b);
    let c = Challenge {
        passed: r.read_bool()?,
        random: r.read_byte_array8()?,
        signature: r.read_byte_array8()?,
    };
    r.finish()?;
    Ok(c)
}

/// Alias of [`decode_challenge`] for the client-to-broker direction.
///
/// # Errors
///
/// Returns `WireError` on malformed or trailing input.
pub fn decode_kosk_result(b: &[u8]) -> Result<Challenge, WireError> {
    decode_challenge(b)
}

/// Attestation report body: the attestation fields followed by `ba8(signature)`.
///
/// # Errors
///
/// `WireError::FieldTooLong` for any byte field over 255 bytes.
pub fn encode_attestation_report(rep: &AttestationReport) -> Result<Vec<u8>, WireError> {
    let w = write_attestation(SiaWriter::new(), &rep.attestation)?;
    Ok(w.add_byte_array8("signature", &rep.signature)?.into_bytes())
}

/// # Errors
///
/// Returns `WireError` on malformed or trailing input.
pub fn decode_attestation_report(b: &[u8]) -> Result<AttestationReport, WireError> {
    let mut r = SiaReader::new(b);
    let attestation = read_attestation(&mut r)?;
    let signature = r.read_byte_array8()?;
    r.finish()?;
    Ok(AttestationReport { attestation, signature })
}
