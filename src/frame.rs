//! Broker frames: one opcode byte followed by a Sia-encoded body.
//!
//! Opcode numbering has drifted across broker releases (the attestation
//! report is 6 on some, 10 on others), so the numbers live in an
//! [`OpcodeTable`] carried by configuration instead of in match arms.

use core::fmt;

use crate::{
    errors::WireError,
    ser::decode_challenge,
    types::Challenge,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Hello,
    KoskChallenge,
    KoskResult,
    Feedback,
    Error,
    Attestation,
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Hello => "hello",
            Self::KoskChallenge => "kosk_challenge",
            Self::KoskResult => "kosk_result",
            Self::Feedback => "feedback",
            Self::Error => "error",
            Self::Attestation => "attestation",
        };
        f.write_str(s)
    }
}

/// Opcode byte assignment for one broker protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeTable {
    pub hello: u8,
    pub kosk_challenge: u8,
    pub kosk_result: u8,
    pub feedback: u8,
    pub error: u8,
    pub attestation: u8,
}

impl OpcodeTable {
    /// Numbering where the attestation report is opcode 6.
    pub const V6: Self = Self {
        hello: 0,
        kosk_challenge: 1,
        kosk_result: 2,
        feedback: 4,
        error: 5,
        attestation: 6,
    };

    /// Numbering where the attestation report (correctness report) is opcode 10.
    pub const V10: Self = Self { attestation: 10, ..Self::V6 };

    #[must_use]
    pub const fn with_attestation(attestation: u8) -> Self {
        Self { attestation, ..Self::V6 }
    }

    #[must_use]
    pub const fn byte(&self, op: Opcode) -> u8 {
        match op {
            Opcode::Hello => self.hello,
            Opcode::KoskChallenge => self.kosk_challenge,
            Opcode::KoskResult => self.kosk_result,
            Opcode::Feedback => self.feedback,
            Opcode::Error => self.error,
            Opcode::Attestation => self.attestation,
        }
    }

    #[must_use]
    pub fn opcode(&self, byte: u8) -> Option<Opcode> {
        [
            Opcode::Hello,
            Opcode::KoskChallenge,
            Opcode::KoskResult,
            Opcode::Feedback,
            Opcode::Error,
            Opcode::Attestation,
        ]
        .into_iter()
        .find(|op| self.byte(*op) == byte)
    }

    /// `opcode || body`
    #[must_use]
    pub fn frame(&self, op: Opcode, body: &[u8]) -> Vec<u8> {
        let mut v = Vec::with_capacity(1 + body.len());
        v.push(self.byte(op));
        v.extend_from_slice(body);
        v
    }

    /// Split a raw frame into its opcode and body.
    ///
    /// # Errors
    ///
    /// `WireError::EmptyFrame` for a zero-length frame. An unassigned opcode
    /// byte is not an error here; it comes back as `None`.
    pub fn split<'a>(&self, raw: &'a [u8]) -> Result<(Option<Opcode>, u8, &'a [u8]), WireError> {
        let (&first, body) = raw.split_first().ok_or(WireError::EmptyFrame)?;
        Ok((self.opcode(first), first, body))
    }
}

impl Default for OpcodeTable {
    fn default() -> Self {
        Self::V6
    }
}

/// Broker feedback vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    KoskOk,
    ConfOk,
    SignatureAccepted,
    SignatureInvalid,
    Unknown(String),
}

impl Feedback {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "kosk.ok" => Self::KoskOk,
            "conf.ok" => Self::ConfOk,
            "signature.accepted" => Self::SignatureAccepted,
            "signature.invalid" => Self::SignatureInvalid,
            other => Self::Unknown(other.to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::KoskOk => "kosk.ok",
            Self::ConfOk => "conf.ok",
            Self::SignatureAccepted => "signature.accepted",
            Self::SignatureInvalid => "signature.invalid",
            Self::Unknown(s) => s,
        }
    }
}

/// A decoded broker-to-client frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    KoskChallenge(Challenge),
    Feedback(Feedback),
    Error(String),
    /// Assigned opcode the client never expects to receive, or an unassigned byte.
    Unexpected(u8),
}

fn utf8(body: &[u8]) -> Result<String, WireError> {
    String::from_utf8(body.to_vec()).map_err(|_| WireError::InvalidUtf8)
}

/// Parse a broker-to-client frame.
///
/// # Errors
///
/// `WireError` when the frame is empty or its body does not decode.
pub fn parse_inbound(table: &OpcodeTable, raw: &[u8]) -> Result<Inbound, WireError> {
    let (op, byte, body) = table.split(raw)?;
    match op {
        Some(Opcode::KoskChallenge) => Ok(Inbound::KoskChallenge(decode_challenge(body)?)),
        Some(Opcode::Feedback) => Ok(Inbound::Feedback(Feedback::parse(&utf8(body)?))),
        Some(Opcode::Error) => Ok(Inbound::Error(utf8(body)?)),
        _ => Ok(Inbound::Unexpected(byte)),
    }
}
