use core::fmt;
use thiserror::Error;

/// Wire format failures. Every decoder is strict: short input, trailing
/// bytes and over-long fields are all hard errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("field {field} is {len} bytes, byte-array-8 allows at most 255")]
    FieldTooLong { field: &'static str, len: usize },

    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("{0} trailing bytes after record")]
    TrailingBytes(usize),

    #[error("invalid bool byte {0:#04x}")]
    InvalidBool(u8),

    #[error("string field is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid base64 payload")]
    InvalidBase64,

    #[error("empty frame")]
    EmptyFrame,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("private key is not valid hex")]
    InvalidHex,

    #[error("invalid length: expected {expected} got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("private key is zero or not below the scalar field modulus")]
    OutOfRange,

    #[error("bytes do not encode a valid curve point")]
    InvalidPoint,
}

/// Why a broker session did not resolve successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    Timeout,
    Error,
    InvalidSignature,
}

impl RejectReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Error => "error",
            Self::InvalidSignature => "invalid_signature",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single failure type a session surfaces to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reject {
    pub reason: RejectReason,
    pub message: Option<String>,
}

impl Reject {
    #[must_use]
    pub const fn timeout() -> Self {
        Self { reason: RejectReason::Timeout, message: None }
    }

    #[must_use]
    pub const fn invalid_signature() -> Self {
        Self { reason: RejectReason::InvalidSignature, message: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { reason: RejectReason::Error, message: Some(message.into()) }
    }
}

impl fmt::Display for Reject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(m) => write!(f, "{}: {m}", self.reason),
            None => write!(f, "{}", self.reason),
        }
    }
}

impl std::error::Error for Reject {}

impl From<WireError> for Reject {
    fn from(e: WireError) -> Self {
        Self::error(format!("malformed frame: {e}"))
    }
}

impl From<KeyError> for Reject {
    fn from(e: KeyError) -> Self {
        Self::error(format!("key error: {e}"))
    }
}
