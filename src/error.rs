use std::fmt;

use thiserror::Error;

use crate::crypto::Status;

/// Numeric option a token was supplied for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    MemoryExponent,
    TimeCost,
    Parallelism,
    OutputLength,
}

impl ParamKind {
    /// Command-line flag carrying this parameter.
    pub fn flag(&self) -> &'static str {
        match self {
            ParamKind::MemoryExponent => "-m",
            ParamKind::TimeCost => "-t",
            ParamKind::Parallelism => "-p",
            ParamKind::OutputLength => "-h",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.flag())
    }
}

/// Buffer that could not be reserved before derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    RawHash,
    EncodedHash,
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferKind::RawHash => f.write_str("output"),
            BufferKind::EncodedHash => f.write_str("hash"),
        }
    }
}

/// Every way a hashing run can fail.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing salt or password, or an input the harness cannot accept.
    #[error("{0}")]
    Usage(String),

    /// Out-of-range or unparsable numeric option.
    #[error("bad numeric input for {kind}: {token:?}")]
    InvalidParameter { kind: ParamKind, token: String },

    #[error("could not allocate memory for {0}")]
    AllocationFailure(BufferKind),

    /// The primitive reported a non-success status.
    #[error("{message}")]
    DerivationFailed { status: Status, message: String },

    /// A hash we just produced failed to decode.
    #[error("self-verification failed: encoded hash could not be decoded")]
    EncodingMalformed,

    /// A hash we just produced did not match its own password.
    #[error("self-verification failed: password does not match the encoded hash")]
    VerificationMismatch,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid(kind: ParamKind, token: &str) -> Self {
        Error::InvalidParameter {
            kind,
            token: token.to_string(),
        }
    }

    /// Self-check failures: these indicate a defect in encoding or decoding,
    /// never a user mistake.
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::EncodingMalformed | Error::VerificationMismatch)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
