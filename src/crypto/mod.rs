//! Seam to the memory-hard key-derivation primitive.
//!
//! The workflow only ever talks to a [`Primitive`]: one raw hashing call, an
//! encoded hash-and-render call, an encoded verify call and a status message
//! lookup. [`Argon2Backend`] is the production implementation.

use subtle::ConstantTimeEq;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::format::{self, EncodedBuffer};
use crate::params::{CostParameters, Variant};

pub mod backend;

pub use backend::Argon2Backend;

/// Non-success status reported by a primitive, with its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Status {
    #[error("Output is too short")]
    OutputTooShort,
    #[error("Output is too long")]
    OutputTooLong,
    #[error("Password is too long")]
    PwdTooLong,
    #[error("Salt is too short")]
    SaltTooShort,
    #[error("Salt is too long")]
    SaltTooLong,
    #[error("Time cost is too small")]
    TimeTooSmall,
    #[error("Memory cost is too small")]
    MemoryTooLittle,
    #[error("Memory cost is too large")]
    MemoryTooMuch,
    #[error("Memory allocation error")]
    MemoryAllocationError,
    #[error("There is no such type of Argon2")]
    IncorrectType,
    #[error("Not enough threads")]
    ThreadsTooFew,
    #[error("Too many threads")]
    ThreadsTooMany,
    #[error("Encoding failed")]
    EncodingFail,
    #[error("Decoding failed")]
    DecodingFail,
    #[error("The password does not match the supplied hash")]
    VerifyMismatch,
    #[error("Unknown error code")]
    Unknown,
}

impl Status {
    pub fn code(&self) -> i32 {
        match self {
            Status::OutputTooShort => -2,
            Status::OutputTooLong => -3,
            Status::PwdTooLong => -5,
            Status::SaltTooShort => -6,
            Status::SaltTooLong => -7,
            Status::TimeTooSmall => -12,
            Status::MemoryTooLittle => -14,
            Status::MemoryTooMuch => -15,
            Status::MemoryAllocationError => -22,
            Status::IncorrectType => -26,
            Status::ThreadsTooFew => -28,
            Status::ThreadsTooMany => -29,
            Status::EncodingFail => -31,
            Status::DecodingFail => -32,
            Status::VerifyMismatch => -35,
            Status::Unknown => i32::MIN,
        }
    }
}

/// Key-derivation primitive consumed by the hashing workflow.
pub trait Primitive {
    /// Fills `out` with the raw hash of `password` under `salt` and `params`.
    ///
    /// Blocks until the computation finishes; there is no cancellation.
    fn hash_raw(
        &self,
        params: &CostParameters,
        password: &[u8],
        salt: &[u8],
        out: &mut [u8],
    ) -> Result<(), Status>;

    /// Computes the raw hash into `raw_out` and renders the encoded form into
    /// `encoded_out`.
    fn hash(
        &self,
        params: &CostParameters,
        password: &[u8],
        salt: &[u8],
        raw_out: &mut [u8],
        encoded_out: &mut EncodedBuffer,
    ) -> Result<(), Status> {
        self.hash_raw(params, password, salt, raw_out)?;
        encoded_out.clear();
        format::encode_into(encoded_out, params, salt, raw_out).map_err(|_| Status::EncodingFail)
    }

    /// Re-derives the hash described by `encoded` and compares it to the
    /// stored one in constant time.
    fn verify_encoded(&self, encoded: &str, password: &[u8], variant: Variant) -> Result<(), Status> {
        let decoded = format::decode(encoded, variant)?;

        let mut fresh = Zeroizing::new(Vec::new());
        fresh
            .try_reserve_exact(decoded.hash().len())
            .map_err(|_| Status::MemoryAllocationError)?;
        fresh.resize(decoded.hash().len(), 0);

        self.hash_raw(decoded.params(), password, decoded.salt(), &mut fresh)?;

        if bool::from(fresh.as_slice().ct_eq(decoded.hash())) {
            Ok(())
        } else {
            Err(Status::VerifyMismatch)
        }
    }

    fn error_message(&self, status: Status) -> String {
        status.to_string()
    }
}
