//! Self-describing encoded hash format.
//!
//! ```text
//! $argon2<variant>$m=<memory KiB>,t=<time cost>,p=<parallelism>$<base64(salt)>$<base64(hash)>
//! ```
//!
//! Base64 uses the standard alphabet without padding. The buffer that receives
//! an encoded string is sized once, up front, for the longest possible
//! rendering and never grows.

use std::collections::TryReserveError;
use std::fmt;

use crate::params::{CostParameters, MAX_MEMORY, MAX_PARALLELISM, MAX_TIME};

pub mod codec;

pub use codec::{decode, encode_into};

/// Literal prefix shared by every variant.
pub const PREFIX: &str = "$argon2";

/// Fixed characters of an encoded hash: prefix, variant tag, the
/// `$m=`, `,t=`, `,p=` labels and the two `$` separators around the salt.
const FIXED_LEN: usize = PREFIX.len() + 1 + "$m=".len() + ",t=".len() + ",p=".len() + 2;

/// Fixed characters plus the widest decimal rendering of each cost field.
pub const ENCODED_OVERHEAD: usize = FIXED_LEN
    + decimal_width(MAX_MEMORY)
    + decimal_width(MAX_TIME)
    + decimal_width(MAX_PARALLELISM);

const fn decimal_width(mut value: u32) -> usize {
    let mut width = 1;
    while value >= 10 {
        value /= 10;
        width += 1;
    }
    width
}

/// Characters needed to base64-encode `len` bytes.
pub fn b64_len(len: usize) -> usize {
    len.div_ceil(3).saturating_mul(4)
}

/// Worst-case length of an encoded hash for the given salt and output sizes.
pub fn encoded_capacity(salt_len: usize, output_len: usize) -> usize {
    ENCODED_OVERHEAD
        .saturating_add(b64_len(salt_len))
        .saturating_add(b64_len(output_len))
}

/// Fixed-capacity text sink for an encoded hash.
///
/// Writes that would exceed the capacity fail instead of reallocating.
#[derive(Debug)]
pub struct EncodedBuffer {
    text: String,
    capacity: usize,
}

impl EncodedBuffer {
    /// Reserves `capacity` bytes without aborting on allocation failure.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut text = String::new();
        text.try_reserve_exact(capacity)?;
        Ok(Self { text, capacity })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Write for EncodedBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.text.len() + s.len() > self.capacity {
            return Err(fmt::Error);
        }
        self.text.push_str(s);
        Ok(())
    }
}

/// Fields recovered from an encoded hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHash {
    params: CostParameters,
    salt: Vec<u8>,
    hash: Vec<u8>,
}

impl DecodedHash {
    pub fn params(&self) -> &CostParameters {
        &self.params
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn hash(&self) -> &[u8] {
        &self.hash
    }
}
