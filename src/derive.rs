use std::fmt::Write;
use std::time::Instant;

use tracing::debug;
use zeroize::Zeroizing;

use crate::crypto::Primitive;
use crate::error::{BufferKind, Error, Result};
use crate::format::{EncodedBuffer, encoded_capacity};
use crate::params::CostParameters;

/// Raw and encoded output of one derivation.
#[derive(Debug)]
pub struct DerivationResult {
    raw: Zeroizing<Vec<u8>>,
    encoded: String,
}

impl DerivationResult {
    pub fn raw_hash(&self) -> &[u8] {
        &self.raw
    }

    /// Lowercase hex rendering of the raw hash.
    pub fn raw_hex(&self) -> String {
        self.raw.iter().fold(
            String::with_capacity(self.raw.len() * 2),
            |mut hex, b| {
                let _ = write!(hex, "{b:02x}");
                hex
            },
        )
    }

    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    pub fn into_encoded(self) -> String {
        self.encoded
    }
}

/// Runs the primitive once over freshly reserved output buffers.
///
/// Failures are returned immediately; the same parameters would fail again.
pub fn derive<P: Primitive + ?Sized>(
    primitive: &P,
    password: &[u8],
    salt: &[u8],
    params: &CostParameters,
) -> Result<DerivationResult> {
    let output_len = params.output_len() as usize;

    let mut raw = Zeroizing::new(Vec::new());
    raw.try_reserve_exact(output_len)
        .map_err(|_| Error::AllocationFailure(BufferKind::RawHash))?;
    raw.resize(output_len, 0);

    let capacity = encoded_capacity(salt.len(), output_len);
    let mut encoded = EncodedBuffer::try_with_capacity(capacity)
        .map_err(|_| Error::AllocationFailure(BufferKind::EncodedHash))?;

    debug!(
        variant = %params.variant(),
        t_cost = params.time_cost(),
        m_cost = params.memory_cost_kib(),
        parallelism = params.parallelism(),
        output_len,
        capacity,
        "starting derivation"
    );
    let started = Instant::now();

    primitive
        .hash(params, password, salt, &mut raw, &mut encoded)
        .map_err(|status| Error::DerivationFailed {
            status,
            message: primitive.error_message(status),
        })?;

    debug!(
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "derivation finished"
    );

    Ok(DerivationResult {
        raw,
        encoded: encoded.into_string(),
    })
}
