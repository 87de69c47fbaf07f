use std::fmt;

use base64::Engine;
use base64::display::Base64Display;
use base64::engine::general_purpose::STANDARD_NO_PAD;

use super::{DecodedHash, PREFIX};
use crate::crypto::Status;
use crate::params::{CostParameters, Variant};

/// Renders `params`, `salt` and `hash` into `out`.
///
/// `params.output_len()` is not consulted; the hash slice is what gets written.
pub fn encode_into<W: fmt::Write>(
    out: &mut W,
    params: &CostParameters,
    salt: &[u8],
    hash: &[u8],
) -> fmt::Result {
    write!(
        out,
        "{PREFIX}{}$m={},t={},p={}${}${}",
        params.variant().tag(),
        params.memory_cost_kib(),
        params.time_cost(),
        params.parallelism(),
        Base64Display::new(salt, &STANDARD_NO_PAD),
        Base64Display::new(hash, &STANDARD_NO_PAD),
    )
}

/// Parses an encoded hash, requiring its variant tag to match `expected`.
///
/// Only canonical renderings are accepted, so decoding and re-encoding yields
/// the original string byte for byte.
pub fn decode(encoded: &str, expected: Variant) -> Result<DecodedHash, Status> {
    let rest = encoded.strip_prefix(PREFIX).ok_or(Status::DecodingFail)?;

    let mut chars = rest.chars();
    let variant = chars
        .next()
        .and_then(Variant::from_tag)
        .ok_or(Status::DecodingFail)?;
    if variant != expected {
        return Err(Status::IncorrectType);
    }
    let rest = chars.as_str();

    let rest = rest.strip_prefix("$m=").ok_or(Status::DecodingFail)?;
    let (memory_cost_kib, rest) = take_decimal(rest)?;
    let rest = rest.strip_prefix(",t=").ok_or(Status::DecodingFail)?;
    let (time_cost, rest) = take_decimal(rest)?;
    let rest = rest.strip_prefix(",p=").ok_or(Status::DecodingFail)?;
    let (parallelism, rest) = take_decimal(rest)?;
    let rest = rest.strip_prefix('$').ok_or(Status::DecodingFail)?;

    let (salt_b64, hash_b64) = rest.split_once('$').ok_or(Status::DecodingFail)?;
    let salt = STANDARD_NO_PAD
        .decode(salt_b64)
        .map_err(|_| Status::DecodingFail)?;
    let hash = STANDARD_NO_PAD
        .decode(hash_b64)
        .map_err(|_| Status::DecodingFail)?;

    let output_len = u32::try_from(hash.len()).map_err(|_| Status::DecodingFail)?;
    let params = CostParameters::new(variant, time_cost, memory_cost_kib, parallelism, output_len)
        .map_err(|_| Status::DecodingFail)?;

    Ok(DecodedHash { params, salt, hash })
}

/// Splits a canonical `u32` decimal off the front of `input`.
fn take_decimal(input: &str) -> Result<(u32, &str), Status> {
    let digits = input
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 || (digits > 1 && input.starts_with('0')) {
        return Err(Status::DecodingFail);
    }

    let (number, rest) = input.split_at(digits);
    let value = number.parse::<u32>().map_err(|_| Status::DecodingFail)?;
    Ok((value, rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{EncodedBuffer, encoded_capacity};

    fn encode(params: &CostParameters, salt: &[u8], hash: &[u8]) -> String {
        let mut buf = EncodedBuffer::try_with_capacity(encoded_capacity(salt.len(), hash.len()))
            .unwrap();
        encode_into(&mut buf, params, salt, hash).unwrap();
        buf.into_string()
    }

    #[test]
    fn encodes_default_parameters() {
        let encoded = encode(&CostParameters::default(), b"somesalt", &[0u8; 32]);
        assert_eq!(
            encoded,
            format!("$argon2i$m=4096,t=3,p=1$c29tZXNhbHQ${}", "A".repeat(43))
        );
    }

    #[test]
    fn decode_then_encode_is_identical() {
        let params = CostParameters::new(Variant::D, 7, 65536, 4, 20).unwrap();
        let hash: Vec<u8> = (0u8..20).collect();
        let encoded = encode(&params, b"pepper and salt", &hash);

        let decoded = decode(&encoded, Variant::D).unwrap();
        assert_eq!(decoded.params(), &params);
        assert_eq!(decoded.salt(), b"pepper and salt");
        assert_eq!(decoded.hash(), hash.as_slice());

        let again = encode(decoded.params(), decoded.salt(), decoded.hash());
        assert_eq!(again, encoded);
    }

    #[test]
    fn capacity_covers_every_small_salt_and_output() {
        let widest = CostParameters::new(
            Variant::I,
            crate::params::MAX_TIME,
            crate::params::MAX_MEMORY,
            crate::params::MAX_PARALLELISM,
            1,
        )
        .unwrap();

        for salt_len in 0..=64 {
            for output_len in 0..=64 {
                let salt = vec![0xA5u8; salt_len];
                let hash = vec![0x5Au8; output_len];
                let mut rendered = String::new();
                encode_into(&mut rendered, &widest, &salt, &hash).unwrap();
                assert!(
                    rendered.len() <= encoded_capacity(salt_len, output_len),
                    "salt {salt_len}, output {output_len}"
                );
            }
        }
    }

    #[test]
    fn wrong_variant_is_incorrect_type() {
        let encoded = encode(&CostParameters::default(), b"somesalt", &[1u8; 32]);
        assert_eq!(decode(&encoded, Variant::D), Err(Status::IncorrectType));
    }

    #[test]
    fn malformed_strings_fail_to_decode() {
        let cases = [
            "",
            "$argon2",
            "$argon2x$m=4096,t=3,p=1$c29tZXNhbHQ$AAAAAA",
            "$argon2i$m=4096,t=3$c29tZXNhbHQ$AAAAAA",
            "$argon2i$m=,t=3,p=1$c29tZXNhbHQ$AAAAAA",
            "$argon2i$m=04096,t=3,p=1$c29tZXNhbHQ$AAAAAA",
            "$argon2i$m=4294967296,t=3,p=1$c29tZXNhbHQ$AAAAAA",
            "$argon2i$m=4096,t=0,p=1$c29tZXNhbHQ$AAAAAA",
            "$argon2i$m=4096,t=3,p=0$c29tZXNhbHQ$AAAAAA",
            "$argon2i$m=4096,t=3,p=1$c29tZXNhbHQ",
            "$argon2i$m=4096,t=3,p=1$c29tZXNhbHQ$",
            "$argon2i$m=4096,t=3,p=1$c29tZXNhbHQ=$AAAAAA",
            "$argon2i$m=4096,t=3,p=1$c29t*XNhbHQ$AAAAAA",
            "$argon2i$m=4096,t=3,p=1$c29tZXNhbHQ$AAAAAA$",
            "$argon2i$m=+4096,t=3,p=1$c29tZXNhbHQ$AAAAAA",
        ];
        for case in cases {
            assert_eq!(decode(case, Variant::I), Err(Status::DecodingFail), "{case}");
        }
    }

    #[test]
    fn non_canonical_trailing_bits_are_rejected() {
        // "AB" decodes one byte only if the low bits of 'B' are zero.
        assert_eq!(
            decode("$argon2i$m=4096,t=3,p=1$c29tZXNhbHQ$AB", Variant::I),
            Err(Status::DecodingFail)
        );
        assert!(decode("$argon2i$m=4096,t=3,p=1$c29tZXNhbHQ$AA", Variant::I).is_ok());
    }
}
