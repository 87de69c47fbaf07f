use tracing::debug;

use crate::crypto::{Primitive, Status};
use crate::error::{Error, Result};
use crate::params::Variant;

/// Checks `password` against an encoded hash.
///
/// A string that does not decode is [`Error::EncodingMalformed`]; a wrong
/// password or tampered hash is [`Error::VerificationMismatch`].
pub fn verify<P: Primitive + ?Sized>(
    primitive: &P,
    encoded: &str,
    password: &[u8],
    variant: Variant,
) -> Result<()> {
    match primitive.verify_encoded(encoded, password, variant) {
        Ok(()) => {
            debug!(%variant, "encoded hash verified");
            Ok(())
        }
        Err(Status::DecodingFail | Status::IncorrectType) => Err(Error::EncodingMalformed),
        Err(Status::VerifyMismatch) => Err(Error::VerificationMismatch),
        Err(status) => Err(Error::DerivationFailed {
            status,
            message: primitive.error_message(status),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::fake::FakePrimitive;
    use crate::derive::derive;
    use crate::params::CostParameters;

    #[test]
    fn verifies_a_fresh_derivation() {
        let primitive = FakePrimitive::default();
        let params = CostParameters::default();
        let result = derive(&primitive, b"password", b"somesalt", &params).unwrap();

        verify(&primitive, result.encoded(), b"password", Variant::I).unwrap();
    }

    #[test]
    fn wrong_password_is_a_mismatch() {
        let primitive = FakePrimitive::default();
        let result =
            derive(&primitive, b"password", b"somesalt", &CostParameters::default()).unwrap();

        assert!(matches!(
            verify(&primitive, result.encoded(), b"Password", Variant::I),
            Err(Error::VerificationMismatch)
        ));
    }

    #[test]
    fn tampered_hash_is_a_mismatch() {
        let primitive = FakePrimitive::default();
        let result =
            derive(&primitive, b"password", b"somesalt", &CostParameters::default()).unwrap();

        let mut tampered = result.into_encoded();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'Q' } else { 'A' });

        assert!(matches!(
            verify(&primitive, &tampered, b"password", Variant::I),
            Err(Error::VerificationMismatch)
        ));
    }

    #[test]
    fn foreign_strings_are_malformed() {
        let primitive = FakePrimitive::default();
        assert!(matches!(
            verify(&primitive, "$2b$10$notargon", b"password", Variant::I),
            Err(Error::EncodingMalformed)
        ));

        let result =
            derive(&primitive, b"password", b"somesalt", &CostParameters::default()).unwrap();
        assert!(matches!(
            verify(&primitive, result.encoded(), b"password", Variant::D),
            Err(Error::EncodingMalformed)
        ));
    }

    #[test]
    fn other_primitive_failures_pass_through() {
        let primitive = FakePrimitive::default();
        let result =
            derive(&primitive, b"password", b"somesalt", &CostParameters::default()).unwrap();

        let failing = FakePrimitive::failing(Status::MemoryAllocationError);
        assert!(matches!(
            verify(&failing, result.encoded(), b"password", Variant::I),
            Err(Error::DerivationFailed {
                status: Status::MemoryAllocationError,
                ..
            })
        ));
    }
}
