use argon2::{Algorithm, Argon2, Block, Params, Version};
use tracing::trace;

use super::{Primitive, Status};
use crate::params::{CostParameters, Variant};

/// Argon2 from the `argon2` crate.
///
/// Encoded hashes carry no version segment, so hashing uses version 0x10.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Backend;

impl From<Variant> for Algorithm {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::D => Algorithm::Argon2d,
            Variant::I => Algorithm::Argon2i,
        }
    }
}

impl From<argon2::Error> for Status {
    fn from(err: argon2::Error) -> Self {
        match err {
            argon2::Error::OutputTooShort => Status::OutputTooShort,
            argon2::Error::OutputTooLong => Status::OutputTooLong,
            argon2::Error::PwdTooLong => Status::PwdTooLong,
            argon2::Error::SaltTooShort => Status::SaltTooShort,
            argon2::Error::SaltTooLong => Status::SaltTooLong,
            argon2::Error::TimeTooSmall => Status::TimeTooSmall,
            argon2::Error::MemoryTooLittle => Status::MemoryTooLittle,
            argon2::Error::MemoryTooMuch => Status::MemoryTooMuch,
            argon2::Error::ThreadsTooFew => Status::ThreadsTooFew,
            argon2::Error::ThreadsTooMany => Status::ThreadsTooMany,
            argon2::Error::AlgorithmInvalid => Status::IncorrectType,
            _ => Status::Unknown,
        }
    }
}

impl Primitive for Argon2Backend {
    fn hash_raw(
        &self,
        params: &CostParameters,
        password: &[u8],
        salt: &[u8],
        out: &mut [u8],
    ) -> Result<(), Status> {
        let argon2_params = Params::new(
            params.memory_cost_kib(),
            params.time_cost(),
            params.parallelism(),
            None,
        )?;
        let block_count = argon2_params.block_count();

        // Working memory is reserved fallibly so an unsatisfiable memory cost
        // is reported instead of aborting the process.
        let mut blocks: Vec<Block> = Vec::new();
        blocks
            .try_reserve_exact(block_count)
            .map_err(|_| Status::MemoryAllocationError)?;
        blocks.resize(block_count, Block::default());
        trace!(block_count, "argon2 working memory reserved");

        Argon2::new(params.variant().into(), Version::V0x10, argon2_params)
            .hash_password_into_with_memory(password, salt, out, &mut blocks)?;
        Ok(())
    }
}
