pub mod crypto;
pub mod derive;
mod error;
pub mod format;
pub mod params;
pub mod secret;
pub mod verify;

use std::io::Write;

use tracing::{error, info};

pub use crate::crypto::{Argon2Backend, Primitive, Status};
pub use crate::derive::{DerivationResult, derive};
pub use crate::error::{BufferKind, Error, ParamKind, Result};
pub use crate::params::{CostParameters, ParameterTokens, Variant};
pub use crate::secret::{Password, ScopedPassword};
pub use crate::verify::verify;

/// Hashes `password` under `salt`, prints the result to `out` and verifies the
/// encoded form against the same password.
///
/// The password is wiped before this returns, on success and on every error.
/// Parameters are validated before any output buffer is reserved.
pub fn execute<P, W>(
    primitive: &P,
    salt: &str,
    tokens: &ParameterTokens,
    password: &mut Password,
    out: &mut W,
) -> Result<DerivationResult>
where
    P: Primitive + ?Sized,
    W: Write,
{
    let password = password.scoped();

    let params = tokens.validate()?;
    print_parameters(out, &params)?;

    let result = derive(primitive, password.as_bytes(), salt.as_bytes(), &params)?;
    writeln!(out, "Hash:\t\t{}", result.raw_hex())?;
    writeln!(out, "Encoded:\t{}", result.encoded())?;
    out.flush()?;

    if let Err(err) = verify(primitive, result.encoded(), password.as_bytes(), params.variant()) {
        if err.is_internal() {
            error!(error = %err, "freshly produced hash failed self-verification");
        }
        return Err(err);
    }
    writeln!(out, "Verification ok")?;
    info!("self-verification passed");

    Ok(result)
}

fn print_parameters<W: Write>(out: &mut W, params: &CostParameters) -> Result<()> {
    writeln!(out, "Type:\t\t{}", params.variant())?;
    writeln!(out, "Iterations:\t{}", params.time_cost())?;
    writeln!(out, "Memory:\t\t{} KiB", params.memory_cost_kib())?;
    writeln!(out, "Parallelism:\t{}", params.lanes())?;
    Ok(())
}
