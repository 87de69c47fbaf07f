use anyhow::{Context, Result, bail};
use argon2_harness::Password;
use std::io::{self, IsTerminal};
use zeroize::Zeroizing;

/// Reads the password from stdin, never from the command line.
pub fn read_password() -> Result<Password> {
    //  Interactive (TTY)
    if io::stdin().is_terminal() {
        let pw = Zeroizing::new(rpassword::prompt_password("Password: ")?);
        return Ok(Password::from_bytes(pw.as_bytes())?);
    }

    //  stdin (Pipeline)
    //  printf "%s" "$PASSWORD" | argon2-harness somesalt
    match Password::read_from(io::stdin().lock()).context("failed to read password from stdin")? {
        Some(pw) => Ok(pw),
        None => bail!("password missing"),
    }
}
