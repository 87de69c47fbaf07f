//! Password buffer that never outlives its use.
//!
//! The password lives in one heap allocation for its whole life so moves never
//! leave stale copies behind. Dropping a [`Password`] wipes it; the driver
//! additionally holds a [`ScopedPassword`] guard so the wipe happens as soon as
//! the workflow ends, whichever way it ends.

use std::fmt;
use std::io::{self, Read};
use std::ops::Deref;

use zeroize::{Zeroize, Zeroizing};

use crate::error::{Error, Result};

/// Maximum password length in bytes, after trimming the trailing newline.
pub const PASSWORD_CAPACITY: usize = 128;

/// Byte every wiped position holds. `zeroize` writes zeros.
pub const WIPE_PATTERN: u8 = 0x00;

pub struct Password {
    bytes: Box<[u8; PASSWORD_CAPACITY]>,
    len: usize,
}

impl Password {
    fn empty() -> Self {
        Self {
            bytes: Box::new([WIPE_PATTERN; PASSWORD_CAPACITY]),
            len: 0,
        }
    }

    /// Copies `secret` into a fresh buffer. The caller remains responsible for
    /// wiping its own copy.
    pub fn from_bytes(secret: &[u8]) -> Result<Self> {
        if secret.len() > PASSWORD_CAPACITY {
            return Err(too_long());
        }
        let mut password = Self::empty();
        password.bytes[..secret.len()].copy_from_slice(secret);
        password.len = secret.len();
        Ok(password)
    }

    /// Reads the whole of `reader` into a password, trimming one trailing
    /// `\n`.
    ///
    /// Returns `Ok(None)` when the stream is empty.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Option<Self>> {
        let mut password = Self::empty();

        loop {
            if password.len == PASSWORD_CAPACITY {
                // Full: anything further, other than a final newline, is too much.
                let mut probe = Zeroizing::new([0u8; 1]);
                match read_retrying(&mut reader, &mut probe[..])? {
                    0 => break,
                    _ if probe[0] == b'\n' && at_eof(&mut reader)? => {
                        return Ok(Some(password));
                    }
                    _ => return Err(too_long()),
                }
            }

            let len = password.len;
            match read_retrying(&mut reader, &mut password.bytes[len..])? {
                0 => break,
                n => password.len += n,
            }
        }

        if password.len == 0 {
            return Ok(None);
        }
        if password.bytes[password.len - 1] == b'\n' {
            password.len -= 1;
            password.bytes[password.len] = WIPE_PATTERN;
        }
        Ok(Some(password))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Overwrites every byte of the buffer, not just the used prefix.
    pub fn wipe(&mut self) {
        self.bytes.as_mut_slice().zeroize();
        self.len = 0;
    }

    /// True when every byte of the buffer holds [`WIPE_PATTERN`].
    pub fn is_wiped(&self) -> bool {
        self.len == 0 && self.bytes.iter().all(|&b| b == WIPE_PATTERN)
    }

    /// Borrows the password for a workflow; it is wiped when the guard drops.
    pub fn scoped(&mut self) -> ScopedPassword<'_> {
        ScopedPassword { password: self }
    }
}

impl Drop for Password {
    fn drop(&mut self) {
        self.wipe();
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Password")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// Scope guard wiping the borrowed password on every exit path, unwinding
/// included.
pub struct ScopedPassword<'a> {
    password: &'a mut Password,
}

impl Deref for ScopedPassword<'_> {
    type Target = Password;

    fn deref(&self) -> &Password {
        self.password
    }
}

impl Drop for ScopedPassword<'_> {
    fn drop(&mut self) {
        self.password.wipe();
    }
}

fn too_long() -> Error {
    Error::Usage(format!("password is longer than {PASSWORD_CAPACITY} bytes"))
}

fn read_retrying<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}

fn at_eof<R: Read>(reader: &mut R) -> io::Result<bool> {
    let mut probe = Zeroizing::new([0u8; 1]);
    Ok(read_retrying(reader, &mut probe[..])? == 0)
}
