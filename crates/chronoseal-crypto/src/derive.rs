//! Password-based key derivation.
//!
//! PBKDF2-HMAC-SHA256 with a high iteration count makes brute-forcing a
//! capsule password computationally expensive. Derivation is fully
//! deterministic: the receiver re-derives the exact session key the sender
//! used from the same password and the salt stored in the key package.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use crate::error::{CryptoError, Result};

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Derive `output_len` key bytes from a password and salt.
///
/// `output_len` must be a valid AES key length (16, 24 or 32).
///
/// # Errors
///
/// Returns [`CryptoError::InvalidKeyLength`] for an unsupported output
/// length and [`CryptoError::ZeroIterations`] for a zero iteration count.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    output_len: usize,
    iterations: u32,
) -> Result<Vec<u8>> {
    if !matches!(output_len, 16 | 24 | 32) {
        return Err(CryptoError::InvalidKeyLength { actual: output_len });
    }
    if iterations == 0 {
        return Err(CryptoError::ZeroIterations);
    }
    let mut key = vec![0u8; output_len];
    pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key);
    Ok(key)
}
