//! SHA-256 content digests.
//!
//! The digest is the capsule's integrity anchor: computed over the
//! original plaintext at seal time, recomputed after decompression at
//! unseal time, and compared in constant time.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::{CryptoError, Result};

/// A 256-bit (32-byte) SHA-256 digest.
#[derive(Clone, Serialize, Deserialize)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Digest size in bytes.
    pub const SIZE: usize = 32;

    /// Compute the digest of `data`.
    pub fn hash(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Create a digest from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::SIZE {
            return Err(CryptoError::InvalidDigestLength {
                expected: Self::SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Get the digest as a byte slice.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to an owned byte array.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Format as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        let mut s = String::with_capacity(64);
        for byte in &self.0 {
            s.push_str(&format!("{:02x}", byte));
        }
        s
    }

    /// Parse from a 64-character hex string.
    ///
    /// # Errors
    ///
    /// Returns an error for the wrong length or non-hex characters.
    pub fn from_hex(s: &str) -> Result<Self> {
        if s.len() != 64 {
            return Err(CryptoError::InvalidDigestLength {
                expected: 64,
                actual: s.len(),
            });
        }
        let mut arr = [0u8; 32];
        for (i, chunk) in s.as_bytes().chunks_exact(2).enumerate() {
            let hex = std::str::from_utf8(chunk)
                .map_err(|_| CryptoError::InvalidDigestHex(s.to_string()))?;
            arr[i] = u8::from_str_radix(hex, 16)
                .map_err(|_| CryptoError::InvalidDigestHex(s.to_string()))?;
        }
        Ok(Self(arr))
    }
}

impl PartialEq for ContentDigest {
    fn eq(&self, other: &Self) -> bool {
        // Constant-time: digest comparison is the tamper check.
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for ContentDigest {}

impl std::fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ContentDigest({:02x}{:02x}{:02x}{:02x}..)",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}
