//! The capsule metadata record.
//!
//! Created once at seal time, immutable from then on, and consumed at
//! unseal time. The record is bincode-serialized inside the container
//! behind a 4-byte length prefix.

use serde::{Deserialize, Serialize};

use chronoseal_crypto::{ContentDigest, KeyMode};

use crate::error::{CapsuleError, Result};

/// Upper bound on the stored filename, matching common filesystem limits.
const MAX_FILENAME_LEN: usize = 255;

/// Metadata describing one sealed capsule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapsuleMetadata {
    /// Base name of the file that was sealed (no directory components).
    pub original_filename: String,

    /// Unix timestamp (seconds) before which the capsule must not open.
    pub unlock_time: u64,

    /// Unix timestamp (seconds) at which the capsule was sealed.
    pub created_at: u64,

    /// Plaintext size in bytes.
    pub original_size: u64,

    /// Size after Huffman compression.
    pub compressed_size: u64,

    /// Size after AES-CBC encryption.
    pub encrypted_size: u64,

    /// SHA-256 of the original plaintext.
    pub content_digest: ContentDigest,

    /// How the session key was obtained. Persisted so the receiver knows
    /// whether a password is required, instead of inferring it from
    /// caller-supplied arguments.
    pub key_mode: KeyMode,
}

impl CapsuleMetadata {
    /// Serialize to bytes for embedding in the container.
    ///
    /// # Errors
    ///
    /// Returns [`CapsuleError::Metadata`] on encoder failure.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| CapsuleError::Metadata(e.to_string()))
    }

    /// Deserialize from container bytes.
    ///
    /// The decoded record is validated before it is returned.
    ///
    /// # Errors
    ///
    /// Returns [`CapsuleError::Metadata`] for undecodable bytes and
    /// [`CapsuleError::InvalidMetadata`] for decodable-but-nonsense
    /// records.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let meta: Self =
            bincode::deserialize(bytes).map_err(|e| CapsuleError::Metadata(e.to_string()))?;
        meta.validate()?;
        Ok(meta)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        if self.original_filename.is_empty() {
            return Err(CapsuleError::InvalidMetadata("empty filename"));
        }
        if self.original_filename.len() > MAX_FILENAME_LEN {
            return Err(CapsuleError::InvalidMetadata("filename too long"));
        }
        if self
            .original_filename
            .contains(['/', '\\'])
        {
            return Err(CapsuleError::InvalidMetadata(
                "filename contains path separators",
            ));
        }
        if self.encrypted_size == 0 {
            return Err(CapsuleError::InvalidMetadata("zero encrypted size"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CapsuleMetadata {
        CapsuleMetadata {
            original_filename: "notes.txt".into(),
            unlock_time: 1_900_000_000,
            created_at: 1_756_000_000,
            original_size: 100,
            compressed_size: 80,
            encrypted_size: 96,
            content_digest: ContentDigest::hash(b"sample"),
            key_mode: KeyMode::Random,
        }
    }

    #[test]
    fn test_metadata_roundtrip() {
        let meta = sample();
        let bytes = meta.to_bytes().unwrap();
        assert_eq!(CapsuleMetadata::from_bytes(&bytes).unwrap(), meta);
    }

    #[test]
    fn test_key_mode_survives_roundtrip() {
        let mut meta = sample();
        meta.key_mode = KeyMode::PasswordDerived;
        let bytes = meta.to_bytes().unwrap();
        assert_eq!(
            CapsuleMetadata::from_bytes(&bytes).unwrap().key_mode,
            KeyMode::PasswordDerived
        );
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        assert!(CapsuleMetadata::from_bytes(&[0xff; 16]).is_err());
    }

    #[test]
    fn test_empty_filename_rejected() {
        let mut meta = sample();
        meta.original_filename.clear();
        assert!(meta.validate().is_err());
    }

    #[test]
    fn test_path_separators_rejected() {
        let mut meta = sample();
        meta.original_filename = "../escape.txt".into();
        assert!(meta.validate().is_err());
    }

    #[test]
    fn test_overlong_filename_rejected() {
        let mut meta = sample();
        meta.original_filename = "x".repeat(300);
        assert!(meta.validate().is_err());
    }
}
