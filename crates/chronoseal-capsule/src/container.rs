//! Capsule container assembly and parsing.
//!
//! See the crate docs for the byte layout. `parse` is the trust boundary
//! for everything read back from disk or a server: every length prefix is
//! validated against the remaining buffer before slicing, and the
//! standalone digest field must agree with the metadata's embedded copy.

use chronoseal_crypto::ContentDigest;

use crate::error::{CapsuleError, Result};
use crate::metadata::CapsuleMetadata;

/// Bytes occupied by one length-prefix field.
const LEN_FIELD: usize = 4;

/// A parsed (or about-to-be-written) capsule.
#[derive(Debug, Clone, PartialEq)]
pub struct Capsule {
    metadata: CapsuleMetadata,
    digest: ContentDigest,
    key_package: Vec<u8>,
    ciphertext: Vec<u8>,
}

impl Capsule {
    /// Assemble a capsule from its fields.
    ///
    /// The digest must be the same value recorded in
    /// `metadata.content_digest`; the container stores it twice so the
    /// fixed-offset copy can be checked before the metadata is even
    /// decoded elsewhere.
    pub fn new(
        metadata: CapsuleMetadata,
        key_package: Vec<u8>,
        ciphertext: Vec<u8>,
    ) -> Self {
        let digest = metadata.content_digest.clone();
        Self {
            metadata,
            digest,
            key_package,
            ciphertext,
        }
    }

    /// The metadata record.
    pub fn metadata(&self) -> &CapsuleMetadata {
        &self.metadata
    }

    /// The content digest.
    pub fn digest(&self) -> &ContentDigest {
        &self.digest
    }

    /// The RSA-wrapped key package.
    pub fn key_package(&self) -> &[u8] {
        &self.key_package
    }

    /// The encrypted, compressed payload.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Serialize the capsule to its on-disk/wire form.
    ///
    /// # Errors
    ///
    /// Returns [`CapsuleError::MetadataTooLarge`] if the metadata record
    /// overflows its 4-byte length field.
    pub fn assemble(&self) -> Result<Vec<u8>> {
        let metadata_bytes = self.metadata.to_bytes()?;
        let metadata_len = u32::try_from(metadata_bytes.len())
            .map_err(|_| CapsuleError::MetadataTooLarge {
                size: metadata_bytes.len(),
            })?;
        let key_package_len = u32::try_from(self.key_package.len()).map_err(|_| {
            CapsuleError::LengthOverrun {
                field: "key package",
                declared: self.key_package.len(),
                remaining: u32::MAX as usize,
            }
        })?;

        let mut out = Vec::with_capacity(
            LEN_FIELD * 2
                + metadata_bytes.len()
                + ContentDigest::SIZE
                + self.key_package.len()
                + self.ciphertext.len(),
        );
        out.extend_from_slice(&metadata_len.to_be_bytes());
        out.extend_from_slice(&metadata_bytes);
        out.extend_from_slice(self.digest.as_bytes());
        out.extend_from_slice(&key_package_len.to_be_bytes());
        out.extend_from_slice(&self.key_package);
        out.extend_from_slice(&self.ciphertext);
        Ok(out)
    }

    /// Parse a container, validating every field boundary.
    ///
    /// # Errors
    ///
    /// Any structural defect rejects the whole capsule; no field of a
    /// partially valid container is ever returned.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let (metadata_bytes, rest) = take_prefixed(bytes, "metadata")?;
        let metadata = CapsuleMetadata::from_bytes(metadata_bytes)?;

        if rest.len() < ContentDigest::SIZE {
            return Err(CapsuleError::Truncated {
                field: "digest",
                needed: ContentDigest::SIZE - rest.len(),
            });
        }
        let (digest_bytes, rest) = rest.split_at(ContentDigest::SIZE);
        let digest = ContentDigest::from_bytes(digest_bytes)?;
        if digest != metadata.content_digest {
            return Err(CapsuleError::DigestFieldMismatch);
        }

        let (key_package, ciphertext) = take_prefixed(rest, "key package")?;
        if ciphertext.is_empty() {
            return Err(CapsuleError::Truncated {
                field: "ciphertext",
                needed: 1,
            });
        }

        Ok(Self {
            metadata,
            digest,
            key_package: key_package.to_vec(),
            ciphertext: ciphertext.to_vec(),
        })
    }
}

/// Split a 4-byte big-endian length-prefixed field off the front of
/// `bytes`, verifying the declared span fits.
fn take_prefixed<'a>(bytes: &'a [u8], field: &'static str) -> Result<(&'a [u8], &'a [u8])> {
    if bytes.len() < LEN_FIELD {
        return Err(CapsuleError::Truncated {
            field,
            needed: LEN_FIELD - bytes.len(),
        });
    }
    let (len_bytes, rest) = bytes.split_at(LEN_FIELD);
    let declared = u32::from_be_bytes(len_bytes.try_into().expect("split yields 4 bytes")) as usize;
    if declared > rest.len() {
        return Err(CapsuleError::LengthOverrun {
            field,
            declared,
            remaining: rest.len(),
        });
    }
    Ok(rest.split_at(declared))
}
