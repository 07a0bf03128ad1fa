//! Error types for container operations.

use thiserror::Error;

/// Errors that can occur while assembling or parsing a capsule.
#[derive(Error, Debug)]
pub enum CapsuleError {
    /// The container ended before a declared field was complete.
    #[error("Truncated capsule: {field} needs {needed} more bytes")]
    Truncated {
        /// Which field was cut short.
        field: &'static str,
        /// Bytes still required.
        needed: usize,
    },

    /// A declared length prefix points past the end of the container.
    #[error("Declared {field} length {declared} exceeds remaining {remaining} bytes")]
    LengthOverrun {
        /// Which field's length was bad.
        field: &'static str,
        /// The declared length.
        declared: usize,
        /// Bytes actually remaining.
        remaining: usize,
    },

    /// The serialized metadata exceeds the 4-byte length field.
    #[error("Metadata too large: {size} bytes")]
    MetadataTooLarge {
        /// Serialized metadata size.
        size: usize,
    },

    /// Metadata bytes did not decode as a CapsuleMetadata record.
    #[error("Metadata serialization error: {0}")]
    Metadata(String),

    /// The standalone digest field disagrees with the metadata's copy.
    #[error("Capsule digest field does not match metadata digest")]
    DigestFieldMismatch,

    /// The digest field was structurally invalid.
    #[error(transparent)]
    Digest(#[from] chronoseal_crypto::CryptoError),

    /// A metadata record failed validation.
    #[error("Invalid metadata: {0}")]
    InvalidMetadata(&'static str),
}

/// Result type for container operations.
pub type Result<T> = std::result::Result<T, CapsuleError>;
