//! Error types for cryptographic operations.

use thiserror::Error;

/// Errors that can occur during cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Symmetric key length is not one of the AES variants.
    #[error("Invalid key length: expected 16, 24 or 32 bytes, got {actual}")]
    InvalidKeyLength {
        /// Actual key length.
        actual: usize,
    },

    /// Initialization vector length does not match the cipher block size.
    #[error("Invalid IV length: expected {expected}, got {actual}")]
    InvalidIvLength {
        /// Expected IV length.
        expected: usize,
        /// Actual IV length.
        actual: usize,
    },

    /// Ciphertext length is not a whole number of cipher blocks.
    #[error("Ciphertext length {len} is not a multiple of the {block} byte block size")]
    CiphertextNotBlockAligned {
        /// Actual ciphertext length.
        len: usize,
        /// The cipher block size.
        block: usize,
    },

    /// Decryption produced invalid padding (wrong key, wrong IV, or a
    /// corrupted ciphertext).
    #[error("Decryption failed: invalid padding")]
    InvalidPadding,

    /// Key derivation was asked to run with zero iterations.
    #[error("Key derivation requires at least one iteration")]
    ZeroIterations,

    /// Key generation failed.
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    /// A PEM key file could not be parsed as the expected key type.
    #[error("Key parse failed: {0}")]
    KeyParse(String),

    /// The serialized key package exceeds the asymmetric cipher's maximum
    /// plaintext size for this key.
    #[error("Key package too large: {size} bytes exceeds OAEP limit {max}")]
    PackageTooLarge {
        /// Serialized package size.
        size: usize,
        /// Maximum OAEP plaintext for the recipient key.
        max: usize,
    },

    /// Asymmetric encryption of the key package failed.
    #[error("Key wrap failed: {0}")]
    Wrap(String),

    /// Asymmetric decryption failed (mismatched private key or corrupted
    /// package).
    #[error("Key unwrap failed: mismatched key or corrupted package")]
    Unwrap,

    /// A length prefix inside the key package points past the end of the
    /// decrypted buffer.
    #[error("Truncated key package: {field} field overruns the buffer")]
    TruncatedPackage {
        /// Which field's declared length was bad.
        field: &'static str,
    },

    /// The key package decrypted cleanly but left unparsed bytes.
    #[error("Malformed key package: {0}")]
    MalformedPackage(&'static str),

    /// A hex digest string was not valid.
    #[error("Invalid digest hex: {0}")]
    InvalidDigestHex(String),

    /// A digest had the wrong length.
    #[error("Invalid digest length: expected {expected}, got {actual}")]
    InvalidDigestLength {
        /// Expected digest length.
        expected: usize,
        /// Actual digest length.
        actual: usize,
    },
}

/// Result type for cryptographic operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
