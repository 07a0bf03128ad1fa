//! Stage-tagged error types for the pipeline.
//!
//! Every pipeline failure reports the specific stage that failed along
//! with the underlying cause. Callers must be able to distinguish
//! [`CoreError::GateLocked`] — expected, retryable later — from every
//! other kind, and [`CoreError::IntegrityMismatch`] — implying tampering
//! or corruption — from ordinary failures.

use thiserror::Error;

/// Stages of the seal pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SealStage {
    /// Reading the input file (file-level API only).
    ReadInput,
    /// Huffman compression.
    Compress,
    /// Session key generation or derivation.
    GenerateKey,
    /// AES-CBC encryption.
    Encrypt,
    /// RSA-OAEP key wrap.
    WrapKey,
    /// Container assembly.
    Assemble,
    /// Writing the capsule file (file-level API only).
    WriteOutput,
    /// Upload to a capsule server.
    Upload,
}

impl std::fmt::Display for SealStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ReadInput => "read-input",
            Self::Compress => "compress",
            Self::GenerateKey => "generate-key",
            Self::Encrypt => "encrypt",
            Self::WrapKey => "wrap-key",
            Self::Assemble => "assemble",
            Self::WriteOutput => "write-output",
            Self::Upload => "upload",
        };
        f.write_str(name)
    }
}

/// Stages of the unseal pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsealStage {
    /// Reading the capsule (file-level API only).
    ReadInput,
    /// Container parsing.
    Parse,
    /// Release gate check. Runs before any key handling so a locked
    /// capsule never reaches the unwrap stage.
    CheckGate,
    /// RSA-OAEP key unwrap (and password re-derivation when required).
    UnwrapKey,
    /// AES-CBC decryption.
    Decrypt,
    /// Huffman decompression.
    Decompress,
    /// Digest recompute-and-compare.
    Verify,
    /// Writing the recovered plaintext (file-level API only).
    WriteOutput,
}

impl std::fmt::Display for UnsealStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ReadInput => "read-input",
            Self::Parse => "parse",
            Self::CheckGate => "check-gate",
            Self::UnwrapKey => "unwrap-key",
            Self::Decrypt => "decrypt",
            Self::Decompress => "decompress",
            Self::Verify => "verify",
            Self::WriteOutput => "write-output",
        };
        f.write_str(name)
    }
}

/// The underlying failure, independent of which stage hit it.
#[derive(Error, Debug)]
pub enum CoreError {
    /// File or network I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Compressed-stream handling failed.
    #[error(transparent)]
    Codec(#[from] chronoseal_codec::CodecError),

    /// A cryptographic operation failed.
    #[error(transparent)]
    Crypto(#[from] chronoseal_crypto::CryptoError),

    /// Container or metadata handling failed.
    #[error(transparent)]
    Capsule(#[from] chronoseal_capsule::CapsuleError),

    /// The unlock time has not been reached. Retryable: try again after
    /// the reported duration.
    #[error("Capsule is still locked for {remaining_secs}s")]
    GateLocked {
        /// Seconds until the capsule becomes releasable.
        remaining_secs: u64,
    },

    /// The recomputed digest does not match the stored digest. Implies
    /// tampering or corruption, not a bug.
    #[error("Integrity check failed: expected digest {expected}, got {actual}")]
    IntegrityMismatch {
        /// Hex digest stored in the capsule.
        expected: String,
        /// Hex digest recomputed from the recovered plaintext.
        actual: String,
    },

    /// The capsule was sealed with a password-derived key but none was
    /// supplied.
    #[error("Capsule requires a password")]
    PasswordRequired,

    /// A password was supplied but the capsule was sealed with a random
    /// key; refusing it beats silently ignoring it.
    #[error("Capsule was not sealed with a password; one was supplied")]
    PasswordNotUsed,

    /// A transport operation failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Failure reported by a [`Transport`](crate::transport::Transport)
/// implementation. Transport failures are reported, never retried by the
/// core.
#[derive(Error, Debug)]
#[error("Transport error: {0}")]
pub struct TransportError(pub String);

/// A seal failure, tagged with the stage that aborted the pipeline.
#[derive(Error, Debug)]
#[error("Seal failed at {stage} stage: {source}")]
pub struct SealError {
    /// The stage that failed.
    pub stage: SealStage,
    /// The underlying cause.
    #[source]
    pub source: CoreError,
}

impl SealError {
    pub(crate) fn new(stage: SealStage, source: impl Into<CoreError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

/// An unseal failure, tagged with the stage that aborted the pipeline.
#[derive(Error, Debug)]
#[error("Unseal failed at {stage} stage: {source}")]
pub struct UnsealError {
    /// The stage that failed.
    pub stage: UnsealStage,
    /// The underlying cause.
    #[source]
    pub source: CoreError,
}

impl UnsealError {
    pub(crate) fn new(stage: UnsealStage, source: impl Into<CoreError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }

    /// Seconds until release, when the failure is a locked gate.
    pub fn locked_for(&self) -> Option<u64> {
        match self.source {
            CoreError::GateLocked { remaining_secs } => Some(remaining_secs),
            _ => None,
        }
    }
}
