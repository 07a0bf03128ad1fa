//! Error types for codec operations.

use thiserror::Error;

/// Errors that can occur while compressing or decompressing a stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The stream ended before a declared field was complete.
    #[error("Truncated stream: needed {needed} more bytes at offset {offset}")]
    Truncated {
        /// Bytes still required by the declared field.
        needed: usize,
        /// Offset at which the shortfall was detected.
        offset: usize,
    },

    /// A serialized tree node carried an unknown marker byte.
    #[error("Invalid tree node marker {marker:#04x} at offset {offset}")]
    InvalidNodeMarker {
        /// The unrecognized marker value.
        marker: u8,
        /// Offset of the marker within the tree bytes.
        offset: usize,
    },

    /// The declared tree length exceeds the maximum a 256-symbol tree can
    /// ever occupy.
    #[error("Declared tree length {declared} exceeds maximum {max}")]
    TreeTooLarge {
        /// The declared tree length in bytes.
        declared: usize,
        /// The largest legal tree serialization.
        max: usize,
    },

    /// The tree serialization did not describe exactly one complete tree.
    #[error("Malformed tree: {0}")]
    MalformedTree(&'static str),

    /// The packed payload size disagrees with the declared bit count.
    #[error("Bit count mismatch: {declared_bits} bits declared, {payload_bytes} payload bytes")]
    BitCountMismatch {
        /// Bits the header claims are valid.
        declared_bits: u64,
        /// Bytes actually present after the header.
        payload_bytes: usize,
    },

    /// The declared bit count ended in the middle of a code.
    #[error("Incomplete symbol: bit stream ended mid-code")]
    IncompleteSymbol,

    /// The input is too large for the 4-byte bit-count field.
    #[error("Input too large: {bits} code bits exceed the u32 framing limit")]
    InputTooLarge {
        /// Total code bits the input would require.
        bits: u64,
    },
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
