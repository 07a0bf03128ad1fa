//! # chronoseal-codec
//!
//! Lossless byte-oriented Huffman codec for chronoseal capsule payloads.
//!
//! The compressed stream is self-describing: the code tree travels with the
//! data, so decompression needs no side channel.
//!
//! ## Stream Layout
//!
//! All lengths are big-endian.
//!
//! ```text
//! +------------------+
//! | tree_len         | 4 bytes  - serialized tree length in bytes
//! +------------------+
//! | tree             | Variable - preorder: 0x01 + byte for a leaf,
//! |                  |            0x00 for an internal node
//! +------------------+
//! | valid_bit_count  | 4 bytes  - exact number of meaningful code bits
//! +------------------+
//! | packed bits      | Variable - MSB-first, zero-padded to a full byte
//! +------------------+
//! ```
//!
//! Recording the exact bit count (not a byte count) removes the ambiguity
//! the zero-padding would otherwise introduce: the decoder stops after
//! consuming precisely `valid_bit_count` bits.
//!
//! ## Edge Cases
//!
//! - Empty input: `tree_len == 0`, `valid_bit_count == 0`, no payload.
//! - Single distinct byte value: the lone leaf is wrapped under one
//!   synthetic internal node so its code is one bit long.
//!
//! ## Example
//!
//! ```
//! use chronoseal_codec::{compress, decompress};
//!
//! let data = b"abracadabra";
//! let packed = compress(data).unwrap();
//! assert_eq!(decompress(&packed).unwrap(), data);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bitio;
pub mod error;
pub mod stream;
pub mod tree;

#[cfg(test)]
mod proptests;

pub use error::{CodecError, Result};
pub use stream::{compress, decompress};
pub use tree::{CodeTable, CodeTree, FrequencyTable};
