//! # chronoseal-capsule
//!
//! The capsule container format and its release gate.
//!
//! A capsule is the only artifact of the pipeline that persists: a single
//! self-describing binary blob carrying everything the receiver needs
//! except their private key (and the password, when one was used).
//!
//! ## Container Layout
//!
//! All lengths are big-endian.
//!
//! ```text
//! +------------------+
//! | metadata_len     | 4 bytes  - serialized metadata length
//! +------------------+
//! | metadata         | Variable - bincode CapsuleMetadata
//! +------------------+
//! | content_digest   | 32 bytes - SHA-256 of the original plaintext
//! +------------------+
//! | key_package_len  | 4 bytes  - wrapped key package length
//! +------------------+
//! | key_package      | Variable - RSA-OAEP ciphertext
//! +------------------+
//! | ciphertext       | Remainder - AES-CBC encrypted, compressed payload
//! +------------------+
//! ```
//!
//! A capsule is never partially valid: every length prefix is checked
//! against the remaining buffer before slicing, and the standalone digest
//! must match the copy inside the metadata, or the whole container is
//! rejected.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod container;
pub mod error;
pub mod gate;
pub mod metadata;

#[cfg(test)]
mod proptests;

pub use container::Capsule;
pub use error::{CapsuleError, Result};
pub use gate::{is_releasable, remaining, unix_now};
pub use metadata::CapsuleMetadata;
