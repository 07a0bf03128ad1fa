//! # chronoseal-crypto
//!
//! Cryptographic primitives for the chronoseal capsule pipeline:
//!
//! - **AES-CBC** symmetric envelope with PKCS#7 padding (128/192/256-bit)
//! - **PBKDF2-HMAC-SHA256** password-based key derivation
//! - **RSA-OAEP** key-wrap of the session key package
//! - **SHA-256** content digests with hex round-trip
//! - **PKCS#8 PEM** key-file encode/parse
//!
//! The CBC envelope is deliberately not an AEAD: tamper detection is the
//! job of the separate content digest verified after decompression.
//!
//! ## Security
//!
//! Session keys are zeroized on drop. Digest comparisons are constant-time
//! via `subtle`. The orchestrator must never reuse a (key, iv) pair across
//! two different plaintexts; both are generated fresh per seal.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod derive;
pub mod digest;
pub mod envelope;
pub mod error;
pub mod keys;
pub mod material;
pub mod wrap;

#[cfg(test)]
mod proptests;

pub use derive::{derive_key, DEFAULT_ITERATIONS};
pub use digest::ContentDigest;
pub use envelope::{decrypt, encrypt, BLOCK_SIZE};
pub use error::{CryptoError, Result};
pub use keys::{
    generate_keypair, private_key_from_pem, private_key_to_pem, public_key_from_pem,
    public_key_to_pem, DEFAULT_RSA_BITS,
};
pub use material::{KeyMaterial, KeyMode, IV_LEN, SALT_LEN, SESSION_KEY_LEN};
pub use wrap::{unwrap_key, wrap_key};

// Re-exported so downstream crates name RSA keys (and read their sizes)
// without a direct dependency on the rsa crate.
pub use rsa::traits::PublicKeyParts;
pub use rsa::{RsaPrivateKey, RsaPublicKey};
