//! RSA-OAEP key-wrap of the session key package.
//!
//! ## Package Layout (pre-wrap)
//!
//! ```text
//! +-----------+----------------+
//! | key_len   | 1 byte         |
//! | key       | key_len bytes  |
//! | salt_len  | 1 byte         |
//! | salt      | salt_len bytes |
//! | iv_len    | 1 byte         |
//! | iv        | iv_len bytes   |
//! +-----------+----------------+
//! ```
//!
//! The whole serialization is encrypted under the receiver's public key
//! with OAEP(SHA-256). For a 3072-bit key the OAEP limit is 318 bytes;
//! the package is at most 99, so the size check only trips on
//! pathologically small recipient keys.

use rand::{CryptoRng, RngCore};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use crate::error::{CryptoError, Result};
use crate::material::{KeyMaterial, KeyMode, IV_LEN, SALT_LEN};

/// OAEP overhead for SHA-256: two hash lengths plus two bytes.
const OAEP_OVERHEAD: usize = 2 * 32 + 2;

/// Serialize key material as length-prefixed fields.
fn serialize_material(material: &KeyMaterial) -> Vec<u8> {
    let key = material.session_key();
    let salt = material.salt();
    let iv = material.iv();
    let mut out = Vec::with_capacity(3 + key.len() + salt.len() + iv.len());
    out.push(key.len() as u8);
    out.extend_from_slice(key);
    out.push(salt.len() as u8);
    out.extend_from_slice(salt);
    out.push(iv.len() as u8);
    out.extend_from_slice(iv);
    out
}

/// Read one length-prefixed field, advancing `pos`.
fn read_field<'a>(buf: &'a [u8], pos: &mut usize, field: &'static str) -> Result<&'a [u8]> {
    let len = *buf
        .get(*pos)
        .ok_or(CryptoError::TruncatedPackage { field })? as usize;
    *pos += 1;
    let end = pos
        .checked_add(len)
        .ok_or(CryptoError::TruncatedPackage { field })?;
    if end > buf.len() {
        return Err(CryptoError::TruncatedPackage { field });
    }
    let out = &buf[*pos..end];
    *pos = end;
    Ok(out)
}

/// Wrap key material for a recipient.
///
/// # Errors
///
/// Returns [`CryptoError::PackageTooLarge`] when the serialized package
/// exceeds the recipient key's OAEP capacity, or [`CryptoError::Wrap`]
/// when the asymmetric encryption itself fails.
pub fn wrap_key<R: RngCore + CryptoRng>(
    rng: &mut R,
    material: &KeyMaterial,
    recipient: &RsaPublicKey,
) -> Result<Vec<u8>> {
    let package = serialize_material(material);
    let max = recipient.size().saturating_sub(OAEP_OVERHEAD);
    if package.len() > max {
        return Err(CryptoError::PackageTooLarge {
            size: package.len(),
            max,
        });
    }
    recipient
        .encrypt(rng, Oaep::new::<Sha256>(), &package)
        .map_err(|e| CryptoError::Wrap(e.to_string()))
}

/// Unwrap a key package with the recipient's private key.
///
/// `mode` comes from the capsule metadata; the package itself carries only
/// the raw fields. A mismatched private key fails with
/// [`CryptoError::Unwrap`] — OAEP makes a plausible-looking wrong answer
/// cryptographically negligible.
///
/// # Errors
///
/// [`CryptoError::Unwrap`] for a failed decryption,
/// [`CryptoError::TruncatedPackage`] when a declared field span exceeds
/// the buffer, and [`CryptoError::MalformedPackage`] for leftover bytes or
/// wrong fixed-field sizes.
pub fn unwrap_key(
    wrapped: &[u8],
    private_key: &RsaPrivateKey,
    mode: KeyMode,
) -> Result<KeyMaterial> {
    let package = private_key
        .decrypt(Oaep::new::<Sha256>(), wrapped)
        .map_err(|_| CryptoError::Unwrap)?;

    let mut pos = 0usize;
    let key = read_field(&package, &mut pos, "session key")?.to_vec();
    let salt_bytes = read_field(&package, &mut pos, "salt")?;
    let iv_bytes = read_field(&package, &mut pos, "iv")?;
    if pos != package.len() {
        return Err(CryptoError::MalformedPackage("trailing bytes"));
    }

    let salt: [u8; SALT_LEN] = salt_bytes
        .try_into()
        .map_err(|_| CryptoError::MalformedPackage("salt is not 16 bytes"))?;
    let iv: [u8; IV_LEN] = iv_bytes
        .try_into()
        .map_err(|_| CryptoError::MalformedPackage("iv is not 16 bytes"))?;

    KeyMaterial::from_parts(key, salt, iv, mode)
}
