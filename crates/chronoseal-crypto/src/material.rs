//! Session key material for one seal operation.
//!
//! A [`KeyMaterial`] bundles the session key, the PBKDF2 salt, and the CBC
//! initialization vector. All three are generated fresh per seal; the
//! session key is either drawn from the injected randomness source or
//! derived deterministically from a password and the salt.
//!
//! Which of the two happened is recorded as a [`KeyMode`] and persisted in
//! the capsule metadata, so the receiver never has to guess whether a
//! password is required.

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::derive::derive_key;
use crate::error::Result;

/// Default session key length in bytes (AES-256).
pub const SESSION_KEY_LEN: usize = 32;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// IV length in bytes (one AES block).
pub const IV_LEN: usize = 16;

/// How the session key was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyMode {
    /// Drawn from a secure random source; only the RSA wrap protects it.
    Random,
    /// Derived from a password and the salt; the receiver must re-derive
    /// it with the same password.
    PasswordDerived,
}

/// The {session key, salt, iv} triple for one seal operation.
///
/// Zeroized on drop. The `Debug` form never prints key bytes.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    session_key: Vec<u8>,
    salt: [u8; SALT_LEN],
    iv: [u8; IV_LEN],
    #[zeroize(skip)]
    mode: KeyMode,
}

impl KeyMaterial {
    /// Generate fresh random material with a random session key.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R, key_len: usize) -> Result<Self> {
        if !matches!(key_len, 16 | 24 | 32) {
            return Err(crate::CryptoError::InvalidKeyLength { actual: key_len });
        }
        let mut session_key = vec![0u8; key_len];
        rng.fill_bytes(&mut session_key);
        let (salt, iv) = random_salt_iv(rng);
        Ok(Self {
            session_key,
            salt,
            iv,
            mode: KeyMode::Random,
        })
    }

    /// Generate fresh salt and IV, deriving the session key from
    /// `password` via PBKDF2.
    pub fn derive_from_password<R: RngCore + CryptoRng>(
        rng: &mut R,
        password: &[u8],
        key_len: usize,
        iterations: u32,
    ) -> Result<Self> {
        let (salt, iv) = random_salt_iv(rng);
        let session_key = derive_key(password, &salt, key_len, iterations)?;
        Ok(Self {
            session_key,
            salt,
            iv,
            mode: KeyMode::PasswordDerived,
        })
    }

    /// Reassemble material from unwrapped fields.
    ///
    /// Used on the unseal side; `mode` comes from the capsule metadata,
    /// not from the package itself.
    pub fn from_parts(
        session_key: Vec<u8>,
        salt: [u8; SALT_LEN],
        iv: [u8; IV_LEN],
        mode: KeyMode,
    ) -> Result<Self> {
        if !matches!(session_key.len(), 16 | 24 | 32) {
            return Err(crate::CryptoError::InvalidKeyLength {
                actual: session_key.len(),
            });
        }
        Ok(Self {
            session_key,
            salt,
            iv,
            mode,
        })
    }

    /// Re-derive the session key from a password and this material's salt.
    ///
    /// The receiver calls this when the metadata says
    /// [`KeyMode::PasswordDerived`]; the result must equal the key the
    /// sender derived or decryption will fail downstream.
    pub fn rederive(&mut self, password: &[u8], iterations: u32) -> Result<()> {
        let key = derive_key(password, &self.salt, self.session_key.len(), iterations)?;
        self.session_key.zeroize();
        self.session_key = key;
        Ok(())
    }

    /// The session key bytes.
    pub fn session_key(&self) -> &[u8] {
        &self.session_key
    }

    /// The PBKDF2 salt.
    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    /// The CBC initialization vector.
    pub fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }

    /// How the session key was obtained.
    pub fn mode(&self) -> KeyMode {
        self.mode
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("session_key", &"[REDACTED]")
            .field("key_len", &self.session_key.len())
            .field("mode", &self.mode)
            .finish()
    }
}

fn random_salt_iv<R: RngCore + CryptoRng>(rng: &mut R) -> ([u8; SALT_LEN], [u8; IV_LEN]) {
    let mut salt = [0u8; SALT_LEN];
    let mut iv = [0u8; IV_LEN];
    rng.fill_bytes(&mut salt);
    rng.fill_bytes(&mut iv);
    (salt, iv)
}
