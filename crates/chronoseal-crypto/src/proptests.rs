//! Property-based tests for the crypto primitives.
//!
//! Roundtrip, determinism, and rejection properties over arbitrary inputs.
//! RSA operations reuse a single shared keypair; generating one per case
//! would dominate the suite's runtime.

use proptest::prelude::*;
use rand::rngs::OsRng;
use std::sync::OnceLock;

use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::material::{KeyMaterial, KeyMode};
use crate::wrap::{unwrap_key, wrap_key};
use crate::{decrypt, derive_key, encrypt, generate_keypair, ContentDigest, BLOCK_SIZE};

fn shared_keypair() -> &'static (RsaPrivateKey, RsaPublicKey) {
    static PAIR: OnceLock<(RsaPrivateKey, RsaPublicKey)> = OnceLock::new();
    PAIR.get_or_init(|| generate_keypair(&mut OsRng, 2048).unwrap())
}

fn any_key_len() -> impl Strategy<Value = usize> {
    prop::sample::select(vec![16usize, 24, 32])
}

proptest! {
    /// Decrypt inverts encrypt for every valid key size.
    #[test]
    fn envelope_roundtrip(plaintext: Vec<u8>, key_len in any_key_len(), iv: [u8; 16]) {
        let key = vec![0x5au8; key_len];
        let ciphertext = encrypt(&plaintext, &key, &iv).unwrap();
        prop_assert_eq!(ciphertext.len() % BLOCK_SIZE, 0);
        prop_assert_eq!(decrypt(&ciphertext, &key, &iv).unwrap(), plaintext);
    }

    /// Ciphertext is always strictly longer than the plaintext's last
    /// partial block: padding adds between 1 and 16 bytes.
    #[test]
    fn envelope_pad_overhead(plaintext: Vec<u8>) {
        let key = [0x5au8; 32];
        let iv = [0u8; 16];
        let ciphertext = encrypt(&plaintext, &key, &iv).unwrap();
        let overhead = ciphertext.len() - plaintext.len();
        prop_assert!(overhead >= 1 && overhead <= BLOCK_SIZE);
    }

    /// Derivation is a pure function of (password, salt, len, iterations).
    #[test]
    fn derivation_deterministic(password: Vec<u8>, salt: [u8; 16], key_len in any_key_len()) {
        let a = derive_key(&password, &salt, key_len, 100).unwrap();
        let b = derive_key(&password, &salt, key_len, 100).unwrap();
        prop_assert_eq!(a, b);
    }

    /// Differing salts produce differing keys.
    #[test]
    fn derivation_salt_sensitivity(password: Vec<u8>, salt_a: [u8; 16], salt_b: [u8; 16]) {
        prop_assume!(salt_a != salt_b);
        let a = derive_key(&password, &salt_a, 32, 100).unwrap();
        let b = derive_key(&password, &salt_b, 32, 100).unwrap();
        prop_assert_ne!(a, b);
    }

    /// Digest hex formatting round-trips.
    #[test]
    fn digest_hex_roundtrip(data: Vec<u8>) {
        let digest = ContentDigest::hash(&data);
        prop_assert_eq!(ContentDigest::from_hex(&digest.to_hex()).unwrap(), digest);
    }
}

proptest! {
    // Fewer cases: each runs an RSA encrypt + decrypt.
    #![proptest_config(ProptestConfig::with_cases(8))]

    /// Key packages survive the wrap/unwrap cycle for every key size.
    #[test]
    fn wrap_unwrap_roundtrip(key_len in any_key_len()) {
        let (private_key, public_key) = shared_keypair();
        let material = KeyMaterial::generate(&mut OsRng, key_len).unwrap();

        let wrapped = wrap_key(&mut OsRng, &material, public_key).unwrap();
        let unwrapped = unwrap_key(&wrapped, private_key, KeyMode::Random).unwrap();

        prop_assert_eq!(unwrapped.session_key(), material.session_key());
        prop_assert_eq!(unwrapped.salt(), material.salt());
        prop_assert_eq!(unwrapped.iv(), material.iv());
    }

    /// Flipping any byte of the wrapped package breaks the unwrap.
    #[test]
    fn wrapped_package_is_brittle(index in 0usize..256, mask in 1u8..=255) {
        let (private_key, public_key) = shared_keypair();
        let material = KeyMaterial::generate(&mut OsRng, 32).unwrap();

        let mut wrapped = wrap_key(&mut OsRng, &material, public_key).unwrap();
        let index = index % wrapped.len();
        wrapped[index] ^= mask;
        prop_assert!(unwrap_key(&wrapped, private_key, KeyMode::Random).is_err());
    }
}
