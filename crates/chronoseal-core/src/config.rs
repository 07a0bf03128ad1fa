//! Pipeline configuration.
//!
//! # Example
//!
//! ```
//! use chronoseal_core::config::PipelineConfig;
//!
//! // Use defaults (AES-256, 100k PBKDF2 iterations, 3072-bit RSA).
//! let config = PipelineConfig::default();
//!
//! // Or customize.
//! let config = PipelineConfig::builder()
//!     .session_key_len(16)
//!     .pbkdf2_iterations(200_000)
//!     .build();
//! ```

use chronoseal_crypto::{DEFAULT_ITERATIONS, DEFAULT_RSA_BITS, SESSION_KEY_LEN};

/// Tunable parameters shared by both pipeline directions.
///
/// One config is typically built at startup and reused for every capsule;
/// pipeline runs themselves share no state.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// PBKDF2 iteration count for password-derived session keys. Must
    /// match between seal and unseal.
    pub pbkdf2_iterations: u32,

    /// Session key length in bytes: 16, 24 or 32.
    pub session_key_len: usize,

    /// RSA modulus size in bits for generated recipient keypairs.
    pub rsa_bits: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pbkdf2_iterations: DEFAULT_ITERATIONS,
            session_key_len: SESSION_KEY_LEN,
            rsa_bits: DEFAULT_RSA_BITS,
        }
    }
}

impl PipelineConfig {
    /// Start building a config from the defaults.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Clone, Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the PBKDF2 iteration count.
    pub fn pbkdf2_iterations(mut self, iterations: u32) -> Self {
        self.config.pbkdf2_iterations = iterations;
        self
    }

    /// Set the session key length (16, 24 or 32 bytes).
    pub fn session_key_len(mut self, len: usize) -> Self {
        self.config.session_key_len = len;
        self
    }

    /// Set the RSA modulus size for keypair generation.
    pub fn rsa_bits(mut self, bits: usize) -> Self {
        self.config.rsa_bits = bits;
        self
    }

    /// Finish building.
    pub fn build(self) -> PipelineConfig {
        self.config
    }
}
