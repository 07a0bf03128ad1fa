//! The seal/unseal pipeline orchestrator.
//!
//! Each direction is a single synchronous sequence of stages; every
//! transition must fully succeed before the next begins, and any failure
//! aborts the whole run with a stage-tagged error. Intermediate buffers
//! are dropped on abort — there is no resumable state, a failed run
//! restarts from `Idle`.
//!
//! ```text
//! seal:    Idle → Compressed → KeyGenerated → Encrypted → KeyWrapped
//!               → Assembled → (Uploaded)
//! unseal:  Idle → Parsed → GateChecked → KeyUnwrapped → Decrypted
//!               → Decompressed → Verified
//! ```
//!
//! The gate check runs strictly before any key handling, so a
//! still-locked capsule never reaches the unwrap stage and leaks no
//! plaintext-adjacent signal.
//!
//! Pipeline runs share no mutable state: each call allocates its own code
//! tree, key material, and buffers, so independent capsules can be
//! processed concurrently without locking.

use rand::{CryptoRng, RngCore};
use tracing::{debug, info};

use chronoseal_capsule::{gate, Capsule, CapsuleMetadata};
use chronoseal_codec as codec;
use chronoseal_crypto::{
    envelope, wrap, ContentDigest, KeyMaterial, KeyMode, RsaPrivateKey, RsaPublicKey,
};

use crate::config::PipelineConfig;
use crate::error::{CoreError, SealError, SealStage, UnsealError, UnsealStage};
use crate::transport::Transport;

/// Terminal and intermediate states of a seal run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SealState {
    /// Nothing done yet.
    Idle,
    /// Payload compressed.
    Compressed,
    /// Session key material ready.
    KeyGenerated,
    /// Payload encrypted.
    Encrypted,
    /// Key package wrapped for the recipient.
    KeyWrapped,
    /// Container bytes produced. Terminal for local seals.
    Assembled,
    /// Container handed to a transport. Terminal for server-mediated
    /// seals.
    Uploaded,
}

/// Terminal and intermediate states of an unseal run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsealState {
    /// Nothing done yet.
    Idle,
    /// Container fields recovered.
    Parsed,
    /// Release gate satisfied.
    GateChecked,
    /// Session key recovered.
    KeyUnwrapped,
    /// Ciphertext decrypted.
    Decrypted,
    /// Payload decompressed.
    Decompressed,
    /// Digest verified. The only terminal success state.
    Verified,
}

/// Inputs to one seal run.
#[derive(Debug)]
pub struct SealRequest<'a> {
    /// The plaintext to lock away.
    pub plaintext: &'a [u8],
    /// Base filename recorded in the metadata.
    pub filename: &'a str,
    /// Unix timestamp (seconds) before which unsealing must fail.
    pub unlock_time: u64,
    /// When set, the session key is derived from this password instead of
    /// drawn at random; the receiver will need the same password.
    pub password: Option<&'a [u8]>,
}

/// Result of a successful seal run.
#[derive(Debug)]
pub struct SealOutcome {
    /// The assembled capsule.
    pub capsule: Capsule,
    /// Its serialized container bytes — the only persisted artifact.
    pub container: Vec<u8>,
    /// Terminal state reached: [`SealState::Assembled`], or
    /// [`SealState::Uploaded`] via [`seal_and_upload`].
    pub state: SealState,
    /// Capsule id assigned by the transport, when uploaded.
    pub capsule_id: Option<String>,
}

/// Result of a successful unseal run.
#[derive(Debug)]
pub struct UnsealOutcome {
    /// The recovered plaintext, digest-verified.
    pub plaintext: Vec<u8>,
    /// The capsule's metadata record.
    pub metadata: CapsuleMetadata,
    /// Always [`UnsealState::Verified`] on success.
    pub state: UnsealState,
}

/// Seal `request.plaintext` into a capsule addressed to `recipient`.
///
/// Stages: compress → generate/derive key → encrypt → wrap key →
/// assemble. The randomness source is injected so runs are independent
/// and testable.
///
/// # Errors
///
/// A [`SealError`] naming the failing stage; no partial artifact
/// survives a failure.
pub fn seal<R: RngCore + CryptoRng>(
    rng: &mut R,
    request: &SealRequest<'_>,
    recipient: &RsaPublicKey,
    config: &PipelineConfig,
) -> Result<SealOutcome, SealError> {
    let digest = ContentDigest::hash(request.plaintext);

    let compressed = codec::compress(request.plaintext)
        .map_err(|e| SealError::new(SealStage::Compress, e))?;
    let ratio = compressed.len() as f64 / request.plaintext.len().max(1) as f64;
    debug!(
        original = request.plaintext.len(),
        compressed = compressed.len(),
        ratio,
        "compressed payload"
    );

    let material = match request.password {
        Some(password) => KeyMaterial::derive_from_password(
            rng,
            password,
            config.session_key_len,
            config.pbkdf2_iterations,
        ),
        None => KeyMaterial::generate(rng, config.session_key_len),
    }
    .map_err(|e| SealError::new(SealStage::GenerateKey, e))?;

    let ciphertext = envelope::encrypt(&compressed, material.session_key(), material.iv())
        .map_err(|e| SealError::new(SealStage::Encrypt, e))?;
    debug!(encrypted = ciphertext.len(), "encrypted payload");

    let key_package = wrap::wrap_key(rng, &material, recipient)
        .map_err(|e| SealError::new(SealStage::WrapKey, e))?;

    let metadata = CapsuleMetadata {
        original_filename: request.filename.to_string(),
        unlock_time: request.unlock_time,
        created_at: gate::unix_now(),
        original_size: request.plaintext.len() as u64,
        compressed_size: compressed.len() as u64,
        encrypted_size: ciphertext.len() as u64,
        content_digest: digest,
        key_mode: material.mode(),
    };
    metadata
        .validate()
        .map_err(|e| SealError::new(SealStage::Assemble, e))?;

    let capsule = Capsule::new(metadata, key_package, ciphertext);
    let container = capsule
        .assemble()
        .map_err(|e| SealError::new(SealStage::Assemble, e))?;
    info!(
        filename = request.filename,
        unlock_time = request.unlock_time,
        container = container.len(),
        mode = ?capsule.metadata().key_mode,
        "capsule assembled"
    );

    Ok(SealOutcome {
        capsule,
        container,
        state: SealState::Assembled,
        capsule_id: None,
    })
}

/// Seal and hand the container to a transport.
///
/// The upload happens strictly after `Assembled`; a transport failure
/// aborts with stage [`SealStage::Upload`] and the outcome is discarded.
pub fn seal_and_upload<R: RngCore + CryptoRng, T: Transport>(
    rng: &mut R,
    request: &SealRequest<'_>,
    recipient: &RsaPublicKey,
    recipient_id: &str,
    transport: &T,
    config: &PipelineConfig,
) -> Result<SealOutcome, SealError> {
    let mut outcome = seal(rng, request, recipient, config)?;
    let capsule_id = transport
        .upload(&outcome.container, recipient_id, outcome.capsule.metadata())
        .map_err(|e| SealError::new(SealStage::Upload, e))?;
    info!(capsule_id = %capsule_id, recipient_id, "capsule uploaded");
    outcome.state = SealState::Uploaded;
    outcome.capsule_id = Some(capsule_id);
    Ok(outcome)
}

/// Unseal `container` with the recipient's private key, evaluating the
/// release gate at the injected timestamp `now`.
///
/// Stage order: parse → gate → unwrap → decrypt → decompress → verify.
///
/// # Errors
///
/// An [`UnsealError`] naming the failing stage. A still-locked capsule
/// fails at [`UnsealStage::CheckGate`] with
/// [`CoreError::GateLocked`] and the remaining duration; a digest
/// mismatch fails at [`UnsealStage::Verify`] with
/// [`CoreError::IntegrityMismatch`].
pub fn unseal_at(
    container: &[u8],
    private_key: &RsaPrivateKey,
    password: Option<&[u8]>,
    config: &PipelineConfig,
    now: u64,
) -> Result<UnsealOutcome, UnsealError> {
    let capsule =
        Capsule::parse(container).map_err(|e| UnsealError::new(UnsealStage::Parse, e))?;
    let metadata = capsule.metadata().clone();
    debug!(
        filename = %metadata.original_filename,
        unlock_time = metadata.unlock_time,
        "capsule parsed"
    );

    if !gate::is_releasable(metadata.unlock_time, now) {
        let remaining = gate::remaining(metadata.unlock_time, now);
        return Err(UnsealError::new(
            UnsealStage::CheckGate,
            CoreError::GateLocked {
                remaining_secs: remaining.as_secs(),
            },
        ));
    }

    // The persisted key mode decides whether a password is required;
    // a mismatch in either direction is refused outright.
    match (metadata.key_mode, password) {
        (KeyMode::PasswordDerived, None) => {
            return Err(UnsealError::new(
                UnsealStage::UnwrapKey,
                CoreError::PasswordRequired,
            ));
        }
        (KeyMode::Random, Some(_)) => {
            return Err(UnsealError::new(
                UnsealStage::UnwrapKey,
                CoreError::PasswordNotUsed,
            ));
        }
        _ => {}
    }

    let mut material = wrap::unwrap_key(capsule.key_package(), private_key, metadata.key_mode)
        .map_err(|e| UnsealError::new(UnsealStage::UnwrapKey, e))?;
    if let Some(password) = password {
        material
            .rederive(password, config.pbkdf2_iterations)
            .map_err(|e| UnsealError::new(UnsealStage::UnwrapKey, e))?;
    }

    let compressed = envelope::decrypt(capsule.ciphertext(), material.session_key(), material.iv())
        .map_err(|e| UnsealError::new(UnsealStage::Decrypt, e))?;

    let plaintext =
        codec::decompress(&compressed).map_err(|e| UnsealError::new(UnsealStage::Decompress, e))?;

    let recomputed = ContentDigest::hash(&plaintext);
    if recomputed != metadata.content_digest {
        return Err(UnsealError::new(
            UnsealStage::Verify,
            CoreError::IntegrityMismatch {
                expected: metadata.content_digest.to_hex(),
                actual: recomputed.to_hex(),
            },
        ));
    }
    info!(
        filename = %metadata.original_filename,
        size = plaintext.len(),
        "capsule verified"
    );

    Ok(UnsealOutcome {
        plaintext,
        metadata,
        state: UnsealState::Verified,
    })
}

/// Unseal with the release gate evaluated against the system clock.
pub fn unseal(
    container: &[u8],
    private_key: &RsaPrivateKey,
    password: Option<&[u8]>,
    config: &PipelineConfig,
) -> Result<UnsealOutcome, UnsealError> {
    unseal_at(container, private_key, password, config, gate::unix_now())
}
