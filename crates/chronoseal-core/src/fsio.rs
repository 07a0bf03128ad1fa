//! File-backed entry points for the pipeline.
//!
//! These wrap [`seal`](crate::pipeline::seal) and
//! [`unseal_at`](crate::pipeline::unseal_at) with disk reads and atomic
//! writes. Output lands in a `.partial` sibling first and is renamed
//! into place only after the full write succeeds, so a crash mid-write
//! never leaves a truncated capsule or plaintext behind.

use std::fs;
use std::path::{Path, PathBuf};

use rand::{CryptoRng, RngCore};
use tracing::debug;

use chronoseal_crypto::{RsaPrivateKey, RsaPublicKey};

use crate::config::PipelineConfig;
use crate::error::{SealError, SealStage, UnsealError, UnsealStage};
use crate::pipeline::{seal, unseal_at, SealOutcome, SealRequest, UnsealOutcome};

/// Seal the file at `input` into a container written to `output`.
///
/// The metadata filename is taken from `input`'s final component.
pub fn seal_file<R: RngCore + CryptoRng>(
    rng: &mut R,
    input: &Path,
    output: &Path,
    unlock_time: u64,
    password: Option<&[u8]>,
    recipient: &RsaPublicKey,
    config: &PipelineConfig,
) -> Result<SealOutcome, SealError> {
    let plaintext =
        fs::read(input).map_err(|e| SealError::new(SealStage::ReadInput, e))?;
    let filename = input
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            SealError::new(
                SealStage::ReadInput,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("input path {} has no usable filename", input.display()),
                ),
            )
        })?;

    let request = SealRequest {
        plaintext: &plaintext,
        filename,
        unlock_time,
        password,
    };
    let outcome = seal(rng, &request, recipient, config)?;

    write_atomic(output, &outcome.container)
        .map_err(|e| SealError::new(SealStage::WriteOutput, e))?;
    Ok(outcome)
}

/// Unseal the container at `input`, writing the recovered plaintext to
/// `output`. The release gate is evaluated at `now`.
pub fn unseal_file(
    input: &Path,
    output: &Path,
    private_key: &RsaPrivateKey,
    password: Option<&[u8]>,
    config: &PipelineConfig,
    now: u64,
) -> Result<UnsealOutcome, UnsealError> {
    let container =
        fs::read(input).map_err(|e| UnsealError::new(UnsealStage::ReadInput, e))?;
    let outcome = unseal_at(&container, private_key, password, config, now)?;
    write_atomic(output, &outcome.plaintext)
        .map_err(|e| UnsealError::new(UnsealStage::WriteOutput, e))?;
    Ok(outcome)
}

/// Write `bytes` to `path` via a `.partial` sibling and rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let temp = partial_path(path);
    let result = fs::write(&temp, bytes).and_then(|()| fs::rename(&temp, path));
    if result.is_err() {
        let _ = fs::remove_file(&temp);
    }
    result?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote output");
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}
