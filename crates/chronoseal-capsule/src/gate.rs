//! The release gate: time comparison that permits unsealing.
//!
//! A pure function of two timestamps. The orchestrator checks the gate
//! before any key handling on unseal, so a still-locked capsule leaks no
//! plaintext-adjacent signal — not even a partial decryption failure.
//!
//! The gate trusts the receiver's local clock; it is a policy check, not
//! a secure time-attestation protocol.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// True iff the capsule may be opened: `now >= unlock_time`.
///
/// The boundary is inclusive — a capsule unlocks at exactly its unlock
/// timestamp.
pub fn is_releasable(unlock_time: u64, now: u64) -> bool {
    now >= unlock_time
}

/// Time remaining until release, or zero when already releasable.
pub fn remaining(unlock_time: u64, now: u64) -> Duration {
    Duration::from_secs(unlock_time.saturating_sub(now))
}

/// Current Unix timestamp in seconds.
///
/// Saturates to zero if the system clock reads before the epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
