//! Delivery of sealed containers to a relay service.
//!
//! The pipeline never talks to the network itself; it hands the
//! assembled container to a [`Transport`] and records the capsule id the
//! transport returns. [`MemoryTransport`] is the in-process
//! implementation used by tests and by library consumers that manage
//! delivery themselves; the CLI supplies an HTTP implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use chronoseal_capsule::CapsuleMetadata;

use crate::error::TransportError;

/// Delivery state of an uploaded capsule as reported by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapsuleStatus {
    /// Stored and waiting for its release time.
    Pending,
    /// Released and fetched by the recipient.
    Delivered,
    /// The relay failed to process the capsule.
    Error,
}

/// A channel that stores sealed containers and serves them back.
///
/// Implementations must treat the container as opaque bytes; only the
/// metadata passed alongside may inform routing or indexing.
pub trait Transport {
    /// Store `container` for `recipient_id`, returning the assigned
    /// capsule id.
    fn upload(
        &self,
        container: &[u8],
        recipient_id: &str,
        metadata: &CapsuleMetadata,
    ) -> Result<String, TransportError>;

    /// Fetch a previously uploaded container by id.
    fn download(&self, capsule_id: &str) -> Result<Vec<u8>, TransportError>;

    /// Report the delivery state of a capsule.
    fn status(&self, capsule_id: &str) -> Result<CapsuleStatus, TransportError>;
}

struct StoredCapsule {
    container: Vec<u8>,
    status: CapsuleStatus,
}

/// In-process transport backed by a mutex-guarded map.
#[derive(Default)]
pub struct MemoryTransport {
    capsules: Mutex<HashMap<String, StoredCapsule>>,
    next_id: Mutex<u64>,
}

impl MemoryTransport {
    /// Create an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a stored capsule as delivered, for test setups.
    pub fn mark_delivered(&self, capsule_id: &str) -> Result<(), TransportError> {
        let mut capsules = self.capsules.lock().expect("transport lock poisoned");
        let stored = capsules
            .get_mut(capsule_id)
            .ok_or_else(|| TransportError(format!("unknown capsule id {capsule_id}")))?;
        stored.status = CapsuleStatus::Delivered;
        Ok(())
    }
}

impl Transport for MemoryTransport {
    fn upload(
        &self,
        container: &[u8],
        _recipient_id: &str,
        _metadata: &CapsuleMetadata,
    ) -> Result<String, TransportError> {
        let mut next_id = self.next_id.lock().expect("transport lock poisoned");
        *next_id += 1;
        let capsule_id = format!("cap-{next_id}");
        self.capsules
            .lock()
            .expect("transport lock poisoned")
            .insert(
                capsule_id.clone(),
                StoredCapsule {
                    container: container.to_vec(),
                    status: CapsuleStatus::Pending,
                },
            );
        Ok(capsule_id)
    }

    fn download(&self, capsule_id: &str) -> Result<Vec<u8>, TransportError> {
        let capsules = self.capsules.lock().expect("transport lock poisoned");
        capsules
            .get(capsule_id)
            .map(|stored| stored.container.clone())
            .ok_or_else(|| TransportError(format!("unknown capsule id {capsule_id}")))
    }

    fn status(&self, capsule_id: &str) -> Result<CapsuleStatus, TransportError> {
        let capsules = self.capsules.lock().expect("transport lock poisoned");
        capsules
            .get(capsule_id)
            .map(|stored| stored.status)
            .ok_or_else(|| TransportError(format!("unknown capsule id {capsule_id}")))
    }
}
