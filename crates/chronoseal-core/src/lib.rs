//! Seal/unseal pipeline orchestration for chronoseal.
//!
//! This crate ties the codec, crypto, and capsule layers into two
//! linear pipelines:
//!
//! - **seal**: compress the payload, generate or derive a session key,
//!   encrypt, wrap the key for the recipient, and assemble the
//!   container (optionally handing it to a [`Transport`]);
//! - **unseal**: parse the container, check the release gate, unwrap
//!   the key, decrypt, decompress, and verify the content digest.
//!
//! Every failure carries the stage that aborted the run, so callers can
//! distinguish a still-locked capsule ([`UnsealStage::CheckGate`]) from
//! a corrupt or misaddressed one without inspecting error text.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod fsio;
pub mod pipeline;
pub mod transport;

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::{CoreError, SealError, SealStage, TransportError, UnsealError, UnsealStage};
pub use fsio::{seal_file, unseal_file};
pub use pipeline::{
    seal, seal_and_upload, unseal, unseal_at, SealOutcome, SealRequest, SealState, UnsealOutcome,
    UnsealState,
};
pub use transport::{CapsuleStatus, MemoryTransport, Transport};
