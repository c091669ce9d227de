//! L2→L1 withdrawals over the token bridge.
//!
//! This crate provides:
//! - Outbound message handle, status and proof types
//! - Handle derivation from the L2 withdrawal receipt
//! - Outbox status, proof and execution service
//! - The poll loop that waits out the dispute window

pub mod message;
pub mod state;
pub mod types;
pub mod wait;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use message::{fetch_handle, MessageError};
pub use state::{OutboundMessageService, OutboxStateProvider};
pub use types::{ExecutedMessage, ExecutionProof, MessageStatus, OutboundMessageHandle};
pub use wait::{
    wait_for_proof, FinalizeError, PendingRead, PollConfig, Sleeper, TokioSleeper,
    DEFAULT_RETRY_DELAY,
};
