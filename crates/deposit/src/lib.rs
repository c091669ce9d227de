//! L1→L2 deposits over the token bridge.
//!
//! This crate provides:
//! - Retryable ticket cost estimation (submission fee, gas limit, gas price bid)
//! - Derivation of the inbound message created by a deposit transaction
//! - Retryable ticket status tracking on L2

pub mod estimate;
pub mod ticket;

pub use estimate::{
    apply_margin, ArbRetryableOracle, EstimateError, RetryableCostOracle, RetryableEstimator,
    RetryableParameters, TicketRequest, MAX_ESTIMATION_ROUNDS,
};
pub use ticket::{
    classify_ticket_status, InboundMessage, InboundTracker, RetryableTicketReader, TicketError,
    TicketOutcome, TicketStatus, TicketStatusReader,
};
