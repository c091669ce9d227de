//! Contract bindings for all external contracts.
//!
//! This crate consolidates all Solidity contract interfaces used across the project:
//! - Arbitrum system contracts (Inbox, Outbox, ArbSys, ArbRetryableTx, NodeInterface)
//! - Token gateways (L1GraphTokenGateway, L2GraphTokenGateway)
//! - ERC20 tokens
//!
//! All bindings are generated using alloy's `sol!` macro.

pub mod arbitrum;
pub mod gateway;
pub mod token;
