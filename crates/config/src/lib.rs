//! Configuration types for the token bridge.
//!
//! This crate provides:
//! - Network configurations (mainnet, testnet)
//! - Contract addresses for different chains
//! - Layer role validation for L1/L2 providers
//! - Retryable ticket margin policy

pub mod margins;
pub mod network;

pub use margins::RetryableMargins;
pub use network::{
    is_l2_chain_id, ArbitrumConfig, EthereumConfig, NetworkConfig, NetworkConfigBuilder,
    NetworkType,
};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The L1 provider is connected to a rollup, or the L2 provider is not.
    #[error(
        "Please use an L1 provider for L1 and an L2 provider for L2 \
         (L1 provider reports chain {l1_chain_id}, L2 provider reports chain {l2_chain_id})"
    )]
    LayerMismatch { l1_chain_id: u64, l2_chain_id: u64 },

    /// A provider is connected to a different network than configured.
    #[error("{layer} provider reports chain {actual}, configured network expects {expected}")]
    NetworkMismatch {
        layer: &'static str,
        expected: u64,
        actual: u64,
    },
}
