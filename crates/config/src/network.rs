//! Network configuration for cross-layer transfers.
//!
//! Provides chain-specific addresses and parameters for the supported
//! L1/rollup pairs (mainnet, testnet).

use crate::ConfigError;
use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

/// Chain ids that identify a rollup (L2) chain.
pub const L2_CHAIN_IDS: [u64; 2] = [42161, 421611];

/// Whether the chain id belongs to a rollup layer.
pub fn is_l2_chain_id(chain_id: u64) -> bool {
    L2_CHAIN_IDS.contains(&chain_id)
}

/// Network type (mainnet or testnet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Mainnet,
    Testnet,
}

/// Ethereum (L1) network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EthereumConfig {
    /// Chain ID
    pub chain_id: u64,
    /// Rollup Inbox contract, emits `InboxMessageDelivered` for deposits
    pub inbox: Address,
    /// Rollup Outbox contract, executes confirmed L2→L1 messages
    pub outbox: Address,
}

impl EthereumConfig {
    /// Ethereum mainnet configuration.
    pub const fn mainnet() -> Self {
        Self {
            chain_id: 1,
            // https://etherscan.io/address/0x4Dbd4fc535Ac27206064B68FfCf827b0A60BAB3f
            inbox: address!("0x4Dbd4fc535Ac27206064B68FfCf827b0A60BAB3f"),
            // https://etherscan.io/address/0x760723CD2e632826c38Fef8CD438A4CC7E7E1A40
            outbox: address!("0x760723CD2e632826c38Fef8CD438A4CC7E7E1A40"),
        }
    }

    /// Ethereum Rinkeby testnet configuration.
    pub const fn rinkeby() -> Self {
        Self {
            chain_id: 4,
            inbox: address!("0x578BAde599406A8fE3d24Fd7f7211c0911F5B29e"),
            outbox: address!("0x2360A33905dc1c72b12d975d975F42BaBdcef9F3"),
        }
    }
}

/// Arbitrum (L2) network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrumConfig {
    /// Chain ID
    pub chain_id: u64,
}

impl ArbitrumConfig {
    /// Arbitrum One configuration.
    pub const fn mainnet() -> Self {
        Self { chain_id: 42161 }
    }

    /// Arbitrum Rinkeby configuration.
    pub const fn rinkeby() -> Self {
        Self { chain_id: 421611 }
    }
}

/// Complete network configuration for cross-layer transfers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network type (mainnet or testnet)
    pub network_type: NetworkType,
    /// Ethereum/L1 configuration
    pub ethereum: EthereumConfig,
    /// Arbitrum/L2 configuration
    pub arbitrum: ArbitrumConfig,
}

impl NetworkConfig {
    /// Create mainnet configuration.
    pub const fn mainnet() -> Self {
        Self {
            network_type: NetworkType::Mainnet,
            ethereum: EthereumConfig::mainnet(),
            arbitrum: ArbitrumConfig::mainnet(),
        }
    }

    /// Create testnet (Rinkeby) configuration.
    pub const fn rinkeby() -> Self {
        Self {
            network_type: NetworkType::Testnet,
            ethereum: EthereumConfig::rinkeby(),
            arbitrum: ArbitrumConfig::rinkeby(),
        }
    }

    /// Create configuration from network type.
    pub const fn from_network_type(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Mainnet => Self::mainnet(),
            NetworkType::Testnet => Self::rinkeby(),
        }
    }

    /// Check that the providers are connected to the layers they are configured for.
    ///
    /// The L1 provider must not report a rollup chain id and the L2 provider must.
    /// Both must also match this network's chain ids.
    pub fn check_layer_roles(&self, l1_chain_id: u64, l2_chain_id: u64) -> Result<(), ConfigError> {
        if is_l2_chain_id(l1_chain_id) || !is_l2_chain_id(l2_chain_id) {
            return Err(ConfigError::LayerMismatch {
                l1_chain_id,
                l2_chain_id,
            });
        }

        if l1_chain_id != self.ethereum.chain_id {
            return Err(ConfigError::NetworkMismatch {
                layer: "L1",
                expected: self.ethereum.chain_id,
                actual: l1_chain_id,
            });
        }

        if l2_chain_id != self.arbitrum.chain_id {
            return Err(ConfigError::NetworkMismatch {
                layer: "L2",
                expected: self.arbitrum.chain_id,
                actual: l2_chain_id,
            });
        }

        Ok(())
    }
}

/// Builder for custom network configurations.
#[derive(Debug, Clone)]
pub struct NetworkConfigBuilder {
    network_type: NetworkType,
    ethereum: EthereumConfig,
    arbitrum: ArbitrumConfig,
}

impl NetworkConfigBuilder {
    /// Start with mainnet defaults.
    pub const fn mainnet() -> Self {
        Self {
            network_type: NetworkType::Mainnet,
            ethereum: EthereumConfig::mainnet(),
            arbitrum: ArbitrumConfig::mainnet(),
        }
    }

    /// Start with testnet defaults.
    pub const fn testnet() -> Self {
        Self {
            network_type: NetworkType::Testnet,
            ethereum: EthereumConfig::rinkeby(),
            arbitrum: ArbitrumConfig::rinkeby(),
        }
    }

    /// Start with the defaults of a network type.
    pub const fn from_network_type(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Mainnet => Self::mainnet(),
            NetworkType::Testnet => Self::testnet(),
        }
    }

    /// Override the L1 Inbox address.
    pub const fn inbox(mut self, address: Address) -> Self {
        self.ethereum.inbox = address;
        self
    }

    /// Override the L1 Outbox address.
    pub const fn outbox(mut self, address: Address) -> Self {
        self.ethereum.outbox = address;
        self
    }

    /// Build the network configuration.
    pub const fn build(self) -> NetworkConfig {
        NetworkConfig {
            network_type: self.network_type,
            ethereum: self.ethereum,
            arbitrum: self.arbitrum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_config() {
        let config = NetworkConfig::mainnet();
        assert_eq!(config.ethereum.chain_id, 1);
        assert_eq!(config.arbitrum.chain_id, 42161);
        assert_eq!(config.network_type, NetworkType::Mainnet);
    }

    #[test]
    fn test_rinkeby_config() {
        let config = NetworkConfig::rinkeby();
        assert_eq!(config.ethereum.chain_id, 4);
        assert_eq!(config.arbitrum.chain_id, 421611);
        assert_eq!(config.network_type, NetworkType::Testnet);
    }

    #[test]
    fn test_custom_config_builder() {
        let custom_outbox = address!("1111111111111111111111111111111111111111");

        let config = NetworkConfigBuilder::mainnet().outbox(custom_outbox).build();

        assert_eq!(config.ethereum.outbox, custom_outbox);
        assert_eq!(config.ethereum.inbox, EthereumConfig::mainnet().inbox);
        assert_eq!(config.network_type, NetworkType::Mainnet);
    }

    #[test]
    fn test_layer_roles_accepted() {
        let config = NetworkConfig::mainnet();
        assert!(config.check_layer_roles(1, 42161).is_ok());
    }

    #[test]
    fn test_l1_provider_on_rollup_rejected() {
        let config = NetworkConfig::mainnet();
        let err = config.check_layer_roles(42161, 42161).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::LayerMismatch {
                l1_chain_id: 42161,
                l2_chain_id: 42161
            }
        ));
    }

    #[test]
    fn test_swapped_providers_rejected() {
        let config = NetworkConfig::mainnet();
        let err = config.check_layer_roles(42161, 1).unwrap_err();
        assert!(matches!(err, ConfigError::LayerMismatch { .. }));
    }

    #[test]
    fn test_wrong_network_rejected() {
        let config = NetworkConfig::mainnet();
        let err = config.check_layer_roles(4, 421611).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NetworkMismatch {
                layer: "L1",
                expected: 1,
                actual: 4
            }
        ));
    }

    #[test]
    fn test_network_type_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            network: NetworkType,
        }

        let parsed: Wrapper = toml::from_str(r#"network = "testnet""#).unwrap();
        assert_eq!(parsed.network, NetworkType::Testnet);
    }
}
