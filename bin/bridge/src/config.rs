use alloy_primitives::Address;
use ::config::{NetworkConfig, NetworkConfigBuilder, NetworkType, RetryableMargins};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};
use withdrawal::PollConfig;

/// Top-level bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// L1 RPC endpoint url
    pub l1_rpc_url: String,

    /// L2 RPC endpoint url
    pub l2_rpc_url: String,

    /// Network preset (mainnet or testnet)
    #[serde(default = "default_network")]
    pub network: NetworkType,

    /// Token being bridged, on L1
    pub l1_token: Address,

    /// L1 token gateway
    pub l1_gateway: Address,

    /// L2 token gateway, read from the L1 gateway when not set
    #[serde(default)]
    pub l2_gateway: Option<Address>,

    /// L2 token, read from the L1 gateway when not set
    #[serde(default)]
    pub l2_token: Option<Address>,

    /// Inbox override
    #[serde(default)]
    pub inbox: Option<Address>,

    /// Outbox override
    #[serde(default)]
    pub outbox: Option<Address>,

    /// Safety margins applied to retryable ticket estimates
    #[serde(default)]
    pub margins: RetryableMargins,

    /// Seconds between status reads while waiting for confirmation
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Give up waiting for confirmation after this many seconds
    #[serde(default)]
    pub max_wait_secs: Option<u64>,

    /// Serve Prometheus metrics on this port
    #[serde(default)]
    pub metrics_port: Option<u16>,

    /// Estimate and read state without sending transactions
    #[serde(default)]
    pub dry_run: bool,
}

const fn default_network() -> NetworkType {
    NetworkType::Mainnet
}

const fn default_retry_delay_secs() -> u64 {
    60
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;

        Ok(config)
    }

    /// Network preset with inbox/outbox overrides applied.
    pub fn network_config(&self) -> NetworkConfig {
        let mut builder = NetworkConfigBuilder::from_network_type(self.network);
        if let Some(inbox) = self.inbox {
            builder = builder.inbox(inbox);
        }
        if let Some(outbox) = self.outbox {
            builder = builder.outbox(outbox);
        }
        builder.build()
    }

    /// Poll cadence for waiting finalization, with optional command-line overrides.
    pub fn poll_config(
        &self,
        retry_delay_secs: Option<u64>,
        max_wait_secs: Option<u64>,
    ) -> PollConfig {
        let retry_delay = retry_delay_secs.unwrap_or(self.retry_delay_secs);
        let max_wait = max_wait_secs.or(self.max_wait_secs);

        PollConfig::new(Duration::from_secs(retry_delay))
            .with_max_wait(max_wait.map(Duration::from_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const MINIMAL: &str = r#"
        l1_rpc_url = "http://localhost:8545"
        l2_rpc_url = "http://localhost:8547"
        l1_token = "0xc944e90c64b2c07662a292be6244bdf05cda44a7"
        l1_gateway = "0x01cdc91b0a9ba741903aa3699bf4ce31d6c5cc06"
    "#;

    #[test]
    fn test_minimal_config_defaults() {
        let config: Config = toml::from_str(MINIMAL).unwrap();

        assert_eq!(config.network, NetworkType::Mainnet);
        assert_eq!(config.retry_delay_secs, 60);
        assert_eq!(config.max_wait_secs, None);
        assert_eq!(config.margins, RetryableMargins::default());
        assert!(config.l2_gateway.is_none());
        assert!(!config.dry_run);

        let network = config.network_config();
        assert_eq!(network.ethereum.chain_id, 1);
        assert_eq!(network.arbitrum.chain_id, 42161);
    }

    #[test]
    fn test_overrides() {
        let contents = format!(
            r#"{MINIMAL}
            network = "testnet"
            outbox = "0x1111111111111111111111111111111111111111"
            retry_delay_secs = 30
            max_wait_secs = 600
            dry_run = true

            [margins]
            gas_limit_pct = 100
            "#
        );
        let config: Config = toml::from_str(&contents).unwrap();

        let network = config.network_config();
        assert_eq!(network.ethereum.chain_id, 4);
        assert_eq!(
            network.ethereum.outbox,
            address!("1111111111111111111111111111111111111111")
        );
        assert_eq!(config.margins.submission_fee_pct, 400);
        assert_eq!(config.margins.gas_limit_pct, 100);
        assert!(config.dry_run);
    }

    #[test]
    fn test_poll_config_overrides() {
        let config: Config = toml::from_str(MINIMAL).unwrap();

        let poll = config.poll_config(None, None);
        assert_eq!(poll.retry_delay, Duration::from_secs(60));
        assert_eq!(poll.max_wait, None);

        let poll = config.poll_config(Some(5), Some(3_600));
        assert_eq!(poll.retry_delay, Duration::from_secs(5));
        assert_eq!(poll.max_wait, Some(Duration::from_secs(3_600)));
    }
}
