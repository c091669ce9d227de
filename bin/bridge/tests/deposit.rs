//! Integration tests for L1→L2 deposits.

use crate::setup::{load_test_config, setup_provider, setup_wallet_provider, signer_address};
use action::{
    deposit::{L1TokenGateway, SendToL2, SendToL2Action},
    Action,
};
use alloy_primitives::{address, Address, U256};
use deposit::{ArbRetryableOracle, RetryableTicketReader};


fn send_to_l2(config: &bridge::config::Config, from: Address, amount: U256) -> SendToL2 {
    let network = config.network_config();
    SendToL2 {
        l1_token: config.l1_token,
        l1_gateway: config.l1_gateway,
        inbox: network.ethereum.inbox,
        from,
        recipient: from,
        amount,
        l2_chain_id: network.arbitrum.chain_id,
    }
}

/// Estimate a deposit without sending it.
#[tokio::test]
#[ignore = "requires live L1 and L2 RPC endpoints"]
async fn test_prepare_deposit() {
    let config = load_test_config();
    let l1_provider = setup_provider(&config.l1_rpc_url).await;
    let l2_provider = setup_provider(&config.l2_rpc_url).await;

    // Any funded account works for estimation
    let from = address!("5cffa347b0ae99cc01e5c01714ca5658e54a23d1");
    let action = SendToL2Action::new(
        L1TokenGateway::new(l1_provider),
        ArbRetryableOracle::new(l2_provider.clone()),
        RetryableTicketReader::new(l2_provider),
        config.margins,
        send_to_l2(&config, from, U256::from(1_000_000_000_000_000_000u64)),
    );

    let prepared = action.prepare().await.expect("Failed to prepare deposit");
    println!("L2 gateway: {}", prepared.l2_gateway);
    println!("Submission fee: {}", prepared.params.submission_fee());
    println!("Gas limit: {}", prepared.params.gas_limit());
    println!("Value: {}", prepared.params.value());

    assert!(prepared.params.validate().is_ok());
    assert!(!prepared.request.calldata.is_empty());
}

/// Send a real deposit and report the ticket outcome.
#[tokio::test]
#[ignore = "submits a real L1 transaction"]
async fn test_send_to_l2_execute() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let config = load_test_config();
    let l1_provider = setup_wallet_provider(&config.l1_rpc_url);
    let l2_provider = setup_provider(&config.l2_rpc_url).await;
    let from = signer_address();

    let mut action = SendToL2Action::new(
        L1TokenGateway::new(l1_provider),
        ArbRetryableOracle::new(l2_provider.clone()),
        RetryableTicketReader::new(l2_provider),
        config.margins,
        send_to_l2(&config, from, U256::from(1_000_000_000_000_000u64)),
    );

    assert!(action.is_ready().await.unwrap(), "Insufficient L1 balance");
    let result = action.execute().await.expect("Deposit failed");
    println!("Deposit tx: {}", result.tx_hash);
    println!("Outcome: {:?}", action.outcome());
}
