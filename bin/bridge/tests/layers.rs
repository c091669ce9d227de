//! Integration tests for the provider layer-role check.

use crate::setup::{load_test_config, setup_provider};
use client::ClientError;
use config::ConfigError;


#[tokio::test]
#[ignore = "requires live L1 and L2 RPC endpoints"]
async fn test_layer_roles_accepted() {
    let config = load_test_config();
    let l1_provider = setup_provider(&config.l1_rpc_url).await;
    let l2_provider = setup_provider(&config.l2_rpc_url).await;

    client::verify_layer_roles(&l1_provider, &l2_provider, &config.network_config())
        .await
        .expect("L1 and L2 providers should pass the role check");
}

#[tokio::test]
#[ignore = "requires live L1 and L2 RPC endpoints"]
async fn test_swapped_providers_rejected() {
    let config = load_test_config();
    let l1_provider = setup_provider(&config.l1_rpc_url).await;
    let l2_provider = setup_provider(&config.l2_rpc_url).await;

    let err = client::verify_layer_roles(&l2_provider, &l1_provider, &config.network_config())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::LayerRole(ConfigError::LayerMismatch { .. })
    ));
}
