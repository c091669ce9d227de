pub mod config;
pub mod metrics;

use crate::{config::Config, metrics::Metrics};
use action::{
    deposit::{L1TokenGateway, SendToL2, SendToL2Action},
    finalize::{FinalizeAction, FinalizeMode},
    withdraw::{StartSendToL1, StartSendToL1Action},
    Action,
};
use alloy_primitives::{
    utils::{format_ether, parse_ether},
    Address, TxHash, U256,
};
use alloy_provider::Provider;
use binding::gateway::IL1GraphTokenGateway;
use ::config::NetworkConfig;
use deposit::{ArbRetryableOracle, RetryableTicketReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use withdrawal::{OutboxStateProvider, PendingRead, PollConfig, TokioSleeper};

/// Parse a decimal token amount with 18 decimals.
pub fn parse_amount(amount: &str) -> eyre::Result<U256> {
    let amount = parse_ether(amount)
        .map_err(|e| eyre::eyre!("Invalid amount {:?}: {}", amount, e))?;
    if amount.is_zero() {
        eyre::bail!("Amount must be greater than zero");
    }
    Ok(amount)
}

/// Command handlers sharing one pair of providers.
pub struct Bridge<P1, P2> {
    l1_provider: P1,
    l2_provider: P2,
    config: Config,
    network: NetworkConfig,
    /// Account signing every transaction
    from: Address,
    metrics: Metrics,
    cancel: CancellationToken,
}

impl<P1, P2> Bridge<P1, P2>
where
    P1: Provider + Clone,
    P2: Provider + Clone,
{
    pub fn new(
        l1_provider: P1,
        l2_provider: P2,
        config: Config,
        from: Address,
        cancel: CancellationToken,
    ) -> Self {
        let network = config.network_config();
        Self {
            l1_provider,
            l2_provider,
            config,
            network,
            from,
            metrics: Metrics::new(),
            cancel,
        }
    }

    /// Refuse to continue unless the L1 provider is on L1 and the L2 provider on L2.
    async fn verify_layers(&self) -> eyre::Result<()> {
        client::verify_layer_roles(&self.l1_provider, &self.l2_provider, &self.network).await?;
        Ok(())
    }

    /// Escrow tokens on L1 and report the retryable ticket outcome.
    pub async fn send_to_l2(&self, amount: U256, recipient: Option<Address>) -> eyre::Result<()> {
        self.verify_layers().await?;

        let mut action = SendToL2Action::new(
            L1TokenGateway::new(self.l1_provider.clone()),
            ArbRetryableOracle::new(self.l2_provider.clone()),
            RetryableTicketReader::new(self.l2_provider.clone()),
            self.config.margins,
            SendToL2 {
                l1_token: self.config.l1_token,
                l1_gateway: self.config.l1_gateway,
                inbox: self.network.ethereum.inbox,
                from: self.from,
                recipient: recipient.unwrap_or(self.from),
                amount,
                l2_chain_id: self.network.arbitrum.chain_id,
            },
        );
        info!("{}", action.description());

        if self.config.dry_run {
            let prepared = action.prepare().await?;
            info!(
                l2_gateway = %prepared.l2_gateway,
                value = %format_ether(prepared.params.value()),
                "Dry run: deposit not sent"
            );
            return Ok(());
        }

        if !action.is_ready().await? {
            eyre::bail!("Insufficient L1 token balance for {}", format_ether(amount));
        }

        let result = action.execute().await?;
        self.metrics.record_deposit();
        if let Some(outcome) = action.outcome() {
            self.metrics.record_ticket_outcome(outcome);
        }

        info!(tx_hash = %result.tx_hash, "Done");
        Ok(())
    }

    /// Burn tokens on L2 and print the handle needed to finish the transfer later.
    pub async fn start_send_to_l1(
        &self,
        amount: U256,
        recipient: Option<Address>,
    ) -> eyre::Result<()> {
        self.verify_layers().await?;

        let (l2_gateway, l2_token) = self.l2_addresses().await?;
        let mut action = StartSendToL1Action::new(
            self.l2_provider.clone(),
            StartSendToL1 {
                l1_token: self.config.l1_token,
                l2_token,
                l2_gateway,
                from: self.from,
                recipient: recipient.unwrap_or(self.from),
                amount,
            },
        );
        info!("{}", action.description());

        if !action.is_ready().await? {
            eyre::bail!("Insufficient L2 token balance for {}", format_ether(amount));
        }

        if self.config.dry_run {
            info!(l2_gateway = %l2_gateway, l2_token = %l2_token, "Dry run: withdrawal not sent");
            return Ok(());
        }

        let result = action.execute().await?;
        self.metrics.record_withdrawal_initiated();

        if let Some(handle) = action.handle() {
            info!(
                tx_hash = %result.tx_hash,
                batch_number = %handle.batch_number,
                index_in_batch = %handle.index_in_batch,
                "Run finish-send-to-l1 with this tx hash once the dispute window has passed"
            );
        }
        Ok(())
    }

    /// Execute a withdrawal on L1, failing if it is not confirmed yet.
    pub async fn finish_send_to_l1(&self, l2_tx_hash: TxHash) -> eyre::Result<()> {
        self.finalize(l2_tx_hash, FinalizeMode::NoWait).await
    }

    /// Wait for a withdrawal to be confirmed, then execute it on L1.
    pub async fn wait_finish_send_to_l1(
        &self,
        l2_tx_hash: TxHash,
        poll: PollConfig,
    ) -> eyre::Result<()> {
        self.finalize(l2_tx_hash, FinalizeMode::Wait(poll)).await
    }

    async fn finalize(&self, l2_tx_hash: TxHash, mode: FinalizeMode) -> eyre::Result<()> {
        self.verify_layers().await?;

        let handle = withdrawal::fetch_handle(&self.l2_provider, l2_tx_hash).await?;
        info!(
            batch_number = %handle.batch_number,
            index_in_batch = %handle.index_in_batch,
            "Found L2-to-L1 message"
        );

        let service = OutboxStateProvider::new(
            self.l1_provider.clone(),
            self.l2_provider.clone(),
            self.network.ethereum.outbox,
        );
        let metrics = self.metrics.clone();
        let mut action = FinalizeAction::new(
            service,
            TokioSleeper,
            handle,
            mode,
            self.cancel.clone(),
        )
        .with_progress(Box::new(move |_: PendingRead| metrics.record_finalize_poll()));
        info!("{}", action.description());

        if self.config.dry_run {
            let proof = action.prepare().await?;
            info!(
                proof_len = proof.proof.len(),
                l1_destination = %proof.l1_destination,
                "Dry run: message ready but not executed"
            );
            return Ok(());
        }

        let result = action.execute().await?;
        self.metrics.record_withdrawal_finalized();

        info!(tx_hash = %result.tx_hash, "Transaction hash");
        Ok(())
    }

    /// L2 gateway and token, from the config or read from the L1 gateway.
    async fn l2_addresses(&self) -> eyre::Result<(Address, Address)> {
        let gateway = IL1GraphTokenGateway::new(self.config.l1_gateway, &self.l1_provider);

        let l2_gateway = match self.config.l2_gateway {
            Some(address) => address,
            None => gateway.l2Counterpart().call().await?,
        };
        let l2_token = match self.config.l2_token {
            Some(address) => address,
            None => {
                gateway
                    .calculateL2TokenAddress(self.config.l1_token)
                    .call()
                    .await?
            }
        };

        if l2_token == Address::ZERO {
            warn!(l1_token = %self.config.l1_token, "L1 gateway reports no L2 token");
            eyre::bail!("Token {} is not bridged to L2", self.config.l1_token);
        }

        Ok((l2_gateway, l2_token))
    }
}
