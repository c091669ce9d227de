use crate::{ensure_success, Action};
use alloy_primitives::{utils::format_ether, Address, Bytes, U256};
use alloy_provider::Provider;
use binding::{gateway::IL2GraphTokenGateway, token::IERC20};
use tracing::info;
use withdrawal::OutboundMessageHandle;

/// Input data for starting an L2→L1 transfer.
#[derive(Debug, Clone)]
pub struct StartSendToL1 {
    /// Token being bridged, on L1
    pub l1_token: Address,
    /// Token being burned, on L2
    pub l2_token: Address,
    /// L2 gateway burning the token
    pub l2_gateway: Address,
    pub from: Address,
    /// Recipient on L1
    pub recipient: Address,
    pub amount: U256,
}

/// Action to burn tokens on L2 and send the L2→L1 message.
///
/// Never waits for the dispute window; the resulting handle is logged so the
/// transfer can be finished later from the transaction hash.
pub struct StartSendToL1Action<P> {
    provider: P,
    action: StartSendToL1,
    handle: Option<OutboundMessageHandle>,
}

impl<P> StartSendToL1Action<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P, action: StartSendToL1) -> Self {
        Self {
            provider,
            action,
            handle: None,
        }
    }

    /// Handle of the sent message, once executed.
    pub const fn handle(&self) -> Option<OutboundMessageHandle> {
        self.handle
    }
}

impl<P> Action for StartSendToL1Action<P>
where
    P: Provider + Clone,
{
    async fn is_ready(&self) -> eyre::Result<bool> {
        if self.action.amount.is_zero() || self.action.recipient == Address::ZERO {
            return Ok(false);
        }

        let token = IERC20::new(self.action.l2_token, &self.provider);
        let balance = token.balanceOf(self.action.from).call().await?;
        Ok(balance >= self.action.amount)
    }

    async fn is_completed(&self) -> eyre::Result<bool> {
        Ok(self.handle.is_some())
    }

    async fn execute(&mut self) -> eyre::Result<crate::Result> {
        if self.is_completed().await? {
            eyre::bail!("Withdrawal already started")
        }

        let token = IERC20::new(self.action.l2_token, &self.provider);
        info!(
            spender = %self.action.l2_gateway,
            amount = %self.action.amount,
            "Approving L2 gateway"
        );
        let receipt = token
            .approve(self.action.l2_gateway, self.action.amount)
            .send()
            .await?
            .get_receipt()
            .await?;
        ensure_success(&receipt, "Approve")?;

        let gateway = IL2GraphTokenGateway::new(self.action.l2_gateway, &self.provider);
        let receipt = gateway
            .outboundTransfer(
                self.action.l1_token,
                self.action.recipient,
                self.action.amount,
                Bytes::new(),
            )
            .send()
            .await?
            .get_receipt()
            .await?;
        ensure_success(&receipt, "Withdrawal")?;

        let handle = OutboundMessageHandle::from_logs(receipt.logs(), receipt.transaction_hash)?;
        info!(
            tx_hash = %receipt.transaction_hash,
            block_number = receipt.block_number,
            gas_used = receipt.gas_used,
            batch_number = %handle.batch_number,
            index_in_batch = %handle.index_in_batch,
            "Withdrawal started on L2. Keep the tx hash to finish it on L1 once confirmed"
        );
        self.handle = Some(handle);

        Ok(crate::Result {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: Some(U256::from(receipt.gas_used)),
        })
    }

    fn description(&self) -> String {
        format!(
            "Sending {} tokens ({}) from L2 to {} on L1",
            format_ether(self.action.amount),
            self.action.l2_token,
            self.action.recipient
        )
    }
}
