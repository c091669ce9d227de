use crate::types::{ExecutedMessage, ExecutionProof, MessageStatus, OutboundMessageHandle};
use alloy_primitives::Address;
use alloy_provider::Provider;
use binding::arbitrum::{INodeInterface, IOutbox, NODE_INTERFACE_ADDRESS};
use std::future::Future;
use tracing::{debug, info};

/// Outbox revert reason for a message that was already executed.
const ALREADY_SPENT: &str = "ALREADY_SPENT";
/// Outbox revert reason for a batch without an outbox entry yet.
const NO_OUTBOX_ENTRY: &str = "NO_OUTBOX_ENTRY";

/// Settlement-layer view of an outbound message.
pub trait OutboundMessageService: Send + Sync {
    /// Current status of the message.
    fn status(
        &self,
        handle: &OutboundMessageHandle,
    ) -> impl Future<Output = eyre::Result<MessageStatus>> + Send;

    /// Execution proof, or `None` while the batch has no outbox entry.
    fn fetch_proof(
        &self,
        handle: &OutboundMessageHandle,
    ) -> impl Future<Output = eyre::Result<Option<ExecutionProof>>> + Send;

    /// Whether the proven message was already executed on L1.
    fn has_executed(
        &self,
        proof: &ExecutionProof,
    ) -> impl Future<Output = eyre::Result<bool>> + Send;

    /// Execute the message on L1 and wait for the receipt.
    fn execute(
        &self,
        proof: &ExecutionProof,
    ) -> impl Future<Output = eyre::Result<ExecutedMessage>> + Send;
}

/// Outbound message service backed by the L1 outbox and the L2 node interface.
pub struct OutboxStateProvider<P1, P2> {
    l1_provider: P1,
    l2_provider: P2,
    outbox: Address,
}

impl<P1, P2> OutboxStateProvider<P1, P2>
where
    P1: Provider + Clone,
    P2: Provider + Clone,
{
    pub const fn new(l1_provider: P1, l2_provider: P2, outbox: Address) -> Self {
        Self {
            l1_provider,
            l2_provider,
            outbox,
        }
    }

    /// Whether the batch has an outbox entry, i.e. has been confirmed on L1.
    pub async fn is_confirmed(&self, handle: &OutboundMessageHandle) -> eyre::Result<bool> {
        let outbox = IOutbox::new(self.outbox, &self.l1_provider);
        let exists = outbox
            .outboxEntryExists(handle.batch_number)
            .call()
            .await?;
        Ok(exists)
    }

    fn execute_call(proof: &ExecutionProof) -> IOutbox::executeTransactionCall {
        IOutbox::executeTransactionCall {
            batchNum: proof.batch_number,
            proof: proof.proof.clone(),
            index: proof.path,
            l2Sender: proof.l2_sender,
            destAddr: proof.l1_destination,
            l2Block: proof.l2_block,
            l1Block: proof.l1_block,
            l2Timestamp: proof.l2_timestamp,
            amount: proof.amount,
            calldataForL1: proof.calldata.clone(),
        }
    }
}

impl<P1, P2> OutboundMessageService for OutboxStateProvider<P1, P2>
where
    P1: Provider + Clone,
    P2: Provider + Clone,
{
    async fn status(&self, handle: &OutboundMessageHandle) -> eyre::Result<MessageStatus> {
        let Some(proof) = self.fetch_proof(handle).await? else {
            return Ok(MessageStatus::Unconfirmed);
        };

        if self.has_executed(&proof).await? {
            Ok(MessageStatus::Executed)
        } else {
            Ok(MessageStatus::Confirmed)
        }
    }

    async fn fetch_proof(
        &self,
        handle: &OutboundMessageHandle,
    ) -> eyre::Result<Option<ExecutionProof>> {
        if !self.is_confirmed(handle).await? {
            return Ok(None);
        }

        let index = u64::try_from(handle.index_in_batch).map_err(|_| {
            eyre::eyre!("Index in batch {} does not fit in u64", handle.index_in_batch)
        })?;

        let node = INodeInterface::new(NODE_INTERFACE_ADDRESS, &self.l2_provider);
        let lookup = node
            .lookupMessageBatchProof(handle.batch_number, index)
            .call()
            .await?;

        debug!(
            batch_number = %handle.batch_number,
            index_in_batch = index,
            proof_len = lookup.proof.len(),
            path = %lookup.path,
            "Fetched outbox proof"
        );

        Ok(Some(ExecutionProof {
            batch_number: handle.batch_number,
            proof: lookup.proof,
            path: lookup.path,
            l2_sender: lookup.l2Sender,
            l1_destination: lookup.l1Dest,
            l2_block: lookup.l2Block,
            l1_block: lookup.l1Block,
            l2_timestamp: lookup.timestamp,
            amount: lookup.amount,
            calldata: lookup.calldataForL1,
        }))
    }

    async fn has_executed(&self, proof: &ExecutionProof) -> eyre::Result<bool> {
        let outbox = IOutbox::new(self.outbox, &self.l1_provider);
        let call = Self::execute_call(proof);

        // A static call succeeds only while the message is still unspent
        match outbox.call_builder(&call).call().await {
            Ok(_) => Ok(false),
            Err(e) => {
                let reason = e.to_string();
                if reason.contains(ALREADY_SPENT) {
                    Ok(true)
                } else if reason.contains(NO_OUTBOX_ENTRY) {
                    Ok(false)
                } else {
                    Err(e.into())
                }
            }
        }
    }

    async fn execute(&self, proof: &ExecutionProof) -> eyre::Result<ExecutedMessage> {
        let outbox = IOutbox::new(self.outbox, &self.l1_provider);
        let call = Self::execute_call(proof);

        let tx = outbox.call_builder(&call).send().await?;
        let receipt = tx.get_receipt().await?;

        if !receipt.status() {
            eyre::bail!(
                "Outbox execution {} reverted on L1",
                receipt.transaction_hash
            );
        }

        info!(
            tx_hash = %receipt.transaction_hash,
            block_number = receipt.block_number,
            gas_used = receipt.gas_used,
            batch_number = %proof.batch_number,
            "Outbox transaction executed"
        );

        Ok(ExecutedMessage {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }
}
