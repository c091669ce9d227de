//! Derivation of the outbound message handle from an L2 withdrawal receipt.

use crate::types::OutboundMessageHandle;
use alloy_primitives::{TxHash, U256};
use alloy_provider::Provider;
use alloy_rpc_types_eth::Log;
use alloy_sol_types::SolEvent;
use binding::arbitrum::{IArbSys, ARB_SYS_ADDRESS};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// The L2 transaction is unknown to the provider.
    #[error("L2 transaction {0} not found")]
    TransactionNotFound(TxHash),

    /// The L2 transaction reverted, so no message was sent.
    #[error("L2 transaction {0} failed")]
    TransactionFailed(TxHash),

    /// No L2→L1 message in the receipt.
    #[error("No L2-to-L1 message found in transaction {0}")]
    NoOutboundMessage(TxHash),

    /// More than one L2→L1 message in the receipt.
    #[error("Expected a single L2-to-L1 message in transaction {tx_hash}, found {count}")]
    AmbiguousOutboundMessage { tx_hash: TxHash, count: usize },
}

impl OutboundMessageHandle {
    /// Derive the handle from the receipt logs of an L2 transaction.
    ///
    /// Only `L2ToL1Transaction` events emitted by ArbSys count.
    pub fn from_logs(logs: &[Log], l2_tx_hash: TxHash) -> Result<Self, MessageError> {
        let coordinates: Vec<(U256, U256)> = logs
            .iter()
            .filter(|log| log.inner.address == ARB_SYS_ADDRESS)
            .filter_map(|log| IArbSys::L2ToL1Transaction::decode_log(&log.inner).ok())
            .map(|event| (event.data.batchNumber, event.data.indexInBatch))
            .collect();

        match coordinates.as_slice() {
            [] => Err(MessageError::NoOutboundMessage(l2_tx_hash)),
            [(batch_number, index_in_batch)] => Ok(Self {
                batch_number: *batch_number,
                index_in_batch: *index_in_batch,
                l2_tx_hash,
            }),
            _ => Err(MessageError::AmbiguousOutboundMessage {
                tx_hash: l2_tx_hash,
                count: coordinates.len(),
            }),
        }
    }
}

/// Re-derive a handle from the hash of a mined L2 withdrawal transaction.
pub async fn fetch_handle<P>(
    l2_provider: &P,
    l2_tx_hash: TxHash,
) -> eyre::Result<OutboundMessageHandle>
where
    P: Provider,
{
    let receipt = l2_provider
        .get_transaction_receipt(l2_tx_hash)
        .await?
        .ok_or(MessageError::TransactionNotFound(l2_tx_hash))?;

    if !receipt.status() {
        return Err(MessageError::TransactionFailed(l2_tx_hash).into());
    }

    let handle = OutboundMessageHandle::from_logs(receipt.logs(), l2_tx_hash)?;

    debug!(
        batch_number = %handle.batch_number,
        index_in_batch = %handle.index_in_batch,
        l2_tx_hash = %l2_tx_hash,
        "Derived outbound message handle"
    );

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, Bytes};

    fn arbsys_log(emitter: alloy_primitives::Address, batch: u64, index: u64) -> Log {
        let event = IArbSys::L2ToL1Transaction {
            caller: Address::repeat_byte(0x01),
            destination: Address::repeat_byte(0x02),
            uniqueId: U256::from(99),
            batchNumber: U256::from(batch),
            indexInBatch: U256::from(index),
            arbBlockNum: U256::from(1_000),
            ethBlockNum: U256::from(500),
            timestamp: U256::from(1_600_000_000u64),
            callvalue: U256::ZERO,
            data: Bytes::from(vec![0x2e, 0x56, 0x7b, 0x36]),
        };
        Log {
            inner: alloy_primitives::Log {
                address: emitter,
                data: event.encode_log_data(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_handle_from_logs() {
        let tx = TxHash::repeat_byte(0xab);
        let logs = vec![
            arbsys_log(Address::repeat_byte(0x33), 1, 1),
            arbsys_log(ARB_SYS_ADDRESS, 7, 3),
        ];

        let handle = OutboundMessageHandle::from_logs(&logs, tx).unwrap();

        assert_eq!(handle.batch_number, U256::from(7));
        assert_eq!(handle.index_in_batch, U256::from(3));
        assert_eq!(handle.l2_tx_hash, tx);
    }

    #[test]
    fn test_handle_from_logs_without_message() {
        let tx = TxHash::repeat_byte(0xab);
        let logs = vec![arbsys_log(Address::repeat_byte(0x33), 1, 1)];

        let err = OutboundMessageHandle::from_logs(&logs, tx).unwrap_err();

        assert_eq!(err, MessageError::NoOutboundMessage(tx));
    }

    #[test]
    fn test_handle_from_logs_with_two_messages() {
        let tx = TxHash::repeat_byte(0xab);
        let logs = vec![
            arbsys_log(ARB_SYS_ADDRESS, 7, 3),
            arbsys_log(ARB_SYS_ADDRESS, 7, 4),
        ];

        let err = OutboundMessageHandle::from_logs(&logs, tx).unwrap_err();

        assert_eq!(
            err,
            MessageError::AmbiguousOutboundMessage {
                tx_hash: tx,
                count: 2
            }
        );
    }
}
