use alloy_primitives::{Address, Bytes, TxHash, B256, U256};
use std::{
    fmt,
    hash::{Hash, Hasher},
};

/// Coordinates of one L2→L1 message in the outbox.
///
/// Identity is `(batch_number, index_in_batch)`; the source transaction hash is
/// carried for reporting only.
#[derive(Debug, Clone, Copy)]
pub struct OutboundMessageHandle {
    pub batch_number: U256,
    pub index_in_batch: U256,
    pub l2_tx_hash: TxHash,
}

impl PartialEq for OutboundMessageHandle {
    fn eq(&self, other: &Self) -> bool {
        self.batch_number == other.batch_number && self.index_in_batch == other.index_in_batch
    }
}

impl Eq for OutboundMessageHandle {}

impl Hash for OutboundMessageHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.batch_number.hash(state);
        self.index_in_batch.hash(state);
    }
}

impl fmt::Display for OutboundMessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "batch {} index {} (tx {})",
            self.batch_number, self.index_in_batch, self.l2_tx_hash
        )
    }
}

/// Outbox status of an L2→L1 message. Ordered by progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageStatus {
    /// Batch not yet confirmed on L1 (dispute window still open)
    Unconfirmed,
    /// Batch confirmed, message can be executed
    Confirmed,
    /// Message already executed on L1
    Executed,
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unconfirmed => "UNCONFIRMED",
            Self::Confirmed => "CONFIRMED",
            Self::Executed => "EXECUTED",
        };
        f.write_str(s)
    }
}

/// Everything the outbox needs to execute a confirmed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionProof {
    pub batch_number: U256,
    pub proof: Vec<B256>,
    /// Leaf path in the batch merkle tree, passed as the outbox `index`
    pub path: U256,
    pub l2_sender: Address,
    pub l1_destination: Address,
    pub l2_block: U256,
    pub l1_block: U256,
    pub l2_timestamp: U256,
    pub amount: U256,
    pub calldata: Bytes,
}

/// Receipt summary of an outbox execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutedMessage {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn handle(batch: u64, index: u64, tx: u8) -> OutboundMessageHandle {
        OutboundMessageHandle {
            batch_number: U256::from(batch),
            index_in_batch: U256::from(index),
            l2_tx_hash: TxHash::repeat_byte(tx),
        }
    }

    #[test]
    fn test_handle_identity_ignores_tx_hash() {
        assert_eq!(handle(3, 1, 0xaa), handle(3, 1, 0xbb));
        assert_ne!(handle(3, 1, 0xaa), handle(3, 2, 0xaa));
        assert_ne!(handle(3, 1, 0xaa), handle(4, 1, 0xaa));

        let set: HashSet<_> = [handle(3, 1, 0xaa), handle(3, 1, 0xbb)].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_status_ordering() {
        assert!(MessageStatus::Unconfirmed < MessageStatus::Confirmed);
        assert!(MessageStatus::Confirmed < MessageStatus::Executed);
        assert_eq!(MessageStatus::Confirmed.to_string(), "CONFIRMED");
    }
}
