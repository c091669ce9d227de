//! Arbitrum system contract bindings.
//!
//! Includes contracts for both bridge directions:
//! - Inbox (L1, emits the message number of every L1→L2 message)
//! - Outbox (L1, executes confirmed L2→L1 messages)
//! - ArbSys (L2 precompile, emits L2→L1 message coordinates)
//! - ArbRetryableTx (L2 precompile, submission price and ticket timeouts)
//! - NodeInterface (L2 virtual contract, gas estimation and outbox proofs)

use alloy_primitives::{address, Address};
use alloy_sol_types::sol;

/// ArbSys precompile address (0x64).
pub const ARB_SYS_ADDRESS: Address = address!("0000000000000000000000000000000000000064");

/// ArbRetryableTx precompile address (0x6E).
pub const ARB_RETRYABLE_TX_ADDRESS: Address =
    address!("000000000000000000000000000000000000006e");

/// NodeInterface address (0xC8).
///
/// Note: This contract doesn't exist on-chain. It is a virtual interface
/// served by the node at that address and only usable through `eth_call`.
pub const NODE_INTERFACE_ADDRESS: Address = address!("00000000000000000000000000000000000000c8");

sol! {
    /// Inbox - L1 entrypoint for messages to L2
    #[sol(rpc)]
    interface IInbox {
        /// Emitted for every message delivered to the L2 inbox
        event InboxMessageDelivered(uint256 indexed messageNum, bytes data);
    }

    /// Outbox - L1 contract executing L2→L1 messages once their batch is confirmed
    #[sol(rpc)]
    #[allow(clippy::too_many_arguments)]
    interface IOutbox {
        /// Emitted when an outbox entry for a batch has been created
        event OutboxEntryCreated(
            uint256 indexed batchNum,
            uint256 outboxEntryIndex,
            bytes32 outputRoot,
            uint256 numInBatch
        );

        /// Emitted when an L2→L1 message is executed
        event OutBoxTransactionExecuted(
            address indexed destAddr,
            address indexed l2Sender,
            uint256 indexed outboxEntryIndex,
            uint256 transactionIndex
        );

        /// Whether the outbox entry for a batch exists (i.e. the batch is confirmed)
        function outboxEntryExists(uint256 batchNum) external view returns (bool);

        /// Execute an L2→L1 message with its merkle proof
        function executeTransaction(
            uint256 batchNum,
            bytes32[] calldata proof,
            uint256 index,
            address l2Sender,
            address destAddr,
            uint256 l2Block,
            uint256 l1Block,
            uint256 l2Timestamp,
            uint256 amount,
            bytes calldata calldataForL1
        ) external;
    }

    /// ArbSys - L2 precompile used to send messages to L1
    #[sol(rpc)]
    interface IArbSys {
        /// Emitted when an L2→L1 message is sent
        event L2ToL1Transaction(
            address caller,
            address indexed destination,
            uint256 indexed uniqueId,
            uint256 indexed batchNumber,
            uint256 indexInBatch,
            uint256 arbBlockNum,
            uint256 ethBlockNum,
            uint256 timestamp,
            uint256 callvalue,
            bytes data
        );
    }

    /// ArbRetryableTx - L2 precompile for retryable ticket bookkeeping
    #[sol(rpc)]
    interface IArbRetryableTx {
        /// Current submission price for a retryable with the given calldata size.
        /// Returns the price and the timestamp until which it is valid.
        function getSubmissionPrice(uint256 calldataSize)
            external view returns (uint256, uint256);

        /// Timeout of a retryable ticket, zero if it does not exist (expired or redeemed)
        function getTimeout(bytes32 userTxHash) external view returns (uint256);
    }

    /// NodeInterface - virtual L2 contract exposing node-side helpers
    #[sol(rpc)]
    #[allow(clippy::too_many_arguments)]
    interface INodeInterface {
        /// Estimate the L2 gas needed to execute a retryable ticket.
        /// Returns the gas estimate and the gas price used.
        function estimateRetryableTicket(
            address sender,
            uint256 deposit,
            address destAddr,
            uint256 l2CallValue,
            uint256 maxSubmissionCost,
            address excessFeeRefundAddress,
            address callValueRefundAddress,
            uint256 maxGas,
            uint256 gasPriceBid,
            bytes calldata data
        ) external view returns (uint256, uint256);

        /// Build the outbox proof for an L2→L1 message
        function lookupMessageBatchProof(uint256 batchNum, uint64 index)
            external
            view
            returns (
                bytes32[] memory proof,
                uint256 path,
                address l2Sender,
                address l1Dest,
                uint256 l2Block,
                uint256 l1Block,
                uint256 timestamp,
                uint256 amount,
                bytes memory calldataForL1
            );
    }
}
