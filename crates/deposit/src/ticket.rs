//! Retryable ticket tracking for L1→L2 messages.
//!
//! Every L1→L2 message becomes a retryable ticket on L2. The ticket is keyed
//! by a creation id derived from the inbox message number, and its auto-redeem
//! by a user transaction hash derived from the creation id.

use alloy_primitives::{keccak256, Address, TxHash, B256, U256};
use alloy_provider::Provider;
use alloy_rpc_types_eth::{Log, TransactionReceipt};
use alloy_sol_types::SolEvent;
use binding::arbitrum::{IArbRetryableTx, IInbox, ARB_RETRYABLE_TX_ADDRESS};
use std::{fmt, future::Future, time::Duration};
use thiserror::Error;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};
use tracing::{debug, info, warn};

/// Lookups of the creation receipt before reporting the ticket as not created.
pub const DEFAULT_CREATION_LOOKUPS: usize = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TicketError {
    /// The L1 receipt carries no message delivered by the inbox.
    #[error("No inbox message found in L1 transaction (inbox {inbox})")]
    NoInboundMessage { inbox: Address },

    /// More than one inbox message in a single transaction.
    #[error("Expected a single inbox message, found {count}")]
    AmbiguousInboundMessage { count: usize },

    /// Ticket ended in a state other than redeemed or funds deposited.
    #[error("Unexpected ticket status: {0}")]
    UnexpectedStatus(TicketStatus),
}

/// Observable status of a retryable ticket on L2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    /// The ticket has not been created on L2 yet
    NotYetCreated,
    /// Ticket creation reverted on L2
    CreationFailed,
    /// Ticket exists with its funds on L2 but auto-redeem did not succeed
    FundsDepositedOnL2,
    /// The ticket executed successfully
    Redeemed,
    /// The ticket timed out before being redeemed
    Expired,
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotYetCreated => "NOT_YET_CREATED",
            Self::CreationFailed => "CREATION_FAILED",
            Self::FundsDepositedOnL2 => "FUNDS_DEPOSITED_ON_L2",
            Self::Redeemed => "REDEEMED",
            Self::Expired => "EXPIRED",
        };
        f.write_str(s)
    }
}

/// The L1→L2 message created by a deposit transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboundMessage {
    /// Sequence number assigned by the inbox
    pub message_number: U256,
    /// Chain id of the destination L2
    pub l2_chain_id: u64,
    /// L1 transaction that sent the message
    pub l1_tx_hash: TxHash,
}

impl InboundMessage {
    /// Derive the message from the receipt logs of an L1 transaction.
    ///
    /// Only logs emitted by `inbox` count. Exactly one must be present.
    pub fn from_logs(
        logs: &[Log],
        inbox: Address,
        l2_chain_id: u64,
        l1_tx_hash: TxHash,
    ) -> Result<Self, TicketError> {
        let numbers: Vec<U256> = logs
            .iter()
            .filter(|log| log.inner.address == inbox)
            .filter_map(|log| IInbox::InboxMessageDelivered::decode_log(&log.inner).ok())
            .map(|event| event.data.messageNum)
            .collect();

        match numbers.as_slice() {
            [] => Err(TicketError::NoInboundMessage { inbox }),
            [message_number] => Ok(Self {
                message_number: *message_number,
                l2_chain_id,
                l1_tx_hash,
            }),
            _ => Err(TicketError::AmbiguousInboundMessage {
                count: numbers.len(),
            }),
        }
    }

    /// L2 transaction hash of the ticket creation.
    ///
    /// `keccak256(uint256(l2ChainId) ++ uint256(messageNumber | 1 << 255))`
    pub fn creation_id(&self) -> B256 {
        let flagged = self.message_number | (U256::from(1) << 255usize);
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(&U256::from(self.l2_chain_id).to_be_bytes::<32>());
        buf[32..].copy_from_slice(&flagged.to_be_bytes::<32>());
        keccak256(buf)
    }

    /// L2 transaction hash of the first (auto) redeem attempt.
    pub fn user_tx_hash(&self) -> B256 {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(self.creation_id().as_slice());
        keccak256(buf)
    }
}

/// Reads the current status of a ticket.
pub trait TicketStatusReader: Send + Sync {
    fn ticket_status(
        &self,
        message: &InboundMessage,
    ) -> impl Future<Output = eyre::Result<TicketStatus>> + Send;
}

/// Ticket status reader backed by an L2 provider.
pub struct RetryableTicketReader<P> {
    l2_provider: P,
    creation_lookups: usize,
}

impl<P> RetryableTicketReader<P>
where
    P: Provider + Clone,
{
    pub const fn new(l2_provider: P) -> Self {
        Self {
            l2_provider,
            creation_lookups: DEFAULT_CREATION_LOOKUPS,
        }
    }

    pub const fn with_creation_lookups(mut self, lookups: usize) -> Self {
        self.creation_lookups = lookups;
        self
    }

    /// Wait a bounded time for the ticket creation receipt to be indexed on L2.
    async fn creation_receipt(
        &self,
        creation_id: B256,
    ) -> eyre::Result<Option<TransactionReceipt>> {
        let retry_strategy = ExponentialBackoff::from_millis(2)
            .factor(500)
            .max_delay(Duration::from_secs(15))
            .take(self.creation_lookups);

        let lookup = RetryIf::start(
            retry_strategy,
            || async {
                match self.l2_provider.get_transaction_receipt(creation_id).await {
                    Ok(Some(receipt)) => Ok(receipt),
                    Ok(None) => {
                        debug!(creation_id = %creation_id, "Ticket creation not indexed yet");
                        Err(ReceiptLookupError::NotIndexed)
                    }
                    Err(e) => {
                        warn!(creation_id = %creation_id, error = %e, "Receipt lookup failed");
                        Err(ReceiptLookupError::Rpc(e.to_string()))
                    }
                }
            },
            |e: &ReceiptLookupError| matches!(e, ReceiptLookupError::NotIndexed),
        )
        .await;

        match lookup {
            Ok(receipt) => Ok(Some(receipt)),
            Err(ReceiptLookupError::NotIndexed) => Ok(None),
            Err(ReceiptLookupError::Rpc(e)) => Err(eyre::eyre!(e)),
        }
    }
}

#[derive(Debug)]
enum ReceiptLookupError {
    NotIndexed,
    Rpc(String),
}

impl<P> TicketStatusReader for RetryableTicketReader<P>
where
    P: Provider + Clone,
{
    async fn ticket_status(&self, message: &InboundMessage) -> eyre::Result<TicketStatus> {
        let creation_id = message.creation_id();

        let Some(creation) = self.creation_receipt(creation_id).await? else {
            return Ok(TicketStatus::NotYetCreated);
        };
        if !creation.status() {
            return Ok(TicketStatus::CreationFailed);
        }

        let user_tx_hash = message.user_tx_hash();
        if let Some(redeem) = self.l2_provider.get_transaction_receipt(user_tx_hash).await? {
            if redeem.status() {
                return Ok(TicketStatus::Redeemed);
            }
            debug!(user_tx_hash = %user_tx_hash, "Auto-redeem reverted");
        }

        let retryable = IArbRetryableTx::new(ARB_RETRYABLE_TX_ADDRESS, &self.l2_provider);
        let timeout = retryable.getTimeout(creation_id).call().await?;

        if timeout.is_zero() {
            Ok(TicketStatus::Expired)
        } else {
            Ok(TicketStatus::FundsDepositedOnL2)
        }
    }
}

/// Acceptable end states of an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketOutcome {
    /// Tokens arrived on L2
    Redeemed,
    /// Funds are on L2 but the ticket must be redeemed manually
    FundsDepositedNotRedeemed,
}

/// Map a ticket status to an outcome, failing on anything unexpected.
pub const fn classify_ticket_status(status: TicketStatus) -> Result<TicketOutcome, TicketError> {
    match status {
        TicketStatus::Redeemed => Ok(TicketOutcome::Redeemed),
        TicketStatus::FundsDepositedOnL2 => Ok(TicketOutcome::FundsDepositedNotRedeemed),
        other => Err(TicketError::UnexpectedStatus(other)),
    }
}

/// Reads a ticket's status once and reports its outcome.
pub struct InboundTracker<R> {
    reader: R,
}

impl<R> InboundTracker<R>
where
    R: TicketStatusReader,
{
    pub const fn new(reader: R) -> Self {
        Self { reader }
    }

    pub async fn track(&self, message: &InboundMessage) -> eyre::Result<TicketOutcome> {
        let status = self.reader.ticket_status(message).await?;

        debug!(
            message_number = %message.message_number,
            creation_id = %message.creation_id(),
            status = %status,
            "Read retryable ticket status"
        );

        let outcome = classify_ticket_status(status)?;
        match outcome {
            TicketOutcome::Redeemed => info!(
                l1_tx_hash = %message.l1_tx_hash,
                user_tx_hash = %message.user_tx_hash(),
                "Deposit redeemed on L2"
            ),
            TicketOutcome::FundsDepositedNotRedeemed => warn!(
                l1_tx_hash = %message.l1_tx_hash,
                creation_id = %message.creation_id(),
                "Funds deposited on L2 but ticket was not redeemed, manual redeem required"
            ),
        }

        Ok(outcome)
    }
}
