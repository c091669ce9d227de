//! Waiting out the dispute window.
//!
//! The poll loop reads the message status at a fixed cadence until the
//! message is confirmed and its proof is available. Sleeping goes through
//! [`Sleeper`] so the loop can be driven without real delays.

use crate::{
    state::OutboundMessageService,
    types::{ExecutionProof, MessageStatus, OutboundMessageHandle},
};
use std::{future::Future, time::Duration};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Delay between status reads when none is configured.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(60);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FinalizeError {
    /// The message cannot be executed yet.
    #[error("Message status is {observed} when it should be {required}")]
    NotYetConfirmed {
        observed: MessageStatus,
        required: MessageStatus,
    },

    /// The status read says confirmed but the node has no outbox entry for it yet.
    #[error("Message status is {observed} but its outbox proof is not available yet")]
    ProofNotAvailable { observed: MessageStatus },

    /// The message was executed before, executing again would revert.
    #[error("Message already executed!")]
    AlreadyExecuted,

    /// The wait was cancelled before the message was confirmed.
    #[error("Wait for confirmation cancelled")]
    Cancelled,

    /// The configured maximum wait elapsed before confirmation.
    #[error("Message still {observed} after waiting {waited:?}")]
    WaitBudgetExhausted {
        observed: MessageStatus,
        waited: Duration,
    },
}

/// Suspends the poll loop between status reads.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Poll cadence and optional budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between status reads
    pub retry_delay: Duration,
    /// Total time the loop may spend sleeping, unbounded when `None`
    pub max_wait: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            retry_delay: DEFAULT_RETRY_DELAY,
            max_wait: None,
        }
    }
}

impl PollConfig {
    pub const fn new(retry_delay: Duration) -> Self {
        Self {
            retry_delay,
            max_wait: None,
        }
    }

    pub const fn with_max_wait(mut self, max_wait: Option<Duration>) -> Self {
        self.max_wait = max_wait;
        self
    }
}

/// What the loop saw on a pending read, handed to the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRead {
    pub status: MessageStatus,
    pub reads: u64,
    pub waited: Duration,
}

/// Poll until the message is confirmed (or executed) and its proof can be fetched.
///
/// Status reads are sequential. A read below the highest status already seen,
/// or a missing proof after a confirmed read, is logged and polled again.
/// Read failures end the loop.
pub async fn wait_for_proof<S, Z, F>(
    service: &S,
    sleeper: &Z,
    handle: &OutboundMessageHandle,
    config: &PollConfig,
    cancel: &CancellationToken,
    mut on_pending: F,
) -> eyre::Result<(MessageStatus, ExecutionProof)>
where
    S: OutboundMessageService,
    Z: Sleeper,
    F: FnMut(PendingRead) + Send,
{
    let mut high_water = MessageStatus::Unconfirmed;
    let mut reads = 0u64;
    let mut waited = Duration::ZERO;

    loop {
        let status = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FinalizeError::Cancelled.into()),
            status = service.status(handle) => status?,
        };
        reads += 1;

        if status < high_water {
            warn!(
                observed = %status,
                high_water = %high_water,
                handle = %handle,
                "Message status regressed, treating read as transient"
            );
        }
        high_water = high_water.max(status);

        if status >= MessageStatus::Confirmed {
            match service.fetch_proof(handle).await? {
                Some(proof) => {
                    debug!(reads, waited = ?waited, status = %status, "Message ready");
                    return Ok((status, proof));
                }
                None => warn!(
                    handle = %handle,
                    "Outbox entry not visible after confirmed read, polling again"
                ),
            }
        }

        on_pending(PendingRead {
            status,
            reads,
            waited,
        });

        if let Some(max_wait) = config.max_wait {
            if waited + config.retry_delay > max_wait {
                return Err(FinalizeError::WaitBudgetExhausted {
                    observed: status,
                    waited,
                }
                .into());
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FinalizeError::Cancelled.into()),
            _ = sleeper.sleep(config.retry_delay) => {}
        }
        waited += config.retry_delay;
    }
}
