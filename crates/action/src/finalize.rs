//! Finalize an L2→L1 transfer on L1.
//!
//! Drives one outbound message through
//! `SUBMITTED → UNCONFIRMED → CONFIRMED → PROOF_FETCHED → EXECUTED`.
//! Executing is guarded by an already-executed check on the fetched proof.

use crate::Action;
use alloy_primitives::U256;
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use withdrawal::{
    wait_for_proof, ExecutionProof, FinalizeError, MessageStatus, OutboundMessageHandle,
    OutboundMessageService, PendingRead, PollConfig, Sleeper,
};

/// How to treat a message that is not confirmed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeMode {
    /// Read the status once and fail if not confirmed
    NoWait,
    /// Poll until confirmed
    Wait(PollConfig),
}

/// Progress of a finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FinalizeStage {
    Submitted,
    Unconfirmed,
    Confirmed,
    ProofFetched,
    Executed,
}

impl fmt::Display for FinalizeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Submitted => "SUBMITTED",
            Self::Unconfirmed => "UNCONFIRMED",
            Self::Confirmed => "CONFIRMED",
            Self::ProofFetched => "PROOF_FETCHED",
            Self::Executed => "EXECUTED",
        };
        f.write_str(s)
    }
}

/// Observer for pending status reads in wait mode.
pub type ProgressFn = Box<dyn FnMut(PendingRead) + Send + Sync>;

/// Action to execute a confirmed L2→L1 message on L1.
pub struct FinalizeAction<S, Z> {
    service: S,
    sleeper: Z,
    handle: OutboundMessageHandle,
    mode: FinalizeMode,
    cancel: CancellationToken,
    stage: FinalizeStage,
    progress: Option<ProgressFn>,
}

impl<S, Z> FinalizeAction<S, Z>
where
    S: OutboundMessageService,
    Z: Sleeper,
{
    pub fn new(
        service: S,
        sleeper: Z,
        handle: OutboundMessageHandle,
        mode: FinalizeMode,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            service,
            sleeper,
            handle,
            mode,
            cancel,
            stage: FinalizeStage::Submitted,
            progress: None,
        }
    }

    /// Also report every pending read in wait mode to `progress`.
    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    pub const fn stage(&self) -> FinalizeStage {
        self.stage
    }

    pub const fn handle(&self) -> &OutboundMessageHandle {
        &self.handle
    }

    fn advance(&mut self, stage: FinalizeStage) {
        if stage > self.stage {
            debug!(from = %self.stage, to = %stage, handle = %self.handle, "Finalize stage");
            self.stage = stage;
        }
    }

    fn observe(&mut self, status: MessageStatus) {
        self.advance(match status {
            MessageStatus::Unconfirmed => FinalizeStage::Unconfirmed,
            MessageStatus::Confirmed | MessageStatus::Executed => FinalizeStage::Confirmed,
        });
    }

    /// Wait (or check) for confirmation, fetch the proof and refuse already executed messages.
    ///
    /// Everything up to, but excluding, the execution transaction.
    pub async fn prepare(&mut self) -> eyre::Result<ExecutionProof> {
        let (status, proof) = match self.mode {
            FinalizeMode::NoWait => self.check_once().await?,
            FinalizeMode::Wait(config) => self.wait(config).await?,
        };
        self.observe(status);
        self.advance(FinalizeStage::ProofFetched);

        if self.service.has_executed(&proof).await? {
            return Err(FinalizeError::AlreadyExecuted.into());
        }

        Ok(proof)
    }

    async fn check_once(&mut self) -> eyre::Result<(MessageStatus, ExecutionProof)> {
        let status = self.service.status(&self.handle).await?;
        self.observe(status);

        if status < MessageStatus::Confirmed {
            return Err(FinalizeError::NotYetConfirmed {
                observed: status,
                required: MessageStatus::Confirmed,
            }
            .into());
        }

        let Some(proof) = self.service.fetch_proof(&self.handle).await? else {
            return Err(FinalizeError::ProofNotAvailable { observed: status }.into());
        };

        Ok((status, proof))
    }

    async fn wait(&mut self, config: PollConfig) -> eyre::Result<(MessageStatus, ExecutionProof)> {
        info!(
            handle = %self.handle,
            retry_delay = ?config.retry_delay,
            max_wait = ?config.max_wait,
            "Waiting for the message to be confirmed"
        );

        let progress = &mut self.progress;
        wait_for_proof(
            &self.service,
            &self.sleeper,
            &self.handle,
            &config,
            &self.cancel,
            |read| {
                info!(
                    status = %read.status,
                    reads = read.reads,
                    waited = ?read.waited,
                    "Still waiting..."
                );
                if let Some(progress) = progress.as_mut() {
                    progress(read);
                }
            },
        )
        .await
    }
}

impl<S, Z> Action for FinalizeAction<S, Z>
where
    S: OutboundMessageService,
    Z: Sleeper,
{
    async fn is_ready(&self) -> eyre::Result<bool> {
        let status = self.service.status(&self.handle).await?;
        Ok(status == MessageStatus::Confirmed)
    }

    async fn is_completed(&self) -> eyre::Result<bool> {
        let status = self.service.status(&self.handle).await?;
        Ok(status == MessageStatus::Executed)
    }

    async fn execute(&mut self) -> eyre::Result<crate::Result> {
        let proof = self.prepare().await?;

        let executed = self.service.execute(&proof).await?;
        self.advance(FinalizeStage::Executed);

        info!(
            tx_hash = %executed.tx_hash,
            block_number = executed.block_number,
            gas_used = executed.gas_used,
            handle = %self.handle,
            "Transaction executed on L1"
        );

        Ok(crate::Result {
            tx_hash: executed.tx_hash,
            block_number: executed.block_number,
            gas_used: Some(U256::from(executed.gas_used)),
        })
    }

    fn description(&self) -> String {
        format!("Finalizing L2-to-L1 message {} on L1", self.handle)
    }
}
