//! Scripted outbox service and sleeper for driving the finalize path in tests.

use crate::{
    state::OutboundMessageService,
    types::{ExecutedMessage, ExecutionProof, MessageStatus, OutboundMessageHandle},
    wait::Sleeper,
};
use alloy_primitives::{Address, Bytes, TxHash, U256};
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

/// Status service replaying scripted reads and counting every call.
#[derive(Debug, Default)]
pub struct ScriptedService {
    pub statuses: Mutex<VecDeque<MessageStatus>>,
    /// Scripted proof availability, `true` when exhausted
    pub proofs: Mutex<VecDeque<bool>>,
    pub executed: bool,
    pub status_reads: AtomicUsize,
    pub proof_fetches: AtomicUsize,
    pub executed_checks: AtomicUsize,
    pub executions: AtomicUsize,
}

impl ScriptedService {
    pub fn new(statuses: &[MessageStatus]) -> Self {
        Self {
            statuses: Mutex::new(statuses.iter().copied().collect()),
            ..Default::default()
        }
    }

    /// Report every proven message as already executed.
    pub fn already_executed(mut self) -> Self {
        self.executed = true;
        self
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Proof returned by [`ScriptedService`], for the message of [`handle`].
pub fn proof() -> ExecutionProof {
    ExecutionProof {
        batch_number: U256::from(7),
        proof: vec![],
        path: U256::from(3),
        l2_sender: Address::repeat_byte(0x01),
        l1_destination: Address::repeat_byte(0x02),
        l2_block: U256::from(100),
        l1_block: U256::from(50),
        l2_timestamp: U256::from(1_600_000_000u64),
        amount: U256::ZERO,
        calldata: Bytes::new(),
    }
}

pub fn handle() -> OutboundMessageHandle {
    OutboundMessageHandle {
        batch_number: U256::from(7),
        index_in_batch: U256::from(3),
        l2_tx_hash: TxHash::repeat_byte(0xab),
    }
}

/// Hash of every transaction [`ScriptedService`] executes.
pub const EXECUTION_TX_HASH: TxHash = TxHash::repeat_byte(0xee);

impl OutboundMessageService for ScriptedService {
    async fn status(&self, _handle: &OutboundMessageHandle) -> eyre::Result<MessageStatus> {
        self.status_reads.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| eyre::eyre!("status script exhausted"))
    }

    async fn fetch_proof(
        &self,
        _handle: &OutboundMessageHandle,
    ) -> eyre::Result<Option<ExecutionProof>> {
        self.proof_fetches.fetch_add(1, Ordering::SeqCst);
        let available = self.proofs.lock().unwrap().pop_front().unwrap_or(true);
        Ok(available.then(proof))
    }

    async fn has_executed(&self, _proof: &ExecutionProof) -> eyre::Result<bool> {
        self.executed_checks.fetch_add(1, Ordering::SeqCst);
        Ok(self.executed)
    }

    async fn execute(&self, _proof: &ExecutionProof) -> eyre::Result<ExecutedMessage> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        Ok(ExecutedMessage {
            tx_hash: EXECUTION_TX_HASH,
            block_number: Some(1),
            gas_used: 21_000,
        })
    }
}

/// Records requested sleeps and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    pub sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn count(&self) -> usize {
        self.sleeps.lock().unwrap().len()
    }
}

impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}
