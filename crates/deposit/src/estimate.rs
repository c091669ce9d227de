//! Retryable ticket cost estimation.
//!
//! An L1→L2 message only executes on L2 if the L1 transaction carries enough
//! value to pay for the ticket submission and its L2 execution. Raw estimates
//! come from L2 collaborators and are padded by the configured margins.

use alloy_primitives::{Address, Bytes, U256};
use alloy_provider::Provider;
use alloy_sol_types::SolValue;
use binding::arbitrum::{
    IArbRetryableTx, INodeInterface, ARB_RETRYABLE_TX_ADDRESS, NODE_INTERFACE_ADDRESS,
};
use config::RetryableMargins;
use std::future::Future;
use thiserror::Error;
use tracing::{debug, warn};

/// Number of estimation rounds before giving up on a rising gas price.
pub const MAX_ESTIMATION_ROUNDS: usize = 3;

/// Deposit assumed during gas estimation to pay for execution (0.05 ether).
pub const ESTIMATION_DEPOSIT_WEI: u64 = 50_000_000_000_000_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EstimateError {
    /// `submissionFee + gasLimit * gasPriceBid` does not fit in 256 bits.
    #[error("Retryable value overflows (fee {submission_fee}, gas {gas_limit}, bid {gas_price_bid})")]
    Overflow {
        submission_fee: U256,
        gas_limit: U256,
        gas_price_bid: U256,
    },

    /// Stored value no longer matches its components.
    #[error("Retryable value {actual} does not match fee + gas * bid = {expected}")]
    ValueMismatch { expected: U256, actual: U256 },

    /// L2 gas price kept rising above the bid between estimation and submission.
    #[error("L2 gas price {current} still above bid {bid} after {rounds} estimation rounds")]
    StaleGasPrice {
        bid: U256,
        current: U256,
        rounds: usize,
    },
}

/// Increase `raw` by `pct` percent, rounding the increase down.
///
/// `raw + floor(raw * pct / 100)`, saturating at `U256::MAX`.
pub fn apply_margin(raw: U256, pct: u64) -> U256 {
    let increase = raw.saturating_mul(U256::from(pct)) / U256::from(100);
    raw.saturating_add(increase)
}

/// Economic parameters an L1→L2 message must carry.
///
/// `value` is derived from the other three and checked on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryableParameters {
    submission_fee: U256,
    gas_limit: U256,
    gas_price_bid: U256,
    value: U256,
}

impl RetryableParameters {
    pub fn new(
        submission_fee: U256,
        gas_limit: U256,
        gas_price_bid: U256,
    ) -> Result<Self, EstimateError> {
        let value = Self::total(submission_fee, gas_limit, gas_price_bid)?;
        Ok(Self {
            submission_fee,
            gas_limit,
            gas_price_bid,
            value,
        })
    }

    fn total(
        submission_fee: U256,
        gas_limit: U256,
        gas_price_bid: U256,
    ) -> Result<U256, EstimateError> {
        gas_limit
            .checked_mul(gas_price_bid)
            .and_then(|execution| execution.checked_add(submission_fee))
            .ok_or(EstimateError::Overflow {
                submission_fee,
                gas_limit,
                gas_price_bid,
            })
    }

    /// Maximum submission cost paid for the ticket.
    pub const fn submission_fee(&self) -> U256 {
        self.submission_fee
    }

    /// Maximum L2 gas for auto-redeem.
    pub const fn gas_limit(&self) -> U256 {
        self.gas_limit
    }

    /// L2 gas price bid.
    pub const fn gas_price_bid(&self) -> U256 {
        self.gas_price_bid
    }

    /// Native value the L1 transaction must carry.
    pub const fn value(&self) -> U256 {
        self.value
    }

    /// Re-check the value invariant before submission.
    pub fn validate(&self) -> Result<(), EstimateError> {
        let expected = Self::total(self.submission_fee, self.gas_limit, self.gas_price_bid)?;
        if expected != self.value {
            return Err(EstimateError::ValueMismatch {
                expected,
                actual: self.value,
            });
        }
        Ok(())
    }

    /// Gateway `_data` argument: `abi.encode(uint256 maxSubmissionCost, bytes extraData)`.
    pub fn gateway_data(&self, extra_data: &Bytes) -> Bytes {
        (self.submission_fee, extra_data.clone())
            .abi_encode_params()
            .into()
    }
}

/// The L2 call a retryable ticket will perform.
#[derive(Debug, Clone)]
pub struct TicketRequest {
    /// L1 contract creating the ticket (the L1 gateway)
    pub sender: Address,
    /// L2 contract the ticket calls (the L2 gateway)
    pub destination: Address,
    /// Value forwarded to the L2 call, zero for token transfers
    pub l2_call_value: U256,
    /// Receives excess fees and call value refunds on L2
    pub refund_address: Address,
    /// Calldata the destination receives
    pub calldata: Bytes,
}

/// Raw L2 price and gas readings used by the estimator.
pub trait RetryableCostOracle: Send + Sync {
    /// Current L2 gas price.
    fn gas_price(&self) -> impl Future<Output = eyre::Result<U256>> + Send;

    /// Raw submission fee for a ticket carrying `calldata_len` bytes.
    fn submission_price(&self, calldata_len: usize)
        -> impl Future<Output = eyre::Result<U256>> + Send;

    /// Raw L2 gas needed to execute the ticket.
    fn execution_gas(
        &self,
        request: &TicketRequest,
        max_submission_cost: U256,
        gas_price_bid: U256,
    ) -> impl Future<Output = eyre::Result<U256>> + Send;
}

/// Cost oracle backed by the ArbRetryableTx precompile and NodeInterface.
pub struct ArbRetryableOracle<P> {
    l2_provider: P,
}

impl<P> ArbRetryableOracle<P>
where
    P: Provider + Clone,
{
    pub const fn new(l2_provider: P) -> Self {
        Self { l2_provider }
    }
}

impl<P> RetryableCostOracle for ArbRetryableOracle<P>
where
    P: Provider + Clone,
{
    async fn gas_price(&self) -> eyre::Result<U256> {
        let price = self.l2_provider.get_gas_price().await?;
        Ok(U256::from(price))
    }

    async fn submission_price(&self, calldata_len: usize) -> eyre::Result<U256> {
        let retryable = IArbRetryableTx::new(ARB_RETRYABLE_TX_ADDRESS, &self.l2_provider);
        let price = retryable
            .getSubmissionPrice(U256::from(calldata_len))
            .call()
            .await?;
        Ok(price._0)
    }

    async fn execution_gas(
        &self,
        request: &TicketRequest,
        max_submission_cost: U256,
        gas_price_bid: U256,
    ) -> eyre::Result<U256> {
        let node = INodeInterface::new(NODE_INTERFACE_ADDRESS, &self.l2_provider);
        let estimate = node
            .estimateRetryableTicket(
                request.sender,
                U256::from(ESTIMATION_DEPOSIT_WEI),
                request.destination,
                request.l2_call_value,
                max_submission_cost,
                request.refund_address,
                request.refund_address,
                U256::ZERO,
                gas_price_bid,
                request.calldata.clone(),
            )
            .call()
            .await?;
        Ok(estimate._0)
    }
}

/// Computes [`RetryableParameters`] from raw oracle readings and margins.
pub struct RetryableEstimator<O> {
    oracle: O,
    margins: RetryableMargins,
}

impl<O> RetryableEstimator<O>
where
    O: RetryableCostOracle,
{
    pub const fn new(oracle: O, margins: RetryableMargins) -> Self {
        Self { oracle, margins }
    }

    pub const fn margins(&self) -> RetryableMargins {
        self.margins
    }

    /// Single estimation pass. Oracle failures propagate unchanged.
    pub async fn estimate(&self, request: &TicketRequest) -> eyre::Result<RetryableParameters> {
        let raw_fee = self.oracle.submission_price(request.calldata.len()).await?;
        let submission_fee = apply_margin(raw_fee, self.margins.submission_fee_pct);

        let gas_price_bid = self.oracle.gas_price().await?;

        let raw_gas = self
            .oracle
            .execution_gas(request, submission_fee, gas_price_bid)
            .await?;
        let gas_limit = apply_margin(raw_gas, self.margins.gas_limit_pct);

        let params = RetryableParameters::new(submission_fee, gas_limit, gas_price_bid)?;

        debug!(
            raw_submission_fee = %raw_fee,
            submission_fee = %params.submission_fee(),
            raw_gas = %raw_gas,
            gas_limit = %params.gas_limit(),
            gas_price_bid = %params.gas_price_bid(),
            value = %params.value(),
            "Estimated retryable parameters"
        );

        Ok(params)
    }

    /// Estimate, then re-read the gas price and re-estimate while it exceeds the bid.
    ///
    /// Returned parameters were valid against the latest gas price reading.
    pub async fn estimate_fresh(
        &self,
        request: &TicketRequest,
    ) -> eyre::Result<RetryableParameters> {
        let mut last = None;

        for round in 1..=MAX_ESTIMATION_ROUNDS {
            let params = self.estimate(request).await?;
            let current = self.oracle.gas_price().await?;

            if current <= params.gas_price_bid() {
                params.validate()?;
                return Ok(params);
            }

            warn!(
                round,
                bid = %params.gas_price_bid(),
                current = %current,
                "L2 gas price moved above bid, re-estimating"
            );
            last = Some((params.gas_price_bid(), current));
        }

        let (bid, current) = last.unwrap_or_default();
        Err(EstimateError::StaleGasPrice {
            bid,
            current,
            rounds: MAX_ESTIMATION_ROUNDS,
        }
        .into())
    }
}
