//! Send tokens from L1 to L2.
//!
//! Escrows tokens in the L1 gateway, which creates a retryable ticket to the L2
//! gateway. The ticket status is read once after the L1 transaction is mined.

use crate::{ensure_success, Action};
use alloy_primitives::{utils::format_ether, Address, Bytes, TxHash, U256};
use alloy_provider::Provider;
use alloy_rpc_types_eth::Log;
use binding::{gateway::IL1GraphTokenGateway, token::IERC20};
use config::RetryableMargins;
use deposit::{
    InboundMessage, InboundTracker, RetryableCostOracle, RetryableEstimator, RetryableParameters,
    TicketOutcome, TicketRequest, TicketStatusReader,
};
use std::future::Future;
use tracing::{debug, info};

/// Input data for an L1→L2 transfer.
#[derive(Debug, Clone)]
pub struct SendToL2 {
    /// Token being bridged, on L1
    pub l1_token: Address,
    /// L1 gateway escrowing the token
    pub l1_gateway: Address,
    /// Inbox receiving the L1→L2 message
    pub inbox: Address,
    /// Sender, also the L2 refund address
    pub from: Address,
    /// Recipient on L2
    pub recipient: Address,
    /// Amount in token base units
    pub amount: U256,
    /// Destination L2 chain id
    pub l2_chain_id: u64,
}

/// Mined outbound transfer on L1.
#[derive(Debug, Clone)]
pub struct SubmittedDeposit {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub logs: Vec<Log>,
}

/// L1 token and gateway calls a deposit makes.
pub trait DepositGateway: Send + Sync {
    /// L2 gateway paired with the L1 gateway.
    fn l2_counterpart(
        &self,
        deposit: &SendToL2,
    ) -> impl Future<Output = eyre::Result<Address>> + Send;

    /// Calldata the L2 gateway will receive for this deposit.
    fn outbound_calldata(
        &self,
        deposit: &SendToL2,
    ) -> impl Future<Output = eyre::Result<Bytes>> + Send;

    /// L1 token balance of the sender.
    fn balance(&self, deposit: &SendToL2) -> impl Future<Output = eyre::Result<U256>> + Send;

    /// Amount the L1 gateway may pull from the sender.
    fn allowance(&self, deposit: &SendToL2) -> impl Future<Output = eyre::Result<U256>> + Send;

    /// Approve the L1 gateway for the deposit amount and wait for the receipt.
    fn approve(&self, deposit: &SendToL2) -> impl Future<Output = eyre::Result<()>> + Send;

    /// Send the outbound transfer carrying `params.value()` and wait for the receipt.
    fn outbound_transfer(
        &self,
        deposit: &SendToL2,
        params: &RetryableParameters,
    ) -> impl Future<Output = eyre::Result<SubmittedDeposit>> + Send;
}

/// Deposit gateway backed by an L1 provider.
pub struct L1TokenGateway<P> {
    provider: P,
}

impl<P> L1TokenGateway<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P> DepositGateway for L1TokenGateway<P>
where
    P: Provider + Clone,
{
    async fn l2_counterpart(&self, deposit: &SendToL2) -> eyre::Result<Address> {
        let gateway = IL1GraphTokenGateway::new(deposit.l1_gateway, &self.provider);
        Ok(gateway.l2Counterpart().call().await?)
    }

    async fn outbound_calldata(&self, deposit: &SendToL2) -> eyre::Result<Bytes> {
        let gateway = IL1GraphTokenGateway::new(deposit.l1_gateway, &self.provider);
        let calldata = gateway
            .getOutboundCalldata(
                deposit.l1_token,
                deposit.from,
                deposit.recipient,
                deposit.amount,
                Bytes::new(),
            )
            .call()
            .await?;
        Ok(calldata)
    }

    async fn balance(&self, deposit: &SendToL2) -> eyre::Result<U256> {
        let token = IERC20::new(deposit.l1_token, &self.provider);
        Ok(token.balanceOf(deposit.from).call().await?)
    }

    async fn allowance(&self, deposit: &SendToL2) -> eyre::Result<U256> {
        let token = IERC20::new(deposit.l1_token, &self.provider);
        Ok(token
            .allowance(deposit.from, deposit.l1_gateway)
            .call()
            .await?)
    }

    async fn approve(&self, deposit: &SendToL2) -> eyre::Result<()> {
        let token = IERC20::new(deposit.l1_token, &self.provider);
        let receipt = token
            .approve(deposit.l1_gateway, deposit.amount)
            .send()
            .await?
            .get_receipt()
            .await?;
        ensure_success(&receipt, "Approve")
    }

    async fn outbound_transfer(
        &self,
        deposit: &SendToL2,
        params: &RetryableParameters,
    ) -> eyre::Result<SubmittedDeposit> {
        let gateway = IL1GraphTokenGateway::new(deposit.l1_gateway, &self.provider);
        let receipt = gateway
            .outboundTransfer(
                deposit.l1_token,
                deposit.recipient,
                deposit.amount,
                params.gas_limit(),
                params.gas_price_bid(),
                params.gateway_data(&Bytes::new()),
            )
            .value(params.value())
            .send()
            .await?
            .get_receipt()
            .await?;
        ensure_success(&receipt, "Deposit")?;

        Ok(SubmittedDeposit {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            logs: receipt.logs().to_vec(),
        })
    }
}

/// Everything a deposit needs before it can be submitted.
#[derive(Debug, Clone)]
pub struct PreparedDeposit {
    pub l2_gateway: Address,
    pub request: TicketRequest,
    pub params: RetryableParameters,
}

/// Action to send tokens from L1 to L2.
pub struct SendToL2Action<G, O, R> {
    gateway: G,
    estimator: RetryableEstimator<O>,
    tracker: InboundTracker<R>,
    action: SendToL2,
    outcome: Option<TicketOutcome>,
}

impl<G, O, R> SendToL2Action<G, O, R>
where
    G: DepositGateway,
    O: RetryableCostOracle,
    R: TicketStatusReader,
{
    pub const fn new(
        gateway: G,
        oracle: O,
        reader: R,
        margins: RetryableMargins,
        action: SendToL2,
    ) -> Self {
        Self {
            gateway,
            estimator: RetryableEstimator::new(oracle, margins),
            tracker: InboundTracker::new(reader),
            action,
            outcome: None,
        }
    }

    /// Ticket outcome of the executed deposit.
    pub const fn outcome(&self) -> Option<TicketOutcome> {
        self.outcome
    }

    fn validate(&self) -> eyre::Result<()> {
        if self.action.amount.is_zero() {
            eyre::bail!("Amount is zero");
        }
        if self.action.recipient == Address::ZERO {
            eyre::bail!("Recipient address is zero");
        }
        Ok(())
    }

    /// Read the gateway calldata and counterpart, then estimate the ticket parameters.
    pub async fn prepare(&self) -> eyre::Result<PreparedDeposit> {
        self.validate()?;

        let l2_gateway = self.gateway.l2_counterpart(&self.action).await?;
        let calldata = self.gateway.outbound_calldata(&self.action).await?;

        debug!(
            l2_gateway = %l2_gateway,
            calldata_len = calldata.len(),
            "Built retryable calldata"
        );

        let request = TicketRequest {
            sender: self.action.l1_gateway,
            destination: l2_gateway,
            l2_call_value: U256::ZERO,
            refund_address: self.action.from,
            calldata,
        };

        let params = self.estimator.estimate_fresh(&request).await?;

        info!(
            submission_fee = %params.submission_fee(),
            gas_limit = %params.gas_limit(),
            gas_price_bid = %params.gas_price_bid(),
            value = %params.value(),
            "Retryable ticket parameters"
        );

        Ok(PreparedDeposit {
            l2_gateway,
            request,
            params,
        })
    }

    /// Approve the L1 gateway if the current allowance does not cover the amount.
    async fn ensure_allowance(&self) -> eyre::Result<()> {
        let allowance = self.gateway.allowance(&self.action).await?;

        if allowance >= self.action.amount {
            debug!(allowance = %allowance, "Gateway allowance sufficient");
            return Ok(());
        }

        info!(
            spender = %self.action.l1_gateway,
            amount = %self.action.amount,
            "Approving L1 gateway"
        );
        self.gateway.approve(&self.action).await
    }
}

impl<G, O, R> Action for SendToL2Action<G, O, R>
where
    G: DepositGateway,
    O: RetryableCostOracle,
    R: TicketStatusReader,
{
    async fn is_ready(&self) -> eyre::Result<bool> {
        if self.validate().is_err() {
            return Ok(false);
        }

        let balance = self.gateway.balance(&self.action).await?;
        Ok(balance >= self.action.amount)
    }

    async fn is_completed(&self) -> eyre::Result<bool> {
        Ok(self.outcome.is_some())
    }

    async fn execute(&mut self) -> eyre::Result<crate::Result> {
        if self.is_completed().await? {
            eyre::bail!("Deposit already sent")
        }
        self.validate()?;

        // The approval waits for an L1 block, so estimate only once it is mined
        self.ensure_allowance().await?;
        let prepared = self.prepare().await?;
        prepared.params.validate()?;

        let submitted = self
            .gateway
            .outbound_transfer(&self.action, &prepared.params)
            .await?;

        info!(
            tx_hash = %submitted.tx_hash,
            block_number = submitted.block_number,
            gas_used = submitted.gas_used,
            "Deposit sent on L1"
        );

        let message = InboundMessage::from_logs(
            &submitted.logs,
            self.action.inbox,
            self.action.l2_chain_id,
            submitted.tx_hash,
        )?;
        self.outcome = Some(self.tracker.track(&message).await?);

        Ok(crate::Result {
            tx_hash: submitted.tx_hash,
            block_number: submitted.block_number,
            gas_used: Some(U256::from(submitted.gas_used)),
        })
    }

    fn description(&self) -> String {
        format!(
            "Sending {} tokens ({}) from L1 to {} on L2",
            format_ether(self.action.amount),
            self.action.l1_token,
            self.action.recipient
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use alloy_sol_types::SolEvent;
    use binding::arbitrum::IInbox;
    use deposit::{TicketError, TicketStatus};
    use std::sync::{Arc, Mutex};

    const INBOX: Address = address!("4dbd4fc535ac27206064b68ffcf827b0a60bab3f");
    const L2_GATEWAY: Address = address!("65e1a5e8946e7e87d9774f5288f41c30a99fd302");
    const DEPOSIT_TX: TxHash = TxHash::repeat_byte(0xd1);

    fn inbox_log(message_num: u64) -> Log {
        let event = IInbox::InboxMessageDelivered {
            messageNum: U256::from(message_num),
            data: Bytes::from(vec![0xbe, 0xef]),
        };
        Log {
            inner: alloy_primitives::Log {
                address: INBOX,
                data: event.encode_log_data(),
            },
            ..Default::default()
        }
    }

    /// L1 gateway recording approvals and submitted parameters.
    struct FakeGateway {
        balance: U256,
        allowance: U256,
        logs: Vec<Log>,
        calls: Mutex<Vec<&'static str>>,
        submitted: Mutex<Option<RetryableParameters>>,
        /// L2 gas price the approval moves to while it is being mined
        price_after_approve: Option<(Arc<Mutex<U256>>, U256)>,
    }

    impl FakeGateway {
        fn new(allowance: u64) -> Self {
            Self {
                balance: U256::from(u64::MAX),
                allowance: U256::from(allowance),
                logs: vec![inbox_log(42)],
                calls: Mutex::new(vec![]),
                submitted: Mutex::new(None),
                price_after_approve: None,
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn submitted(&self) -> Option<RetryableParameters> {
            *self.submitted.lock().unwrap()
        }
    }

    impl DepositGateway for FakeGateway {
        async fn l2_counterpart(&self, _deposit: &SendToL2) -> eyre::Result<Address> {
            self.calls.lock().unwrap().push("l2_counterpart");
            Ok(L2_GATEWAY)
        }

        async fn outbound_calldata(&self, _deposit: &SendToL2) -> eyre::Result<Bytes> {
            self.calls.lock().unwrap().push("outbound_calldata");
            Ok(Bytes::from(vec![0u8; 100]))
        }

        async fn balance(&self, _deposit: &SendToL2) -> eyre::Result<U256> {
            Ok(self.balance)
        }

        async fn allowance(&self, _deposit: &SendToL2) -> eyre::Result<U256> {
            self.calls.lock().unwrap().push("allowance");
            Ok(self.allowance)
        }

        async fn approve(&self, _deposit: &SendToL2) -> eyre::Result<()> {
            self.calls.lock().unwrap().push("approve");
            if let Some((price, next)) = &self.price_after_approve {
                *price.lock().unwrap() = *next;
            }
            Ok(())
        }

        async fn outbound_transfer(
            &self,
            _deposit: &SendToL2,
            params: &RetryableParameters,
        ) -> eyre::Result<SubmittedDeposit> {
            self.calls.lock().unwrap().push("outbound_transfer");
            *self.submitted.lock().unwrap() = Some(*params);
            Ok(SubmittedDeposit {
                tx_hash: DEPOSIT_TX,
                block_number: Some(18_000_000),
                gas_used: 250_000,
                logs: self.logs.clone(),
            })
        }
    }

    /// Oracle with raw fee 100, raw gas 1,000,000 and a shared gas price.
    #[derive(Clone)]
    struct FakeOracle {
        gas_price: Arc<Mutex<U256>>,
        calldata_lens: Arc<Mutex<Vec<usize>>>,
        fail: bool,
    }

    impl FakeOracle {
        fn new(gas_price: u64) -> Self {
            Self {
                gas_price: Arc::new(Mutex::new(U256::from(gas_price))),
                calldata_lens: Arc::new(Mutex::new(vec![])),
                fail: false,
            }
        }
    }

    impl RetryableCostOracle for FakeOracle {
        async fn gas_price(&self) -> eyre::Result<U256> {
            Ok(*self.gas_price.lock().unwrap())
        }

        async fn submission_price(&self, calldata_len: usize) -> eyre::Result<U256> {
            if self.fail {
                eyre::bail!("node interface unavailable");
            }
            self.calldata_lens.lock().unwrap().push(calldata_len);
            Ok(U256::from(100))
        }

        async fn execution_gas(
            &self,
            request: &TicketRequest,
            _max_submission_cost: U256,
            _gas_price_bid: U256,
        ) -> eyre::Result<U256> {
            assert_eq!(request.destination, L2_GATEWAY);
            Ok(U256::from(1_000_000))
        }
    }

    /// Ticket reader returning a fixed status and recording the message it was asked about.
    #[derive(Clone)]
    struct FakeReader {
        status: TicketStatus,
        seen: Arc<Mutex<Vec<InboundMessage>>>,
    }

    impl FakeReader {
        fn new(status: TicketStatus) -> Self {
            Self {
                status,
                seen: Arc::new(Mutex::new(vec![])),
            }
        }
    }

    impl TicketStatusReader for FakeReader {
        async fn ticket_status(&self, message: &InboundMessage) -> eyre::Result<TicketStatus> {
            self.seen.lock().unwrap().push(*message);
            Ok(self.status)
        }
    }

    fn send_to_l2(amount: u64, recipient: Address) -> SendToL2 {
        SendToL2 {
            l1_token: address!("c944e90c64b2c07662a292be6244bdf05cda44a7"),
            l1_gateway: address!("01cdc91b0a9ba741903aa3699bf4ce31d6c5cc06"),
            inbox: INBOX,
            from: address!("5cffa347b0ae99cc01e5c01714ca5658e54a23d1"),
            recipient,
            amount: U256::from(amount),
            l2_chain_id: 42161,
        }
    }

    fn deposit_action(
        gateway: FakeGateway,
        oracle: FakeOracle,
        reader: FakeReader,
    ) -> SendToL2Action<FakeGateway, FakeOracle, FakeReader> {
        SendToL2Action::new(
            gateway,
            oracle,
            reader,
            RetryableMargins::default(),
            send_to_l2(
                1_000_000_000_000_000_000,
                address!("5cffa347b0ae99cc01e5c01714ca5658e54a23d1"),
            ),
        )
    }

    #[tokio::test]
    async fn test_execute_submits_estimated_value_and_tracks_ticket() {
        let oracle = FakeOracle::new(2);
        let reader = FakeReader::new(TicketStatus::Redeemed);
        let mut action = deposit_action(FakeGateway::new(u64::MAX), oracle.clone(), reader.clone());

        let result = action.execute().await.unwrap();

        assert_eq!(result.tx_hash, DEPOSIT_TX);
        assert_eq!(result.block_number, Some(18_000_000));
        assert_eq!(result.gas_used, Some(U256::from(250_000)));

        let params = action.gateway.submitted().unwrap();
        assert_eq!(params.submission_fee(), U256::from(500));
        assert_eq!(params.gas_limit(), U256::from(1_500_000));
        assert_eq!(params.gas_price_bid(), U256::from(2));
        assert_eq!(params.value(), U256::from(3_000_500));

        // Fee is estimated from the gateway calldata length
        assert_eq!(*oracle.calldata_lens.lock().unwrap(), vec![100]);

        let seen = reader.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].message_number, U256::from(42));
        assert_eq!(seen[0].l2_chain_id, 42161);
        assert_eq!(seen[0].l1_tx_hash, DEPOSIT_TX);

        assert_eq!(action.outcome(), Some(TicketOutcome::Redeemed));
        assert!(action.is_completed().await.unwrap());
        assert!(!action.gateway.calls().contains(&"approve"));
    }

    #[tokio::test]
    async fn test_gas_price_rise_during_approval_is_bid() {
        let oracle = FakeOracle::new(2);
        let mut gateway = FakeGateway::new(0);
        gateway.price_after_approve = Some((oracle.gas_price.clone(), U256::from(5)));
        let mut action =
            deposit_action(gateway, oracle, FakeReader::new(TicketStatus::Redeemed));

        action.execute().await.unwrap();

        let params = action.gateway.submitted().unwrap();
        assert_eq!(params.gas_price_bid(), U256::from(5));
        assert_eq!(params.value(), U256::from(7_500_500));
        assert_eq!(
            action.gateway.calls(),
            vec![
                "allowance",
                "approve",
                "l2_counterpart",
                "outbound_calldata",
                "outbound_transfer"
            ]
        );
    }

    #[tokio::test]
    async fn test_unredeemed_ticket_is_soft_outcome() {
        let mut action = deposit_action(
            FakeGateway::new(u64::MAX),
            FakeOracle::new(2),
            FakeReader::new(TicketStatus::FundsDepositedOnL2),
        );

        action.execute().await.unwrap();

        assert_eq!(
            action.outcome(),
            Some(TicketOutcome::FundsDepositedNotRedeemed)
        );
    }

    #[tokio::test]
    async fn test_expired_ticket_fails_with_status() {
        let mut action = deposit_action(
            FakeGateway::new(u64::MAX),
            FakeOracle::new(2),
            FakeReader::new(TicketStatus::Expired),
        );

        let err = action.execute().await.unwrap_err();

        assert_eq!(
            err.downcast_ref::<TicketError>(),
            Some(&TicketError::UnexpectedStatus(TicketStatus::Expired))
        );
        assert_eq!(action.outcome(), None);
    }

    #[tokio::test]
    async fn test_receipt_without_inbox_message_fails() {
        let mut gateway = FakeGateway::new(u64::MAX);
        gateway.logs.clear();
        let reader = FakeReader::new(TicketStatus::Redeemed);
        let mut action = deposit_action(gateway, FakeOracle::new(2), reader.clone());

        let err = action.execute().await.unwrap_err();

        assert_eq!(
            err.downcast_ref::<TicketError>(),
            Some(&TicketError::NoInboundMessage { inbox: INBOX })
        );
        assert!(reader.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_estimation_failure_submits_nothing() {
        let mut oracle = FakeOracle::new(2);
        oracle.fail = true;
        let mut action = deposit_action(
            FakeGateway::new(u64::MAX),
            oracle,
            FakeReader::new(TicketStatus::Redeemed),
        );

        let err = action.execute().await.unwrap_err();

        assert!(err.to_string().contains("node interface unavailable"));
        assert!(action.gateway.submitted().is_none());
    }

    #[tokio::test]
    async fn test_prepare_does_not_approve_or_submit() {
        let action = deposit_action(
            FakeGateway::new(0),
            FakeOracle::new(2),
            FakeReader::new(TicketStatus::Redeemed),
        );

        let prepared = action.prepare().await.unwrap();

        assert_eq!(prepared.l2_gateway, L2_GATEWAY);
        assert_eq!(prepared.request.refund_address, action.action.from);
        assert_eq!(prepared.params.value(), U256::from(3_000_500));
        assert_eq!(
            action.gateway.calls(),
            vec!["l2_counterpart", "outbound_calldata"]
        );
    }

    #[test]
    fn test_description() {
        let action = deposit_action(
            FakeGateway::new(0),
            FakeOracle::new(2),
            FakeReader::new(TicketStatus::Redeemed),
        );
        let desc = action.description();
        assert!(desc.contains("Sending 1.000000000000000000 tokens"));
        assert!(desc.contains("from L1"));
    }

    #[tokio::test]
    async fn test_invalid_deposit_not_ready() {
        let mut action = SendToL2Action::new(
            FakeGateway::new(0),
            FakeOracle::new(2),
            FakeReader::new(TicketStatus::Redeemed),
            RetryableMargins::default(),
            send_to_l2(0, Address::ZERO),
        );

        assert!(!action.is_ready().await.unwrap());
        assert!(!action.is_completed().await.unwrap());

        let err = action.execute().await.unwrap_err();
        assert!(err.to_string().contains("Amount is zero"));
        assert!(action.gateway.calls().is_empty());
    }

    #[test]
    fn test_validate_rejects_zero_recipient() {
        let action = SendToL2Action::new(
            FakeGateway::new(0),
            FakeOracle::new(2),
            FakeReader::new(TicketStatus::Redeemed),
            RetryableMargins::default(),
            send_to_l2(1, Address::ZERO),
        );
        let err = action.validate().unwrap_err();
        assert!(err.to_string().contains("Recipient address is zero"));
    }
}
