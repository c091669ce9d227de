//! Prometheus metrics for the bridge commands.

use deposit::TicketOutcome;
use metrics::{counter, describe_counter};

/// Handle for recording bridge metrics.
///
/// Metric descriptions are registered with the global registry on creation.
#[derive(Debug, Clone)]
pub struct Metrics {
    _private: (),
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    fn register_descriptions() {
        describe_counter!(
            "bridge_deposits_total",
            "Total number of L1→L2 deposits sent"
        );
        describe_counter!(
            "bridge_ticket_outcomes_total",
            "Retryable ticket outcomes of sent deposits by outcome"
        );
        describe_counter!(
            "bridge_withdrawals_initiated_total",
            "Total number of L2→L1 withdrawals started"
        );
        describe_counter!(
            "bridge_finalize_polls_total",
            "Status reads that found the message not yet executable"
        );
        describe_counter!(
            "bridge_withdrawals_finalized_total",
            "Total number of L2→L1 messages executed on L1"
        );
    }

    pub fn record_deposit(&self) {
        counter!("bridge_deposits_total").increment(1);
    }

    pub fn record_ticket_outcome(&self, outcome: TicketOutcome) {
        let outcome = match outcome {
            TicketOutcome::Redeemed => "redeemed",
            TicketOutcome::FundsDepositedNotRedeemed => "funds_deposited",
        };
        counter!("bridge_ticket_outcomes_total", "outcome" => outcome).increment(1);
    }

    pub fn record_withdrawal_initiated(&self) {
        counter!("bridge_withdrawals_initiated_total").increment(1);
    }

    pub fn record_finalize_poll(&self) {
        counter!("bridge_finalize_polls_total").increment(1);
    }

    pub fn record_withdrawal_finalized(&self) {
        counter!("bridge_withdrawals_finalized_total").increment(1);
    }
}

/// Install the Prometheus metrics exporter and start the HTTP server.
///
/// Returns an error if the server fails to bind to the specified port.
pub fn install_prometheus_exporter(port: u16) -> eyre::Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::net::SocketAddr;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| eyre::eyre!("Failed to install Prometheus exporter: {}", e))?;

    Ok(())
}
