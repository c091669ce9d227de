//! Token bridge CLI.
//!
//! - `send-to-l2`: escrow tokens on L1 and report the retryable ticket outcome
//! - `start-send-to-l1`: burn tokens on L2 and print the message handle
//! - `finish-send-to-l1`: execute a confirmed L2→L1 message on L1
//! - `wait-finish-send-to-l1`: wait out the dispute window, then execute

use alloy_primitives::{Address, TxHash};
use bridge::{config::Config, metrics::install_prometheus_exporter, parse_amount, Bridge};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bridge")]
#[command(about = "Move tokens between L1 and L2 through the token gateways")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Private key for signing transactions (hex string, with or without 0x prefix)
    #[arg(short = 'k', long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: String,

    /// Dry-run mode: estimate and read state without sending transactions
    #[arg(long)]
    dry_run: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Serve Prometheus metrics on this port
    #[arg(long)]
    metrics_port: Option<u16>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send tokens from L1 to L2
    #[command(name = "send-to-l2")]
    SendToL2 {
        /// Amount in tokens (18 decimals)
        amount: String,
        /// Recipient on L2, defaults to the sender
        recipient: Option<Address>,
    },

    /// Start sending tokens from L2 to L1
    #[command(name = "start-send-to-l1")]
    StartSendToL1 {
        /// Amount in tokens (18 decimals)
        amount: String,
        /// Recipient on L1, defaults to the sender
        recipient: Option<Address>,
    },

    /// Finish an L2→L1 transfer, failing if it is not confirmed yet
    #[command(name = "finish-send-to-l1")]
    FinishSendToL1 {
        /// Hash of the L2 transaction that started the transfer
        tx_hash: TxHash,
    },

    /// Wait until an L2→L1 transfer is confirmed, then finish it
    #[command(name = "wait-finish-send-to-l1")]
    WaitFinishSendToL1 {
        /// Hash of the L2 transaction that started the transfer
        tx_hash: TxHash,
        /// Seconds between status checks (default from config, 60)
        retry_delay_secs: Option<u64>,
        /// Give up after this many seconds of waiting
        #[arg(long)]
        max_wait_secs: Option<u64>,
    },
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let mut config = Config::from_file(&cli.config)?;

    // CLI flags override the config file
    if cli.dry_run {
        config.dry_run = true;
    }
    if cli.metrics_port.is_some() {
        config.metrics_port = cli.metrics_port;
    }

    info!("Loaded config:");
    info!("  Network: {:?}", config.network);
    info!("  L1 token: {}", config.l1_token);
    info!("  L1 gateway: {}", config.l1_gateway);
    if config.dry_run {
        info!("  Mode: DRY-RUN (no transactions will be executed)");
    }

    if let Some(port) = config.metrics_port {
        install_prometheus_exporter(port)?;
        info!(port, "Serving metrics");
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            on_signal.cancel();
        }
    });

    let from = client::signer_address(&cli.private_key)?;
    let l1_provider = client::create_wallet_provider(&config.l1_rpc_url, &cli.private_key)?;
    let l2_provider = client::create_wallet_provider(&config.l2_rpc_url, &cli.private_key)?;

    match cli.command {
        Command::SendToL2 { amount, recipient } => {
            let amount = parse_amount(&amount)?;
            let bridge = Bridge::new(l1_provider, l2_provider, config, from, cancel);
            bridge.send_to_l2(amount, recipient).await?;
        }
        Command::StartSendToL1 { amount, recipient } => {
            let amount = parse_amount(&amount)?;
            let bridge = Bridge::new(l1_provider, l2_provider, config, from, cancel);
            bridge.start_send_to_l1(amount, recipient).await?;
        }
        Command::FinishSendToL1 { tx_hash } => {
            let bridge = Bridge::new(l1_provider, l2_provider, config, from, cancel);
            bridge.finish_send_to_l1(tx_hash).await?;
        }
        Command::WaitFinishSendToL1 {
            tx_hash,
            retry_delay_secs,
            max_wait_secs,
        } => {
            let poll = config.poll_config(retry_delay_secs, max_wait_secs);
            let bridge = Bridge::new(l1_provider, l2_provider, config, from, cancel);
            bridge.wait_finish_send_to_l1(tx_hash, poll).await?;
        }
    }

    Ok(())
}
