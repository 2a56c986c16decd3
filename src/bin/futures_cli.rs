//! Futures CLI - account-level position controls for Binance USD-M futures
//!
//! # Usage
//! ```sh
//! cargo run --bin futures-cli -- leverage --symbol BTCUSDT --leverage 10
//! cargo run --bin futures-cli -- margin-type --symbol BTCUSDT --margin-type isolated
//! cargo run --bin futures-cli -- position-margin --symbol BTCUSDT --amount 12.5 --type 1
//! cargo run --bin futures-cli -- positions --open-only
//! ```
//!
//! # Environment Variables
//! - `BINANCE_FUTURES_API_KEY` / `BINANCE_FUTURES_SECRET_KEY` - credentials
//! - `BINANCE_FUTURES_BASE_URL` - REST endpoint (default: https://fapi.binance.com)
//! - `BINANCE_FUTURES_RECV_WINDOW_MS` - default recvWindow for signed calls
//! - `BINANCE_FUTURES_TIMEOUT_SECS` - HTTP timeout (default: 30)
//! - `BINANCE_FUTURES_MAX_RETRIES` - transient retries (default: 0)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use rustrade_futures::application::{
    ChangeLeverageRequest, ChangeMarginTypeRequest, FuturesClient, UpdatePositionMarginRequest,
};
use rustrade_futures::config::Config;
use rustrade_futures::domain::futures::{MarginType, RequestOption};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "futures-cli", version, about = "Binance USD-M futures position controls")]
struct Cli {
    /// recvWindow in milliseconds for this call
    #[arg(long, global = true)]
    recv_window: Option<u64>,

    /// Abort the call after this many seconds
    #[arg(long, global = true)]
    deadline_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Change initial leverage of a symbol
    Leverage {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        leverage: u32,
    },
    /// Switch a symbol between ISOLATED and CROSSED margin
    MarginType {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        margin_type: MarginType,
    },
    /// Add (type 1) or reduce (type 2) isolated position margin
    PositionMargin {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        amount: String,
        #[arg(long = "type")]
        action_type: i32,
    },
    /// List position risk records
    Positions {
        /// Skip symbols with a zero position amount
        #[arg(long)]
        open_only: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    if !config.binance.has_credentials() {
        warn!("BINANCE_FUTURES_API_KEY / BINANCE_FUTURES_SECRET_KEY not set; signed calls will fail");
    }
    info!("Using Binance futures endpoint {}", config.binance.base_url);

    let client = FuturesClient::from_config(&config.binance);

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling request...");
            ctrl_c_token.cancel();
        }
    });

    let mut options = vec![RequestOption::Cancel(cancel)];
    if let Some(recv_window) = cli.recv_window {
        options.push(RequestOption::RecvWindow(recv_window));
    }
    if let Some(secs) = cli.deadline_secs {
        options.push(RequestOption::Timeout(Duration::from_secs(secs)));
    }

    match cli.command {
        Command::Leverage { symbol, leverage } => {
            let request = ChangeLeverageRequest::builder()
                .symbol(symbol)
                .leverage(leverage)
                .build()?;
            let res = client
                .send_with(&request, &options)
                .await
                .context("Failed to change leverage")?;
            println!("{}", serde_json::to_string_pretty(&res)?);
        }
        Command::MarginType {
            symbol,
            margin_type,
        } => {
            let request = ChangeMarginTypeRequest::builder()
                .symbol(symbol.clone())
                .margin_type(margin_type)
                .build()?;
            client
                .send_with(&request, &options)
                .await
                .context("Failed to change margin type")?;
            info!("Margin type of {} set to {}", symbol, margin_type);
        }
        Command::PositionMargin {
            symbol,
            amount,
            action_type,
        } => {
            let request = UpdatePositionMarginRequest::builder()
                .symbol(symbol.clone())
                .amount_str(&amount)
                .action_code(action_type)
                .build()?;
            client
                .send_with(&request, &options)
                .await
                .context("Failed to update position margin")?;
            info!(
                "Position margin of {} updated: {} {}",
                symbol,
                request.action().code(),
                request.amount()
            );
        }
        Command::Positions { open_only } => {
            let positions = client
                .send_with(
                    &rustrade_futures::application::PositionInformationRequest,
                    &options,
                )
                .await
                .context("Failed to fetch position information")?;

            let positions: Vec<_> = positions
                .into_iter()
                .filter(|p| {
                    !open_only
                        || p.position_amt_decimal()
                            .map(|amt| amt != Decimal::ZERO)
                            .unwrap_or(true)
                })
                .collect();

            info!("Fetched {} position records", positions.len());
            println!("{}", serde_json::to_string_pretty(&positions)?);
        }
    }

    Ok(())
}
