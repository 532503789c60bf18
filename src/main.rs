//! Pickup Desk - headless pickup confirmation terminal.
//!
//! Runs the scanner on a host without a camera: codes are typed or pasted on
//! stdin, one per line, and confirmed against the marketplace backend.
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Fetch the provider's orders and start the expiry ticker
//! 3. Open the scanner, which falls back to manual entry
//! 4. Confirm each line read from stdin, refreshing orders after every success

use std::sync::Arc;

use pickup_scanner::camera::HeadlessCamera;
use pickup_scanner::services::ApiClient;
use pickup_scanner::{
    Config, ConfirmError, CredentialSource, InputMode, Order, OrderBoard, OrderStatus,
    ScanListener, ScanOutcome, Scanner, StaticCredentials,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Reports scanner events through the log.
struct LogListener;

impl ScanListener for LogListener {
    fn on_confirmed(&self, order: &Order) {
        tracing::info!(order = %order.id, "Pickup confirmed, hand over the order");
    }

    fn on_rejected(&self, error: &ConfirmError) {
        tracing::warn!(reason = %error.reason, "{}", error.user_message());
    }

    fn on_mode_changed(&self, mode: &InputMode) {
        tracing::info!(?mode, "Scanner input changed");
    }
}

fn log_board(orders: &[Order]) {
    let count = |status: OrderStatus| orders.iter().filter(|o| o.status == status).count();
    tracing::info!(
        pending = count(OrderStatus::Pending),
        confirmed = count(OrderStatus::Confirmed),
        expired = count(OrderStatus::Expired),
        "Orders"
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    let credentials: Arc<dyn CredentialSource> = Arc::new(StaticCredentials::from_config(&config));
    let api = ApiClient::from_config(&config)?;

    let board = Arc::new(OrderBoard::new());
    board.refresh(&api, credentials.as_ref()).await?;
    log_board(&board.snapshot());

    let shutdown = CancellationToken::new();
    let ticker = board
        .clone()
        .spawn_ticker(config.expiry_tick(), shutdown.clone());

    let scanner = Scanner::new(HeadlessCamera, api.clone(), credentials.clone())
        .with_listener(Arc::new(LogListener));
    let mode = scanner.open().await?;
    tracing::info!(?mode, "Scanner ready, enter pickup codes");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match scanner.submit_manual(&line).await {
            ScanOutcome::Confirmed(order) => {
                board.apply_confirmed(&order);
                if let Err(e) = board.refresh(&api, credentials.as_ref()).await {
                    tracing::error!(error = %e, "Failed to refresh orders");
                }
                log_board(&board.snapshot());

                // Ready for the next customer
                scanner.open().await?;
            }
            ScanOutcome::Rejected(_) | ScanOutcome::Ignored => {}
        }
    }

    scanner.close().await;
    shutdown.cancel();
    ticker.await?;

    Ok(())
}
