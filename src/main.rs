//! Cricket Auction - Main binary
//!
//! Boots the auction engine and serves the HTTP API.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐   commands/bids    ┌────────────────┐
//! │  Axum server   │ ─────────────────▶ │ AuctionEngine  │
//! │  (async)       │ ◀───────────────── │ (per-auction   │
//! │                │     snapshots      │  serialization)│
//! └────────────────┘                    └────────────────┘
//! ```
//!
//! Admin operations authenticate with the `x-admin-token` header against
//! the configured credential.

mod config;

use std::sync::Arc;

use auction_core::AuctionEngine;
use clap::Parser;
use server::{ServerState, create_app};
use tracing::warn;
use tracing_subscriber::EnvFilter;

pub use config::AppConfig;

/// Cricket Auction - live player auction engine and HTTP API
#[derive(Parser, Debug)]
#[command(name = "cricket-auction")]
#[command(about = "Live player auction engine with an HTTP command/snapshot API")]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(long, env = "AUCTION_SERVER_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "AUCTION_SERVER_PORT")]
    port: Option<u16>,

    /// Admin credential for session control and imports
    #[arg(long, env = "AUCTION_ADMIN_TOKEN")]
    admin_token: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Config: defaults < environment < CLI
    let mut config = AppConfig::from_env();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(token) = args.admin_token {
        config.admin_token = token;
    }

    if config.default_admin_token() {
        warn!("running with the default admin token; set AUCTION_ADMIN_TOKEN");
    }

    let engine = Arc::new(AuctionEngine::new(config.admin_token.clone()));
    let state = ServerState::new(engine);
    let app = create_app(state);

    let addr = config.bind_addr();
    eprintln!("╔══════════════════════════════════════════════╗");
    eprintln!("║  Cricket Auction                             ║");
    eprintln!("║  listening on {:<31}║", addr);
    eprintln!("╚══════════════════════════════════════════════╝");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await
}
