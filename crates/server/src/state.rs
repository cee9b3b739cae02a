//! Shared server state.
//!
//! Holds the engine handle and server-side metrics, cloned into each
//! handler via Axum's State extractor. The server observes and commands
//! the engine; it never owns auction state of its own.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use auction_core::AuctionEngine;

/// Shared state for all route handlers.
#[derive(Clone)]
pub struct ServerState {
    /// The auction engine.
    pub engine: Arc<AuctionEngine>,

    /// Server start time.
    pub start_time: Instant,

    /// Shared metrics.
    pub metrics: Arc<ServerMetrics>,
}

impl ServerState {
    /// Create server state around an engine.
    pub fn new(engine: Arc<AuctionEngine>) -> Self {
        Self {
            engine,
            start_time: Instant::now(),
            metrics: Arc::new(ServerMetrics::new()),
        }
    }

    /// Get uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// Server-side counters.
pub struct ServerMetrics {
    /// Auctions created over the server's lifetime.
    pub auctions_created: AtomicU64,
    /// Accepted bids.
    pub bids_accepted: AtomicU64,
    /// Rejected bid attempts.
    pub bids_rejected: AtomicU64,
}

impl ServerMetrics {
    /// Create zeroed metrics.
    pub fn new() -> Self {
        Self {
            auctions_created: AtomicU64::new(0),
            bids_accepted: AtomicU64::new(0),
            bids_rejected: AtomicU64::new(0),
        }
    }

    /// Record a created auction.
    pub fn auction_created(&self) {
        self.auctions_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a bid outcome.
    pub fn bid(&self, accepted: bool) {
        if accepted {
            self.bids_accepted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.bids_rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Auctions created so far.
    pub fn auctions(&self) -> u64 {
        self.auctions_created.load(Ordering::Relaxed)
    }

    /// Accepted bid count.
    pub fn accepted(&self) -> u64 {
        self.bids_accepted.load(Ordering::Relaxed)
    }

    /// Rejected bid count.
    pub fn rejected(&self) -> u64 {
        self.bids_rejected.load(Ordering::Relaxed)
    }
}

impl Default for ServerMetrics {
    fn default() -> Self {
        Self::new()
    }
}
