//! Server crate: Axum HTTP surface over the auction engine.
//!
//! The engine is transport-agnostic; this crate is the one collaborator
//! that knows about HTTP. Polling clients repeatedly fetch the live-state
//! snapshot and the participant list, and post commands and bids.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────┐          ┌────────────────────────┐
//! │  AuctionEngine          │          │  Axum handlers         │
//! │  (sync, per-auction     │ ◀──────── │  commands / bids       │
//! │   serialization)        │ ────────▶ │  snapshot reads        │
//! └───────────┬─────────────┘          └────────────────────────┘
//!             │ round deadline
//!             ▼
//!   deadline watcher task (tokio) ──▶ idempotent epoch-checked close
//! ```
//!
//! # Modules
//!
//! - [`app`]: Axum application builder and router setup
//! - [`state`]: Shared server state (engine handle, metrics)
//! - [`error`]: Unified error handling with HTTP status codes
//! - [`auth`]: Admin credential extraction
//! - [`timer`]: Round deadline watcher tasks
//! - [`routes`]: HTTP route handlers (health, sessions, players)

pub mod app;
pub mod auth;
pub mod error;
pub mod routes;
pub mod state;
pub mod timer;

// Re-exports for convenience
pub use app::create_app;
pub use error::{ApiError, ApiResult};
pub use state::{ServerMetrics, ServerState};
pub use timer::spawn_round_watcher;
