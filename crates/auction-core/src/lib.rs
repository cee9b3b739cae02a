//! Auction-core: the live player auction engine.
//!
//! This crate provides the core auction mechanics:
//! - Player catalogue with partial-failure-tolerant bulk import
//! - Ordered session player queue with reclaim of unsold players
//! - Bid arbitration with monotonic increment enforcement
//! - Wallet ledger and squad registry, settled atomically
//! - Session state machine with a pausable, anti-snipe round timer
//! - Read-side summary rollups
//! - Engine facade with per-auction serialization and server-side
//!   authorization

mod arbiter;
mod engine;
mod error;
mod pool;
mod queue;
mod session;
mod squad;
mod summary;
mod wallet;

pub use arbiter::{BidArbiter, BidChecks};
pub use engine::{
    AuctionEngine, AuthContext, BidReceipt, CreateAuctionParams, DEFAULT_ANTI_SNIPE_SECS,
    DEFAULT_MAX_SQUAD_SIZE, LiveState, ParticipantView, RoundDeadline,
};
pub use error::{EngineError, Result};
pub use pool::{ImportReport, ImportRow, PlayerPool, RowError};
pub use queue::SessionPlayerQueue;
pub use session::{AuctionSession, RoundClose, RoundTimer};
pub use squad::SquadRegistry;
pub use summary::{
    ParticipantCounts, PlayerCounts, SoldPlayer, SummaryReport, TopSpender, summarize,
};
pub use wallet::WalletLedger;
