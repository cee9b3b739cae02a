//! Engine facade: the auction registry and its serialization points.
//!
//! Owns the player pool, every auction session, and the admin credential.
//! Each auction's state sits behind its own mutex — the single point of
//! serialization required for bid arbitration — so operations on different
//! auctions proceed fully in parallel while all state-mutating operations
//! for one auction are strictly ordered.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::info;
use types::{
    Auction, AuctionId, AuctionStatus, Bid, Money, Participant, ParticipantStatus,
    PlayerPoolEntry, SessionPlayer, SessionPlayerId, UserId, now_millis,
};

use crate::error::{EngineError, Result};
use crate::pool::{ImportReport, ImportRow, PlayerPool};
use crate::session::{AuctionSession, RoundClose};
use crate::summary::{SummaryReport, summarize};

/// Default squad cap when a new auction does not specify one.
pub const DEFAULT_MAX_SQUAD_SIZE: usize = 13;

/// Default anti-snipe grace window in seconds.
pub const DEFAULT_ANTI_SNIPE_SECS: u64 = 10;

/// Server-side resolved authorization for one request.
///
/// The engine never trusts a caller-supplied role flag; the only way to
/// obtain an admin context is to present the admin credential to
/// [`AuctionEngine::authorize`].
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    admin: bool,
}

impl AuthContext {
    /// Whether this request may invoke admin operations.
    pub fn is_admin(&self) -> bool {
        self.admin
    }
}

/// Parameters for creating an auction.
#[derive(Debug, Clone)]
pub struct CreateAuctionParams {
    pub name: String,
    pub max_squad_size: Option<usize>,
    pub initial_wallet: Money,
    pub bid_timer_secs: u64,
    pub min_increment: Money,
    pub anti_snipe_secs: Option<u64>,
}

/// Consistent snapshot for polling clients.
#[derive(Debug, Clone, Serialize)]
pub struct LiveState {
    pub auction: Auction,
    pub live_player: Option<SessionPlayer>,
    pub time_left_secs: u64,
}

/// One participant row for the room view.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ParticipantView {
    pub user_id: UserId,
    pub status: ParticipantStatus,
    pub is_active: bool,
}

/// Outcome of an accepted bid, with the fresh round state the bidder's
/// client needs.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BidReceipt {
    pub bid: Bid,
    pub current_bid: Money,
    pub time_left_secs: u64,
}

/// Epoch-tagged round deadline for timer scheduling.
#[derive(Debug, Clone, Copy)]
pub struct RoundDeadline {
    pub epoch: u64,
    pub deadline: Instant,
}

/// The live auction engine.
pub struct AuctionEngine {
    admin_token: String,
    pool: RwLock<PlayerPool>,
    auctions: RwLock<HashMap<AuctionId, Arc<Mutex<AuctionSession>>>>,
    next_auction_id: AtomicU64,
    next_session_player_id: AtomicU64,
}

impl AuctionEngine {
    /// Create an engine with the given admin credential.
    pub fn new(admin_token: impl Into<String>) -> Self {
        Self {
            admin_token: admin_token.into(),
            pool: RwLock::new(PlayerPool::new()),
            auctions: RwLock::new(HashMap::new()),
            next_auction_id: AtomicU64::new(1),
            next_session_player_id: AtomicU64::new(1),
        }
    }

    /// Resolve the authorization context for a presented credential.
    pub fn authorize(&self, token: Option<&str>) -> AuthContext {
        AuthContext {
            admin: token.is_some_and(|t| t == self.admin_token),
        }
    }

    fn require_admin(ctx: &AuthContext) -> Result<()> {
        if ctx.is_admin() {
            Ok(())
        } else {
            Err(EngineError::Unauthorized)
        }
    }

    fn session(&self, id: AuctionId) -> Result<Arc<Mutex<AuctionSession>>> {
        self.auctions
            .read()
            .get(&id)
            .cloned()
            .ok_or(EngineError::UnknownAuction(id))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Player pool
    // ─────────────────────────────────────────────────────────────────────

    /// Bulk upsert of roster rows into the catalogue. Admin only.
    pub fn import_players(&self, ctx: &AuthContext, rows: &[ImportRow]) -> Result<ImportReport> {
        Self::require_admin(ctx)?;
        let report = self.pool.write().import_batch(rows);
        info!(
            total = report.total,
            inserted = report.inserted,
            updated = report.updated,
            skipped = report.skipped,
            errored = report.errors.len(),
            "player import finished"
        );
        Ok(report)
    }

    /// The full catalogue.
    pub fn list_players(&self) -> Vec<PlayerPoolEntry> {
        self.pool.read().entries().to_vec()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Auction lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Create an auction. Admin only.
    pub fn create_auction(&self, ctx: &AuthContext, params: CreateAuctionParams) -> Result<Auction> {
        Self::require_admin(ctx)?;

        let name = params.name.trim();
        if name.is_empty() {
            return Err(EngineError::Validation("auction name is required".into()));
        }
        if !params.initial_wallet.is_positive() {
            return Err(EngineError::Validation(
                "initial wallet amount must be positive".into(),
            ));
        }
        if params.bid_timer_secs == 0 {
            return Err(EngineError::Validation(
                "bid timer must be at least one second".into(),
            ));
        }
        if !params.min_increment.is_positive() {
            return Err(EngineError::Validation(
                "minimum bid increment must be positive".into(),
            ));
        }
        let max_squad_size = params.max_squad_size.unwrap_or(DEFAULT_MAX_SQUAD_SIZE);
        if max_squad_size == 0 {
            return Err(EngineError::Validation(
                "squad size must be at least one".into(),
            ));
        }

        let auction = Auction {
            id: AuctionId(self.next_auction_id.fetch_add(1, Ordering::Relaxed)),
            name: name.to_string(),
            status: AuctionStatus::NotStarted,
            max_squad_size,
            initial_wallet: params.initial_wallet,
            bid_timer_secs: params.bid_timer_secs,
            min_increment: params.min_increment,
            anti_snipe_secs: params.anti_snipe_secs.unwrap_or(DEFAULT_ANTI_SNIPE_SECS),
            created_at: now_millis(),
            ended_at: None,
        };

        info!(auction = %auction.id, name = %auction.name, "auction created");
        self.auctions
            .write()
            .insert(auction.id, Arc::new(Mutex::new(AuctionSession::new(auction.clone()))));
        Ok(auction)
    }

    /// All auctions, newest first.
    pub fn list_auctions(&self) -> Vec<Auction> {
        let mut auctions: Vec<Auction> = self
            .auctions
            .read()
            .values()
            .map(|s| s.lock().auction().clone())
            .collect();
        auctions.sort_by(|a, b| b.id.cmp(&a.id));
        auctions
    }

    /// Draw pool players into an auction's queue: the whole catalogue, or
    /// the subset named by code. Returns how many entered the queue
    /// (already-drawn players are skipped). Admin only.
    pub fn draw_players(
        &self,
        ctx: &AuthContext,
        id: AuctionId,
        codes: Option<&[String]>,
    ) -> Result<usize> {
        Self::require_admin(ctx)?;
        let entries = self.pool.read().select(codes)?;
        if entries.is_empty() {
            return Err(EngineError::Validation(
                "player pool is empty; import players first".into(),
            ));
        }

        let session = self.session(id)?;
        let mut session = session.lock();
        let mut added = 0;
        for entry in entries {
            let player_id =
                SessionPlayerId(self.next_session_player_id.fetch_add(1, Ordering::Relaxed));
            if session.draw_player(player_id, entry)? {
                added += 1;
            }
        }
        info!(auction = %id, added, "players drawn into queue");
        Ok(added)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Membership
    // ─────────────────────────────────────────────────────────────────────

    /// Register a participant.
    pub fn join(&self, id: AuctionId, user_id: UserId) -> Result<Participant> {
        self.session(id)?.lock().join(user_id, now_millis())
    }

    /// Voluntary exit.
    pub fn leave(&self, id: AuctionId, user_id: UserId) -> Result<Participant> {
        self.session(id)?.lock().leave(user_id)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Admin session control
    // ─────────────────────────────────────────────────────────────────────

    /// Start the auction. Admin only.
    pub fn start(&self, ctx: &AuthContext, id: AuctionId) -> Result<AuctionStatus> {
        Self::require_admin(ctx)?;
        let session = self.session(id)?;
        let mut session = session.lock();
        session.start()?;
        Ok(session.status())
    }

    /// Pause the auction, freezing the round timer. Admin only.
    pub fn pause(&self, ctx: &AuthContext, id: AuctionId) -> Result<AuctionStatus> {
        Self::require_admin(ctx)?;
        let session = self.session(id)?;
        let mut session = session.lock();
        session.pause(Instant::now())?;
        Ok(session.status())
    }

    /// Resume the auction with the frozen remaining time. Admin only.
    pub fn resume(&self, ctx: &AuthContext, id: AuctionId) -> Result<AuctionStatus> {
        Self::require_admin(ctx)?;
        let session = self.session(id)?;
        let mut session = session.lock();
        session.resume(Instant::now())?;
        Ok(session.status())
    }

    /// Draw the next player live. `None` signals the queue is exhausted.
    /// Admin only.
    pub fn next_player(&self, ctx: &AuthContext, id: AuctionId) -> Result<Option<SessionPlayer>> {
        Self::require_admin(ctx)?;
        self.session(id)?.lock().next_player(Instant::now())
    }

    /// Close the current round. Admin only; idempotent.
    pub fn close_round(&self, ctx: &AuthContext, id: AuctionId) -> Result<RoundClose> {
        Self::require_admin(ctx)?;
        self.session(id)?.lock().close_round()
    }

    /// Timer-driven close for the given round epoch. Internal path used by
    /// the deadline watcher; a stale epoch or unexpired deadline is a no-op.
    pub fn close_round_if_expired(&self, id: AuctionId, epoch: u64) -> Result<RoundClose> {
        self.session(id)?.lock().close_if_expired(epoch, Instant::now())
    }

    /// Re-queue unsold players at the tail. Admin only.
    pub fn reclaim_unsold(&self, ctx: &AuthContext, id: AuctionId) -> Result<usize> {
        Self::require_admin(ctx)?;
        self.session(id)?.lock().reclaim_unsold()
    }

    /// End the auction. Admin only; terminal.
    pub fn end(&self, ctx: &AuthContext, id: AuctionId) -> Result<AuctionStatus> {
        Self::require_admin(ctx)?;
        let session = self.session(id)?;
        let mut session = session.lock();
        session.end(now_millis())?;
        Ok(session.status())
    }

    /// Destructive reset back to NOT_STARTED. Admin only.
    pub fn reset(&self, ctx: &AuthContext, id: AuctionId) -> Result<AuctionStatus> {
        Self::require_admin(ctx)?;
        let session = self.session(id)?;
        let mut session = session.lock();
        session.reset()?;
        Ok(session.status())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Bidding
    // ─────────────────────────────────────────────────────────────────────

    /// Submit a bid attempt. Preconditions and acceptance are decided
    /// entirely under the auction's serialization point.
    pub fn submit_bid(
        &self,
        id: AuctionId,
        user_id: UserId,
        session_player_id: SessionPlayerId,
        amount: Money,
    ) -> Result<BidReceipt> {
        let session = self.session(id)?;
        let mut session = session.lock();
        let now = Instant::now();
        let bid = session.submit_bid(user_id, session_player_id, amount, now)?;
        Ok(BidReceipt {
            bid,
            current_bid: amount,
            time_left_secs: session.time_left_secs(now),
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────

    /// Snapshot for the polling room view.
    pub fn live_state(&self, id: AuctionId) -> Result<LiveState> {
        let session = self.session(id)?;
        let session = session.lock();
        Ok(LiveState {
            auction: session.auction().clone(),
            live_player: session.live_player().cloned(),
            time_left_secs: session.time_left_secs(Instant::now()),
        })
    }

    /// Participant list for the room view.
    pub fn participants(&self, id: AuctionId) -> Result<Vec<ParticipantView>> {
        let session = self.session(id)?;
        let session = session.lock();
        Ok(session
            .participants()
            .map(|p| ParticipantView {
                user_id: p.user_id,
                status: p.status,
                is_active: p.is_active(),
            })
            .collect())
    }

    /// Aggregated report.
    pub fn summary(&self, id: AuctionId) -> Result<SummaryReport> {
        let session = self.session(id)?;
        let session = session.lock();
        Ok(summarize(&session))
    }

    /// Epoch-tagged deadline of the running round, for the timer watcher.
    pub fn round_deadline(&self, id: AuctionId) -> Result<Option<RoundDeadline>> {
        let session = self.session(id)?;
        let session = session.lock();
        Ok(session.round_deadline().map(|deadline| RoundDeadline {
            epoch: session.round_epoch(),
            deadline,
        }))
    }
}
