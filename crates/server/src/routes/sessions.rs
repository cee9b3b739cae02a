//! Auction session endpoints: lifecycle commands, bidding, and the
//! snapshot reads the polling room view lives on.
//!
//! Admin commands authenticate via the `x-admin-token` header; the engine
//! resolves the role server-side. Bid rejections that are ordinary auction
//! outcomes (too low, timer expired, squad full, ...) come back as a 200
//! with `accepted: false` and a machine-readable reason — the polling
//! client treats them as data, not transport failures.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use auction_core::{
    CreateAuctionParams, LiveState, ParticipantView, RoundClose, SummaryReport,
};
use types::{
    Auction, AuctionId, AuctionStatus, Money, Participant, SessionPlayer, SessionPlayerId, UserId,
};

use crate::auth::context_from_headers;
use crate::error::{ApiError, ApiResult};
use crate::state::ServerState;
use crate::timer::spawn_round_watcher;

// ─────────────────────────────────────────────────────────────────────────────
// Request / response bodies
// ─────────────────────────────────────────────────────────────────────────────

/// Auction creation request.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub name: String,
    #[serde(default)]
    pub max_squad_size: Option<usize>,
    pub initial_wallet_amount: f64,
    pub bid_timer_seconds: u64,
    pub min_bid_increment: f64,
    #[serde(default)]
    pub anti_snipe_seconds: Option<u64>,
}

/// Join/leave request.
#[derive(Debug, Deserialize)]
pub struct MembershipRequest {
    pub user_id: u64,
}

/// Queue drawing request.
#[derive(Debug, Deserialize)]
pub struct DrawPlayersRequest {
    /// Codes to draw; omitted means the whole catalogue.
    #[serde(default)]
    pub player_codes: Option<Vec<String>>,
}

/// Queue drawing response.
#[derive(Debug, Serialize)]
pub struct DrawPlayersResponse {
    /// Players that entered the queue (already-drawn ones are skipped).
    pub added: usize,
}

/// Response to a lifecycle command.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: AuctionStatus,
}

/// Response to `next-player`.
#[derive(Debug, Serialize)]
pub struct NextPlayerResponse {
    /// The player now live, or `None` when the queue is exhausted.
    pub live_player: Option<SessionPlayer>,
    pub queue_exhausted: bool,
}

/// Response to `close-round`.
#[derive(Debug, Serialize)]
pub struct CloseRoundResponse {
    /// "SOLD", "UNSOLD", or "ALREADY_RESOLVED".
    pub outcome: &'static str,
    pub session_player_id: Option<SessionPlayerId>,
    pub winner: Option<UserId>,
    pub price: Option<Money>,
}

impl From<RoundClose> for CloseRoundResponse {
    fn from(close: RoundClose) -> Self {
        match close {
            RoundClose::Settled {
                session_player_id,
                winner,
                price,
            } => Self {
                outcome: "SOLD",
                session_player_id: Some(session_player_id),
                winner: Some(winner),
                price: Some(price),
            },
            RoundClose::Unsold { session_player_id } => Self {
                outcome: "UNSOLD",
                session_player_id: Some(session_player_id),
                winner: None,
                price: None,
            },
            RoundClose::AlreadyResolved => Self {
                outcome: "ALREADY_RESOLVED",
                session_player_id: None,
                winner: None,
                price: None,
            },
        }
    }
}

/// Response to `reclaim`.
#[derive(Debug, Serialize)]
pub struct ReclaimResponse {
    pub reclaimed: usize,
}

/// Bid request.
#[derive(Debug, Deserialize)]
pub struct BidRequest {
    pub user_id: u64,
    pub session_player_id: u64,
    pub amount: f64,
}

/// Bid outcome. Rejections carry the reason and a machine-readable code.
#[derive(Debug, Serialize)]
pub struct BidResponse {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    /// Highest accepted bid after this attempt, if any.
    pub current_bid: Option<Money>,
    pub time_left_secs: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Lifecycle handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Create an auction: `POST /api/sessions` (admin)
pub async fn create_session(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(req): Json<CreateSessionRequest>,
) -> ApiResult<Json<Auction>> {
    let ctx = context_from_headers(&state.engine, &headers);
    let auction = state.engine.create_auction(
        &ctx,
        CreateAuctionParams {
            name: req.name,
            max_squad_size: req.max_squad_size,
            initial_wallet: Money::from_float(req.initial_wallet_amount),
            bid_timer_secs: req.bid_timer_seconds,
            min_increment: Money::from_float(req.min_bid_increment),
            anti_snipe_secs: req.anti_snipe_seconds,
        },
    )?;
    state.metrics.auction_created();
    Ok(Json(auction))
}

/// List auctions: `GET /api/sessions`
pub async fn list_sessions(State(state): State<ServerState>) -> Json<Vec<Auction>> {
    Json(state.engine.list_auctions())
}

/// Join an auction: `POST /api/sessions/{id}/join`
pub async fn join_session(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    Json(req): Json<MembershipRequest>,
) -> ApiResult<Json<Participant>> {
    let participant = state.engine.join(AuctionId(id), UserId(req.user_id))?;
    Ok(Json(participant))
}

/// Leave an auction: `POST /api/sessions/{id}/leave`
pub async fn leave_session(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    Json(req): Json<MembershipRequest>,
) -> ApiResult<Json<Participant>> {
    let participant = state.engine.leave(AuctionId(id), UserId(req.user_id))?;
    Ok(Json(participant))
}

/// Draw pool players into the queue: `POST /api/sessions/{id}/players` (admin)
pub async fn draw_players(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(req): Json<DrawPlayersRequest>,
) -> ApiResult<Json<DrawPlayersResponse>> {
    let ctx = context_from_headers(&state.engine, &headers);
    let added = state
        .engine
        .draw_players(&ctx, AuctionId(id), req.player_codes.as_deref())?;
    Ok(Json(DrawPlayersResponse { added }))
}

/// Start: `POST /api/sessions/{id}/start` (admin)
pub async fn start_session(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> ApiResult<Json<StatusResponse>> {
    let ctx = context_from_headers(&state.engine, &headers);
    let status = state.engine.start(&ctx, AuctionId(id))?;
    Ok(Json(StatusResponse { status }))
}

/// Pause: `POST /api/sessions/{id}/pause` (admin)
///
/// The running round timer freezes; the deadline watcher notices the
/// timer is gone on its next wake and stands down.
pub async fn pause_session(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> ApiResult<Json<StatusResponse>> {
    let ctx = context_from_headers(&state.engine, &headers);
    let status = state.engine.pause(&ctx, AuctionId(id))?;
    Ok(Json(StatusResponse { status }))
}

/// Resume: `POST /api/sessions/{id}/resume` (admin)
pub async fn resume_session(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> ApiResult<Json<StatusResponse>> {
    let ctx = context_from_headers(&state.engine, &headers);
    let status = state.engine.resume(&ctx, AuctionId(id))?;
    spawn_round_watcher(state.engine.clone(), AuctionId(id));
    Ok(Json(StatusResponse { status }))
}

/// Draw the next player live: `POST /api/sessions/{id}/next-player` (admin)
pub async fn next_player(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> ApiResult<Json<NextPlayerResponse>> {
    let ctx = context_from_headers(&state.engine, &headers);
    let live_player = state.engine.next_player(&ctx, AuctionId(id))?;
    let queue_exhausted = live_player.is_none();
    if !queue_exhausted {
        spawn_round_watcher(state.engine.clone(), AuctionId(id));
    }
    Ok(Json(NextPlayerResponse {
        live_player,
        queue_exhausted,
    }))
}

/// Close the round: `POST /api/sessions/{id}/close-round` (admin)
pub async fn close_round(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> ApiResult<Json<CloseRoundResponse>> {
    let ctx = context_from_headers(&state.engine, &headers);
    let close = state.engine.close_round(&ctx, AuctionId(id))?;
    Ok(Json(close.into()))
}

/// Re-queue unsold players: `POST /api/sessions/{id}/reclaim` (admin)
pub async fn reclaim(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> ApiResult<Json<ReclaimResponse>> {
    let ctx = context_from_headers(&state.engine, &headers);
    let reclaimed = state.engine.reclaim_unsold(&ctx, AuctionId(id))?;
    Ok(Json(ReclaimResponse { reclaimed }))
}

/// End: `POST /api/sessions/{id}/end` (admin)
pub async fn end_session(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> ApiResult<Json<StatusResponse>> {
    let ctx = context_from_headers(&state.engine, &headers);
    let status = state.engine.end(&ctx, AuctionId(id))?;
    Ok(Json(StatusResponse { status }))
}

/// Reset: `POST /api/sessions/{id}/reset` (admin, destructive)
pub async fn reset_session(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> ApiResult<Json<StatusResponse>> {
    let ctx = context_from_headers(&state.engine, &headers);
    let status = state.engine.reset(&ctx, AuctionId(id))?;
    Ok(Json(StatusResponse { status }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Bidding
// ─────────────────────────────────────────────────────────────────────────────

/// Submit a bid: `POST /api/sessions/{id}/bid`
pub async fn post_bid(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    Json(req): Json<BidRequest>,
) -> ApiResult<Json<BidResponse>> {
    let auction_id = AuctionId(id);
    let result = state.engine.submit_bid(
        auction_id,
        UserId(req.user_id),
        SessionPlayerId(req.session_player_id),
        Money::from_float(req.amount),
    );

    match result {
        Ok(receipt) => {
            state.metrics.bid(true);
            Ok(Json(BidResponse {
                accepted: true,
                reason: None,
                code: None,
                current_bid: Some(receipt.current_bid),
                time_left_secs: receipt.time_left_secs,
            }))
        }
        Err(err) if err.is_bid_rejection() => {
            state.metrics.bid(false);
            // A rejection is an ordinary outcome; hand the client the fresh
            // round state alongside the reason.
            let snapshot = state.engine.live_state(auction_id)?;
            Ok(Json(BidResponse {
                accepted: false,
                reason: Some(err.to_string()),
                code: Some(err.code()),
                current_bid: snapshot.live_player.and_then(|p| p.current_bid),
                time_left_secs: snapshot.time_left_secs,
            }))
        }
        Err(err) => Err(ApiError::from(err)),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Snapshot reads
// ─────────────────────────────────────────────────────────────────────────────

/// Room snapshot: `GET /api/sessions/{id}/live-state`
pub async fn live_state(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<LiveState>> {
    Ok(Json(state.engine.live_state(AuctionId(id))?))
}

/// Participant list: `GET /api/sessions/{id}/participants`
pub async fn participants(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Vec<ParticipantView>>> {
    Ok(Json(state.engine.participants(AuctionId(id))?))
}

/// Aggregated report: `GET /api/sessions/{id}/summary`
pub async fn summary(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<SummaryReport>> {
    Ok(Json(state.engine.summary(AuctionId(id))?))
}
