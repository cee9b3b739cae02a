//! Read-side rollups for reporting.
//!
//! Pure projections over a session snapshot: player and participant counts
//! by status, top spenders, and the sold list. Safe to compute at any time,
//! including mid-auction; never mutates.

use serde::Serialize;
use types::{
    AuctionId, AuctionStatus, Money, ParticipantStatus, PlayerStatus, SessionPlayerId, UserId,
};

use crate::session::AuctionSession;

/// Session player counts by lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlayerCounts {
    pub pending: usize,
    pub live: usize,
    pub sold: usize,
    pub unsold: usize,
    pub reclaimed: usize,
}

/// Participant counts by membership status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParticipantCounts {
    pub active: usize,
    pub exited: usize,
    pub completed: usize,
}

/// One row of the spend leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TopSpender {
    pub user_id: UserId,
    /// Total spent: initial purse minus remaining balance.
    pub spent: Money,
    pub balance: Money,
}

/// One sold player with its buyer and settled price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoldPlayer {
    pub session_player_id: SessionPlayerId,
    pub name: String,
    pub country: String,
    pub sold_to: UserId,
    pub price: Money,
}

/// Aggregated report over one auction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub auction_id: AuctionId,
    pub status: AuctionStatus,
    pub players: PlayerCounts,
    pub participants: ParticipantCounts,
    /// Ranked by spend descending, user id ascending on equal spend.
    pub top_spenders: Vec<TopSpender>,
    /// In settlement order.
    pub sold_players: Vec<SoldPlayer>,
}

/// Build the report from a session snapshot.
pub fn summarize(session: &AuctionSession) -> SummaryReport {
    let mut players = PlayerCounts::default();
    for player in session.players() {
        match player.status {
            PlayerStatus::Pending => players.pending += 1,
            PlayerStatus::Live => players.live += 1,
            PlayerStatus::Sold => players.sold += 1,
            PlayerStatus::Unsold => players.unsold += 1,
            PlayerStatus::Reclaimed => players.reclaimed += 1,
        }
    }

    let mut participants = ParticipantCounts::default();
    for participant in session.participants() {
        match participant.status {
            ParticipantStatus::Active => participants.active += 1,
            ParticipantStatus::Exited => participants.exited += 1,
            ParticipantStatus::Completed => participants.completed += 1,
        }
    }

    let mut top_spenders: Vec<TopSpender> = session
        .wallets()
        .accounts()
        .map(|account| TopSpender {
            user_id: account.user_id,
            spent: account.spent(),
            balance: account.balance,
        })
        .collect();
    top_spenders.sort_by(|a, b| b.spent.cmp(&a.spent).then(a.user_id.cmp(&b.user_id)));

    let sold_players = session
        .squads()
        .entries()
        .iter()
        .filter_map(|entry| {
            let player = session
                .players()
                .iter()
                .find(|p| p.id == entry.session_player_id)?;
            Some(SoldPlayer {
                session_player_id: entry.session_player_id,
                name: player.pool.name.clone(),
                country: player.pool.country.clone(),
                sold_to: entry.user_id,
                price: entry.price,
            })
        })
        .collect();

    SummaryReport {
        auction_id: session.auction().id,
        status: session.status(),
        players,
        participants,
        top_spenders,
        sold_players,
    }
}
