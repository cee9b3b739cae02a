//! Core types for the live player auction engine.
//!
//! This crate provides all shared data types used across the engine and
//! server: identifier newtypes, fixed-point monetary values, lifecycle
//! status enums, and the plain data records for auctions, players, bids,
//! participants, wallets, and squads.

mod ids;
mod money;

pub use ids::{AuctionId, BidSeq, SessionPlayerId, UserId};
pub use money::{MONEY_SCALE, Money};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

// =============================================================================
// Time
// =============================================================================

/// Wall clock timestamp in milliseconds since epoch.
pub type Timestamp = u64;

/// Current wall clock time in milliseconds since epoch.
pub fn now_millis() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// =============================================================================
// Status Enums
// =============================================================================

/// Lifecycle status of an auction session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuctionStatus {
    /// Created, accepting participants and queue entries; no bidding yet.
    #[default]
    NotStarted,
    /// Bidding rounds in progress.
    Running,
    /// Frozen mid-round; the timer holds its remaining time.
    Paused,
    /// Terminal. Wallets and squads are read-only.
    Ended,
}

impl AuctionStatus {
    /// Check if the auction has reached its terminal state.
    #[inline]
    pub fn is_ended(self) -> bool {
        self == AuctionStatus::Ended
    }
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuctionStatus::NotStarted => write!(f, "NOT_STARTED"),
            AuctionStatus::Running => write!(f, "RUNNING"),
            AuctionStatus::Paused => write!(f, "PAUSED"),
            AuctionStatus::Ended => write!(f, "ENDED"),
        }
    }
}

/// Sale lifecycle of a player drawn into an auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerStatus {
    /// Queued, waiting to be drawn live.
    #[default]
    Pending,
    /// The single player currently open for bidding.
    Live,
    /// Sold and settled (wallet debited, squad entry created).
    Sold,
    /// Round closed with no accepted bid.
    Unsold,
    /// Re-queued after going unsold; becomes live again when drawn.
    Reclaimed,
}

impl PlayerStatus {
    /// Check if the player can still be drawn live from the queue.
    #[inline]
    pub fn is_queued(self) -> bool {
        matches!(self, PlayerStatus::Pending | PlayerStatus::Reclaimed)
    }
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerStatus::Pending => write!(f, "PENDING"),
            PlayerStatus::Live => write!(f, "LIVE"),
            PlayerStatus::Sold => write!(f, "SOLD"),
            PlayerStatus::Unsold => write!(f, "UNSOLD"),
            PlayerStatus::Reclaimed => write!(f, "RECLAIMED"),
        }
    }
}

/// Membership status of a participant within one auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantStatus {
    /// Joined and eligible to bid.
    #[default]
    Active,
    /// Left voluntarily.
    Exited,
    /// Squad filled, or the auction ended.
    Completed,
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantStatus::Active => write!(f, "ACTIVE"),
            ParticipantStatus::Exited => write!(f, "EXITED"),
            ParticipantStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

// =============================================================================
// Player Catalogue Enums
// =============================================================================

/// Playing skill of a catalogue player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillType {
    Batsman,
    Bowler,
    Allrounder,
    WicketKeeper,
}

impl FromStr for SkillType {
    type Err = String;

    /// Parse an import-sheet skill label. Accepts the common spellings
    /// found in exported rosters ("WicketKeeper/Batsman", "All-rounder").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "batsman" | "batter" => Ok(SkillType::Batsman),
            "bowler" => Ok(SkillType::Bowler),
            "allrounder" => Ok(SkillType::Allrounder),
            "wicketkeeper" | "wicketkeeperbatsman" | "keeper" => Ok(SkillType::WicketKeeper),
            _ => Err(format!("unknown skill type: {s:?}")),
        }
    }
}

impl fmt::Display for SkillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkillType::Batsman => write!(f, "Batsman"),
            SkillType::Bowler => write!(f, "Bowler"),
            SkillType::Allrounder => write!(f, "Allrounder"),
            SkillType::WicketKeeper => write!(f, "WicketKeeper/Batsman"),
        }
    }
}

/// Pricing tier of a catalogue player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Legend,
    Platinum,
    Gold,
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legend" => Ok(Category::Legend),
            "platinum" => Ok(Category::Platinum),
            "gold" => Ok(Category::Gold),
            _ => Err(format!("unknown category: {s:?}")),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Legend => write!(f, "Legend"),
            Category::Platinum => write!(f, "Platinum"),
            Category::Gold => write!(f, "Gold"),
        }
    }
}

// =============================================================================
// Auction Record
// =============================================================================

/// One bounded bidding event with its own player queue, participants,
/// wallets, and timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auction {
    /// Unique auction identifier.
    pub id: AuctionId,
    /// Display name.
    pub name: String,
    /// Current session status.
    pub status: AuctionStatus,
    /// Maximum players a participant may win.
    pub max_squad_size: usize,
    /// Purse each participant starts with.
    pub initial_wallet: Money,
    /// Round duration in seconds.
    pub bid_timer_secs: u64,
    /// Minimum amount a bid must exceed the previous accepted bid by.
    pub min_increment: Money,
    /// Anti-snipe grace window in seconds (0 disables). A bid accepted with
    /// less than this remaining pushes the deadline back out to it.
    pub anti_snipe_secs: u64,
    /// Creation time.
    pub created_at: Timestamp,
    /// Set exactly once, when the auction ends.
    pub ended_at: Option<Timestamp>,
}

// =============================================================================
// Player Records
// =============================================================================

/// Global catalogue row: a player importable into auction queues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPoolEntry {
    /// Roster code, unique when present. Upsert key when set.
    pub code: Option<String>,
    /// Player name.
    pub name: String,
    /// Country of the player.
    pub country: String,
    /// Playing skill.
    pub skill: SkillType,
    /// Pricing tier.
    pub category: Category,
    /// Opening bid floor; strictly positive.
    pub base_price: Money,
}

/// A catalogue player drawn into one auction, carrying sale lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPlayer {
    /// Unique session player identifier.
    pub id: SessionPlayerId,
    /// The auction this player was drawn into.
    pub auction_id: AuctionId,
    /// Copy of the catalogue entry at draw time.
    pub pool: PlayerPoolEntry,
    /// Sale lifecycle status.
    pub status: PlayerStatus,
    /// Highest accepted bid so far, if any.
    pub current_bid: Option<Money>,
    /// Bidder holding the highest accepted bid.
    pub current_bidder: Option<UserId>,
    /// Final price, set at settlement.
    pub sale_price: Option<Money>,
    /// Winner, set at settlement.
    pub sold_to: Option<UserId>,
}

impl SessionPlayer {
    /// Create a fresh pending session player from a catalogue entry.
    pub fn pending(id: SessionPlayerId, auction_id: AuctionId, pool: PlayerPoolEntry) -> Self {
        Self {
            id,
            auction_id,
            pool,
            status: PlayerStatus::Pending,
            current_bid: None,
            current_bidder: None,
            sale_price: None,
            sold_to: None,
        }
    }

    /// Check if this player is currently open for bidding.
    #[inline]
    pub fn is_live(&self) -> bool {
        self.status == PlayerStatus::Live
    }
}

// =============================================================================
// Bid Record
// =============================================================================

/// An accepted bid. Append-only; never mutated or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    /// The auction the bid belongs to.
    pub auction_id: AuctionId,
    /// The live player the bid was placed on.
    pub session_player_id: SessionPlayerId,
    /// Bidder.
    pub user_id: UserId,
    /// Bid amount.
    pub amount: Money,
    /// Server-assigned order of arrival; ties are impossible by construction
    /// but ordering is still defined here, never by client time.
    pub seq: BidSeq,
}

// =============================================================================
// Participant / Wallet / Squad Records
// =============================================================================

/// A user registered into one auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// The auction joined.
    pub auction_id: AuctionId,
    /// The user.
    pub user_id: UserId,
    /// Membership status.
    pub status: ParticipantStatus,
    /// Join time.
    pub joined_at: Timestamp,
}

impl Participant {
    /// Check whether the participant can still bid.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == ParticipantStatus::Active
    }
}

/// A participant's purse for one auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAccount {
    /// The auction this purse belongs to.
    pub auction_id: AuctionId,
    /// Owner.
    pub user_id: UserId,
    /// Starting purse.
    pub initial: Money,
    /// Remaining purse: initial minus the sum of won sale prices.
    pub balance: Money,
}

impl WalletAccount {
    /// Create a fresh account at the auction's initial purse.
    pub fn new(auction_id: AuctionId, user_id: UserId, initial: Money) -> Self {
        Self {
            auction_id,
            user_id,
            initial,
            balance: initial,
        }
    }

    /// Total amount spent so far.
    #[inline]
    pub fn spent(&self) -> Money {
        self.initial - self.balance
    }
}

/// A won player in a participant's squad. Created only at settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadEntry {
    /// The auction the purchase happened in.
    pub auction_id: AuctionId,
    /// Buyer.
    pub user_id: UserId,
    /// The purchased player.
    pub session_player_id: SessionPlayerId,
    /// Settled price.
    pub price: Money,
}

// =============================================================================
// Tests
// =============================================================================
