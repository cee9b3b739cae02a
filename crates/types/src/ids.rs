//! Core identifier types for the auction engine.
//!
//! This module defines the fundamental ID types used throughout the system
//! to uniquely identify auctions, users, session players, and bids.

use derive_more::{From, Into};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an auction session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default, From,
    Into,
)]
pub struct AuctionId(pub u64);

impl fmt::Display for AuctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Auction({})", self.0)
    }
}

/// Unique identifier for a participant (bidder or admin).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default, From,
    Into,
)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "User({})", self.0)
    }
}

/// Unique identifier for a player drawn into a specific auction.
///
/// Distinct from any pool-level player code: the same catalogue player
/// drawn into two auctions gets two session player IDs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default, From,
    Into,
)]
pub struct SessionPlayerId(pub u64);

impl fmt::Display for SessionPlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionPlayer({})", self.0)
    }
}

/// Server-assigned bid sequence number.
///
/// Strictly increasing per auction, assigned at the single point of
/// serialization. Defines bid ordering; client timestamps never do.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default, From,
    Into,
)]
pub struct BidSeq(pub u64);

impl BidSeq {
    /// The next sequence number.
    #[inline]
    pub fn next(self) -> Self {
        BidSeq(self.0 + 1)
    }
}

impl fmt::Display for BidSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(AuctionId(3).to_string(), "Auction(3)");
        assert_eq!(UserId(7).to_string(), "User(7)");
        assert_eq!(SessionPlayerId(12).to_string(), "SessionPlayer(12)");
    }

    #[test]
    fn test_bid_seq_next() {
        assert_eq!(BidSeq(0).next(), BidSeq(1));
        assert_eq!(BidSeq(41).next(), BidSeq(42));
    }
}
