//! Error types for auction engine operations.

use std::fmt;
use types::{AuctionId, Money, SessionPlayerId, UserId};

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur during auction operations.
///
/// All variants except `InvariantViolation` are recoverable conditions that
/// are surfaced to the caller with the reason; `InvariantViolation` indicates
/// a logic bug and is logged at error level before being returned.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Operation not valid for the auction's current status.
    InvalidState(String),
    /// Bid submitted while the auction is paused.
    AuctionPaused,
    /// Bid placed against a player that is not the current live player.
    NotLive(SessionPlayerId),
    /// The round timer has already expired.
    TimerExpired,
    /// Bid amount below the required floor.
    BidTooLow {
        /// Smallest amount that would have been accepted.
        floor: Money,
    },
    /// The participant's squad is already at the cap.
    SquadFull {
        /// The auction's squad cap.
        cap: usize,
    },
    /// The participant's purse cannot cover the amount.
    InsufficientFunds {
        /// Remaining purse balance.
        balance: Money,
    },
    /// Input failed validation.
    Validation(String),
    /// The requested auction was not found.
    UnknownAuction(AuctionId),
    /// The requested session player was not found.
    UnknownPlayer(SessionPlayerId),
    /// The user has not joined the auction.
    UnknownParticipant(UserId),
    /// Admin operation invoked without admin credentials.
    Unauthorized,
    /// Internal invariant broken; indicates a logic bug, not user error.
    InvariantViolation(String),
}

impl EngineError {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidState(_) => "INVALID_STATE",
            EngineError::AuctionPaused => "AUCTION_PAUSED",
            EngineError::NotLive(_) => "NOT_LIVE",
            EngineError::TimerExpired => "TIMER_EXPIRED",
            EngineError::BidTooLow { .. } => "BID_TOO_LOW",
            EngineError::SquadFull { .. } => "SQUAD_FULL",
            EngineError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            EngineError::Validation(_) => "VALIDATION",
            EngineError::UnknownAuction(_) => "UNKNOWN_AUCTION",
            EngineError::UnknownPlayer(_) => "UNKNOWN_PLAYER",
            EngineError::UnknownParticipant(_) => "UNKNOWN_PARTICIPANT",
            EngineError::Unauthorized => "UNAUTHORIZED",
            EngineError::InvariantViolation(_) => "INVARIANT_VIOLATION",
        }
    }

    /// Check if this is a normal bid rejection rather than a lookup or
    /// authorization failure. The bid endpoint reports these as data.
    pub fn is_bid_rejection(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidState(_)
                | EngineError::AuctionPaused
                | EngineError::NotLive(_)
                | EngineError::TimerExpired
                | EngineError::BidTooLow { .. }
                | EngineError::SquadFull { .. }
                | EngineError::InsufficientFunds { .. }
        )
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidState(reason) => write!(f, "invalid state: {}", reason),
            EngineError::AuctionPaused => write!(f, "auction is paused"),
            EngineError::NotLive(id) => write!(f, "{} is not the live player", id),
            EngineError::TimerExpired => write!(f, "round timer has expired"),
            EngineError::BidTooLow { floor } => {
                write!(f, "bid below minimum; next acceptable bid is {}", floor)
            }
            EngineError::SquadFull { cap } => {
                write!(f, "squad already holds the maximum of {} players", cap)
            }
            EngineError::InsufficientFunds { balance } => {
                write!(f, "insufficient funds; remaining balance is {}", balance)
            }
            EngineError::Validation(reason) => write!(f, "validation failed: {}", reason),
            EngineError::UnknownAuction(id) => write!(f, "auction not found: {}", id),
            EngineError::UnknownPlayer(id) => write!(f, "session player not found: {}", id),
            EngineError::UnknownParticipant(id) => {
                write!(f, "{} has not joined this auction", id)
            }
            EngineError::Unauthorized => write!(f, "admin credentials required"),
            EngineError::InvariantViolation(detail) => {
                write!(f, "internal invariant violated: {}", detail)
            }
        }
    }
}

impl std::error::Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::BidTooLow {
            floor: Money::from_float(10.5),
        };
        assert_eq!(
            err.to_string(),
            "bid below minimum; next acceptable bid is 10.50"
        );

        let err = EngineError::UnknownAuction(AuctionId(9));
        assert_eq!(err.to_string(), "auction not found: Auction(9)");
    }

    #[test]
    fn test_bid_rejection_classification() {
        assert!(EngineError::TimerExpired.is_bid_rejection());
        assert!(EngineError::SquadFull { cap: 13 }.is_bid_rejection());
        assert!(!EngineError::UnknownAuction(AuctionId(1)).is_bid_rejection());
        assert!(!EngineError::Unauthorized.is_bid_rejection());
    }
}
