//! Bid arbitration for the live player.
//!
//! The arbiter accepts bid attempts against the currently live player,
//! enforces the monotonic increment rule, and publishes the single accepted
//! highest bid. It runs entirely inside the per-auction serialization
//! point: every submission observes the latest accepted state, and the
//! sequence number it assigns defines bid order. Tie amounts are impossible
//! by construction, since every accepted bid must strictly exceed the
//! previous one by at least the minimum increment.

use types::{AuctionId, AuctionStatus, Bid, BidSeq, Money, SessionPlayer, SessionPlayerId, UserId};

use crate::error::{EngineError, Result};

/// Everything the precondition chain needs from the session, captured
/// under the per-auction lock at submission time.
#[derive(Debug)]
pub struct BidChecks<'a> {
    /// Auction status at submission.
    pub status: AuctionStatus,
    /// The currently live player, if any.
    pub live: Option<&'a SessionPlayer>,
    /// Whether the round timer had already expired at submission.
    pub timer_expired: bool,
    /// How many players the bidder has already won.
    pub squad_count: usize,
    /// The auction's squad cap.
    pub squad_cap: usize,
    /// The bidder's remaining purse.
    pub wallet_balance: Money,
    /// Minimum increment over the previous accepted bid.
    pub min_increment: Money,
}

/// Accepts bids and tracks the accepted highest bid for the live round.
#[derive(Debug, Clone, Default)]
pub struct BidArbiter {
    bids: Vec<Bid>,
    next_seq: BidSeq,
    highest: Option<(UserId, Money)>,
}

impl BidArbiter {
    /// Create an arbiter with an empty bid log.
    pub fn new() -> Self {
        Self::default()
    }

    /// The accepted highest bid of the current round, if any.
    pub fn highest(&self) -> Option<(UserId, Money)> {
        self.highest
    }

    /// Full append-only bid log for the auction.
    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    /// Accepted bids for one session player, in acceptance order.
    pub fn bids_for(&self, id: SessionPlayerId) -> impl Iterator<Item = &Bid> {
        self.bids.iter().filter(move |b| b.session_player_id == id)
    }

    /// Submit a bid attempt against the live player.
    ///
    /// Preconditions are checked in order, short-circuiting on the first
    /// failure:
    ///
    /// 1. auction is running (paused auctions reject with `AuctionPaused`)
    /// 2. the target matches the live player
    /// 3. the round timer has not expired
    /// 4. the bidder's squad is below the cap
    /// 5. the bidder's purse covers the amount
    /// 6. the amount meets the floor: previous highest plus the minimum
    ///    increment, or the base price for the round's first bid
    ///
    /// On acceptance the bid is appended with the next sequence number and
    /// becomes the published highest bid.
    pub fn submit(
        &mut self,
        auction_id: AuctionId,
        session_player_id: SessionPlayerId,
        user_id: UserId,
        amount: Money,
        checks: BidChecks<'_>,
    ) -> Result<Bid> {
        match checks.status {
            AuctionStatus::Running => {}
            AuctionStatus::Paused => return Err(EngineError::AuctionPaused),
            status => {
                return Err(EngineError::InvalidState(format!(
                    "cannot bid while auction is {}",
                    status
                )));
            }
        }

        match checks.live {
            Some(live) if live.id == session_player_id => {}
            _ => return Err(EngineError::NotLive(session_player_id)),
        }

        if checks.timer_expired {
            return Err(EngineError::TimerExpired);
        }

        if checks.squad_count >= checks.squad_cap {
            return Err(EngineError::SquadFull {
                cap: checks.squad_cap,
            });
        }

        if checks.wallet_balance < amount {
            return Err(EngineError::InsufficientFunds {
                balance: checks.wallet_balance,
            });
        }

        let floor = match self.highest {
            Some((_, current)) => current + checks.min_increment,
            None => checks.live.map(|p| p.pool.base_price).unwrap_or(Money::ZERO),
        };
        if amount < floor {
            return Err(EngineError::BidTooLow { floor });
        }

        let bid = Bid {
            auction_id,
            session_player_id,
            user_id,
            amount,
            seq: self.next_seq,
        };
        self.next_seq = self.next_seq.next();
        self.bids.push(bid);
        self.highest = Some((user_id, amount));
        Ok(bid)
    }

    /// Clear the highest-bid state for a fresh round. The bid log is
    /// append-only and survives.
    pub fn reset_round(&mut self) {
        self.highest = None;
    }

    /// Drop the entire bid log and round state. Auction reset path only.
    pub fn clear(&mut self) {
        self.bids.clear();
        self.highest = None;
        self.next_seq = BidSeq::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{Category, PlayerPoolEntry, PlayerStatus, SkillType};

    fn live_player(base: f64) -> SessionPlayer {
        let mut player = SessionPlayer::pending(
            SessionPlayerId(1),
            AuctionId(1),
            PlayerPoolEntry {
                code: Some("P1".into()),
                name: "V. Kohli".into(),
                country: "India".into(),
                skill: SkillType::Batsman,
                category: Category::Legend,
                base_price: Money::from_float(base),
            },
        );
        player.status = PlayerStatus::Live;
        player
    }

    fn checks(player: &SessionPlayer) -> BidChecks<'_> {
        BidChecks {
            status: AuctionStatus::Running,
            live: Some(player),
            timer_expired: false,
            squad_count: 0,
            squad_cap: 13,
            wallet_balance: Money::from_float(100.0),
            min_increment: Money::from_float(0.5),
        }
    }

    #[test]
    fn test_first_bid_must_meet_base_price() {
        let player = live_player(2.0);
        let mut arbiter = BidArbiter::new();

        let err = arbiter
            .submit(
                AuctionId(1),
                player.id,
                UserId(1),
                Money::from_float(1.5),
                checks(&player),
            )
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::BidTooLow {
                floor: Money::from_float(2.0)
            }
        );

        arbiter
            .submit(
                AuctionId(1),
                player.id,
                UserId(1),
                Money::from_float(2.0),
                checks(&player),
            )
            .unwrap();
        assert_eq!(arbiter.highest(), Some((UserId(1), Money::from_float(2.0))));
    }

    #[test]
    fn test_increment_rule_rejects_10_25_accepts_10_5() {
        // currentHighestBid = 10, minBidIncrement = 0.5:
        // a bid of 10.25 is rejected, 10.5 is accepted.
        let player = live_player(2.0);
        let mut arbiter = BidArbiter::new();
        arbiter
            .submit(
                AuctionId(1),
                player.id,
                UserId(1),
                Money::from_float(10.0),
                checks(&player),
            )
            .unwrap();

        let err = arbiter
            .submit(
                AuctionId(1),
                player.id,
                UserId(2),
                Money::from_float(10.25),
                checks(&player),
            )
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::BidTooLow {
                floor: Money::from_float(10.5)
            }
        );

        arbiter
            .submit(
                AuctionId(1),
                player.id,
                UserId(2),
                Money::from_float(10.5),
                checks(&player),
            )
            .unwrap();
        assert_eq!(arbiter.highest(), Some((UserId(2), Money::from_float(10.5))));
    }

    #[test]
    fn test_accepted_amounts_strictly_increase() {
        let player = live_player(2.0);
        let mut arbiter = BidArbiter::new();

        for (user, amount) in [(1, 2.0), (2, 2.5), (1, 4.0), (3, 4.5)] {
            arbiter
                .submit(
                    AuctionId(1),
                    player.id,
                    UserId(user),
                    Money::from_float(amount),
                    checks(&player),
                )
                .unwrap();
        }

        let amounts: Vec<_> = arbiter.bids().iter().map(|b| b.amount).collect();
        let min_inc = Money::from_float(0.5);
        assert!(amounts.windows(2).all(|w| w[1] >= w[0] + min_inc));

        // Sequence numbers are strictly increasing too.
        let seqs: Vec<_> = arbiter.bids().iter().map(|b| b.seq).collect();
        assert!(seqs.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_precondition_order_paused_before_not_live() {
        // A paused auction rejects with AuctionPaused even when the target
        // player is wrong; the status check short-circuits first.
        let player = live_player(2.0);
        let mut arbiter = BidArbiter::new();
        let mut c = checks(&player);
        c.status = AuctionStatus::Paused;
        c.live = None;

        let err = arbiter
            .submit(
                AuctionId(1),
                SessionPlayerId(99),
                UserId(1),
                Money::from_float(5.0),
                c,
            )
            .unwrap_err();
        assert_eq!(err, EngineError::AuctionPaused);
    }

    #[test]
    fn test_wrong_target_rejected() {
        let player = live_player(2.0);
        let mut arbiter = BidArbiter::new();

        let err = arbiter
            .submit(
                AuctionId(1),
                SessionPlayerId(99),
                UserId(1),
                Money::from_float(5.0),
                checks(&player),
            )
            .unwrap_err();
        assert_eq!(err, EngineError::NotLive(SessionPlayerId(99)));
    }

    #[test]
    fn test_expired_timer_rejected() {
        let player = live_player(2.0);
        let mut arbiter = BidArbiter::new();
        let mut c = checks(&player);
        c.timer_expired = true;

        let err = arbiter
            .submit(
                AuctionId(1),
                player.id,
                UserId(1),
                Money::from_float(5.0),
                c,
            )
            .unwrap_err();
        assert_eq!(err, EngineError::TimerExpired);
    }

    #[test]
    fn test_full_squad_rejected_even_when_affordable() {
        let player = live_player(2.0);
        let mut arbiter = BidArbiter::new();
        let mut c = checks(&player);
        c.squad_count = 13;

        let err = arbiter
            .submit(
                AuctionId(1),
                player.id,
                UserId(1),
                Money::from_float(5.0),
                c,
            )
            .unwrap_err();
        assert_eq!(err, EngineError::SquadFull { cap: 13 });
    }

    #[test]
    fn test_bid_over_balance_rejected() {
        let player = live_player(2.0);
        let mut arbiter = BidArbiter::new();
        let mut c = checks(&player);
        c.wallet_balance = Money::from_float(4.0);

        let err = arbiter
            .submit(
                AuctionId(1),
                player.id,
                UserId(1),
                Money::from_float(4.5),
                c,
            )
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::InsufficientFunds {
                balance: Money::from_float(4.0)
            }
        );
    }

    #[test]
    fn test_reset_round_keeps_bid_log() {
        let player = live_player(2.0);
        let mut arbiter = BidArbiter::new();
        arbiter
            .submit(
                AuctionId(1),
                player.id,
                UserId(1),
                Money::from_float(2.0),
                checks(&player),
            )
            .unwrap();

        arbiter.reset_round();
        assert_eq!(arbiter.highest(), None);
        assert_eq!(arbiter.bids().len(), 1);

        // Next round's first bid is measured against base price again.
        let next = live_player(3.0);
        let err = arbiter
            .submit(
                AuctionId(1),
                next.id,
                UserId(1),
                Money::from_float(2.5),
                checks(&next),
            )
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::BidTooLow {
                floor: Money::from_float(3.0)
            }
        );
    }
}
