//! Auction session state machine.
//!
//! Owns one auction's status, player queue, bid arbiter, wallets, squads,
//! participants, and the round timer. Every method runs inside the
//! per-auction serialization point, so no caller ever observes a torn
//! state between the components.
//!
//! Status transitions:
//!
//! ```text
//! NOT_STARTED ──start──▶ RUNNING ◀──resume──┐
//!                           │ pause          │
//!                           ▼                │
//!                        PAUSED ─────────────┘
//!
//! any non-ENDED ──end──▶ ENDED (terminal)
//! any pre-ENDED ──reset──▶ NOT_STARTED (destructive, logged)
//! ```
//!
//! The round timer lives here as data; scheduling its expiry is the
//! transport layer's job. Timer expiry and an explicit admin close both
//! funnel into [`AuctionSession::close_round`], with the round epoch as
//! the idempotence token, so a race resolves as one logical close.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};
use types::{
    Auction, AuctionStatus, Bid, Money, Participant, ParticipantStatus, PlayerPoolEntry,
    SessionPlayer, SessionPlayerId, Timestamp, UserId,
};

use crate::arbiter::{BidArbiter, BidChecks};
use crate::error::{EngineError, Result};
use crate::queue::SessionPlayerQueue;
use crate::squad::SquadRegistry;
use crate::wallet::WalletLedger;

/// Countdown state for the current round.
///
/// `Paused` holds the remaining time so resume restores it exactly rather
/// than restarting the round at full duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundTimer {
    /// No round in progress.
    Idle,
    /// Counting down to the deadline.
    Running { deadline: Instant },
    /// Frozen mid-round with this much time left.
    Paused { remaining: Duration },
}

/// Outcome of closing a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundClose {
    /// The highest bidder won; wallet debited and squad entry created.
    Settled {
        session_player_id: SessionPlayerId,
        winner: UserId,
        price: Money,
    },
    /// No accepted bid; the player went unsold onto the reclaim list.
    Unsold { session_player_id: SessionPlayerId },
    /// The round was already resolved; nothing changed.
    AlreadyResolved,
}

/// One auction's complete mutable state.
#[derive(Debug)]
pub struct AuctionSession {
    auction: Auction,
    queue: SessionPlayerQueue,
    arbiter: BidArbiter,
    wallets: WalletLedger,
    squads: SquadRegistry,
    participants: BTreeMap<UserId, Participant>,
    timer: RoundTimer,
    round_epoch: u64,
}

impl AuctionSession {
    /// Create a session for a freshly created auction.
    pub fn new(auction: Auction) -> Self {
        let auction_id = auction.id;
        let cap = auction.max_squad_size;
        Self {
            auction,
            queue: SessionPlayerQueue::new(auction_id),
            arbiter: BidArbiter::new(),
            wallets: WalletLedger::new(auction_id),
            squads: SquadRegistry::new(auction_id, cap),
            participants: BTreeMap::new(),
            timer: RoundTimer::Idle,
            round_epoch: 0,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Read accessors
    // ─────────────────────────────────────────────────────────────────────

    /// The auction record.
    pub fn auction(&self) -> &Auction {
        &self.auction
    }

    /// Current status.
    pub fn status(&self) -> AuctionStatus {
        self.auction.status
    }

    /// The currently live player, if any.
    pub fn live_player(&self) -> Option<&SessionPlayer> {
        self.queue.live_player()
    }

    /// All session players in draw order.
    pub fn players(&self) -> &[SessionPlayer] {
        self.queue.players()
    }

    /// Append-only bid log.
    pub fn bids(&self) -> &[Bid] {
        self.arbiter.bids()
    }

    /// Wallet ledger.
    pub fn wallets(&self) -> &WalletLedger {
        &self.wallets
    }

    /// Squad registry.
    pub fn squads(&self) -> &SquadRegistry {
        &self.squads
    }

    /// Participants ordered by user id.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    /// The current round epoch. Bumped on every round boundary; a close
    /// attempt carrying a stale epoch is a no-op.
    pub fn round_epoch(&self) -> u64 {
        self.round_epoch
    }

    /// Deadline of the running round timer, if one is counting down.
    pub fn round_deadline(&self) -> Option<Instant> {
        match self.timer {
            RoundTimer::Running { deadline } => Some(deadline),
            _ => None,
        }
    }

    /// Whole seconds left in the current round.
    pub fn time_left_secs(&self, now: Instant) -> u64 {
        match self.timer {
            RoundTimer::Idle => 0,
            RoundTimer::Running { deadline } => deadline.saturating_duration_since(now).as_secs(),
            RoundTimer::Paused { remaining } => remaining.as_secs(),
        }
    }

    fn timer_expired(&self, now: Instant) -> bool {
        matches!(self.timer, RoundTimer::Running { deadline } if now >= deadline)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Membership
    // ─────────────────────────────────────────────────────────────────────

    /// Register a participant and open their wallet.
    ///
    /// Re-joining after a voluntary exit reactivates the participant with
    /// their existing wallet.
    pub fn join(&mut self, user_id: UserId, joined_at: Timestamp) -> Result<Participant> {
        if self.auction.status.is_ended() {
            return Err(EngineError::InvalidState("auction has ended".into()));
        }

        if let Some(existing) = self.participants.get_mut(&user_id) {
            return match existing.status {
                ParticipantStatus::Active => {
                    Err(EngineError::Validation(format!("{} already joined", user_id)))
                }
                ParticipantStatus::Exited => {
                    existing.status = ParticipantStatus::Active;
                    Ok(*existing)
                }
                ParticipantStatus::Completed => Err(EngineError::Validation(format!(
                    "{} has completed this auction",
                    user_id
                ))),
            };
        }

        let participant = Participant {
            auction_id: self.auction.id,
            user_id,
            status: ParticipantStatus::Active,
            joined_at,
        };
        self.participants.insert(user_id, participant);
        self.wallets.open(user_id, self.auction.initial_wallet);
        info!(auction = %self.auction.id, user = %user_id, "participant joined");
        Ok(participant)
    }

    /// Voluntary exit. Accepted bids stay durable; if the leaver holds the
    /// current highest bid it still stands.
    pub fn leave(&mut self, user_id: UserId) -> Result<Participant> {
        if self.auction.status.is_ended() {
            return Err(EngineError::InvalidState("auction has ended".into()));
        }
        let participant = self
            .participants
            .get_mut(&user_id)
            .ok_or(EngineError::UnknownParticipant(user_id))?;
        participant.status = ParticipantStatus::Exited;
        info!(auction = %self.auction.id, user = %user_id, "participant left");
        Ok(*participant)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queue management
    // ─────────────────────────────────────────────────────────────────────

    /// Draw a catalogue entry into the session queue.
    ///
    /// Returns false if the player is already in the session.
    pub fn draw_player(&mut self, id: SessionPlayerId, entry: PlayerPoolEntry) -> Result<bool> {
        if self.auction.status.is_ended() {
            return Err(EngineError::InvalidState("auction has ended".into()));
        }
        Ok(self.queue.draw(id, entry))
    }

    /// Re-queue every unsold player at the tail of the queue.
    pub fn reclaim_unsold(&mut self) -> Result<usize> {
        if self.auction.status.is_ended() {
            return Err(EngineError::InvalidState("auction has ended".into()));
        }
        let n = self.queue.reclaim_all();
        if n > 0 {
            info!(auction = %self.auction.id, count = n, "unsold players re-queued");
        }
        Ok(n)
    }

    // ─────────────────────────────────────────────────────────────────────
    // State machine transitions
    // ─────────────────────────────────────────────────────────────────────

    /// NOT_STARTED → RUNNING. Requires at least one active participant and
    /// a non-empty queue. The first round still needs an explicit
    /// `next_player`.
    pub fn start(&mut self) -> Result<()> {
        if self.auction.status != AuctionStatus::NotStarted {
            return Err(EngineError::InvalidState(format!(
                "cannot start from {}",
                self.auction.status
            )));
        }
        if !self.participants.values().any(|p| p.is_active()) {
            return Err(EngineError::InvalidState(
                "cannot start without registered participants".into(),
            ));
        }
        if self.queue.pending_len() == 0 {
            return Err(EngineError::InvalidState(
                "cannot start with an empty player queue".into(),
            ));
        }

        self.auction.status = AuctionStatus::Running;
        info!(auction = %self.auction.id, "auction started");
        Ok(())
    }

    /// RUNNING → PAUSED, freezing the round timer at its remaining time.
    pub fn pause(&mut self, now: Instant) -> Result<()> {
        if self.auction.status != AuctionStatus::Running {
            return Err(EngineError::InvalidState(format!(
                "cannot pause from {}",
                self.auction.status
            )));
        }

        if let RoundTimer::Running { deadline } = self.timer {
            self.timer = RoundTimer::Paused {
                remaining: deadline.saturating_duration_since(now),
            };
        }
        self.auction.status = AuctionStatus::Paused;
        info!(auction = %self.auction.id, "auction paused");
        Ok(())
    }

    /// PAUSED → RUNNING, restoring the timer with the frozen remaining
    /// time rather than the full round duration.
    pub fn resume(&mut self, now: Instant) -> Result<()> {
        if self.auction.status != AuctionStatus::Paused {
            return Err(EngineError::InvalidState(format!(
                "cannot resume from {}",
                self.auction.status
            )));
        }

        if let RoundTimer::Paused { remaining } = self.timer {
            self.timer = RoundTimer::Running {
                deadline: now + remaining,
            };
        }
        self.auction.status = AuctionStatus::Running;
        info!(auction = %self.auction.id, "auction resumed");
        Ok(())
    }

    /// Draw the next queued player live and start its round timer.
    ///
    /// Valid only while running with no unresolved live player. Returns
    /// `None` when the queue is exhausted (a no-op, not an error).
    pub fn next_player(&mut self, now: Instant) -> Result<Option<SessionPlayer>> {
        if self.auction.status != AuctionStatus::Running {
            return Err(EngineError::InvalidState(format!(
                "cannot draw next player from {}",
                self.auction.status
            )));
        }
        if let Some(live) = self.queue.live_player() {
            return Err(EngineError::InvalidState(format!(
                "{} is still live; close the round first",
                live.id
            )));
        }

        self.round_epoch += 1;
        match self.queue.pop_next_live() {
            Some(player) => {
                let player = player.clone();
                self.arbiter.reset_round();
                self.timer = RoundTimer::Running {
                    deadline: now + Duration::from_secs(self.auction.bid_timer_secs),
                };
                info!(
                    auction = %self.auction.id,
                    player = %player.id,
                    name = %player.pool.name,
                    base = %player.pool.base_price,
                    "player live"
                );
                Ok(Some(player))
            }
            None => {
                self.timer = RoundTimer::Idle;
                Ok(None)
            }
        }
    }

    /// Close the current round: settle a sale if there is an accepted
    /// highest bid, otherwise mark the player unsold.
    ///
    /// Idempotent: closing an already-resolved round returns
    /// [`RoundClose::AlreadyResolved`] and mutates nothing.
    pub fn close_round(&mut self) -> Result<RoundClose> {
        if self.auction.status != AuctionStatus::Running {
            return Err(EngineError::InvalidState(format!(
                "cannot close a round from {}",
                self.auction.status
            )));
        }
        let Some(live) = self.queue.live_player() else {
            return Ok(RoundClose::AlreadyResolved);
        };
        let live_id = live.id;

        self.round_epoch += 1;
        self.timer = RoundTimer::Idle;

        match self.arbiter.highest() {
            Some((winner, price)) => match self.settle_sale(live_id, winner, price) {
                Ok(()) => Ok(RoundClose::Settled {
                    session_player_id: live_id,
                    winner,
                    price,
                }),
                Err(err) => {
                    // Settlement raced out from under the accepted bid
                    // (funds or cap changed between submit and close); the
                    // player reverts to unsold rather than half-settled.
                    warn!(
                        auction = %self.auction.id,
                        player = %live_id,
                        %err,
                        "settlement failed; player goes unsold"
                    );
                    self.queue.mark_unsold(live_id)?;
                    Ok(RoundClose::Unsold {
                        session_player_id: live_id,
                    })
                }
            },
            None => {
                self.queue.mark_unsold(live_id)?;
                info!(auction = %self.auction.id, player = %live_id, "round closed unsold");
                Ok(RoundClose::Unsold {
                    session_player_id: live_id,
                })
            }
        }
    }

    /// Timer-driven close. A no-op unless the given epoch is still current,
    /// the auction is running, and the round deadline has actually passed —
    /// which collapses a timer/admin race into one logical close.
    pub fn close_if_expired(&mut self, epoch: u64, now: Instant) -> Result<RoundClose> {
        if epoch != self.round_epoch || self.auction.status != AuctionStatus::Running {
            return Ok(RoundClose::AlreadyResolved);
        }
        if !self.timer_expired(now) {
            return Ok(RoundClose::AlreadyResolved);
        }
        self.close_round()
    }

    /// End the auction from any non-ended state. An unresolved live player
    /// is discarded as unsold with no settlement and no wallet debit.
    pub fn end(&mut self, ended_at: Timestamp) -> Result<()> {
        if self.auction.status.is_ended() {
            return Err(EngineError::InvalidState("auction already ended".into()));
        }

        if let Some(live) = self.queue.live_player() {
            let live_id = live.id;
            warn!(
                auction = %self.auction.id,
                player = %live_id,
                "auction ended with unresolved live player; discarding as unsold"
            );
            self.queue.mark_unsold(live_id)?;
        }

        self.auction.status = AuctionStatus::Ended;
        self.auction.ended_at = Some(ended_at);
        self.timer = RoundTimer::Idle;
        self.round_epoch += 1;
        for participant in self.participants.values_mut() {
            if participant.status == ParticipantStatus::Active {
                participant.status = ParticipantStatus::Completed;
            }
        }
        info!(auction = %self.auction.id, "auction ended");
        Ok(())
    }

    /// Destructive reset back to NOT_STARTED: clears session players, bids,
    /// and squads, and restores every wallet to its initial purse.
    /// Participants persist. Invalid once ended.
    pub fn reset(&mut self) -> Result<()> {
        if self.auction.status.is_ended() {
            return Err(EngineError::InvalidState(
                "cannot reset an ended auction".into(),
            ));
        }

        warn!(
            auction = %self.auction.id,
            players = self.queue.players().len(),
            bids = self.arbiter.bids().len(),
            "resetting auction; all session state is being discarded"
        );

        self.queue.clear();
        self.arbiter.clear();
        self.squads.clear();
        self.wallets.restore_all();
        for participant in self.participants.values_mut() {
            if participant.status == ParticipantStatus::Completed {
                participant.status = ParticipantStatus::Active;
            }
        }
        self.auction.status = AuctionStatus::NotStarted;
        self.timer = RoundTimer::Idle;
        self.round_epoch += 1;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Bidding
    // ─────────────────────────────────────────────────────────────────────

    /// Submit a bid attempt against the live player.
    ///
    /// On acceptance the published highest bid is updated and, if less than
    /// the anti-snipe window remains, the deadline is pushed back out to it.
    pub fn submit_bid(
        &mut self,
        user_id: UserId,
        session_player_id: SessionPlayerId,
        amount: Money,
        now: Instant,
    ) -> Result<Bid> {
        let participant = self
            .participants
            .get(&user_id)
            .ok_or(EngineError::UnknownParticipant(user_id))?;
        if participant.status == ParticipantStatus::Exited {
            return Err(EngineError::InvalidState(format!(
                "{} has exited the auction",
                user_id
            )));
        }

        let checks = BidChecks {
            status: self.auction.status,
            live: self.queue.live_player(),
            timer_expired: self.timer_expired(now),
            squad_count: self.squads.count(user_id),
            squad_cap: self.auction.max_squad_size,
            wallet_balance: self.wallets.balance(user_id)?,
            min_increment: self.auction.min_increment,
        };

        let bid = self.arbiter.submit(
            self.auction.id,
            session_player_id,
            user_id,
            amount,
            checks,
        )?;
        self.queue.record_bid(session_player_id, user_id, amount)?;

        // Anti-snipe: a late accepted bid guarantees the room at least the
        // grace window to respond.
        let grace = Duration::from_secs(self.auction.anti_snipe_secs);
        if !grace.is_zero()
            && let RoundTimer::Running { deadline } = &mut self.timer
            && deadline.saturating_duration_since(now) < grace
        {
            *deadline = now + grace;
        }

        Ok(bid)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Settlement
    // ─────────────────────────────────────────────────────────────────────

    /// The single write path into wallets and squads: debit + squad entry +
    /// SOLD status as one unit. Preconditions are re-validated first so the
    /// mutations cannot partially apply; a failure after the debit is a
    /// logic bug, rolled back and reported as an invariant violation.
    fn settle_sale(
        &mut self,
        session_player_id: SessionPlayerId,
        winner: UserId,
        price: Money,
    ) -> Result<()> {
        // Re-check both preconditions at settlement time.
        let balance = self.wallets.balance(winner)?;
        if balance < price {
            return Err(EngineError::InsufficientFunds { balance });
        }
        if self.squads.is_full(winner) {
            return Err(EngineError::SquadFull {
                cap: self.squads.cap(),
            });
        }

        let remaining = self.wallets.debit(winner, price)?;
        if let Err(err) = self.squads.add_player(winner, session_player_id, price) {
            self.wallets.refund(winner, price);
            let detail = format!(
                "squad insert failed after wallet debit for {}: {}",
                winner, err
            );
            error!(auction = %self.auction.id, "{}", detail);
            return Err(EngineError::InvariantViolation(detail));
        }
        self.queue.mark_sold(session_player_id, winner, price)?;

        if self.squads.is_full(winner)
            && let Some(participant) = self.participants.get_mut(&winner)
        {
            participant.status = ParticipantStatus::Completed;
        }

        info!(
            auction = %self.auction.id,
            player = %session_player_id,
            winner = %winner,
            price = %price,
            balance = %remaining,
            "sale settled"
        );
        Ok(())
    }
}
