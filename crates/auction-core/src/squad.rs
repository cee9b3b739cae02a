//! Per-auction squad registry.
//!
//! Records which session players each participant has won. Entries are
//! created only at sale settlement, coupled with the wallet debit.

use std::collections::HashMap;

use types::{AuctionId, Money, SessionPlayerId, SquadEntry, UserId};

use crate::error::{EngineError, Result};

/// Won players per participant, capped at the auction's squad size.
#[derive(Debug, Clone, Default)]
pub struct SquadRegistry {
    auction_id: AuctionId,
    cap: usize,
    entries: Vec<SquadEntry>,
    counts: HashMap<UserId, usize>,
}

impl SquadRegistry {
    /// Create an empty registry with the given cap.
    pub fn new(auction_id: AuctionId, cap: usize) -> Self {
        Self {
            auction_id,
            cap,
            entries: Vec::new(),
            counts: HashMap::new(),
        }
    }

    /// The squad cap.
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Number of players a user has won.
    pub fn count(&self, user_id: UserId) -> usize {
        self.counts.get(&user_id).copied().unwrap_or(0)
    }

    /// Check if a user's squad is at the cap.
    pub fn is_full(&self, user_id: UserId) -> bool {
        self.count(user_id) >= self.cap
    }

    /// Atomically append a won player to a user's squad.
    ///
    /// Fails with `SquadFull` at the cap. Settlement is the only caller.
    pub fn add_player(
        &mut self,
        user_id: UserId,
        session_player_id: SessionPlayerId,
        price: Money,
    ) -> Result<()> {
        if self.is_full(user_id) {
            return Err(EngineError::SquadFull { cap: self.cap });
        }

        self.entries.push(SquadEntry {
            auction_id: self.auction_id,
            user_id,
            session_player_id,
            price,
        });
        *self.counts.entry(user_id).or_insert(0) += 1;
        Ok(())
    }

    /// All squad entries in settlement order.
    pub fn entries(&self) -> &[SquadEntry] {
        &self.entries
    }

    /// Squad entries for one user, in settlement order.
    pub fn entries_for(&self, user_id: UserId) -> impl Iterator<Item = &SquadEntry> {
        self.entries.iter().filter(move |e| e.user_id == user_id)
    }

    /// Total purchase spend for one user.
    pub fn spend_for(&self, user_id: UserId) -> Money {
        self.entries_for(user_id).map(|e| e.price).sum()
    }

    /// Drop every entry. Reset path only.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.counts.clear();
    }
}
