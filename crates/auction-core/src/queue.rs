//! Ordered queue of players drawn into one auction.
//!
//! Owns every `SessionPlayer` of the session, the pending draw order, and
//! the reclaim list of unsold players. At most one player is live at any
//! instant; the session state machine is the only caller that changes that.

use std::collections::{HashMap, VecDeque};

use types::{AuctionId, Money, PlayerPoolEntry, PlayerStatus, SessionPlayer, SessionPlayerId, UserId};

use crate::error::{EngineError, Result};

/// Session players of one auction with draw order and reclaim list.
#[derive(Debug, Clone, Default)]
pub struct SessionPlayerQueue {
    auction_id: AuctionId,
    players: Vec<SessionPlayer>,
    index: HashMap<SessionPlayerId, usize>,
    pending: VecDeque<SessionPlayerId>,
    reclaim: Vec<SessionPlayerId>,
    live: Option<SessionPlayerId>,
}

impl SessionPlayerQueue {
    /// Create an empty queue for an auction.
    pub fn new(auction_id: AuctionId) -> Self {
        Self {
            auction_id,
            players: Vec::new(),
            index: HashMap::new(),
            pending: VecDeque::new(),
            reclaim: Vec::new(),
            live: None,
        }
    }

    /// Draw a catalogue entry into the session as a pending player.
    ///
    /// Returns false without drawing if an entry with the same identity
    /// (code, else name + country) is already in the session.
    pub fn draw(&mut self, id: SessionPlayerId, entry: PlayerPoolEntry) -> bool {
        let duplicate = self.players.iter().any(|p| match (&p.pool.code, &entry.code) {
            (Some(a), Some(b)) => a == b,
            _ => p.pool.name == entry.name && p.pool.country == entry.country,
        });
        if duplicate {
            return false;
        }

        let player = SessionPlayer::pending(id, self.auction_id, entry);
        self.index.insert(id, self.players.len());
        self.players.push(player);
        self.pending.push_back(id);
        true
    }

    /// Look up a session player.
    pub fn get(&self, id: SessionPlayerId) -> Result<&SessionPlayer> {
        self.index
            .get(&id)
            .map(|&i| &self.players[i])
            .ok_or(EngineError::UnknownPlayer(id))
    }

    fn get_mut(&mut self, id: SessionPlayerId) -> Result<&mut SessionPlayer> {
        match self.index.get(&id) {
            Some(&i) => Ok(&mut self.players[i]),
            None => Err(EngineError::UnknownPlayer(id)),
        }
    }

    /// The currently live player, if any.
    pub fn live_player(&self) -> Option<&SessionPlayer> {
        self.live.and_then(|id| self.index.get(&id)).map(|&i| &self.players[i])
    }

    /// Number of players still waiting to be drawn live.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of unsold players eligible for reclaim.
    pub fn reclaim_len(&self) -> usize {
        self.reclaim.len()
    }

    /// Pop the next queued player and mark it live.
    ///
    /// Returns `None` when the queue is exhausted. The caller must have
    /// resolved any prior live player first.
    pub fn pop_next_live(&mut self) -> Option<&SessionPlayer> {
        debug_assert!(self.live.is_none(), "previous live player unresolved");

        let id = self.pending.pop_front()?;
        self.live = Some(id);
        let i = self.index[&id];
        let player = &mut self.players[i];
        player.status = PlayerStatus::Live;
        Some(&self.players[i])
    }

    /// Record an accepted bid on the live player.
    pub fn record_bid(&mut self, id: SessionPlayerId, bidder: UserId, amount: Money) -> Result<()> {
        let player = self.get_mut(id)?;
        player.current_bid = Some(amount);
        player.current_bidder = Some(bidder);
        Ok(())
    }

    /// Settle the live player as sold and release the live slot.
    pub fn mark_sold(&mut self, id: SessionPlayerId, winner: UserId, price: Money) -> Result<()> {
        let player = self.get_mut(id)?;
        player.status = PlayerStatus::Sold;
        player.sale_price = Some(price);
        player.sold_to = Some(winner);
        self.live = None;
        Ok(())
    }

    /// Resolve the live player as unsold, placing it on the reclaim list,
    /// and release the live slot.
    pub fn mark_unsold(&mut self, id: SessionPlayerId) -> Result<()> {
        let player = self.get_mut(id)?;
        player.status = PlayerStatus::Unsold;
        player.current_bid = None;
        player.current_bidder = None;
        if self.live == Some(id) {
            self.live = None;
        }
        self.reclaim.push(id);
        Ok(())
    }

    /// Re-queue every unsold player at the tail of the queue.
    ///
    /// Re-queued players carry `Reclaimed` status until drawn live again.
    /// Returns the number of players re-queued.
    pub fn reclaim_all(&mut self) -> usize {
        let ids = std::mem::take(&mut self.reclaim);
        let n = ids.len();
        for id in ids {
            if let Some(&i) = self.index.get(&id) {
                self.players[i].status = PlayerStatus::Reclaimed;
                self.pending.push_back(id);
            }
        }
        n
    }

    /// All session players in draw order.
    pub fn players(&self) -> &[SessionPlayer] {
        &self.players
    }

    /// Drop all session players. Reset path only.
    pub fn clear(&mut self) {
        self.players.clear();
        self.index.clear();
        self.pending.clear();
        self.reclaim.clear();
        self.live = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{Category, SkillType};

    fn entry(code: &str, name: &str) -> PlayerPoolEntry {
        PlayerPoolEntry {
            code: Some(code.into()),
            name: name.into(),
            country: "India".into(),
            skill: SkillType::Batsman,
            category: Category::Gold,
            base_price: Money::from_float(2.0),
        }
    }

    fn queue_with(codes: &[&str]) -> SessionPlayerQueue {
        let mut queue = SessionPlayerQueue::new(AuctionId(1));
        for (i, code) in codes.iter().enumerate() {
            assert!(queue.draw(SessionPlayerId(i as u64 + 1), entry(code, code)));
        }
        queue
    }

    #[test]
    fn test_draw_order_is_fifo() {
        let mut queue = queue_with(&["A", "B"]);

        let first = queue.pop_next_live().unwrap();
        assert_eq!(first.pool.code.as_deref(), Some("A"));
        assert_eq!(first.status, PlayerStatus::Live);

        queue.mark_unsold(SessionPlayerId(1)).unwrap();
        let second = queue.pop_next_live().unwrap();
        assert_eq!(second.pool.code.as_deref(), Some("B"));
    }

    #[test]
    fn test_duplicate_draw_is_rejected() {
        let mut queue = queue_with(&["A"]);
        assert!(!queue.draw(SessionPlayerId(99), entry("A", "other name")));
        assert_eq!(queue.players().len(), 1);
    }

    #[test]
    fn test_only_one_live_at_a_time() {
        let mut queue = queue_with(&["A", "B", "C"]);
        queue.pop_next_live().unwrap();

        let live: Vec<_> = queue
            .players()
            .iter()
            .filter(|p| p.status == PlayerStatus::Live)
            .collect();
        assert_eq!(live.len(), 1);

        queue.mark_sold(SessionPlayerId(1), UserId(5), Money::from_float(4.0)).unwrap();
        assert!(queue.live_player().is_none());
    }

    #[test]
    fn test_unsold_then_reclaim_goes_to_tail() {
        let mut queue = queue_with(&["A", "B"]);

        queue.pop_next_live().unwrap();
        queue.mark_unsold(SessionPlayerId(1)).unwrap();
        assert_eq!(queue.reclaim_len(), 1);

        assert_eq!(queue.reclaim_all(), 1);
        assert_eq!(queue.reclaim_len(), 0);
        assert_eq!(queue.get(SessionPlayerId(1)).unwrap().status, PlayerStatus::Reclaimed);

        // B is still ahead; the reclaimed A comes back after it.
        assert_eq!(queue.pop_next_live().unwrap().id, SessionPlayerId(2));
        queue.mark_unsold(SessionPlayerId(2)).unwrap();
        assert_eq!(queue.pop_next_live().unwrap().id, SessionPlayerId(1));
    }

    #[test]
    fn test_sold_clears_nothing_but_live_slot() {
        let mut queue = queue_with(&["A"]);
        queue.pop_next_live().unwrap();
        queue.record_bid(SessionPlayerId(1), UserId(3), Money::from_float(6.0)).unwrap();
        queue.mark_sold(SessionPlayerId(1), UserId(3), Money::from_float(6.0)).unwrap();

        let player = queue.get(SessionPlayerId(1)).unwrap();
        assert_eq!(player.status, PlayerStatus::Sold);
        assert_eq!(player.sale_price, Some(Money::from_float(6.0)));
        assert_eq!(player.sold_to, Some(UserId(3)));
    }

    #[test]
    fn test_exhausted_queue() {
        let mut queue = queue_with(&[]);
        assert!(queue.pop_next_live().is_none());
    }
}
