//! Round deadline watcher.
//!
//! The engine owns the round timer as data; this module is the alarm clock.
//! One task per running round sleeps until the deadline, re-reads it (an
//! anti-snipe extension moves it), and finally funnels into the engine's
//! idempotent epoch-checked close. A stale epoch — the round was closed by
//! an admin, paused, reset, or ended — makes the task exit without effect,
//! so a timer firing can never double-settle a round.

use std::sync::Arc;
use std::time::Instant;

use auction_core::{AuctionEngine, RoundClose};
use tracing::{debug, info, warn};
use types::AuctionId;

/// Watch the currently running round of an auction, if any, and close it
/// when its deadline passes.
///
/// Call after any operation that leaves a round counting down: drawing a
/// player live, or resuming a paused auction. Spawning twice for the same
/// round is harmless; the close is idempotent.
pub fn spawn_round_watcher(engine: Arc<AuctionEngine>, auction_id: AuctionId) {
    let Ok(Some(round)) = engine.round_deadline(auction_id) else {
        return;
    };
    let epoch = round.epoch;
    let mut deadline = round.deadline;

    tokio::spawn(async move {
        loop {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;

            // Re-read before closing: a late bid may have pushed the
            // deadline, or the round may be gone entirely.
            match engine.round_deadline(auction_id) {
                Ok(Some(current)) if current.epoch == epoch => {
                    if current.deadline > Instant::now() {
                        deadline = current.deadline;
                        continue;
                    }
                }
                // Paused, resolved, reset, ended, or auction deleted.
                _ => return,
            }

            match engine.close_round_if_expired(auction_id, epoch) {
                Ok(RoundClose::Settled {
                    session_player_id,
                    winner,
                    price,
                }) => {
                    info!(
                        auction = %auction_id,
                        player = %session_player_id,
                        winner = %winner,
                        price = %price,
                        "round timer expired; sale settled"
                    );
                }
                Ok(RoundClose::Unsold { session_player_id }) => {
                    info!(
                        auction = %auction_id,
                        player = %session_player_id,
                        "round timer expired; player unsold"
                    );
                }
                Ok(RoundClose::AlreadyResolved) => {
                    debug!(auction = %auction_id, "round already resolved before timer close");
                }
                Err(err) => {
                    warn!(auction = %auction_id, %err, "timer-driven close failed");
                }
            }
            return;
        }
    });
}
