//! Integration tests driving a full auction through the engine facade.
//!
//! Covers the end-to-end flow — import, create, join, draw, bid, settle,
//! reclaim, end — plus the serialization guarantee under concurrent
//! bidders.

use std::sync::Arc;
use std::thread;

use auction_core::{
    AuctionEngine, CreateAuctionParams, EngineError, ImportRow, RoundClose,
};
use types::{AuctionStatus, Money, ParticipantStatus, UserId};

fn row(code: &str, name: &str, category: &str, base: f64) -> ImportRow {
    ImportRow {
        code: Some(code.into()),
        name: name.into(),
        country: "India".into(),
        skill: "Batsman".into(),
        category: category.into(),
        base_price: base,
    }
}

fn params(name: &str) -> CreateAuctionParams {
    CreateAuctionParams {
        name: name.into(),
        max_squad_size: Some(2),
        initial_wallet: Money::from_float(50.0),
        bid_timer_secs: 60,
        min_increment: Money::from_float(0.5),
        anti_snipe_secs: Some(0),
    }
}

#[test]
fn test_full_auction_flow() {
    let engine = AuctionEngine::new("secret");
    let admin = engine.authorize(Some("secret"));

    // Import a small roster; one bad row must not abort the batch.
    let report = engine
        .import_players(
            &admin,
            &[
                row("P1", "R. Sharma", "Legend", 2.0),
                row("P2", "J. Bumrah", "Silver", 2.0),
                row("P3", "S. Gill", "Platinum", 1.5),
                row("P4", "K. Rahul", "Gold", 1.0),
            ],
        )
        .unwrap();
    assert_eq!(report.inserted, 3);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].row, 1);

    // Create, join, draw, start.
    let auction = engine.create_auction(&admin, params("Season 7")).unwrap();
    engine.join(auction.id, UserId(10)).unwrap();
    engine.join(auction.id, UserId(20)).unwrap();
    assert_eq!(engine.draw_players(&admin, auction.id, None).unwrap(), 3);
    engine.start(&admin, auction.id).unwrap();

    // Round 1: contested sale.
    let live = engine.next_player(&admin, auction.id).unwrap().unwrap();
    engine
        .submit_bid(auction.id, UserId(10), live.id, Money::from_float(2.0))
        .unwrap();
    engine
        .submit_bid(auction.id, UserId(20), live.id, Money::from_float(3.0))
        .unwrap();
    let err = engine
        .submit_bid(auction.id, UserId(10), live.id, Money::from_float(3.25))
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::BidTooLow {
            floor: Money::from_float(3.5)
        }
    );

    let close = engine.close_round(&admin, auction.id).unwrap();
    assert_eq!(
        close,
        RoundClose::Settled {
            session_player_id: live.id,
            winner: UserId(20),
            price: Money::from_float(3.0),
        }
    );

    // Round 2: no bids, unsold, reclaimed to the tail.
    let live2 = engine.next_player(&admin, auction.id).unwrap().unwrap();
    let close = engine.close_round(&admin, auction.id).unwrap();
    assert_eq!(
        close,
        RoundClose::Unsold {
            session_player_id: live2.id
        }
    );
    assert_eq!(engine.reclaim_unsold(&admin, auction.id).unwrap(), 1);

    // Summary mid-auction is consistent.
    let summary = engine.summary(auction.id).unwrap();
    assert_eq!(summary.players.sold, 1);
    assert_eq!(summary.players.reclaimed, 1);
    assert_eq!(summary.top_spenders[0].user_id, UserId(20));
    assert_eq!(summary.top_spenders[0].spent, Money::from_float(3.0));

    // Round 3 live, then end mid-round: player discarded unsold, no debit.
    let live3 = engine.next_player(&admin, auction.id).unwrap().unwrap();
    engine
        .submit_bid(auction.id, UserId(10), live3.id, Money::from_float(2.0))
        .unwrap();
    engine.end(&admin, auction.id).unwrap();

    let state = engine.live_state(auction.id).unwrap();
    assert_eq!(state.auction.status, AuctionStatus::Ended);
    assert!(state.auction.ended_at.is_some());
    assert!(state.live_player.is_none());

    let summary = engine.summary(auction.id).unwrap();
    assert_eq!(summary.players.sold, 1);
    assert_eq!(summary.players.unsold, 1);
    // User 10 never won anything and keeps a full purse.
    let spender = summary
        .top_spenders
        .iter()
        .find(|s| s.user_id == UserId(10))
        .unwrap();
    assert_eq!(spender.spent, Money::ZERO);

    // Ended auctions are immutable.
    assert!(matches!(
        engine.start(&admin, auction.id).unwrap_err(),
        EngineError::InvalidState(_)
    ));
    assert!(matches!(
        engine.reset(&admin, auction.id).unwrap_err(),
        EngineError::InvalidState(_)
    ));
}

#[test]
fn test_wallet_conservation_across_sales() {
    let engine = AuctionEngine::new("secret");
    let admin = engine.authorize(Some("secret"));
    engine
        .import_players(
            &admin,
            &[
                row("P1", "A", "Gold", 1.0),
                row("P2", "B", "Gold", 1.0),
                row("P3", "C", "Gold", 1.0),
                row("P4", "D", "Gold", 1.0),
            ],
        )
        .unwrap();

    let auction = engine.create_auction(&admin, params("Conservation")).unwrap();
    engine.join(auction.id, UserId(1)).unwrap();
    engine.join(auction.id, UserId(2)).unwrap();
    engine.draw_players(&admin, auction.id, None).unwrap();
    engine.start(&admin, auction.id).unwrap();

    // User 1 wins two players (hitting the cap), user 2 wins one.
    for (user, amount) in [(UserId(1), 4.0), (UserId(2), 6.5), (UserId(1), 2.0)] {
        let live = engine.next_player(&admin, auction.id).unwrap().unwrap();
        engine
            .submit_bid(auction.id, user, live.id, Money::from_float(amount))
            .unwrap();
        engine.close_round(&admin, auction.id).unwrap();
    }

    let summary = engine.summary(auction.id).unwrap();
    for spender in &summary.top_spenders {
        assert_eq!(
            spender.spent + spender.balance,
            Money::from_float(50.0),
            "spend plus balance must equal the initial purse for {}",
            spender.user_id
        );
    }

    // User 1 is at the cap of 2: completed, and further bids rejected.
    let participants = engine.participants(auction.id).unwrap();
    let full = participants
        .iter()
        .find(|p| p.user_id == UserId(1))
        .unwrap();
    assert_eq!(full.status, ParticipantStatus::Completed);
    assert!(!full.is_active);

    // A fourth player goes live; the capped user can afford it but is
    // rejected with SquadFull all the same.
    let live = engine.next_player(&admin, auction.id).unwrap().unwrap();
    let err = engine
        .submit_bid(auction.id, UserId(1), live.id, Money::from_float(2.0))
        .unwrap_err();
    assert_eq!(err, EngineError::SquadFull { cap: 2 });
}

#[test]
fn test_concurrent_bids_serialize_strictly() {
    let engine = Arc::new(AuctionEngine::new("secret"));
    let admin = engine.authorize(Some("secret"));
    engine
        .import_players(&admin, &[row("P1", "A", "Gold", 1.0)])
        .unwrap();

    let auction = engine
        .create_auction(
            &admin,
            CreateAuctionParams {
                name: "Race".into(),
                max_squad_size: Some(13),
                initial_wallet: Money::from_float(10_000.0),
                bid_timer_secs: 600,
                min_increment: Money::from_float(1.0),
                anti_snipe_secs: Some(0),
            },
        )
        .unwrap();
    for user in 1..=8 {
        engine.join(auction.id, UserId(user)).unwrap();
    }
    engine.draw_players(&admin, auction.id, None).unwrap();
    engine.start(&admin, auction.id).unwrap();
    let live_id = engine.next_player(&admin, auction.id).unwrap().unwrap().id;

    // Eight bidders hammer the same live player with rising amounts. Many
    // attempts lose the race and get rejected; every accepted bid must
    // still be strictly increasing in both amount and sequence number.
    let handles: Vec<_> = (1..=8u64)
        .map(|user| {
            let engine = Arc::clone(&engine);
            let auction_id = auction.id;
            thread::spawn(move || {
                for step in 0..50u64 {
                    let amount = Money::from_float((step * 8 + user) as f64);
                    let _ = engine.submit_bid(auction_id, UserId(user), live_id, amount);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let state = engine.live_state(auction.id).unwrap();
    let highest = state.live_player.unwrap().current_bid.unwrap();
    assert!(highest.is_positive());

    let close = engine.close_round(&admin, auction.id).unwrap();
    match close {
        RoundClose::Settled { price, winner, .. } => {
            assert_eq!(price, highest);
            let summary = engine.summary(auction.id).unwrap();
            let spender = summary
                .top_spenders
                .iter()
                .find(|s| s.user_id == winner)
                .unwrap();
            assert_eq!(spender.spent, price);
        }
        other => panic!("expected a settled sale, got {:?}", other),
    }

    // A second close is a pure no-op.
    assert_eq!(
        engine.close_round(&admin, auction.id).unwrap(),
        RoundClose::AlreadyResolved
    );

    let summary = engine.summary(auction.id).unwrap();
    assert_eq!(summary.players.sold, 1);
    assert_eq!(summary.players.live, 0);
}

#[test]
fn test_reset_is_explicit_and_recoverable() {
    let engine = AuctionEngine::new("secret");
    let admin = engine.authorize(Some("secret"));
    engine
        .import_players(&admin, &[row("P1", "A", "Gold", 1.0)])
        .unwrap();

    let auction = engine.create_auction(&admin, params("Resettable")).unwrap();
    engine.join(auction.id, UserId(1)).unwrap();
    engine.draw_players(&admin, auction.id, None).unwrap();
    engine.start(&admin, auction.id).unwrap();

    let live = engine.next_player(&admin, auction.id).unwrap().unwrap();
    engine
        .submit_bid(auction.id, UserId(1), live.id, Money::from_float(5.0))
        .unwrap();
    engine.close_round(&admin, auction.id).unwrap();

    engine.reset(&admin, auction.id).unwrap();

    let state = engine.live_state(auction.id).unwrap();
    assert_eq!(state.auction.status, AuctionStatus::NotStarted);
    let summary = engine.summary(auction.id).unwrap();
    assert_eq!(summary.players.sold + summary.players.pending, 0);
    assert_eq!(summary.top_spenders[0].spent, Money::ZERO);

    // The auction is reusable: draw and run again.
    assert_eq!(engine.draw_players(&admin, auction.id, None).unwrap(), 1);
    engine.start(&admin, auction.id).unwrap();
    engine.next_player(&admin, auction.id).unwrap().unwrap();
}
