//! Chip conservation under settlement, checked over randomized hands.

use std::collections::HashMap;

use proptest::prelude::*;

use tourney_poker::game::deal::Dealer;
use tourney_poker::game::entities::{Chips, Player, Username};
use tourney_poker::game::settlement::settle;
use tourney_poker::scoring::{RankScorer, ScoredHand, Scorer};
use tourney_poker::SeatIndex;

fn seated_players(commitments: &[Chips], extras: &[Chips]) -> Vec<Player> {
    commitments
        .iter()
        .zip(extras)
        .enumerate()
        .map(|(seat, (&committed, &extra))| {
            let mut player = Player::new(Username::new(&format!("bot{seat}")), String::new());
            player.seat = Some(seat);
            player.committed = committed;
            player.chips = committed + extra;
            player
        })
        .collect()
}

fn real_scores(seats: usize) -> HashMap<SeatIndex, ScoredHand> {
    let mut dealer = Dealer::new();
    let pockets = dealer.deal_pockets(seats).unwrap().to_vec();
    dealer.deal_flop().unwrap();
    dealer.deal_street().unwrap();
    dealer.deal_street().unwrap();
    pockets
        .iter()
        .map(|p| (p.seat, RankScorer.score(&p.cards, dealer.board())))
        .collect()
}

proptest! {
    #[test]
    fn settlement_conserves_chips(
        commitments in prop::collection::vec(0u32..=1_000, 2..=9),
        extra_seed in prop::collection::vec(0u32..=500, 9),
    ) {
        let seats = commitments.len();
        let extras = &extra_seed[..seats];
        let mut players = seated_players(&commitments, extras);
        let before: Chips = players.iter().map(|p| p.chips).sum();
        let pot: Chips = commitments.iter().sum();

        let scores = real_scores(seats);
        let results = settle(&mut players, &scores).unwrap();

        let after: Chips = players.iter().map(|p| p.chips).sum();
        let distributed: Chips = results.iter().map(|r| r.winnings).sum();
        prop_assert_eq!(after, before);
        prop_assert_eq!(distributed, pot);
        prop_assert!(players.iter().all(|p| p.committed == 0));
        prop_assert_eq!(results.len(), seats);
    }

    #[test]
    fn settlement_conserves_chips_with_folds(
        commitments in prop::collection::vec(1u32..=1_000, 3..=9),
        folded_mask in prop::collection::vec(any::<bool>(), 9),
    ) {
        let seats = commitments.len();
        let extras = vec![100; seats];
        let mut players = seated_players(&commitments, &extras);
        // Fold per the mask but always leave seat 0 live.
        for (i, player) in players.iter_mut().enumerate().skip(1) {
            if folded_mask[i] {
                player.active = false;
            }
        }
        let before: Chips = players.iter().map(|p| p.chips).sum();

        let scores = real_scores(seats);
        let results = settle(&mut players, &scores).unwrap();

        let after: Chips = players.iter().map(|p| p.chips).sum();
        prop_assert_eq!(after, before);
        prop_assert!(players.iter().all(|p| p.committed == 0));
        prop_assert!(results.len() <= seats);
        // Folded players never collect.
        for result in &results {
            prop_assert!(players.iter().any(|p| p.name == result.name && p.active));
        }
    }

    #[test]
    fn no_winner_exceeds_cap(
        commitments in prop::collection::vec(1u32..=1_000, 2..=9),
    ) {
        let seats = commitments.len();
        let extras = vec![0; seats];
        let mut players = seated_players(&commitments, &extras);
        let scores = real_scores(seats);
        let results = settle(&mut players, &scores).unwrap();
        // A winner's take caps at their commitment from each player.
        for result in &results {
            let cap: Chips = commitments
                .iter()
                .map(|&c| c.min(result.committed))
                .sum();
            prop_assert!(result.winnings <= cap);
        }
    }
}
