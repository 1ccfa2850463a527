//! End-of-hand settlement: layered side pots with remainder carry.

use std::collections::HashMap;

use serde::Serialize;

use super::EngineError;
use super::entities::{Chips, Player, SeatIndex, Username};
use crate::scoring::{HandScore, ScoredHand};

/// One eligible player's line in the hand's outcome, as broadcast to
/// spectators.
#[derive(Clone, Debug, Serialize)]
pub struct Settlement {
    pub name: Username,
    pub score: HandScore,
    pub hand: String,
    pub winnings: Chips,
    pub committed: Chips,
    #[serde(skip)]
    player_index: usize,
}

/// Settle the hand's commitments into winnings.
///
/// Eligible players (live and not folded) are ranked best score first,
/// smaller commitment first among ties. Each one in turn caps a pot
/// layer at their remaining commitment, collects that much from every
/// player at the table, folded ones included, and takes their share.
/// Ties split a layer with the remainder carried into the next
/// winner's layer, so no chip is ever minted or lost.
///
/// Every eligible player must have a score keyed by their seat;
/// anything else means the showdown went wrong and settlement cannot
/// proceed.
pub fn settle(
    players: &mut [Player],
    scores: &HashMap<SeatIndex, ScoredHand>,
) -> Result<Vec<Settlement>, EngineError> {
    let mut results = Vec::new();
    for (index, player) in players.iter().enumerate() {
        if !player.in_play || !player.active {
            continue;
        }
        debug_assert!(player.committed <= player.chips);
        let seat = player
            .seat
            .ok_or(EngineError::UnseatedPlayer { index })?;
        let scored = scores
            .get(&seat)
            .ok_or(EngineError::MissingScore { seat })?;
        results.push(Settlement {
            name: player.name.clone(),
            score: scored.score,
            hand: scored.desc.clone(),
            winnings: 0,
            committed: player.committed,
            player_index: index,
        });
    }
    results.sort_by(|a, b| b.score.cmp(&a.score).then(a.committed.cmp(&b.committed)));

    let mut pot: Chips = 0;
    let mut already_paid = 0;
    for i in 0..results.len() {
        // This winner's layer collects up to their remaining
        // commitment from everyone still owing.
        let cap = players[results[i].player_index].committed;
        for player in players.iter_mut() {
            let collected = cap.min(player.committed);
            player.committed -= collected;
            player.chips -= collected;
            pot += collected;
        }
        let tied = results.iter().filter(|r| r.score == results[i].score).count();
        let share = pot / (tied - already_paid) as Chips;
        pot -= share;
        results[i].winnings = share;
        players[results[i].player_index].chips += share;
        // Track position within a tied group; the last one divides by
        // one, so the running pot always drains completely.
        already_paid = if already_paid + 1 == tied {
            0
        } else {
            already_paid + 1
        };
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str, chips: Chips, committed: Chips, seat: SeatIndex) -> Player {
        let mut player = Player::new(Username::new(name), String::new());
        player.chips = chips;
        player.committed = committed;
        player.seat = Some(seat);
        player
    }

    fn scored(value: u32) -> ScoredHand {
        // Settlement only compares packed scores; any distinct u32s do.
        ScoredHand {
            score: HandScore::from_raw(value),
            desc: format!("score {value}"),
        }
    }

    fn total_chips(players: &[Player]) -> Chips {
        players.iter().map(|p| p.chips).sum()
    }

    #[test]
    fn test_outright_winner_takes_capped_layers() {
        let mut players = vec![
            player("a", 800, 800, 0),
            player("b", 1000, 1000, 1),
            player("c", 1200, 1200, 2),
            player("d", 1200, 1200, 3),
        ];
        let scores = HashMap::from([
            (0, scored(100)),
            (1, scored(90)),
            (2, scored(90)),
            (3, scored(80)),
        ]);
        let before = total_chips(&players);
        let results = settle(&mut players, &scores).unwrap();
        assert_eq!(results[0].name.as_str(), "a");
        assert_eq!(results[0].winnings, 3200);
        assert_eq!(players[0].chips, 3200);
        // b and c tie the next layers; b's is capped at its remaining
        // 200 commitment.
        assert_eq!(results[1].name.as_str(), "b");
        assert_eq!(results[1].winnings, 300);
        assert_eq!(results[2].name.as_str(), "c");
        assert_eq!(results[2].winnings, 700);
        assert_eq!(results[3].winnings, 0);
        assert_eq!(players[3].chips, 0);
        assert_eq!(total_chips(&players), before);
        assert!(players.iter().all(|p| p.committed == 0));
    }

    #[test]
    fn test_three_way_tie_carries_remainder() {
        let mut players = vec![
            player("a", 800, 800, 0),
            player("b", 1000, 1000, 1),
            player("c", 1200, 1200, 2),
            player("d", 1200, 1200, 3),
        ];
        let scores = HashMap::from([
            (0, scored(50)),
            (1, scored(50)),
            (2, scored(50)),
            (3, scored(10)),
        ]);
        let results = settle(&mut players, &scores).unwrap();
        assert_eq!(results[0].winnings, 1066);
        assert_eq!(results[1].winnings, 1367);
        assert_eq!(results[2].winnings, 1767);
        assert_eq!(results[3].winnings, 0);
        let distributed: Chips = results.iter().map(|r| r.winnings).sum();
        assert_eq!(distributed, 4200);
    }

    #[test]
    fn test_split_pot_loses_no_chips() {
        let mut players = vec![
            player("a", 500, 101, 0),
            player("b", 500, 101, 1),
            player("c", 500, 101, 2),
        ];
        let scores = HashMap::from([(0, scored(7)), (1, scored(7)), (2, scored(3))]);
        let results = settle(&mut players, &scores).unwrap();
        let distributed: Chips = results.iter().map(|r| r.winnings).sum();
        assert_eq!(distributed, 303);
        assert!(results[0].winnings.abs_diff(results[1].winnings) <= 1);
        assert_eq!(total_chips(&players), 1500);
    }

    #[test]
    fn test_folded_players_still_pay() {
        let mut players = vec![
            player("a", 300, 100, 0),
            player("b", 300, 100, 1),
            player("c", 300, 100, 2),
        ];
        players[1].active = false;
        players[2].active = false;
        // Only the last live player needs a score.
        let scores = HashMap::from([(0, scored(1))]);
        let results = settle(&mut players, &scores).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].winnings, 300);
        assert_eq!(players[0].chips, 500);
        assert_eq!(players[1].chips, 200);
    }

    #[test]
    fn test_missing_score_is_fatal() {
        let mut players = vec![player("a", 300, 100, 0), player("b", 300, 100, 1)];
        let scores = HashMap::from([(0, scored(1))]);
        assert_eq!(
            settle(&mut players, &scores).unwrap_err(),
            EngineError::MissingScore { seat: 1 }
        );
    }

    #[test]
    fn test_eliminated_players_are_ignored() {
        let mut players = vec![player("a", 300, 100, 0), player("b", 0, 0, 1)];
        players[1].in_play = false;
        players[1].seat = None;
        let scores = HashMap::from([(0, scored(1))]);
        let results = settle(&mut players, &scores).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].winnings, 100);
    }
}
