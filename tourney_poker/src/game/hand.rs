//! One hand of play, dealt through settled.

use std::collections::HashMap;

use log::debug;

use super::EngineError;
use super::deal::Dealer;
use super::entities::{Chips, SeatIndex};
use super::settlement::{self, Settlement};
use super::table::Table;
use crate::betting::{BettingDriver, Street};
use crate::events::TableEvent;
use crate::hub::SpectatorHub;
use crate::scoring::{ScoredHand, Scorer};

/// Phases of a hand, in the only order they can occur. A hand that
/// starts always runs to `DealerRotated` or fails.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HandPhase {
    Seating,
    PocketsDealt,
    FlopBet,
    TurnBet,
    RiverBet,
    Settled,
    DealerRotated,
}

/// Runs one hand over borrowed table state. Built fresh per hand; the
/// deck, board, and pockets die with it.
pub struct HandRunner<'a> {
    table: &'a mut Table,
    hub: &'a mut SpectatorHub,
    betting: &'a mut dyn BettingDriver,
    scorer: &'a dyn Scorer,
    phase: HandPhase,
}

impl<'a> HandRunner<'a> {
    pub fn new(
        table: &'a mut Table,
        hub: &'a mut SpectatorHub,
        betting: &'a mut dyn BettingDriver,
        scorer: &'a dyn Scorer,
    ) -> Self {
        Self {
            table,
            hub,
            betting,
            scorer,
            phase: HandPhase::Seating,
        }
    }

    /// Play the hand end to end, broadcast each stage, and leave the
    /// button on the next live player.
    pub async fn play(mut self, min_raise: Chips) -> Result<Vec<Settlement>, EngineError> {
        let dealer_index = self.table.dealer_index().ok_or(EngineError::NoDealer)?;
        let seated = self.table.begin_hand(dealer_index);
        let mut dealer = Dealer::new();
        let pockets = dealer.deal_pockets(seated)?.to_vec();
        for pocket in &pockets {
            debug!("{pocket}");
        }
        self.advance(HandPhase::PocketsDealt);
        self.hub
            .broadcast(&TableEvent::HandsDealt {
                dealer_seat: self.table.dealer_seat(),
                pockets,
            });
        self.betting
            .run_street(Street::PreFlop, self.table, min_raise)
            .await?;

        dealer.deal_flop()?;
        self.advance(HandPhase::FlopBet);
        self.broadcast_board(&dealer);
        self.betting
            .run_street(Street::Flop, self.table, min_raise)
            .await?;

        dealer.deal_street()?;
        self.advance(HandPhase::TurnBet);
        self.broadcast_board(&dealer);
        self.betting
            .run_street(Street::Turn, self.table, min_raise)
            .await?;

        dealer.deal_street()?;
        self.advance(HandPhase::RiverBet);
        self.broadcast_board(&dealer);
        self.betting
            .run_street(Street::River, self.table, min_raise)
            .await?;

        let scores = self.score_showdown(&dealer);
        let results = settlement::settle(self.table.players_mut(), &scores)?;
        self.advance(HandPhase::Settled);
        self.hub
            .broadcast(&TableEvent::Results {
                results: results.clone(),
            });

        self.table.rotate_dealer()?;
        self.advance(HandPhase::DealerRotated);
        Ok(results)
    }

    fn advance(&mut self, phase: HandPhase) {
        debug!("hand phase {:?}", phase);
        self.phase = phase;
    }

    fn broadcast_board(&mut self, dealer: &Dealer) {
        debug!("board {}", dealer.board_repr());
        self.hub
            .broadcast(&TableEvent::TableCards {
                board: dealer.board().to_vec(),
                pot: self.table.pot_total(),
            });
    }

    /// Score every live, unfolded player's seven cards. Missing scores
    /// are settlement's problem to reject.
    fn score_showdown(&self, dealer: &Dealer) -> HashMap<SeatIndex, ScoredHand> {
        let mut scores = HashMap::new();
        for player in self.table.players() {
            if !player.in_play || !player.active {
                continue;
            }
            let Some(seat) = player.seat else { continue };
            if let Some(pocket) = dealer.pocket_for_seat(seat) {
                scores.insert(seat, self.scorer.score(&pocket.cards, dealer.board()));
            }
        }
        scores
    }
}
