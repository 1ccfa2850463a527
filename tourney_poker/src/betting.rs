//! Betting-round collaborator seam.
//!
//! The coordinator stays agnostic about how wagers are decided. A
//! [`BettingDriver`] owns one street at a time and records its outcome
//! directly on the players: commitments go up, `active` drops on a
//! fold, `all_in` latches when a stack is fully committed.

use std::fmt;

use async_trait::async_trait;
use log::debug;

use crate::game::EngineError;
use crate::game::entities::Chips;
use crate::game::table::Table;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Street {
    PreFlop,
    Flop,
    Turn,
    River,
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::PreFlop => "pre-flop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
        };
        write!(f, "{repr}")
    }
}

/// Drives one betting street to completion.
///
/// A driver must never commit a player past their stack; settlement
/// relies on `committed <= chips` holding for every player.
#[async_trait]
pub trait BettingDriver: Send {
    async fn run_street(
        &mut self,
        street: Street,
        table: &mut Table,
        min_raise: Chips,
    ) -> Result<(), EngineError>;
}

/// Deterministic driver: every live player calls the minimum raise,
/// going all in when short. Nobody ever folds. Used by the stock
/// server and by tests that need predictable chip flow.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoCaller;

#[async_trait]
impl BettingDriver for AutoCaller {
    async fn run_street(
        &mut self,
        street: Street,
        table: &mut Table,
        min_raise: Chips,
    ) -> Result<(), EngineError> {
        for player in table.players_mut() {
            if !player.in_play || !player.active || player.all_in {
                continue;
            }
            let available = player.chips - player.committed;
            let wager = min_raise.min(available);
            player.committed += wager;
            if player.committed == player.chips {
                player.all_in = true;
            }
        }
        debug!("{street}: everyone calls {min_raise}, pot {}", table.pot_total());
        Ok(())
    }
}
