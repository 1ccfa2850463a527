//! The broadcast event taxonomy, serialized once per event and fanned
//! out to every spectator as one JSON text line.

use serde::Serialize;

use crate::game::entities::{Card, Chips, Pocket, SeatIndex, Username};
use crate::game::settlement::Settlement;

/// A player's public standing. Keys and hand flags never leave the
/// coordinator.
#[derive(Clone, Debug, Serialize)]
pub struct PlayerSummary {
    pub name: Username,
    pub chips: Chips,
}

/// Everything spectators can observe, in the order it happens.
///
/// `PING` carries the checkpoint spectators must echo back in their
/// `PONG`; acks stamped with any other checkpoint are ignored.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableEvent {
    TournamentStart {
        players: Vec<PlayerSummary>,
        starting_chips: Chips,
    },
    HandsDealt {
        dealer_seat: Option<SeatIndex>,
        pockets: Vec<Pocket>,
    },
    TableCards {
        board: Vec<Card>,
        pot: Chips,
    },
    Results {
        results: Vec<Settlement>,
    },
    Broke {
        players: Vec<Username>,
    },
    Ping {
        checkpoint: u64,
    },
    TournamentWinner {
        name: Username,
        chips: Chips,
    },
    Shutdown,
}
