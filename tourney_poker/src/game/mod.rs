//! Poker engine - entities, dealing, seating, settlement, hand flow.
//!
//! Everything in here is pure in-memory computation owned by the
//! coordinator task; no I/O happens below this module.

pub mod constants;
pub mod deal;
pub mod entities;
pub mod hand;
pub mod settlement;
pub mod table;

use thiserror::Error;

use self::entities::SeatIndex;

/// Errors raised by the engine.
///
/// A missing settlement score or an empty winners' circle corrupts
/// chip conservation and is unrecoverable; callers abort the
/// tournament rather than retry.
#[derive(Debug, Eq, Error, PartialEq)]
pub enum EngineError {
    #[error("deck exhausted: needed {needed} cards, only {remaining} remaining")]
    DeckExhausted { needed: usize, remaining: usize },
    #[error("no settlement score for seat {seat}")]
    MissingScore { seat: SeatIndex },
    #[error("active player at index {index} has no seat")]
    UnseatedPlayer { index: usize },
    #[error("no dealer is assigned")]
    NoDealer,
    #[error("no player holds chips at tournament end")]
    NoChipsInPlay,
    #[error("betting driver failed: {0}")]
    Betting(String),
    #[error("coordinator intake closed")]
    IntakeClosed,
}
