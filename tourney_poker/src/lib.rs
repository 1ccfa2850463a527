//! # Tourney Poker
//!
//! A multi-tournament poker coordinator for network bots. One
//! authoritative task deals hands, settles layered side pots, and
//! holds every spectator to an ack barrier between hands so nobody
//! watches the future.
//!
//! The engine is transport-free; the `tp_server` binary puts an HTTP
//! and WebSocket face on it. Library users wire their own
//! [`BettingDriver`] and [`Scorer`] into the coordinator:
//!
//! ```
//! use tourney_poker::{AutoCaller, Coordinator, RankScorer, TourneyConfig};
//!
//! let (coordinator, handle) = Coordinator::new(
//!     TourneyConfig::default(),
//!     Box::new(AutoCaller),
//!     Box::new(RankScorer),
//! );
//! # drop((coordinator, handle));
//! ```

pub mod betting;
pub mod config;
pub mod coordinator;
pub mod events;
pub mod game;
pub mod hub;
pub mod scoring;

pub use betting::{AutoCaller, BettingDriver, Street};
pub use config::TourneyConfig;
pub use coordinator::{
    Coordinator, CoordinatorHandle, CoordinatorMessage, RegisterError, Registered,
};
pub use events::{PlayerSummary, TableEvent};
pub use game::EngineError;
pub use game::entities::{Card, Chips, Pocket, SeatIndex, Username};
pub use hub::{SpectatorHub, SpectatorId};
pub use scoring::{HandScore, RankScorer, ScoredHand, Scorer};
