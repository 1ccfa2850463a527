//! Coordinator configuration.

use std::time::Duration;

use crate::game::entities::Chips;

/// Knobs for one coordinator run. The defaults mirror a small demo
/// table; the server binary overrides them from flags and environment
/// variables.
#[derive(Clone, Debug)]
pub struct TourneyConfig {
    /// Players required before play starts. Registration closes once
    /// they are all taken.
    pub seats: usize,
    /// Spectators required before play starts. More may attach later.
    pub min_spectators: usize,
    /// Tournaments played back to back over the same registrations.
    pub tournaments: u32,
    pub starting_chips: Chips,
    /// Per-street wager while blinds are at their base level.
    pub min_raise: Chips,
    /// Hands between blind doublings.
    pub raise_rate: u32,
    /// How long the barrier waits for a spectator's ack before
    /// detaching it.
    pub ack_timeout: Duration,
}

impl Default for TourneyConfig {
    fn default() -> Self {
        Self {
            seats: 3,
            min_spectators: 0,
            tournaments: 1,
            starting_chips: 10_000,
            min_raise: 200,
            raise_rate: 20,
            ack_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_playable() {
        let config = TourneyConfig::default();
        assert!(config.seats >= 2);
        assert!(config.starting_chips >= config.min_raise);
        assert!(config.raise_rate > 0);
        assert!(config.ack_timeout > Duration::ZERO);
    }
}
