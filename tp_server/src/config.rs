//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated
//! configuration.

use std::net::SocketAddr;
use std::time::Duration;

use tourney_poker::TourneyConfig;
use tourney_poker::game::constants::MAX_SEATS;

const DEFAULT_BIND: &str = "127.0.0.1:6969";

/// Complete server configuration, loaded from CLI overrides first and
/// environment variables second.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Server socket bind address.
    pub bind: SocketAddr,
    /// Tournament knobs handed to the coordinator.
    pub game: TourneyConfig,
}

impl ServerConfig {
    /// Load configuration, preferring CLI overrides over environment
    /// variables over defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when a value is present but unusable.
    pub fn from_env(bind_override: Option<SocketAddr>) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => match std::env::var("SERVER_BIND") {
                Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                    var: "SERVER_BIND".to_string(),
                    reason: format!("not a socket address: {raw}"),
                })?,
                Err(_) => DEFAULT_BIND
                    .parse()
                    .map_err(|_| ConfigError::Invalid {
                        var: "SERVER_BIND".to_string(),
                        reason: "default bind address failed to parse".to_string(),
                    })?,
            },
        };

        let defaults = TourneyConfig::default();
        let game = TourneyConfig {
            seats: parse_env_or("TABLE_SEATS", defaults.seats),
            min_spectators: parse_env_or("MIN_SPECTATORS", defaults.min_spectators),
            tournaments: parse_env_or("TOURNAMENTS", defaults.tournaments),
            starting_chips: parse_env_or("STARTING_CHIPS", defaults.starting_chips),
            min_raise: parse_env_or("MIN_RAISE", defaults.min_raise),
            raise_rate: parse_env_or("RAISE_RATE", defaults.raise_rate),
            ack_timeout: Duration::from_secs(parse_env_or(
                "ACK_TIMEOUT_SECS",
                defaults.ack_timeout.as_secs(),
            )),
        };

        Ok(Self { bind, game })
    }

    /// Validate configuration after loading.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError::Invalid`] naming the offending variable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.game.seats < 2 {
            return Err(ConfigError::Invalid {
                var: "TABLE_SEATS".to_string(),
                reason: "must be at least 2".to_string(),
            });
        }
        if self.game.seats > MAX_SEATS {
            return Err(ConfigError::Invalid {
                var: "TABLE_SEATS".to_string(),
                reason: format!("must be at most {MAX_SEATS} (one 52-card deck)"),
            });
        }
        if self.game.tournaments == 0 {
            return Err(ConfigError::Invalid {
                var: "TOURNAMENTS".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.game.min_raise == 0 {
            return Err(ConfigError::Invalid {
                var: "MIN_RAISE".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.game.starting_chips < self.game.min_raise {
            return Err(ConfigError::Invalid {
                var: "STARTING_CHIPS".to_string(),
                reason: format!(
                    "must cover at least one minimum raise ({})",
                    self.game.min_raise
                ),
            });
        }
        if self.game.raise_rate == 0 {
            return Err(ConfigError::Invalid {
                var: "RAISE_RATE".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.game.ack_timeout == Duration::ZERO {
            return Err(ConfigError::Invalid {
                var: "ACK_TIMEOUT_SECS".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse an environment variable with a default fallback.
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
