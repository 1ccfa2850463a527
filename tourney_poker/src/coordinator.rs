//! The authoritative coordinator task.
//!
//! One tokio task owns the table, the spectator hub, and the
//! checkpoint counter. Every I/O task talks to it through a single
//! mpsc intake; nothing else ever touches game state, so there are no
//! locks anywhere in the engine.

use std::collections::HashSet;

use log::{info, warn};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, timeout_at};

use crate::betting::BettingDriver;
use crate::config::TourneyConfig;
use crate::events::{PlayerSummary, TableEvent};
use crate::game::EngineError;
use crate::game::entities::{Chips, Username};
use crate::game::hand::HandRunner;
use crate::game::table::Table;
use crate::hub::{SpectatorHub, SpectatorId};
use crate::scoring::Scorer;

const INTAKE_BUFFER: usize = 100;

/// Successful registration: the unique name actually assigned and the
/// bot's private key.
#[derive(Clone, Debug, Serialize)]
pub struct Registered {
    pub name: Username,
    pub key: String,
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RegisterError {
    #[error("all seats are taken")]
    SeatsFull,
    #[error("play is already underway")]
    InProgress,
    #[error("the coordinator is gone")]
    Closed,
}

/// Everything I/O tasks can ask of the coordinator.
#[derive(Debug)]
pub enum CoordinatorMessage {
    Register {
        requested_name: String,
        respond: oneshot::Sender<Result<Registered, RegisterError>>,
    },
    AttachSpectator {
        sender: mpsc::Sender<String>,
        respond: oneshot::Sender<SpectatorId>,
    },
    DetachSpectator {
        id: SpectatorId,
    },
    Ack {
        id: SpectatorId,
        checkpoint: u64,
    },
    Shutdown,
}

/// Cheap cloneable sender half; one per connection task.
#[derive(Clone)]
pub struct CoordinatorHandle {
    sender: mpsc::Sender<CoordinatorMessage>,
}

impl CoordinatorHandle {
    pub async fn register(&self, requested_name: String) -> Result<Registered, RegisterError> {
        let (respond, response) = oneshot::channel();
        self.sender
            .send(CoordinatorMessage::Register {
                requested_name,
                respond,
            })
            .await
            .map_err(|_| RegisterError::Closed)?;
        response.await.map_err(|_| RegisterError::Closed)?
    }

    /// Attach a spectator feed; events arrive as JSON lines on
    /// `sender`. Returns `None` if the coordinator is gone.
    pub async fn attach_spectator(&self, sender: mpsc::Sender<String>) -> Option<SpectatorId> {
        let (respond, response) = oneshot::channel();
        self.sender
            .send(CoordinatorMessage::AttachSpectator { sender, respond })
            .await
            .ok()?;
        response.await.ok()
    }

    pub async fn detach_spectator(&self, id: SpectatorId) {
        let _ = self
            .sender
            .send(CoordinatorMessage::DetachSpectator { id })
            .await;
    }

    pub async fn ack(&self, id: SpectatorId, checkpoint: u64) {
        let _ = self
            .sender
            .send(CoordinatorMessage::Ack { id, checkpoint })
            .await;
    }

    pub async fn shutdown(&self) {
        let _ = self.sender.send(CoordinatorMessage::Shutdown).await;
    }
}

/// The coordinator itself. Construct it with the collaborators you
/// want, keep the handle, and spawn [`Coordinator::run`].
pub struct Coordinator {
    config: TourneyConfig,
    table: Table,
    hub: SpectatorHub,
    inbox: mpsc::Receiver<CoordinatorMessage>,
    betting: Box<dyn BettingDriver>,
    scorer: Box<dyn Scorer>,
    checkpoint: u64,
    shutting_down: bool,
}

impl Coordinator {
    pub fn new(
        config: TourneyConfig,
        betting: Box<dyn BettingDriver>,
        scorer: Box<dyn Scorer>,
    ) -> (Self, CoordinatorHandle) {
        let (sender, inbox) = mpsc::channel(INTAKE_BUFFER);
        let coordinator = Self {
            config,
            table: Table::new(),
            hub: SpectatorHub::new(),
            inbox,
            betting,
            scorer,
            checkpoint: 0,
            shutting_down: false,
        };
        (coordinator, CoordinatorHandle { sender })
    }

    /// Out-of-band feed of every broadcast event. Dashboards and tests
    /// subscribe here; it never participates in the ack barrier.
    pub fn subscribe_monitor(&self) -> tokio::sync::broadcast::Receiver<TableEvent> {
        self.hub.subscribe_monitor()
    }

    /// Gate on registrations, then play the configured tournaments
    /// back to back, then tell everyone to go home.
    pub async fn run(mut self) -> Result<(), EngineError> {
        self.await_players().await?;
        if !self.shutting_down {
            for tournament in 0..self.config.tournaments {
                info!(
                    "starting tournament {} of {}",
                    tournament + 1,
                    self.config.tournaments
                );
                self.play_tournament().await?;
                if self.shutting_down {
                    break;
                }
            }
        }
        self.hub.broadcast(&TableEvent::Shutdown);
        info!("coordinator finished");
        Ok(())
    }

    /// Block until every seat is filled and enough spectators are
    /// watching. Seats are first come first served; once they are gone,
    /// later registrations are refused.
    async fn await_players(&mut self) -> Result<(), EngineError> {
        info!(
            "waiting for {} players and {} spectators",
            self.config.seats, self.config.min_spectators
        );
        while !self.shutting_down
            && (self.table.len() < self.config.seats || self.hub.len() < self.config.min_spectators)
        {
            let message = self.inbox.recv().await.ok_or(EngineError::IntakeClosed)?;
            match message {
                CoordinatorMessage::Register {
                    requested_name,
                    respond,
                } => {
                    if self.table.len() >= self.config.seats {
                        let _ = respond.send(Err(RegisterError::SeatsFull));
                        continue;
                    }
                    let player = self.table.register(&requested_name);
                    info!(
                        "registered {} ({} of {} seats)",
                        player.name,
                        self.table.len(),
                        self.config.seats
                    );
                    let _ = respond.send(Ok(Registered {
                        name: player.name,
                        key: player.key,
                    }));
                }
                other => self.handle_side_message(other),
            }
        }
        self.table.seat_first_dealer();
        Ok(())
    }

    /// Anything that is not a seat-filling registration. Safe to apply
    /// in any state.
    fn handle_side_message(&mut self, message: CoordinatorMessage) {
        match message {
            CoordinatorMessage::Register { respond, .. } => {
                let refusal = if self.table.len() >= self.config.seats {
                    RegisterError::SeatsFull
                } else {
                    RegisterError::InProgress
                };
                let _ = respond.send(Err(refusal));
            }
            CoordinatorMessage::AttachSpectator { sender, respond } => {
                let id = self.hub.attach(sender);
                info!("spectator {id} attached ({} total)", self.hub.len());
                let _ = respond.send(id);
            }
            CoordinatorMessage::DetachSpectator { id } => self.hub.detach(id),
            // Acks outside a barrier are stale; drop them.
            CoordinatorMessage::Ack { .. } => {}
            CoordinatorMessage::Shutdown => {
                info!("shutdown requested");
                self.shutting_down = true;
            }
        }
    }

    async fn play_tournament(&mut self) -> Result<(), EngineError> {
        self.table.reset_for_tournament(self.config.starting_chips);
        let players = self
            .table
            .players()
            .iter()
            .map(|p| PlayerSummary {
                name: p.name.clone(),
                chips: p.chips,
            })
            .collect();
        self.hub
            .broadcast(&TableEvent::TournamentStart {
                players,
                starting_chips: self.config.starting_chips,
            });

        let mut min_raise = self.config.min_raise;
        let mut hands: u32 = 0;
        while self.table.count_in_play() > 1 && !self.shutting_down {
            if hands != 0 && hands % self.config.raise_rate == 0 {
                min_raise = raise_blinds(min_raise);
                info!("blinds doubled to {min_raise} after {hands} hands");
            }

            HandRunner::new(
                &mut self.table,
                &mut self.hub,
                self.betting.as_mut(),
                self.scorer.as_ref(),
            )
            .play(min_raise)
            .await?;

            let broke = self.table.mark_broke();
            if !broke.is_empty() {
                info!(
                    "busted: {}",
                    broke
                        .iter()
                        .map(Username::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                self.hub
                    .broadcast(&TableEvent::Broke { players: broke });
            }

            self.sync_barrier().await?;
            hands += 1;
        }
        if self.shutting_down {
            return Ok(());
        }
        let winner = self.table.find_winner().ok_or(EngineError::NoChipsInPlay)?;
        info!(
            "tournament winner: {} with {} chips after {hands} hands",
            winner.name, winner.chips
        );
        let event = TableEvent::TournamentWinner {
            name: winner.name.clone(),
            chips: winner.chips,
        };
        self.hub.broadcast(&event);
        Ok(())
    }

    /// Ping every spectator and block until each one attached at ping
    /// time has echoed this checkpoint back. Spectators attaching
    /// mid-barrier are admitted but not awaited; laggards past the
    /// timeout are detached and never waited on again.
    async fn sync_barrier(&mut self) -> Result<(), EngineError> {
        self.checkpoint += 1;
        let checkpoint = self.checkpoint;
        self.hub.broadcast(&TableEvent::Ping { checkpoint });
        let mut pending: HashSet<SpectatorId> = self.hub.ids().into_iter().collect();
        // One deadline for the whole barrier, fixed at ping time.
        // Unrelated inbox traffic must not buy laggards more time.
        let deadline = Instant::now() + self.config.ack_timeout;
        while !pending.is_empty() && !self.shutting_down {
            match timeout_at(deadline, self.inbox.recv()).await {
                Ok(Some(CoordinatorMessage::Ack { id, checkpoint: acked })) => {
                    // An ack stamped with any other checkpoint never
                    // satisfies this barrier.
                    if acked == checkpoint {
                        pending.remove(&id);
                    }
                }
                Ok(Some(CoordinatorMessage::DetachSpectator { id })) => {
                    self.hub.detach(id);
                    pending.remove(&id);
                }
                Ok(Some(other)) => self.handle_side_message(other),
                Ok(None) => return Err(EngineError::IntakeClosed),
                Err(_) => {
                    for id in pending.drain() {
                        warn!(
                            "spectator {id} missed checkpoint {checkpoint} within {:?}, detaching",
                            self.config.ack_timeout
                        );
                        self.hub.detach(id);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Doubling stops at the chip ceiling instead of wrapping.
fn raise_blinds(min_raise: Chips) -> Chips {
    min_raise.saturating_mul(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_blinds_saturates_at_the_chip_ceiling() {
        assert_eq!(raise_blinds(100), 200);
        assert_eq!(raise_blinds(Chips::MAX / 2 + 1), Chips::MAX);
        assert_eq!(raise_blinds(Chips::MAX), Chips::MAX);
    }
}
