//! The registry of bots at one table: registration, seating, the
//! dealer button, and elimination.

use uuid::Uuid;

use super::EngineError;
use super::constants;
use super::entities::{Chips, Player, SeatIndex, Username};

/// All registered players for the lifetime of the process.
///
/// Registration order is fixed and doubles as the player index used
/// everywhere else. Seats are transient labels reassigned per hand;
/// eliminated players keep their slot here but get no seat.
#[derive(Debug, Default)]
pub struct Table {
    players: Vec<Player>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bot under a unique, non-empty name.
    ///
    /// Blank requests become `PLAYER<n>`, duplicates grow a numeric
    /// suffix. Each registration gets a fresh secret key.
    pub fn register(&mut self, requested_name: &str) -> Player {
        let base = if requested_name.trim().is_empty() {
            format!("PLAYER{}", self.players.len())
        } else {
            requested_name.to_string()
        };
        let mut name = Username::new(&base);
        let mut suffix = 1u32;
        while !self.is_name_unique(&name) {
            let digits = suffix.to_string();
            let keep = constants::MAX_NAME_LENGTH.saturating_sub(digits.len());
            let stem: String = base.chars().take(keep).collect();
            name = Username::new(&format!("{stem}{digits}"));
            suffix += 1;
        }
        let player = Player::new(name, Uuid::new_v4().to_string());
        self.players.push(player.clone());
        player
    }

    /// Pin the button on the first registrant. Called once, when the
    /// registration gate closes.
    pub fn seat_first_dealer(&mut self) {
        if let Some(player) = self.players.first_mut() {
            player.is_dealer = true;
        }
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    #[must_use]
    pub fn dealer_index(&self) -> Option<usize> {
        self.players.iter().position(|p| p.is_dealer)
    }

    /// The dealer's seat for the current hand, if seated.
    #[must_use]
    pub fn dealer_seat(&self) -> Option<SeatIndex> {
        self.dealer_index().and_then(|i| self.players[i].seat)
    }

    #[must_use]
    pub fn count_in_play(&self) -> usize {
        self.players.iter().filter(|p| p.in_play).count()
    }

    /// Total chips committed this hand.
    #[must_use]
    pub fn pot_total(&self) -> Chips {
        self.players.iter().map(|p| p.committed).sum()
    }

    /// Start a hand: clear commitments and hand seats out clockwise
    /// from the button's left. Eliminated players get no seat. Returns
    /// the number of seats dealt.
    pub fn begin_hand(&mut self, dealer: usize) -> usize {
        let count = self.players.len();
        let mut seat: SeatIndex = 0;
        for offset in 0..count {
            let pos = (dealer + 1 + offset) % count;
            let player = &mut self.players[pos];
            player.committed = 0;
            if player.in_play {
                player.seat = Some(seat);
                seat += 1;
            } else {
                player.seat = None;
            }
        }
        seat
    }

    /// Next player index after `index` still holding chips.
    #[must_use]
    pub fn next_in_play_after(&self, index: usize) -> Option<usize> {
        let count = self.players.len();
        (1..=count)
            .map(|offset| (index + offset) % count)
            .find(|&pos| self.players[pos].in_play)
    }

    /// End a hand: everyone contests again next hand, and the button
    /// moves to the next live player.
    pub fn rotate_dealer(&mut self) -> Result<(), EngineError> {
        let dealer = self.dealer_index().ok_or(EngineError::NoDealer)?;
        for player in &mut self.players {
            player.active = true;
            player.all_in = false;
        }
        let next = self
            .next_in_play_after(dealer)
            .ok_or(EngineError::NoDealer)?;
        self.players[dealer].is_dealer = false;
        self.players[next].is_dealer = true;
        Ok(())
    }

    /// Knock out everyone who settled to zero chips. Returns the names
    /// of the newly eliminated.
    pub fn mark_broke(&mut self) -> Vec<Username> {
        let mut broke = Vec::new();
        for player in &mut self.players {
            if player.in_play && player.chips == 0 {
                player.in_play = false;
                broke.push(player.name.clone());
            }
        }
        broke
    }

    /// Everyone back in with a fresh stack; the button stays where the
    /// last tournament left it.
    pub fn reset_for_tournament(&mut self, starting_chips: Chips) {
        for player in &mut self.players {
            player.chips = starting_chips;
            player.committed = 0;
            player.seat = None;
            player.in_play = true;
            player.active = true;
            player.all_in = false;
        }
    }

    /// The last player holding chips, once all others are broke.
    #[must_use]
    pub fn find_winner(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.chips > 0)
    }

    fn is_name_unique(&self, name: &Username) -> bool {
        !self.players.iter().any(|p| p.name == *name)
    }
}
