//! Per-hand card dealing: pockets, community cards, and the burn pile.

use super::EngineError;
use super::constants::BOARD_SIZE;
use super::entities::{Card, Deck, Pocket, SeatIndex};

/// Deals one hand from a freshly shuffled deck.
///
/// Pockets go out in two passes, one card per seat each pass, the way
/// a dealer pitches them around the table. Every community reveal
/// burns a card first. The turn and the river are the same one-card
/// reveal, so [`Dealer::deal_street`] serves both.
#[derive(Debug)]
pub struct Dealer {
    deck: Deck,
    board: Vec<Card>,
    burnt: Vec<Card>,
    pockets: Vec<Pocket>,
}

impl Dealer {
    pub fn new() -> Self {
        let mut deck = Deck::default();
        deck.shuffle();
        Self {
            deck,
            board: Vec::with_capacity(BOARD_SIZE),
            burnt: Vec::with_capacity(3),
            pockets: Vec::new(),
        }
    }

    /// Deal two hole cards to each of `seats` seats.
    pub fn deal_pockets(&mut self, seats: usize) -> Result<&[Pocket], EngineError> {
        self.require(2 * seats)?;
        let mut dealt = Vec::with_capacity(2 * seats);
        for _ in 0..2 * seats {
            dealt.push(self.deck.deal_card());
        }
        for seat in 0..seats {
            self.pockets.push(Pocket {
                seat,
                cards: [dealt[seat], dealt[seat + seats]],
            });
        }
        Ok(&self.pockets)
    }

    /// Burn one card, reveal three.
    pub fn deal_flop(&mut self) -> Result<&[Card], EngineError> {
        self.require(4)?;
        self.burn();
        for _ in 0..3 {
            let card = self.deck.deal_card();
            self.board.push(card);
        }
        Ok(&self.board)
    }

    /// Burn one card, reveal one. Call once for the turn and once for
    /// the river.
    pub fn deal_street(&mut self) -> Result<Card, EngineError> {
        self.require(2)?;
        self.burn();
        let card = self.deck.deal_card();
        self.board.push(card);
        Ok(card)
    }

    pub fn board(&self) -> &[Card] {
        &self.board
    }

    pub fn pockets(&self) -> &[Pocket] {
        &self.pockets
    }

    pub fn pocket_for_seat(&self, seat: SeatIndex) -> Option<&Pocket> {
        self.pockets.iter().find(|p| p.seat == seat)
    }

    /// Board rendered for the logs, e.g. `| A♣ K♦ 2♥ |`.
    pub fn board_repr(&self) -> String {
        let cards = self
            .board
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        format!("| {cards} |")
    }

    fn burn(&mut self) {
        let card = self.deck.deal_card();
        self.burnt.push(card);
    }

    fn require(&self, needed: usize) -> Result<(), EngineError> {
        let remaining = self.deck.remaining();
        if needed > remaining {
            return Err(EngineError::DeckExhausted { needed, remaining });
        }
        Ok(())
    }

    #[cfg(test)]
    fn burnt(&self) -> &[Card] {
        &self.burnt
    }
}

impl Default for Dealer {
    fn default() -> Self {
        Self::new()
    }
}
