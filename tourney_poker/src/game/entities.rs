use rand::{rng, seq::SliceRandom};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::constants;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
    // Wild is used to initialize a deck of cards.
    Wild,
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
            Self::Wild => "w",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values (2u8 ... ace=14u8).
pub type Value = u8;

/// A card is a tuple of a uInt8 value and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", value_repr(self.0), self.1)
    }
}

/// Short name for a card value ("2".."10", "J", "Q", "K", "A").
pub fn value_repr(value: Value) -> String {
    match value {
        1 | 14 => "A".to_string(),
        11 => "J".to_string(),
        12 => "Q".to_string(),
        13 => "K".to_string(),
        v => v.to_string(),
    }
}

/// Five-card hand categories, weakest first so derived `Ord` ranks them.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Rank {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "high card",
            Self::OnePair => "pair",
            Self::TwoPair => "two pair",
            Self::ThreeOfAKind => "three of a kind",
            Self::Straight => "straight",
            Self::Flush => "flush",
            Self::FullHouse => "full house",
            Self::FourOfAKind => "four of a kind",
            Self::StraightFlush => "straight flush",
        };
        write!(f, "{repr}")
    }
}

/// One freshly built deck, dealt by advancing an index over the
/// shuffled array.
#[derive(Debug)]
pub struct Deck {
    cards: [Card; constants::DECK_SIZE],
    deck_idx: usize,
}

impl Deck {
    pub fn deal_card(&mut self) -> Card {
        let card = self.cards[self.deck_idx];
        self.deck_idx += 1;
        card
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        constants::DECK_SIZE - self.deck_idx
    }

    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut rng());
        self.deck_idx = 0;
    }
}

impl Default for Deck {
    fn default() -> Self {
        let mut cards = [Card(0, Suit::Wild); constants::DECK_SIZE];
        for (i, value) in (2u8..=14u8).enumerate() {
            for (j, suit) in [Suit::Club, Suit::Spade, Suit::Diamond, Suit::Heart]
                .into_iter()
                .enumerate()
            {
                cards[4 * i + j] = Card(value, suit);
            }
        }
        Self { cards, deck_idx: 0 }
    }
}

/// Type alias for whole chips. Stacks and commitments are whole chips;
/// a tournament never mints new ones, so u32 is plenty.
pub type Chips = u32;

/// Type alias for seat positions within one hand.
pub type SeatIndex = usize;

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Username(String);

impl Username {
    pub fn new(s: &str) -> Self {
        let mut username: String = s
            .chars()
            .map(|c| if c.is_ascii_whitespace() { '_' } else { c })
            .collect();
        username.truncate(constants::MAX_NAME_LENGTH);
        Self(username)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<String> for Username {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

/// Two pocket cards bound to a seat for one hand.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Pocket {
    pub seat: SeatIndex,
    pub cards: [Card; 2],
}

impl fmt::Display for Pocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|{} {}|s {}|", self.cards[0], self.cards[1], self.seat)
    }
}

/// A registered bot. Persistent across hands and tournaments; the
/// transient per-hand fields are reset by the table between hands.
#[derive(Clone, Debug)]
pub struct Player {
    pub name: Username,
    /// Registration secret returned to the bot; never broadcast.
    pub key: String,
    pub chips: Chips,
    /// Seat for the current hand; `None` while eliminated.
    pub seat: Option<SeatIndex>,
    /// Still holds chips in this tournament.
    pub in_play: bool,
    /// Still contesting the current hand (cleared on fold).
    pub active: bool,
    pub all_in: bool,
    pub is_dealer: bool,
    /// Chips committed to the pot this hand; consumed at settlement.
    pub committed: Chips,
}

impl Player {
    #[must_use]
    pub fn new(name: Username, key: String) -> Self {
        Self {
            name,
            key,
            chips: 0,
            seat: None,
            in_play: true,
            active: true,
            all_in: false,
            is_dealer: false,
            committed: 0,
        }
    }
}
