//! Table-wide limits.

/// Cards in a standard deck.
pub const DECK_SIZE: usize = 52;

/// Community cards revealed by the river.
pub const BOARD_SIZE: usize = 5;

/// Most seats a 52-card deck can serve (2 pocket cards each plus
/// board and burns).
pub const MAX_SEATS: usize = 22;

/// Registered names are truncated to this many characters.
pub const MAX_NAME_LENGTH: usize = 16;
