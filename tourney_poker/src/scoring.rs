//! Showdown hand scoring.
//!
//! Settlement only needs a total order over hands, so the whole
//! strength of a hand is packed into one integer: the category in the
//! high bits and up to five 4-bit tiebreak values below it.

use serde::Serialize;

use crate::game::entities::{Card, Rank, Value, value_repr};

/// Packed hand strength. Bigger wins; equal means a chopped pot.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct HandScore(u32);

impl HandScore {
    fn pack(rank: Rank, tiebreak: &[Value]) -> Self {
        let mut score = (rank as u32) << 20;
        for (i, &value) in tiebreak.iter().take(5).enumerate() {
            score |= u32::from(value) << (16 - 4 * i);
        }
        Self(score)
    }

    #[must_use]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

/// A score plus the line shown to spectators, e.g. "two pair, Ks and 7s".
#[derive(Clone, Debug, Serialize)]
pub struct ScoredHand {
    pub score: HandScore,
    pub desc: String,
}

/// Scores a showdown hand from a pocket and the community cards.
pub trait Scorer: Send + Sync {
    fn score(&self, pocket: &[Card; 2], board: &[Card]) -> ScoredHand;
}

/// Exhaustive best-five-of-seven evaluator. Twenty-one combinations
/// per hand is nothing at table sizes.
#[derive(Clone, Copy, Debug, Default)]
pub struct RankScorer;

impl Scorer for RankScorer {
    fn score(&self, pocket: &[Card; 2], board: &[Card]) -> ScoredHand {
        let cards: Vec<Card> = pocket.iter().chain(board.iter()).copied().collect();
        let (rank, tiebreak) = best_five(&cards);
        ScoredHand {
            score: HandScore::pack(rank, &tiebreak),
            desc: describe(rank, &tiebreak),
        }
    }
}

fn best_five(cards: &[Card]) -> (Rank, Vec<Value>) {
    debug_assert!((5..=7).contains(&cards.len()));
    let mut best: Option<(HandScore, Rank, Vec<Value>)> = None;
    for mask in 0u32..1 << cards.len() {
        if mask.count_ones() != 5 {
            continue;
        }
        let five: Vec<Card> = cards
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, &c)| c)
            .collect();
        let (rank, tiebreak) = rank_five(&five);
        let score = HandScore::pack(rank, &tiebreak);
        if best.as_ref().is_none_or(|(b, _, _)| score > *b) {
            best = Some((score, rank, tiebreak));
        }
    }
    let (_, rank, tiebreak) = best.unwrap_or((
        HandScore(0),
        Rank::HighCard,
        cards.iter().map(|c| c.0).collect(),
    ));
    (rank, tiebreak)
}

fn rank_five(cards: &[Card]) -> (Rank, Vec<Value>) {
    let mut values: Vec<Value> = cards.iter().map(|c| c.0).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));
    let is_flush = cards.iter().all(|c| c.1 == cards[0].1);
    let straight = straight_high(&values);

    // Value groups ordered by count, then value, both descending.
    let mut groups: Vec<(u8, Value)> = Vec::new();
    for &value in &values {
        match groups.iter_mut().find(|g| g.1 == value) {
            Some(group) => group.0 += 1,
            None => groups.push((1, value)),
        }
    }
    groups.sort_unstable_by(|a, b| b.cmp(a));

    if is_flush {
        if let Some(high) = straight {
            return (Rank::StraightFlush, vec![high]);
        }
    }
    match (groups[0].0, groups.get(1).map_or(0, |g| g.0)) {
        (4, _) => (Rank::FourOfAKind, vec![groups[0].1, groups[1].1]),
        (3, 2) => (Rank::FullHouse, vec![groups[0].1, groups[1].1]),
        _ if is_flush => (Rank::Flush, values),
        _ if straight.is_some() => (Rank::Straight, vec![straight.unwrap_or(0)]),
        (3, _) => (
            Rank::ThreeOfAKind,
            vec![groups[0].1, groups[1].1, groups[2].1],
        ),
        (2, 2) => (Rank::TwoPair, vec![groups[0].1, groups[1].1, groups[2].1]),
        (2, _) => (
            Rank::OnePair,
            vec![groups[0].1, groups[1].1, groups[2].1, groups[3].1],
        ),
        _ => (Rank::HighCard, values),
    }
}

/// High card of a five-card straight, with the wheel (A2345) counting
/// as five-high.
fn straight_high(sorted_desc: &[Value]) -> Option<Value> {
    let mut distinct = sorted_desc.to_vec();
    distinct.dedup();
    if distinct.len() != 5 {
        return None;
    }
    if distinct[0] - distinct[4] == 4 {
        return Some(distinct[0]);
    }
    if distinct == [14, 5, 4, 3, 2] {
        return Some(5);
    }
    None
}

fn describe(rank: Rank, tiebreak: &[Value]) -> String {
    let v = |i: usize| value_repr(tiebreak.get(i).copied().unwrap_or(0));
    match rank {
        Rank::HighCard => format!("{} {}", rank, v(0)),
        Rank::OnePair => format!("{} of {}s", rank, v(0)),
        Rank::TwoPair => format!("{}, {}s and {}s", rank, v(0), v(1)),
        Rank::ThreeOfAKind => format!("{}, {}s", rank, v(0)),
        Rank::Straight | Rank::Flush | Rank::StraightFlush => {
            format!("{} high {}", v(0), rank)
        }
        Rank::FullHouse => format!("{}, {}s over {}s", rank, v(0), v(1)),
        Rank::FourOfAKind => format!("{}, {}s", rank, v(0)),
    }
}
