use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Category {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

impl Category {
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::HighCard => "High Card",
            Category::OnePair => "One Pair",
            Category::TwoPair => "Two Pair",
            Category::ThreeOfAKind => "Three of a Kind",
            Category::Straight => "Straight",
            Category::Flush => "Flush",
            Category::FullHouse => "Full House",
            Category::FourOfAKind => "Four of a Kind",
            Category::StraightFlush => "Straight Flush",
        }
    }
}

/// Comparable result of evaluating a hand.
///
/// `kickers[0]` is the primary rank (pair rank, trip rank, straight high card, ...)
/// and the rest are tie-breakers, most significant first. Unused slots are zero.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct HandRank {
    pub category: Category,
    pub kickers: [u8; 5],
}

impl HandRank {
    pub fn primary(&self) -> u8 {
        self.kickers[0]
    }

    /// Human label for snapshots and hand-finished events.
    pub fn describe(&self) -> String {
        let primary = Rank::from_u8(self.primary());
        match self.category {
            Category::StraightFlush if self.primary() == 14 => "Royal Flush".to_string(),
            Category::OnePair | Category::ThreeOfAKind | Category::FourOfAKind => {
                format!("{} ({})", self.category.label(), primary.plural())
            }
            Category::TwoPair => format!(
                "Two Pair ({} and {})",
                primary.plural(),
                Rank::from_u8(self.kickers[1]).plural()
            ),
            Category::FullHouse => format!(
                "Full House ({} over {})",
                primary.plural(),
                Rank::from_u8(self.kickers[1]).plural()
            ),
            _ => self.category.label().to_string(),
        }
    }
}

impl Ord for HandRank {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_hands(self, other)
    }
}

impl PartialOrd for HandRank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ranks the best hand obtainable from 2..=7 distinct cards.
///
/// With fewer than five cards only rank multiples are considered, so two hole
/// cards yield either a pair or a high card ordered high-then-low.
pub fn evaluate_hand(cards: &[Card]) -> HandRank {
    let mut rank_counts = [0u8; 15]; // 2..14 used
    let mut rank_mask: u16 = 0;
    let mut suit_counts = [0u8; 4];
    let mut by_suit_mask = [0u16; 4];
    for c in cards {
        let r = c.rank.value();
        let s = c.suit.index();
        rank_counts[r as usize] += 1;
        rank_mask |= 1 << r;
        suit_counts[s] += 1;
        by_suit_mask[s] |= 1 << r;
    }

    let flush_suit = suit_counts.iter().position(|&n| n >= 5);

    if let Some(s) = flush_suit {
        if let Some(high) = straight_high_from_mask(by_suit_mask[s]) {
            return rank(Category::StraightFlush, &[high]);
        }
    }

    let quads = ranks_desc(&rank_counts, |n| n >= 4);
    if let Some(&q) = quads.first() {
        let kicker = ranks_desc(&rank_counts, |n| n > 0)
            .into_iter()
            .find(|&r| r != q)
            .unwrap_or(0);
        return rank(Category::FourOfAKind, &[q, kicker]);
    }

    let trips = ranks_desc(&rank_counts, |n| n == 3);
    let pairs = ranks_desc(&rank_counts, |n| n == 2);

    if let Some(&t) = trips.first() {
        // a second set of trips can only contribute two cards as the pair
        let pair = trips
            .get(1)
            .copied()
            .into_iter()
            .chain(pairs.first().copied())
            .max();
        if let Some(p) = pair {
            return rank(Category::FullHouse, &[t, p]);
        }
    }

    if let Some(s) = flush_suit {
        let top: Vec<u8> = mask_ranks_desc(by_suit_mask[s]).into_iter().take(5).collect();
        return rank(Category::Flush, &top);
    }

    if cards.len() >= 5 {
        if let Some(high) = straight_high_from_mask(rank_mask) {
            return rank(Category::Straight, &[high]);
        }
    }

    let others = |used: &[u8], n: usize| -> Vec<u8> {
        ranks_desc(&rank_counts, |c| c > 0)
            .into_iter()
            .filter(|r| !used.contains(r))
            .take(n)
            .collect()
    };

    if let Some(&t) = trips.first() {
        let mut k = vec![t];
        k.extend(others(&[t], 2));
        return rank(Category::ThreeOfAKind, &k);
    }
    if pairs.len() >= 2 {
        let (high, low) = (pairs[0], pairs[1]);
        let mut k = vec![high, low];
        k.extend(others(&[high, low], 1));
        return rank(Category::TwoPair, &k);
    }
    if let Some(&p) = pairs.first() {
        let mut k = vec![p];
        k.extend(others(&[p], 3));
        return rank(Category::OnePair, &k);
    }

    rank(Category::HighCard, &others(&[], 5))
}

/// Evaluates hole cards together with whatever board is showing.
pub fn evaluate_holding(hole: &[Card], board: &[Card]) -> HandRank {
    let mut all = Vec::with_capacity(hole.len() + board.len());
    all.extend_from_slice(hole);
    all.extend_from_slice(board);
    evaluate_hand(&all)
}

/// Category first, then kickers lexicographically from most significant.
pub fn compare_hands(a: &HandRank, b: &HandRank) -> Ordering {
    match a.category.cmp(&b.category) {
        Ordering::Equal => a.kickers.cmp(&b.kickers),
        ord => ord,
    }
}

fn rank(category: Category, ranks: &[u8]) -> HandRank {
    let mut kickers = [0u8; 5];
    for (slot, &r) in kickers.iter_mut().zip(ranks) {
        *slot = r;
    }
    HandRank { category, kickers }
}

fn ranks_desc(rank_counts: &[u8; 15], pred: impl Fn(u8) -> bool) -> Vec<u8> {
    (2..=14u8)
        .rev()
        .filter(|&r| pred(rank_counts[r as usize]))
        .collect()
}

fn mask_ranks_desc(mask: u16) -> Vec<u8> {
    (2..=14u8).rev().filter(|&r| mask & (1 << r) != 0).collect()
}

/// Highest straight in a rank bitmask; the wheel (A-2-3-4-5) reports 5.
fn straight_high_from_mask(mask: u16) -> Option<u8> {
    let mut m = mask;
    if m & (1 << 14) != 0 {
        m |= 1 << 1;
    }
    (5..=14u8).rev().find(|&high| {
        let window = 0b1_1111u16 << (high - 4);
        m & window == window
    })
}
