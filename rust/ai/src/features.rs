//! Descriptive features the policy branches on.

use felt_engine::cards::Card;
use felt_engine::hand::{evaluate_hand, evaluate_holding, Category};

use crate::view::{SeatView, TableView};

/// Rank index where two is 0 and the ace is 12.
fn index(c: &Card) -> f64 {
    f64::from(c.rank.value() - 2)
}

/// Closed-form preflop score in `0.0..=1.0`.
///
/// Pairs are scored by rank (AA 1.0, KK 0.92, QQ 0.85, JJ 0.72). Unpaired
/// hands start from the high card and gain for suitedness and connectedness;
/// AK, AQ and KQ are pinned to 0.9, 0.8 and 0.7.
pub fn preflop_strength(hole: &[Card]) -> f64 {
    let [a, b] = hole else { return 0.3 };
    let (ra, rb) = (index(a), index(b));
    let (high, low) = (ra.max(rb), ra.min(rb));

    if a.rank == b.rank {
        return match a.rank.value() {
            14 => 1.0,
            13 => 0.92,
            12 => 0.85,
            11 => 0.72,
            _ => 0.5 + ra * 0.02,
        };
    }

    let mut strength = 0.2 + high / 12.0 * 0.35;
    if a.suit == b.suit {
        strength += 0.1;
    }
    if high - low <= 1.0 {
        strength += 0.12;
    }
    match (high as u8, low as u8) {
        (12, 11) => strength = 0.9,
        (12, 10) => strength = 0.8,
        (11, 10) => strength = 0.7,
        _ => {}
    }
    strength.min(1.0)
}

/// Hole-card score lifted by any made hand on the board.
pub fn hand_strength(hole: &[Card], board: &[Card]) -> f64 {
    let [a, b] = hole else { return 0.3 };
    let (ra, rb) = (index(a), index(b));
    let high = ra.max(rb);
    let gap = (ra - rb).abs();

    let mut strength = if a.rank == b.rank {
        0.5 + ra / 13.0 * 0.45
    } else {
        let mut s = high / 13.0 * 0.3;
        if a.suit == b.suit {
            s += 0.1;
        }
        if gap <= 2.0 {
            s += 0.08;
        }
        if high >= 11.0 && gap <= 2.0 {
            s += 0.15;
        }
        s
    };

    if !board.is_empty() {
        let made = evaluate_holding(hole, board).category;
        let floor = if made >= Category::ThreeOfAKind {
            0.7
        } else if made >= Category::TwoPair {
            0.5
        } else if made >= Category::OnePair {
            0.35
        } else {
            0.0
        };
        strength = strength.max(floor);
    }
    strength.min(1.0)
}

/// 1 high card, 2 pair, 3 two pair or trips, 4 straight/flush/full house,
/// 5 quads or a straight flush.
pub fn hand_tier(category: Category) -> u8 {
    match category {
        Category::HighCard => 1,
        Category::OnePair => 2,
        Category::TwoPair | Category::ThreeOfAKind => 3,
        Category::Straight | Category::Flush | Category::FullHouse => 4,
        Category::FourOfAKind | Category::StraightFlush => 5,
    }
}

pub fn tier_of(hole: &[Card], board: &[Card]) -> u8 {
    if hole.len() + board.len() < 2 {
        return 1;
    }
    let mut all = hole.to_vec();
    all.extend_from_slice(board);
    hand_tier(evaluate_hand(&all).category)
}

/// Flush-draw heuristic from the largest same-suit group.
pub fn draw_strength(hole: &[Card], board: &[Card]) -> f64 {
    if hole.len() < 2 {
        return 0.0;
    }
    if board.is_empty() {
        return 0.1;
    }
    let mut suits = [0u8; 4];
    for c in hole.iter().chain(board) {
        suits[c.suit.index()] += 1;
    }
    match suits.iter().copied().max().unwrap_or(0) {
        n if n >= 4 => 0.35,
        3 => 0.15,
        _ => 0.05,
    }
}

const POSITION_WEIGHTS: [f64; 6] = [0.5, 0.3, 0.4, 0.6, 0.8, 1.0];

pub fn position_advantage(seat_index: usize) -> f64 {
    POSITION_WEIGHTS[seat_index % POSITION_WEIGHTS.len()]
}

/// Share of the final pot the call would pay for; zero when nothing is owed.
pub fn pot_odds(to_call: u32, pot: u32) -> f64 {
    if to_call == 0 {
        0.0
    } else {
        f64::from(to_call) / (f64::from(pot) + f64::from(to_call))
    }
}

pub fn stack_to_pot(stack: u32, pot: u32) -> f64 {
    if stack == 0 {
        0.0
    } else {
        f64::from(stack) / f64::from(pot.max(1))
    }
}

/// Everything the policy derives before branching.
#[derive(Debug, Clone, PartialEq)]
pub struct Features {
    pub to_call: u32,
    pub tier: u8,
    pub strength: f64,
    pub preflop: f64,
    pub draw: f64,
    pub position: f64,
    pub pot_odds: f64,
    pub spr: f64,
    /// Fraction of the remaining stack a call would cost
    pub call_cost: f64,
}

impl Features {
    pub fn compute(seat: &SeatView, table: &TableView) -> Self {
        let to_call = table.current_bet.saturating_sub(seat.street_bet);
        let call_cost = if seat.stack > 0 {
            f64::from(to_call) / f64::from(seat.stack)
        } else {
            1.0
        };
        Self {
            to_call,
            tier: tier_of(&seat.hole, &table.board),
            strength: hand_strength(&seat.hole, &table.board),
            preflop: preflop_strength(&seat.hole),
            draw: draw_strength(&seat.hole, &table.board),
            position: position_advantage(seat.index),
            pot_odds: pot_odds(to_call, table.pot),
            spr: stack_to_pot(seat.stack, table.pot),
            call_cost,
        }
    }
}
