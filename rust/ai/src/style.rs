//! Playing-style profiles for automated seats.

use felt_engine::cards::{Card, Rank};

/// Starting hands that can carry fixed preflop frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PremiumHand {
    AA,
    KK,
    QQ,
    AKs,
    AKo,
}

impl PremiumHand {
    pub fn classify(hole: &[Card]) -> Option<PremiumHand> {
        let [a, b] = hole else { return None };
        let suited = a.suit == b.suit;
        match (a.rank.max(b.rank), a.rank.min(b.rank)) {
            (Rank::Ace, Rank::Ace) => Some(PremiumHand::AA),
            (Rank::King, Rank::King) => Some(PremiumHand::KK),
            (Rank::Queen, Rank::Queen) => Some(PremiumHand::QQ),
            (Rank::Ace, Rank::King) if suited => Some(PremiumHand::AKs),
            (Rank::Ace, Rank::King) => Some(PremiumHand::AKo),
            _ => None,
        }
    }
}

/// `(raise_freq, call_freq)` per premium hand when facing a preflop bet.
/// Whatever probability is left over folds.
#[derive(Debug, Clone, PartialEq)]
pub struct PremiumTable {
    entries: Vec<(PremiumHand, f64, f64)>,
}

impl PremiumTable {
    pub fn new(entries: Vec<(PremiumHand, f64, f64)>) -> Self {
        Self { entries }
    }

    pub fn frequencies(&self, hand: PremiumHand) -> Option<(f64, f64)> {
        self.entries
            .iter()
            .find(|(h, _, _)| *h == hand)
            .map(|&(_, raise, call)| (raise, call))
    }
}

impl Default for PremiumTable {
    fn default() -> Self {
        Self::new(vec![
            (PremiumHand::AA, 0.9, 0.1),
            (PremiumHand::KK, 0.85, 0.15),
            (PremiumHand::QQ, 0.7, 0.3),
            (PremiumHand::AKs, 0.75, 0.25),
            (PremiumHand::AKo, 0.65, 0.35),
        ])
    }
}

/// `call_rate` at which the base call frequencies apply unchanged.
pub const NEUTRAL_CALL_RATE: f64 = 0.75;

#[derive(Debug, Clone, PartialEq)]
pub struct StyleProfile {
    pub name: &'static str,
    /// Chance to open-raise a playable hand when nobody has bet
    pub aggression: f64,
    /// Chance to raise a weak hand from late position
    pub bluff_rate: f64,
    /// Scales call-or-fold frequencies when facing a bet, relative to
    /// [`NEUTRAL_CALL_RATE`]
    pub call_rate: f64,
    pub premium: Option<PremiumTable>,
}

impl StyleProfile {
    pub fn tight_aggressive() -> Self {
        Self {
            name: "TAG",
            aggression: 0.85,
            bluff_rate: 0.35,
            call_rate: 0.7,
            premium: None,
        }
    }

    pub fn game_theory() -> Self {
        Self {
            name: "GTO",
            aggression: 0.8,
            bluff_rate: 0.3,
            call_rate: 0.75,
            premium: Some(PremiumTable::default()),
        }
    }

    pub fn loose_aggressive() -> Self {
        Self {
            name: "LAG",
            aggression: 0.9,
            bluff_rate: 0.4,
            call_rate: 0.8,
            premium: None,
        }
    }

    pub fn shark() -> Self {
        Self {
            name: "Shark",
            aggression: 0.95,
            bluff_rate: 0.45,
            call_rate: 0.85,
            premium: None,
        }
    }

    pub fn master() -> Self {
        Self {
            name: "Master",
            aggression: 0.82,
            bluff_rate: 0.32,
            call_rate: 0.72,
            premium: None,
        }
    }

    /// Base call frequency `p` adjusted for this profile, capped at 1.
    pub fn call_frequency(&self, p: f64) -> f64 {
        (p * self.call_rate / NEUTRAL_CALL_RATE).min(1.0)
    }

    pub fn all() -> [StyleProfile; 5] {
        [
            Self::tight_aggressive(),
            Self::game_theory(),
            Self::loose_aggressive(),
            Self::shark(),
            Self::master(),
        ]
    }

    /// Profile for a seat index. Seat 1 gets the first profile, seat 0 the last.
    pub fn for_seat(index: usize) -> Self {
        let all = Self::all();
        let i = (index + all.len() - 1) % all.len();
        all.into_iter().nth(i).unwrap_or_else(Self::master)
    }
}
