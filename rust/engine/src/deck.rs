use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};

/// The cards for one hand. Cards are drawn from the end of the sequence.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Fresh deck in enumeration order (not shuffled).
    pub fn new() -> Self {
        Self { cards: full_deck() }
    }

    /// Fresh deck shuffled by a ChaCha20 stream seeded from `seed`.
    pub fn new_with_seed(seed: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut deck = Self::new();
        deck.shuffle(&mut rng);
        deck
    }

    /// Deck that deals `draw_order` first, then the remaining cards of a full deck.
    pub fn stacked(draw_order: Vec<Card>) -> Self {
        let mut rest: Vec<Card> = full_deck()
            .into_iter()
            .filter(|c| !draw_order.contains(c))
            .collect();
        rest.reverse();
        let mut cards = rest;
        cards.extend(draw_order.into_iter().rev());
        Self { cards }
    }

    /// Uniform Fisher–Yates permutation: walks from the last index down to 1,
    /// swapping each slot with a uniformly chosen index at or below it.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn deal_card(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn burn_card(&mut self) {
        let _ = self.deal_card();
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}
