use crate::cards::Card;
use serde::{Deserialize, Serialize};

/// An action a seat submits on its turn.
/// `Raise` carries the total street bet the seat wants to reach ("raise to").
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum PlayerAction {
    /// Fold and forfeit the hand
    Fold,
    /// Pass without betting (only valid when nothing is owed)
    Check,
    /// Match the current bet, or commit the whole stack if it is shorter
    Call,
    /// Lift the current bet to the given street total
    Raise(u32),
}

impl PlayerAction {
    pub fn kind(&self) -> &'static str {
        match self {
            PlayerAction::Fold => "fold",
            PlayerAction::Check => "check",
            PlayerAction::Call => "call",
            PlayerAction::Raise(_) => "raise",
        }
    }
}

/// Persistent seat as the room knows it, snapshotted when a hand starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatConfig {
    pub id: String,
    pub name: String,
    pub chips: u32,
    pub automated: bool,
}

impl SeatConfig {
    pub fn human(id: impl Into<String>, name: impl Into<String>, chips: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            chips,
            automated: false,
        }
    }

    pub fn bot(id: impl Into<String>, name: impl Into<String>, chips: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            chips,
            automated: true,
        }
    }
}

/// A participant in the current hand. Only the table mutates it.
#[derive(Debug, Clone)]
pub struct Seat {
    id: String,
    name: String,
    index: usize,
    automated: bool,
    /// Chips behind (not yet committed)
    stack: u32,
    /// Chips committed on the current street
    bet: u32,
    hole: Vec<Card>,
    folded: bool,
    all_in: bool,
}

impl Seat {
    pub fn from_config(cfg: &SeatConfig, index: usize) -> Self {
        Self {
            id: cfg.id.clone(),
            name: cfg.name.clone(),
            index,
            automated: cfg.automated,
            stack: cfg.chips,
            bet: 0,
            hole: Vec::with_capacity(2),
            folded: false,
            all_in: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn index(&self) -> usize {
        self.index
    }
    pub fn is_automated(&self) -> bool {
        self.automated
    }
    pub fn stack(&self) -> u32 {
        self.stack
    }
    pub fn bet(&self) -> u32 {
        self.bet
    }
    pub fn hole_cards(&self) -> &[Card] {
        &self.hole
    }
    pub fn is_folded(&self) -> bool {
        self.folded
    }
    pub fn is_all_in(&self) -> bool {
        self.all_in
    }

    /// Still eligible to take a turn this hand.
    pub fn can_act(&self) -> bool {
        !self.folded && !self.all_in && self.stack > 0
    }

    /// Chips still needed to match `current_bet`.
    pub fn owed(&self, current_bet: u32) -> u32 {
        current_bet.saturating_sub(self.bet)
    }

    pub(crate) fn give_card(&mut self, c: Card) {
        debug_assert!(self.hole.len() < 2, "hole cards already full");
        self.hole.push(c);
    }

    /// Moves up to `amount` from stack into the street bet and returns the chips moved.
    /// Emptying the stack marks the seat all-in.
    pub(crate) fn commit(&mut self, amount: u32) -> u32 {
        let moved = amount.min(self.stack);
        self.stack -= moved;
        self.bet += moved;
        if self.stack == 0 {
            self.all_in = true;
        }
        moved
    }

    pub(crate) fn fold(&mut self) {
        self.folded = true;
    }

    pub(crate) fn clear_bet(&mut self) {
        self.bet = 0;
    }

    pub(crate) fn add_chips(&mut self, amount: u32) {
        self.stack = self.stack.saturating_add(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_never_overdraws_and_marks_all_in() {
        let mut s = Seat::from_config(&SeatConfig::human("a", "Alice", 30), 0);
        assert_eq!(s.commit(10), 10);
        assert_eq!((s.stack(), s.bet()), (20, 10));
        assert!(!s.is_all_in());
        assert_eq!(s.commit(100), 20);
        assert_eq!((s.stack(), s.bet()), (0, 30));
        assert!(s.is_all_in());
        assert!(!s.can_act());
    }

    #[test]
    fn owed_is_saturating() {
        let mut s = Seat::from_config(&SeatConfig::bot("b", "Bot", 100), 1);
        s.commit(40);
        assert_eq!(s.owed(100), 60);
        assert_eq!(s.owed(20), 0);
    }

    #[test]
    fn action_serializes_as_tagged_union() {
        let json = serde_json::to_string(&PlayerAction::Raise(40)).unwrap();
        assert_eq!(json, r#"{"kind":"raise","amount":40}"#);
        let back: PlayerAction = serde_json::from_str(r#"{"kind":"fold"}"#).unwrap();
        assert_eq!(back, PlayerAction::Fold);
    }
}
