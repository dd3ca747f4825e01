use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::table::{HandResult, Phase, Table};

/// A hole card as one particular viewer may see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "card", rename_all = "snake_case")]
pub enum CardView {
    Hidden,
    Shown(Card),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatSnapshot {
    pub index: usize,
    pub id: String,
    pub name: String,
    pub stack: u32,
    pub bet: u32,
    pub folded: bool,
    pub all_in: bool,
    pub automated: bool,
    pub is_turn: bool,
    pub is_dealer: bool,
    pub hole: Vec<CardView>,
    /// Best-hand label once the hand went to showdown
    pub best_hand: Option<String>,
}

/// Viewer-specific picture of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub hand_number: u64,
    pub phase: Phase,
    pub board: Vec<Card>,
    pub pot: u32,
    pub current_bet: u32,
    pub min_raise_to: u32,
    pub small_blind: u32,
    pub big_blind: u32,
    pub dealer: Option<usize>,
    pub turn: Option<usize>,
    pub seats: Vec<SeatSnapshot>,
    pub result: Option<HandResult>,
}

impl TableSnapshot {
    pub fn seat(&self, id: &str) -> Option<&SeatSnapshot> {
        self.seats.iter().find(|s| s.id == id)
    }
}

impl Table {
    /// Builds the snapshot `viewer` is allowed to see.
    ///
    /// Hole cards are shown only to their owner until the hand is over, after
    /// which every seat's cards are shown. `None` is a spectator.
    pub fn snapshot_for(&self, viewer: Option<&str>) -> TableSnapshot {
        let over = self.phase().is_over();
        let labels = self.result().map(|r| &r.showdown);
        let seats = self
            .seats()
            .iter()
            .map(|s| {
                let visible = over || viewer == Some(s.id());
                let hole = s
                    .hole_cards()
                    .iter()
                    .map(|&c| if visible { CardView::Shown(c) } else { CardView::Hidden })
                    .collect();
                let best_hand = labels.and_then(|entries| {
                    entries
                        .iter()
                        .find(|e| e.seat == s.index())
                        .map(|e| e.label.clone())
                });
                SeatSnapshot {
                    index: s.index(),
                    id: s.id().to_string(),
                    name: s.name().to_string(),
                    stack: s.stack(),
                    bet: s.bet(),
                    folded: s.is_folded(),
                    all_in: s.is_all_in(),
                    automated: s.is_automated(),
                    is_turn: self.turn() == Some(s.index()),
                    is_dealer: self.dealer() == Some(s.index()),
                    hole,
                    best_hand,
                }
            })
            .collect();

        TableSnapshot {
            hand_number: self.hand_number(),
            phase: self.phase(),
            board: self.board().to_vec(),
            pot: self.pot(),
            current_bet: self.current_bet(),
            min_raise_to: self.min_raise_to(),
            small_blind: self.config().small_blind,
            big_blind: self.config().big_blind,
            dealer: self.dealer(),
            turn: self.turn(),
            seats,
            result: self.result().cloned(),
        }
    }
}
