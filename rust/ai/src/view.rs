//! Read-only inputs to a decision.

use felt_engine::cards::Card;
use felt_engine::logger::Street;
use felt_engine::table::Table;

/// What the deciding seat knows about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatView {
    pub index: usize,
    pub hole: Vec<Card>,
    pub stack: u32,
    pub street_bet: u32,
}

/// Public table state at the moment of the decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub street: Street,
    pub board: Vec<Card>,
    pub pot: u32,
    pub current_bet: u32,
    pub big_blind: u32,
}

impl SeatView {
    pub fn from_table(table: &Table, index: usize) -> Option<Self> {
        let seat = table.seat(index)?;
        Some(Self {
            index,
            hole: seat.hole_cards().to_vec(),
            stack: seat.stack(),
            street_bet: seat.bet(),
        })
    }
}

impl TableView {
    /// `None` outside a betting street.
    pub fn from_table(table: &Table) -> Option<Self> {
        Some(Self {
            street: table.street()?,
            board: table.board().to_vec(),
            pot: table.pot(),
            current_bet: table.current_bet(),
            big_blind: table.big_blind(),
        })
    }

    pub fn min_raise_to(&self) -> u32 {
        self.current_bet.saturating_add(self.big_blind)
    }
}
