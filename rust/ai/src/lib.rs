//! # felt-ai: automated seats for the felt table
//!
//! Turns a seat's cards, the public table state and an opponent-aggression
//! estimate into a [`PlayerAction`]. All randomness comes from the caller's
//! RNG, so decisions replay exactly under a seeded or scripted source.
//!
//! ## Core Components
//!
//! - [`AIOpponent`] - Trait defining the interface for AI decision-making
//! - [`policy`] - The styled decision policy and [`policy::StyledAI`]
//! - [`style`] - Style profiles and premium-hand frequency tables
//! - [`features`] - Hand strength, tier, draw, position and pot-odds features
//! - [`tracker`] - Per-room opponent-aggression estimate
//! - [`create_ai`] - Factory picking a style by seat index
//!
//! ## Quick Start
//!
//! ```rust
//! use felt_ai::{create_ai, AIOpponent};
//! use felt_engine::player::SeatConfig;
//! use felt_engine::table::{Table, TableConfig};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let mut table = Table::new(TableConfig { seed: Some(42), ..TableConfig::default() });
//! table
//!     .start_hand(&[SeatConfig::bot("a", "A", 1000), SeatConfig::bot("b", "B", 1000)])
//!     .unwrap();
//!
//! let seat = table.turn().unwrap();
//! let ai = create_ai(seat);
//! let mut rng = ChaCha20Rng::seed_from_u64(7);
//! let action = ai.act(&table, seat, 0.3, &mut rng).unwrap();
//! table.apply_action(seat, action).unwrap();
//! ```

use felt_engine::player::PlayerAction;
use felt_engine::table::Table;
use rand::RngCore;

pub mod features;
pub mod policy;
pub mod style;
pub mod tracker;
pub mod view;

pub use policy::StyledAI;
pub use style::StyleProfile;
pub use tracker::AggressionTracker;
pub use view::{SeatView, TableView};

/// Trait defining the interface for AI opponents.
///
/// Implementors only read their inputs; the opponent-aggression estimate and
/// the random source are passed in so the caller owns all mutable state.
pub trait AIOpponent: Send + Sync {
    /// Determine the next action for `seat` given the public table state.
    fn decide(
        &self,
        seat: &SeatView,
        table: &TableView,
        aggression: f64,
        rng: &mut dyn RngCore,
    ) -> PlayerAction;

    /// Return the name/identifier of this AI implementation.
    fn name(&self) -> &str;

    /// Builds the views from a live table and decides for `seat`.
    /// `None` when no betting street is open or the seat does not exist.
    fn act(
        &self,
        table: &Table,
        seat: usize,
        aggression: f64,
        rng: &mut dyn RngCore,
    ) -> Option<PlayerAction> {
        let seat_view = SeatView::from_table(table, seat)?;
        let table_view = TableView::from_table(table)?;
        Some(self.decide(&seat_view, &table_view, aggression, rng))
    }
}

/// Factory creating the styled opponent for a seat index.
///
/// # Example
///
/// ```rust
/// use felt_ai::create_ai;
///
/// assert_eq!(create_ai(1).name(), "TAG");
/// assert_eq!(create_ai(2).name(), "GTO");
/// ```
pub fn create_ai(seat_index: usize) -> Box<dyn AIOpponent> {
    Box::new(StyledAI::new(StyleProfile::for_seat(seat_index)))
}
