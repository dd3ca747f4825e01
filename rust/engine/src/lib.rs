//! # felt-engine: Texas Hold'em table core
//!
//! Card model, 7-card hand evaluation and the betting-round state machine for
//! a multi-seat no-limit table. Shuffles are driven by seeded ChaCha20 streams
//! so any hand can be replayed from its recorded seed.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and text parsing
//! - [`deck`] - Seeded deck shuffling
//! - [`hand`] - Hand evaluation and comparison
//! - [`player`] - Seat state and submitted actions
//! - [`rules`] - Action validation and raise clamping
//! - [`table`] - Blinds, turn order, streets, showdown and payouts
//! - [`snapshot`] - Viewer-specific table views
//! - [`logger`] - HandRecord serialization to JSONL
//! - [`errors`] - Error types for table operations
//!
//! ## Quick Start
//!
//! ```rust
//! use felt_engine::cards::parse_cards;
//! use felt_engine::hand::{evaluate_hand, Category};
//!
//! let cards = parse_cards("Ah Kh Qh Jh Th 2c 3d").unwrap();
//! let rank = evaluate_hand(&cards);
//! assert_eq!(rank.category, Category::StraightFlush);
//! assert_eq!(rank.describe(), "Royal Flush");
//! ```
//!
//! ## Playing a Hand
//!
//! ```rust
//! use felt_engine::player::{PlayerAction, SeatConfig};
//! use felt_engine::table::{Phase, Table, TableConfig};
//!
//! let mut table = Table::new(TableConfig { seed: Some(42), ..TableConfig::default() });
//! table
//!     .start_hand(&[
//!         SeatConfig::human("p1", "Alice", 1000),
//!         SeatConfig::bot("p2", "Bob", 1000),
//!         SeatConfig::bot("p3", "Carol", 1000),
//!     ])
//!     .unwrap();
//! assert_eq!(table.pot(), 15);
//!
//! // the seat after the big blind opens; everyone folds to the big blind
//! while let Some(seat) = table.turn() {
//!     table.apply_action(seat, PlayerAction::Fold).unwrap();
//! }
//! assert_eq!(table.phase(), Phase::Finished);
//! ```

pub mod cards;
pub mod deck;
pub mod errors;
pub mod hand;
pub mod logger;
pub mod player;
pub mod rules;
pub mod snapshot;
pub mod table;
