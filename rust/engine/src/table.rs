use std::collections::BTreeSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cards::Card;
use crate::deck::Deck;
use crate::errors::GameError;
use crate::hand::{evaluate_holding, HandRank};
use crate::logger::{ActionRecord, HandRecord, ShowdownInfo, ShownHand, Street};
use crate::player::{PlayerAction, Seat, SeatConfig};
use crate::rules::{min_raise_to, validate_action, ValidatedAction};

/// Per-street action count after which the street is closed unconditionally.
pub const DEFAULT_ACTION_CEILING: u32 = 100;

/// Most seats one hand can deal to.
pub const MAX_SEATS: usize = 10;

/// Where the hand stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No hand has been dealt yet
    Waiting,
    Preflop,
    Flop,
    Turn,
    River,
    /// Pot decided by comparing hands
    Showdown,
    /// Pot won uncontested after everyone else folded
    Finished,
}

impl Phase {
    pub fn street(self) -> Option<Street> {
        match self {
            Phase::Preflop => Some(Street::Preflop),
            Phase::Flop => Some(Street::Flop),
            Phase::Turn => Some(Street::Turn),
            Phase::River => Some(Street::River),
            _ => None,
        }
    }

    pub fn is_betting(self) -> bool {
        self.street().is_some()
    }

    pub fn is_over(self) -> bool {
        matches!(self, Phase::Showdown | Phase::Finished)
    }
}

impl From<Street> for Phase {
    fn from(street: Street) -> Self {
        match street {
            Street::Preflop => Phase::Preflop,
            Street::Flop => Phase::Flop,
            Street::Turn => Phase::Turn,
            Street::River => Phase::River,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub small_blind: u32,
    pub big_blind: u32,
    pub max_actions_per_street: u32,
    /// Seeds the shuffle stream; `None` draws one from the thread RNG
    pub seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            small_blind: 5,
            big_blind: 10,
            max_actions_per_street: DEFAULT_ACTION_CEILING,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub seat: usize,
    pub seat_id: String,
    pub name: String,
    pub amount: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowdownEntry {
    pub seat: usize,
    pub seat_id: String,
    pub name: String,
    pub cards: Vec<Card>,
    pub rank: HandRank,
    pub label: String,
}

/// Winner record for a finished hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandResult {
    pub winners: Vec<Payout>,
    pub pot: u32,
    pub description: String,
    /// Contesting hands; empty when the pot was won uncontested
    pub showdown: Vec<ShowdownEntry>,
}

/// What the table did with a submitted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedAction {
    pub seat: usize,
    pub street: Street,
    pub requested: PlayerAction,
    /// The action as it took effect (clamped raise, short raise as call)
    pub effective: PlayerAction,
    pub resolved: ValidatedAction,
}

impl AppliedAction {
    pub fn was_clamped(&self) -> bool {
        self.requested != self.effective
    }
}

/// Betting-round state machine for one table.
///
/// Owns the per-hand state (deck, board, pot, bets, turn pointer) and moves it
/// through preflop, flop, turn and river to a showdown or an uncontested win.
#[derive(Debug)]
pub struct Table {
    config: TableConfig,
    rng: ChaCha20Rng,
    deck: Deck,
    board: Vec<Card>,
    seats: Vec<Seat>,
    pot: u32,
    current_bet: u32,
    phase: Phase,
    turn: Option<usize>,
    dealer: Option<usize>,
    /// Button holder by seat id, so it survives seats busting between hands
    dealer_id: Option<String>,
    acted: BTreeSet<usize>,
    street_actions: u32,
    result: Option<HandResult>,
    actions: Vec<ActionRecord>,
    hand_seed: Option<u64>,
    hand_number: u64,
    chips_at_start: u32,
}

impl Table {
    pub fn new(config: TableConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        Self {
            config,
            rng: ChaCha20Rng::seed_from_u64(seed),
            deck: Deck::new(),
            board: Vec::with_capacity(5),
            seats: Vec::new(),
            pot: 0,
            current_bet: 0,
            phase: Phase::Waiting,
            turn: None,
            dealer: None,
            dealer_id: None,
            acted: BTreeSet::new(),
            street_actions: 0,
            result: None,
            actions: Vec::new(),
            hand_seed: None,
            hand_number: 0,
            chips_at_start: 0,
        }
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn street(&self) -> Option<Street> {
        self.phase.street()
    }
    pub fn board(&self) -> &[Card] {
        &self.board
    }
    pub fn pot(&self) -> u32 {
        self.pot
    }
    pub fn current_bet(&self) -> u32 {
        self.current_bet
    }
    pub fn big_blind(&self) -> u32 {
        self.config.big_blind
    }
    pub fn turn(&self) -> Option<usize> {
        self.turn
    }
    pub fn dealer(&self) -> Option<usize> {
        self.dealer
    }
    pub fn dealer_id(&self) -> Option<&str> {
        self.dealer_id.as_deref()
    }
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }
    pub fn seat(&self, index: usize) -> Option<&Seat> {
        self.seats.get(index)
    }
    pub fn seat_index_of(&self, id: &str) -> Option<usize> {
        self.seats.iter().position(|s| s.id() == id)
    }
    pub fn result(&self) -> Option<&HandResult> {
        self.result.as_ref()
    }
    pub fn actions(&self) -> &[ActionRecord] {
        &self.actions
    }
    /// Seats that have acted since the street opened or the last raise.
    pub fn acted_this_street(&self) -> &BTreeSet<usize> {
        &self.acted
    }
    pub fn street_actions(&self) -> u32 {
        self.street_actions
    }
    /// Increments with every dealt hand; used to detect stale work.
    pub fn hand_number(&self) -> u64 {
        self.hand_number
    }
    pub fn hand_seed(&self) -> Option<u64> {
        self.hand_seed
    }
    pub fn is_hand_active(&self) -> bool {
        self.phase.is_betting()
    }

    pub fn to_call(&self, seat: usize) -> u32 {
        self.seats
            .get(seat)
            .map(|s| s.owed(self.current_bet).min(s.stack()))
            .unwrap_or(0)
    }

    pub fn min_raise_to(&self) -> u32 {
        min_raise_to(self.current_bet, self.config.big_blind)
    }

    /// Pot plus every stack behind. Constant for the life of a hand.
    pub fn chips_in_play(&self) -> u32 {
        self.pot + self.seats.iter().map(Seat::stack).sum::<u32>()
    }

    /// Stacks to write back to the room, by seat identity.
    pub fn final_stacks(&self) -> Vec<(String, u32)> {
        self.seats
            .iter()
            .map(|s| (s.id().to_string(), s.stack()))
            .collect()
    }

    /// Shuffles a fresh deck and deals a new hand to every seat holding chips.
    ///
    /// # Errors
    ///
    /// - [`GameError::InsufficientActors`] when fewer than two seats hold chips
    /// - [`GameError::IllegalAction`] while a hand is still being bet, or with
    ///   more than [`MAX_SEATS`] playable seats
    pub fn start_hand(&mut self, roster: &[SeatConfig]) -> Result<(), GameError> {
        let seed: u64 = self.rng.random();
        self.deal_hand(roster, Deck::new_with_seed(seed), Some(seed))
    }

    /// Like [`Table::start_hand`] but deals from a prepared deck (replays, tests).
    pub fn start_hand_with_deck(
        &mut self,
        roster: &[SeatConfig],
        deck: Deck,
    ) -> Result<(), GameError> {
        self.deal_hand(roster, deck, None)
    }

    fn deal_hand(
        &mut self,
        roster: &[SeatConfig],
        mut deck: Deck,
        seed: Option<u64>,
    ) -> Result<(), GameError> {
        if self.phase.is_betting() {
            return Err(GameError::illegal("a hand is already in progress"));
        }
        let playable: Vec<(usize, &SeatConfig)> = roster
            .iter()
            .enumerate()
            .filter(|(_, s)| s.chips > 0)
            .collect();
        if playable.len() < 2 {
            return Err(GameError::InsufficientActors {
                available: playable.len(),
            });
        }
        if playable.len() > MAX_SEATS {
            return Err(GameError::illegal(format!(
                "at most {MAX_SEATS} seats can be dealt in"
            )));
        }

        let mut seats: Vec<Seat> = playable
            .iter()
            .enumerate()
            .map(|(i, (_, cfg))| Seat::from_config(cfg, i))
            .collect();
        for _ in 0..2 {
            for seat in seats.iter_mut() {
                let c = deck
                    .deal_card()
                    .ok_or_else(|| GameError::illegal("deck exhausted"))?;
                seat.give_card(c);
            }
        }

        let n = seats.len();
        let button = self.next_button(roster);
        let dealer = playable
            .iter()
            .position(|&(pos, _)| Some(pos) == button)
            .unwrap_or(0);
        self.dealer_id = Some(playable[dealer].1.id.clone());
        self.seats = seats;
        self.deck = deck;
        self.dealer = Some(dealer);
        self.hand_seed = seed;
        self.hand_number += 1;
        self.board.clear();
        self.pot = 0;
        self.acted.clear();
        self.street_actions = 0;
        self.result = None;
        self.actions.clear();
        self.chips_at_start = self.chips_in_play();

        // heads-up the dealer posts the small blind
        let (sb, bb) = if n == 2 {
            (dealer, (dealer + 1) % n)
        } else {
            ((dealer + 1) % n, (dealer + 2) % n)
        };
        let sb_posted = self.seats[sb].commit(self.config.small_blind);
        let bb_posted = self.seats[bb].commit(self.config.big_blind);
        self.pot = sb_posted + bb_posted;
        self.current_bet = sb_posted.max(bb_posted);
        self.phase = Phase::Preflop;

        info!(
            hand = self.hand_number,
            seats = n,
            dealer,
            small_blind = sb,
            big_blind = bb,
            pot = self.pot,
            "hand started"
        );

        self.turn = self.next_actor_after(bb);
        if self.turn.is_none() {
            self.end_street();
        }
        Ok(())
    }

    /// Roster position of the next button: the first seat holding chips after
    /// the previous dealer's position, or the first funded seat on the first
    /// hand (or when the previous dealer left the roster).
    fn next_button(&self, roster: &[SeatConfig]) -> Option<usize> {
        let previous = self
            .dealer_id
            .as_deref()
            .and_then(|id| roster.iter().position(|s| s.id == id));
        match previous {
            Some(prev) => (1..=roster.len())
                .map(|step| (prev + step) % roster.len())
                .find(|&i| roster[i].chips > 0),
            None => roster.iter().position(|s| s.chips > 0),
        }
    }

    /// Applies `action` for `seat`, then advances the turn or the street.
    ///
    /// # Errors
    ///
    /// - [`GameError::NoHandInProgress`] outside a betting street
    /// - [`GameError::UnknownSeat`] for an index not dealt in
    /// - [`GameError::NotPlayersTurn`] when `seat` does not hold the turn
    /// - [`GameError::IllegalAction`] for a check while owing chips
    ///
    /// A rejected action leaves the table unchanged.
    pub fn apply_action(
        &mut self,
        seat: usize,
        action: PlayerAction,
    ) -> Result<AppliedAction, GameError> {
        let street = self.phase.street().ok_or(GameError::NoHandInProgress)?;
        if seat >= self.seats.len() {
            return Err(GameError::UnknownSeat(seat));
        }
        let expected = self.turn.ok_or(GameError::NoHandInProgress)?;
        if expected != seat {
            return Err(GameError::NotPlayersTurn {
                expected,
                actual: seat,
            });
        }

        let prior_bet = self.current_bet;
        let resolved = {
            let s = &self.seats[seat];
            validate_action(
                s.stack(),
                s.bet(),
                self.current_bet,
                self.config.big_blind,
                action,
            )?
        };

        let effective = match resolved {
            ValidatedAction::Fold => {
                self.seats[seat].fold();
                PlayerAction::Fold
            }
            ValidatedAction::Check => PlayerAction::Check,
            ValidatedAction::Call(chips) => {
                self.pot += self.seats[seat].commit(chips);
                PlayerAction::Call
            }
            ValidatedAction::Raise { to, chips } | ValidatedAction::AllIn { to, chips } => {
                self.pot += self.seats[seat].commit(chips);
                if to > prior_bet {
                    self.current_bet = to;
                    // everyone else must respond to the new bet
                    self.acted.clear();
                    PlayerAction::Raise(to)
                } else {
                    PlayerAction::Call
                }
            }
        };
        if let PlayerAction::Raise(requested) = action {
            if effective != action {
                warn!(
                    seat,
                    requested,
                    effective = ?effective,
                    "raise amount outside legal range, clamped"
                );
            }
        }

        self.acted.insert(seat);
        self.street_actions += 1;
        self.actions.push(ActionRecord {
            seat,
            seat_id: self.seats[seat].id().to_string(),
            street,
            action: effective,
            chips: resolved.chips(),
        });
        debug!(
            hand = self.hand_number,
            seat,
            street = ?street,
            action = ?effective,
            pot = self.pot,
            current_bet = self.current_bet,
            "action applied"
        );

        self.advance_turn();
        debug_assert_eq!(self.chips_in_play(), self.chips_at_start, "chips leaked");

        Ok(AppliedAction {
            seat,
            street,
            requested: action,
            effective,
            resolved,
        })
    }

    fn needs_to_act(&self, index: usize) -> bool {
        let seat = &self.seats[index];
        seat.can_act() && (!self.acted.contains(&index) || self.current_bet > seat.bet())
    }

    /// First seat after `from` (wrapping, `from` itself last) that must act.
    fn next_actor_after(&self, from: usize) -> Option<usize> {
        let n = self.seats.len();
        (1..=n)
            .map(|step| (from + step) % n)
            .find(|&i| self.needs_to_act(i))
    }

    fn advance_turn(&mut self) {
        let live: Vec<usize> = self.live_seats();
        if live.len() == 1 {
            self.award_uncontested(live[0]);
            return;
        }
        if self.street_actions >= self.config.max_actions_per_street {
            warn!(
                hand = self.hand_number,
                street = ?self.phase,
                actions = self.street_actions,
                "action ceiling reached, forcing street transition"
            );
            self.end_street();
            return;
        }
        let from = self.turn.unwrap_or(0);
        match self.next_actor_after(from) {
            Some(next) => self.turn = Some(next),
            None => self.end_street(),
        }
    }

    fn live_seats(&self) -> Vec<usize> {
        self.seats
            .iter()
            .filter(|s| !s.is_folded())
            .map(Seat::index)
            .collect()
    }

    /// Closes the current street and opens the next one, running the board
    /// out while fewer than two seats can still bet.
    fn end_street(&mut self) {
        loop {
            for seat in self.seats.iter_mut() {
                seat.clear_bet();
            }
            self.current_bet = 0;
            self.acted.clear();
            self.street_actions = 0;
            self.turn = None;

            let next = match self.phase.street().and_then(Street::next) {
                Some(next) => next,
                None => {
                    self.showdown();
                    return;
                }
            };
            self.deck.burn_card();
            while self.board.len() < next.board_len() {
                match self.deck.deal_card() {
                    Some(c) => self.board.push(c),
                    None => break,
                }
            }
            self.phase = Phase::from(next);
            debug!(hand = self.hand_number, street = ?next, board = ?self.board, "street dealt");

            let actors = self.seats.iter().filter(|s| s.can_act()).count();
            if actors >= 2 {
                if let Some(dealer) = self.dealer {
                    self.turn = self.next_actor_after(dealer);
                }
                if self.turn.is_some() {
                    return;
                }
            }
            debug!(hand = self.hand_number, actors, "no betting possible, running out board");
        }
    }

    fn award_uncontested(&mut self, winner: usize) {
        let amount = self.pot;
        let seat = &mut self.seats[winner];
        seat.add_chips(amount);
        let payout = Payout {
            seat: winner,
            seat_id: seat.id().to_string(),
            name: seat.name().to_string(),
            amount,
        };
        info!(hand = self.hand_number, winner = %payout.name, amount, "pot won uncontested");
        self.finish(
            Phase::Finished,
            HandResult {
                winners: vec![payout],
                pot: amount,
                description: "Uncontested".to_string(),
                showdown: Vec::new(),
            },
        );
    }

    fn showdown(&mut self) {
        let entries: Vec<ShowdownEntry> = self
            .seats
            .iter()
            .filter(|s| !s.is_folded())
            .map(|s| {
                let rank = evaluate_holding(s.hole_cards(), &self.board);
                ShowdownEntry {
                    seat: s.index(),
                    seat_id: s.id().to_string(),
                    name: s.name().to_string(),
                    cards: s.hole_cards().to_vec(),
                    label: rank.describe(),
                    rank,
                }
            })
            .collect();
        let Some(best) = entries.iter().map(|e| &e.rank).max().cloned() else {
            return;
        };

        // tied winners ordered from the dealer's left; odd chips go to the first ones
        let n = self.seats.len();
        let dealer = self.dealer.unwrap_or(0);
        let mut winners: Vec<&ShowdownEntry> =
            entries.iter().filter(|e| e.rank == best).collect();
        winners.sort_by_key(|e| (e.seat + n - dealer - 1) % n);

        let pot = self.pot;
        let share = pot / winners.len() as u32;
        let remainder = pot as usize % winners.len();
        let payouts: Vec<Payout> = winners
            .iter()
            .enumerate()
            .map(|(i, e)| Payout {
                seat: e.seat,
                seat_id: e.seat_id.clone(),
                name: e.name.clone(),
                amount: share + u32::from(i < remainder),
            })
            .collect();
        for p in &payouts {
            self.seats[p.seat].add_chips(p.amount);
        }

        let mut description = best.describe();
        if payouts.len() > 1 {
            description.push_str(" (split pot)");
        }
        info!(
            hand = self.hand_number,
            winners = ?payouts.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            pot,
            hand_label = %description,
            "showdown"
        );
        self.finish(
            Phase::Showdown,
            HandResult {
                winners: payouts,
                pot,
                description,
                showdown: entries,
            },
        );
    }

    fn finish(&mut self, phase: Phase, result: HandResult) {
        for seat in self.seats.iter_mut() {
            seat.clear_bet();
        }
        self.pot = 0;
        self.current_bet = 0;
        self.turn = None;
        self.phase = phase;
        self.result = Some(result);
    }

    /// History record for the hand just played (or in progress).
    pub fn hand_record(&self, hand_id: impl Into<String>) -> HandRecord {
        let summary = self.result.as_ref().map(|r| {
            let names: Vec<String> = r
                .winners
                .iter()
                .map(|p| format!("{} +{}", p.name, p.amount))
                .collect();
            format!("{} ({})", names.join(", "), r.description)
        });
        let showdown = self
            .result
            .as_ref()
            .filter(|r| !r.showdown.is_empty())
            .map(|r| ShowdownInfo {
                winners: r.winners.iter().map(|p| p.seat_id.clone()).collect(),
                hands: r
                    .showdown
                    .iter()
                    .map(|e| ShownHand {
                        seat_id: e.seat_id.clone(),
                        cards: e.cards.clone(),
                        label: e.label.clone(),
                    })
                    .collect(),
                notes: (r.winners.len() > 1).then(|| "split pot".to_string()),
            });
        HandRecord {
            hand_id: hand_id.into(),
            seed: self.hand_seed,
            actions: self.actions.clone(),
            board: self.board.clone(),
            result: summary,
            ts: None,
            showdown,
        }
    }
}
