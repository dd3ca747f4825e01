//! Styled decision policy for automated seats.
//!
//! The policy derives [`Features`] for the seat, branches on the street, then
//! re-decides with a push/fold rule when continuing would cost the whole
//! stack. Every probabilistic branch draws one `f64` from the injected RNG,
//! so a scripted source selects branches exactly.

use felt_engine::logger::Street;
use felt_engine::player::PlayerAction;
use rand::{Rng, RngCore};
use tracing::debug;

use crate::AIOpponent;
use crate::features::Features;
use crate::style::{PremiumHand, StyleProfile};
use crate::view::{SeatView, TableView};

/// Opponent-aggression estimate above which bets are treated as likely bluffs.
pub const BLUFF_SUSPICION: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    Fold,
    Check,
    Call,
    Raise,
}

fn chance<R: Rng + ?Sized>(rng: &mut R, p: f64, hit: Intent, miss: Intent) -> Intent {
    if rng.random::<f64>() < p { hit } else { miss }
}

/// Call-or-fold draw with the base frequency scaled by the style's call rate.
fn call_or_fold<R: Rng + ?Sized>(rng: &mut R, style: &StyleProfile, p: f64) -> Intent {
    chance(rng, style.call_frequency(p), Intent::Call, Intent::Fold)
}

/// Recommends an action for `seat`. Never mutates anything but `rng`.
///
/// Raises are returned as "raise to" totals inside
/// `[current_bet + big_blind, stack + street_bet]`; a seat that cannot reach the
/// minimum calls (or checks when nothing is owed) instead.
pub fn decide<R: Rng + ?Sized>(
    seat: &SeatView,
    table: &TableView,
    style: &StyleProfile,
    aggression: f64,
    rng: &mut R,
) -> PlayerAction {
    let f = Features::compute(seat, table);
    let suspicion = aggression > BLUFF_SUSPICION;

    let (mut intent, mut target) = match table.street {
        Street::Preflop => preflop(seat, table, style, &f, suspicion, rng),
        _ => postflop(seat, table, style, &f, suspicion, rng),
    };
    if f.to_call >= seat.stack && intent != Intent::Fold {
        intent = push_or_fold(&f, suspicion, rng);
        target = 0;
    }

    let action = finalize(intent, target, seat, table, &f);
    debug!(
        seat = seat.index,
        style = style.name,
        street = ?table.street,
        tier = f.tier,
        strength = f.strength,
        to_call = f.to_call,
        pot_odds = f.pot_odds,
        suspicion,
        action = ?action,
        "ai decision"
    );
    action
}

fn preflop<R: Rng + ?Sized>(
    seat: &SeatView,
    table: &TableView,
    style: &StyleProfile,
    f: &Features,
    suspicion: bool,
    rng: &mut R,
) -> (Intent, u32) {
    let intent = if f.to_call > 0 {
        facing_preflop_bet(seat, style, f, suspicion, rng)
    } else if f.preflop > 0.5 {
        chance(rng, style.aggression, Intent::Raise, Intent::Check)
    } else if f.preflop > 0.35 && f.position > 0.6 {
        chance(rng, style.bluff_rate * 1.5, Intent::Raise, Intent::Check)
    } else if f.position > 0.8 {
        chance(rng, style.bluff_rate, Intent::Raise, Intent::Check)
    } else {
        Intent::Check
    };
    if intent != Intent::Raise {
        return (intent, 0);
    }

    let base = f64::from(table.big_blind) * (2.0 + f.position * 2.0);
    let sized = (base * (0.8 + rng.random::<f64>() * 0.4)).floor() as u32;
    let target = sized
        .min(seat.stack + seat.street_bet)
        .max(table.min_raise_to());
    (Intent::Raise, target)
}

fn facing_preflop_bet<R: Rng + ?Sized>(
    seat: &SeatView,
    style: &StyleProfile,
    f: &Features,
    suspicion: bool,
    rng: &mut R,
) -> Intent {
    let premium = style.premium.as_ref().and_then(|table| {
        PremiumHand::classify(&seat.hole).and_then(|hand| table.frequencies(hand))
    });
    if let Some((raise, call)) = premium {
        let r = rng.random::<f64>();
        return if r < raise {
            Intent::Raise
        } else if r < raise + call {
            Intent::Call
        } else {
            Intent::Fold
        };
    }

    let s = f.preflop;
    let odds = f.pot_odds;
    if s > 0.8 {
        chance(rng, 0.7, Intent::Raise, Intent::Call)
    } else if s > 0.65 {
        chance(rng, 0.5, Intent::Raise, Intent::Call)
    } else if s > 0.5 {
        chance(rng, 0.35, Intent::Raise, Intent::Call)
    } else if s > 0.4 {
        let p = if odds < 0.35 || suspicion { 0.7 } else { 0.6 };
        call_or_fold(rng, style, p)
    } else if s > 0.3 {
        if odds < 0.2 || suspicion {
            call_or_fold(rng, style, 0.6)
        } else {
            Intent::Fold
        }
    } else if suspicion && odds < 0.15 {
        call_or_fold(rng, style, 0.4)
    } else {
        Intent::Fold
    }
}

fn postflop<R: Rng + ?Sized>(
    seat: &SeatView,
    table: &TableView,
    style: &StyleProfile,
    f: &Features,
    suspicion: bool,
    rng: &mut R,
) -> (Intent, u32) {
    let facing = f.to_call > 0;
    let odds_good = f.pot_odds < 0.35;
    let odds_decent = f.pot_odds < 0.5;

    let intent = if f.tier >= 4 {
        if facing {
            chance(rng, 0.6, Intent::Raise, Intent::Call)
        } else {
            chance(rng, 0.7, Intent::Raise, Intent::Check)
        }
    } else if f.tier >= 3 {
        if !facing {
            chance(rng, 0.65, Intent::Raise, Intent::Check)
        } else if rng.random::<f64>() < 0.85 {
            Intent::Call
        } else {
            chance(rng, 0.5, Intent::Raise, Intent::Call)
        }
    } else if f.tier >= 2 {
        if !facing {
            chance(rng, 0.55, Intent::Raise, Intent::Check)
        } else {
            let p = if odds_good {
                0.9
            } else if odds_decent {
                0.8
            } else if f.pot_odds < 0.7 {
                0.7
            } else if suspicion {
                0.55
            } else {
                0.45
            };
            call_or_fold(rng, style, p)
        }
    } else if f.draw > 0.3 {
        if !facing {
            chance(rng, 0.5, Intent::Raise, Intent::Check)
        } else if f.pot_odds < f.draw {
            Intent::Call
        } else {
            call_or_fold(rng, style, 0.4)
        }
    } else if !facing {
        // late-position bluff
        if f.position > 0.6 && rng.random::<f64>() < style.bluff_rate {
            Intent::Raise
        } else {
            Intent::Check
        }
    } else if suspicion && odds_good {
        call_or_fold(rng, style, 0.55)
    } else if suspicion && odds_decent {
        call_or_fold(rng, style, 0.4)
    } else if odds_good {
        call_or_fold(rng, style, 0.35)
    } else {
        Intent::Fold
    };
    if intent != Intent::Raise {
        return (intent, 0);
    }

    let pot = f64::from(table.pot);
    let r = rng.random::<f64>();
    let fraction = if f.tier >= 4 {
        0.7 + r * 0.3
    } else if f.tier >= 3 {
        0.55 + r * 0.25
    } else {
        0.4 + r * 0.2
    };
    let sized = (pot * fraction).floor() as u32;
    let floor = table.min_raise_to().max((pot * 0.4).floor() as u32);
    let target = sized.max(floor).min(seat.stack + seat.street_bet);
    (Intent::Raise, target)
}

/// Continuing costs the whole stack: call it off or fold.
fn push_or_fold<R: Rng + ?Sized>(f: &Features, suspicion: bool, rng: &mut R) -> Intent {
    if f.tier >= 4 || (f.tier >= 3 && f.spr < 5.0) || (f.tier >= 2 && f.spr < 3.0) {
        Intent::Call
    } else if f.strength > 0.45 && f.call_cost > 0.5 {
        chance(rng, 0.6, Intent::Call, Intent::Fold)
    } else if suspicion && f.tier >= 2 {
        chance(rng, 0.5, Intent::Call, Intent::Fold)
    } else {
        Intent::Fold
    }
}

fn finalize(
    intent: Intent,
    target: u32,
    seat: &SeatView,
    table: &TableView,
    f: &Features,
) -> PlayerAction {
    let owes = f.to_call > 0;
    let passive = if owes {
        PlayerAction::Call
    } else {
        PlayerAction::Check
    };
    match intent {
        Intent::Fold if owes => PlayerAction::Fold,
        Intent::Fold | Intent::Check | Intent::Call => passive,
        Intent::Raise => {
            let min_to = table.min_raise_to();
            let max_to = seat.stack + seat.street_bet;
            if max_to < min_to {
                passive
            } else {
                PlayerAction::Raise(target.clamp(min_to, max_to))
            }
        }
    }
}

/// An [`AIOpponent`] playing one [`StyleProfile`].
#[derive(Debug, Clone)]
pub struct StyledAI {
    style: StyleProfile,
}

impl StyledAI {
    pub fn new(style: StyleProfile) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &StyleProfile {
        &self.style
    }
}

impl AIOpponent for StyledAI {
    fn decide(
        &self,
        seat: &SeatView,
        table: &TableView,
        aggression: f64,
        rng: &mut dyn RngCore,
    ) -> PlayerAction {
        decide(seat, table, &self.style, aggression, rng)
    }

    fn name(&self) -> &str {
        self.style.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use felt_engine::cards::{parse_cards, Card};

    /// Replays fixed `f64` draws in order, wrapping around.
    struct Scripted {
        draws: Vec<f64>,
        next: usize,
    }

    impl Scripted {
        fn new(draws: &[f64]) -> Self {
            Self {
                draws: draws.to_vec(),
                next: 0,
            }
        }
    }

    impl RngCore for Scripted {
        fn next_u32(&mut self) -> u32 {
            (self.next_u64() >> 32) as u32
        }

        fn next_u64(&mut self) -> u64 {
            let v = self.draws[self.next % self.draws.len()];
            self.next += 1;
            // f64 sampling keeps the top 53 bits
            ((v * (1u64 << 53) as f64) as u64) << 11
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            for chunk in dst.chunks_mut(8) {
                let bytes = self.next_u64().to_le_bytes();
                chunk.copy_from_slice(&bytes[..chunk.len()]);
            }
        }
    }

    fn cards(s: &str) -> Vec<Card> {
        parse_cards(s).unwrap()
    }

    fn seat(index: usize, hole: &str, stack: u32, street_bet: u32) -> SeatView {
        SeatView {
            index,
            hole: cards(hole),
            stack,
            street_bet,
        }
    }

    fn view(street: Street, board: &str, pot: u32, current_bet: u32) -> TableView {
        TableView {
            street,
            board: if board.is_empty() { vec![] } else { cards(board) },
            pot,
            current_bet,
            big_blind: 10,
        }
    }

    #[test]
    fn scripted_rng_yields_requested_floats() {
        let mut rng = Scripted::new(&[0.25, 0.9]);
        assert!((rng.random::<f64>() - 0.25).abs() < 1e-12);
        assert!((rng.random::<f64>() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn preflop_open_raise_with_strong_hand() {
        // seat 4: position 0.8, base = 10 * 3.6 = 36, sized by (0.8 + 0.5 * 0.4) = 36
        let s = seat(4, "Ah Qd", 1000, 10);
        let t = view(Street::Preflop, "", 30, 10);
        let mut rng = Scripted::new(&[0.1, 0.5]);
        let a = decide(&s, &t, &StyleProfile::tight_aggressive(), 0.3, &mut rng);
        assert_eq!(a, PlayerAction::Raise(36));
    }

    #[test]
    fn preflop_checks_when_open_roll_misses() {
        let s = seat(4, "Ah Qd", 1000, 10);
        let t = view(Street::Preflop, "", 30, 10);
        let mut rng = Scripted::new(&[0.99]);
        let a = decide(&s, &t, &StyleProfile::tight_aggressive(), 0.3, &mut rng);
        assert_eq!(a, PlayerAction::Check);
    }

    #[test]
    fn preflop_trash_out_of_position_checks_without_drawing() {
        let s = seat(1, "7c 2d", 1000, 10);
        let t = view(Street::Preflop, "", 30, 10);
        let mut rng = Scripted::new(&[0.0]);
        let a = decide(&s, &t, &StyleProfile::shark(), 0.3, &mut rng);
        assert_eq!(a, PlayerAction::Check);
        assert_eq!(rng.next, 0);
    }

    #[test]
    fn preflop_weak_hand_folds_to_a_bet() {
        let s = seat(1, "7c 2d", 1000, 0);
        let t = view(Street::Preflop, "", 45, 30);
        let mut rng = Scripted::new(&[0.0]);
        let a = decide(&s, &t, &StyleProfile::tight_aggressive(), 0.3, &mut rng);
        assert_eq!(a, PlayerAction::Fold);
    }

    #[test]
    fn bluff_suspicion_widens_preflop_calls() {
        // 9h 6c scores ~0.404: mid band, bad odds
        let s = seat(1, "9h 6c", 1000, 0);
        let t = view(Street::Preflop, "", 100, 100);
        let mut calm = Scripted::new(&[0.65]);
        let mut wary = Scripted::new(&[0.65]);
        let style = StyleProfile::tight_aggressive();
        assert_eq!(decide(&s, &t, &style, 0.3, &mut calm), PlayerAction::Fold);
        assert_eq!(decide(&s, &t, &style, 0.8, &mut wary), PlayerAction::Call);
    }

    #[test]
    fn premium_table_overrides_preflop_band() {
        let s = seat(2, "Ks Kd", 1000, 0);
        let t = view(Street::Preflop, "", 45, 30);
        // KK raises below 0.85 and calls the rest
        let mut rng = Scripted::new(&[0.8, 0.5]);
        let gto = StyleProfile::game_theory();
        assert!(matches!(decide(&s, &t, &gto, 0.3, &mut rng), PlayerAction::Raise(_)));
        let mut rng = Scripted::new(&[0.9]);
        assert_eq!(decide(&s, &t, &gto, 0.3, &mut rng), PlayerAction::Call);
    }

    #[test]
    fn postflop_monster_bets_large() {
        // flush on the flop, pot 200: 0.7 + 0.0 * 0.3 = 140
        let s = seat(0, "Ah Kh", 1000, 0);
        let t = view(Street::Flop, "2h 7h 9h", 200, 0);
        let mut rng = Scripted::new(&[0.1, 0.0]);
        let a = decide(&s, &t, &StyleProfile::master(), 0.3, &mut rng);
        assert_eq!(a, PlayerAction::Raise(140));
    }

    #[test]
    fn postflop_raise_respects_pot_fraction_floor() {
        // one pair, pot 1000, facing nothing: 0.4 * 1000 floor
        let s = seat(0, "Ah 3c", 5000, 0);
        let t = view(Street::Flop, "As 7d 9c", 1000, 0);
        let mut rng = Scripted::new(&[0.1, 0.0]);
        let a = decide(&s, &t, &StyleProfile::master(), 0.3, &mut rng);
        assert_eq!(a, PlayerAction::Raise(400));
    }

    #[test]
    fn one_pair_call_frequency_follows_pot_odds() {
        let s = seat(0, "Ah 3c", 5000, 0);
        // to_call 300 into 300: odds 0.5 -> 0.7 band
        let t = view(Street::Turn, "As 7d 9c 2s", 300, 300);
        let mut rng = Scripted::new(&[0.75]);
        let a = decide(&s, &t, &StyleProfile::master(), 0.3, &mut rng);
        assert_eq!(a, PlayerAction::Fold);
        let mut rng = Scripted::new(&[0.65]);
        let a = decide(&s, &t, &StyleProfile::master(), 0.3, &mut rng);
        assert_eq!(a, PlayerAction::Call);
    }

    #[test]
    fn looser_styles_call_more_often() {
        // one pair at odds 0.5: base 0.7, Shark 0.793, TAG 0.653
        let s = seat(0, "Ah 3c", 5000, 0);
        let t = view(Street::Turn, "As 7d 9c 2s", 300, 300);
        let mut rng = Scripted::new(&[0.7]);
        let a = decide(&s, &t, &StyleProfile::shark(), 0.3, &mut rng);
        assert_eq!(a, PlayerAction::Call);
        let mut rng = Scripted::new(&[0.7]);
        let a = decide(&s, &t, &StyleProfile::tight_aggressive(), 0.3, &mut rng);
        assert_eq!(a, PlayerAction::Fold);
    }

    #[test]
    fn draw_calls_when_price_is_right() {
        // four hearts, no pair: draw 0.35 against odds 0.2
        let s = seat(0, "Ah Kh", 1000, 0);
        let t = view(Street::Flop, "2h 7h 9c", 200, 50);
        let mut rng = Scripted::new(&[0.99]);
        let a = decide(&s, &t, &StyleProfile::master(), 0.3, &mut rng);
        assert_eq!(a, PlayerAction::Call);
    }

    #[test]
    fn weak_hand_bluffs_only_from_late_position() {
        let t = view(Street::River, "Ks 8d 4c 3h 2s", 100, 0);
        let mut rng = Scripted::new(&[0.1, 0.0]);
        let late = seat(5, "Jc Td", 1000, 0);
        assert_eq!(
            decide(&late, &t, &StyleProfile::shark(), 0.3, &mut rng),
            PlayerAction::Raise(40)
        );
        let mut rng = Scripted::new(&[0.1]);
        let early = seat(1, "Jc Td", 1000, 0);
        assert_eq!(
            decide(&early, &t, &StyleProfile::shark(), 0.3, &mut rng),
            PlayerAction::Check
        );
    }

    #[test]
    fn forced_all_in_calls_with_strong_tier() {
        let s = seat(0, "9c 9d", 200, 0);
        let t = view(Street::Flop, "9s Kd 3h", 400, 500);
        let mut rng = Scripted::new(&[0.0]);
        let a = decide(&s, &t, &StyleProfile::master(), 0.3, &mut rng);
        assert_eq!(a, PlayerAction::Call);
    }

    #[test]
    fn forced_all_in_folds_air() {
        let s = seat(0, "7c 2d", 200, 0);
        let t = view(Street::Flop, "9s Kd 3h", 400, 500);
        let mut rng = Scripted::new(&[0.0]);
        let a = decide(&s, &t, &StyleProfile::master(), 0.8, &mut rng);
        assert_eq!(a, PlayerAction::Fold);
    }

    #[test]
    fn raise_degrades_when_minimum_is_out_of_reach() {
        // flush facing 500 with 505 behind: max_to 505 < min_to 510
        let s = seat(0, "Ah Kh", 505, 0);
        let t = view(Street::Flop, "2h 7h 9h", 1000, 500);
        let mut rng = Scripted::new(&[0.0]);
        let a = decide(&s, &t, &StyleProfile::master(), 0.3, &mut rng);
        assert_eq!(a, PlayerAction::Call);
    }
}
