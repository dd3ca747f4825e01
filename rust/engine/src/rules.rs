use crate::errors::GameError;
use crate::player::PlayerAction as A;

/// A submitted action resolved into chip movement for one seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedAction {
    Fold,
    Check,
    /// Chips moved to match the current bet
    Call(u32),
    /// New street total and the chips moved to reach it
    Raise { to: u32, chips: u32 },
    /// Whole stack committed; `to` may or may not exceed the current bet
    AllIn { to: u32, chips: u32 },
}

impl ValidatedAction {
    /// Chips leaving the seat's stack.
    pub fn chips(&self) -> u32 {
        match self {
            ValidatedAction::Fold | ValidatedAction::Check => 0,
            ValidatedAction::Call(c) => *c,
            ValidatedAction::Raise { chips, .. } | ValidatedAction::AllIn { chips, .. } => *chips,
        }
    }
}

/// Smallest legal "raise to" total.
pub fn min_raise_to(current_bet: u32, big_blind: u32) -> u32 {
    current_bet.saturating_add(big_blind)
}

/// Clamps a raise target into `[min_to, max_to]`. When the seat cannot reach
/// `min_to` its whole stack (`max_to`) is the only raise left.
pub fn clamp_raise(target: u32, min_to: u32, max_to: u32) -> u32 {
    if max_to <= min_to {
        max_to
    } else {
        target.clamp(min_to, max_to)
    }
}

/// Validates a seat's action against its stack and the table's current bet.
///
/// Out-of-range raise amounts are clamped rather than rejected; a raise that
/// cannot exceed the current bet after clamping is treated as a call.
///
/// # Errors
///
/// [`GameError::IllegalAction`] when the seat tries to check while owing chips.
///
/// # Examples
///
/// ```
/// use felt_engine::rules::{validate_action, ValidatedAction};
/// use felt_engine::player::PlayerAction;
///
/// // stack 1000, nothing in yet, facing 50 with a 10 big blind
/// let v = validate_action(1000, 0, 50, 10, PlayerAction::Call).unwrap();
/// assert_eq!(v, ValidatedAction::Call(50));
///
/// // raise to 20 is below the minimum (60) and is lifted to it
/// let v = validate_action(1000, 0, 50, 10, PlayerAction::Raise(20)).unwrap();
/// assert_eq!(v, ValidatedAction::Raise { to: 60, chips: 60 });
/// ```
pub fn validate_action(
    stack: u32,
    street_bet: u32,
    current_bet: u32,
    big_blind: u32,
    action: A,
) -> Result<ValidatedAction, GameError> {
    let owed = current_bet.saturating_sub(street_bet);
    match action {
        A::Fold => Ok(ValidatedAction::Fold),
        A::Check => {
            if owed == 0 {
                Ok(ValidatedAction::Check)
            } else {
                Err(GameError::illegal(format!(
                    "cannot check while facing {owed} to call"
                )))
            }
        }
        A::Call => Ok(call(stack, street_bet, owed)),
        A::Raise(target) => {
            let max_to = street_bet + stack;
            let to = clamp_raise(target, min_raise_to(current_bet, big_blind), max_to);
            if to <= current_bet {
                return Ok(call(stack, street_bet, owed));
            }
            let chips = to - street_bet;
            if chips >= stack {
                Ok(ValidatedAction::AllIn { to, chips: stack })
            } else {
                Ok(ValidatedAction::Raise { to, chips })
            }
        }
    }
}

fn call(stack: u32, street_bet: u32, owed: u32) -> ValidatedAction {
    if owed == 0 {
        ValidatedAction::Check
    } else if owed >= stack {
        ValidatedAction::AllIn {
            to: street_bet + stack,
            chips: stack,
        }
    } else {
        ValidatedAction::Call(owed)
    }
}
