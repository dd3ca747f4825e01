use felt_engine::player::PlayerAction;

/// Neutral estimate at the start of every hand.
pub const BASELINE_AGGRESSION: f64 = 0.3;

/// Smoothed estimate of how aggressively the human seats are playing.
///
/// Raises nudge the estimate up and folds nudge it down; once more than five
/// actions have been seen it is recomputed from the observed raise frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct AggressionTracker {
    estimate: f64,
    raises: u32,
    total: u32,
}

impl AggressionTracker {
    pub fn new() -> Self {
        Self {
            estimate: BASELINE_AGGRESSION,
            raises: 0,
            total: 0,
        }
    }

    pub fn estimate(&self) -> f64 {
        self.estimate
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn raises(&self) -> u32 {
        self.raises
    }

    pub fn record(&mut self, action: &PlayerAction) {
        self.total += 1;
        match action {
            PlayerAction::Raise(_) => {
                self.raises += 1;
                self.estimate = (self.estimate + 0.1).min(1.0);
            }
            PlayerAction::Fold => {
                self.estimate = (self.estimate - 0.05).max(0.2);
            }
            PlayerAction::Check | PlayerAction::Call => {}
        }
        if self.total > 5 {
            let freq = f64::from(self.raises) / f64::from(self.total);
            self.estimate = 0.3 + freq * 0.6;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for AggressionTracker {
    fn default() -> Self {
        Self::new()
    }
}
