//! Slot outcome classification
//!
//! A trial value in 1..=64 indexes every ordered reel triplet over four
//! symbols. Reel `k` shows digit `k` (units first) of `trial - 1` in base 4.

use crate::error::{EngineError, EngineResult};
use serde::Serialize;
use std::fmt;

pub const MIN_TRIAL: i64 = 1;
pub const MAX_TRIAL: i64 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    Bar,
    Grape,
    Lemon,
    Seven,
}

impl Symbol {
    pub const ALL: [Symbol; 4] = [Symbol::Bar, Symbol::Grape, Symbol::Lemon, Symbol::Seven];

    pub fn as_str(&self) -> &'static str {
        match self {
            Symbol::Bar => "bar",
            Symbol::Grape => "grape",
            Symbol::Lemon => "lemon",
            Symbol::Seven => "seven",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the three reels show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub is_win: bool,
    pub symbols: [Symbol; 3],
}

/// Map a trial value to its reel symbols. Three matching symbols is a win.
pub fn classify(trial_value: i64) -> EngineResult<Outcome> {
    if !(MIN_TRIAL..=MAX_TRIAL).contains(&trial_value) {
        return Err(EngineError::InvalidTrialValue(trial_value));
    }

    let index = (trial_value - 1) as usize;
    let symbols = [
        Symbol::ALL[index % 4],
        Symbol::ALL[(index / 4) % 4],
        Symbol::ALL[(index / 16) % 4],
    ];
    let is_win = symbols[0] == symbols[1] && symbols[1] == symbols[2];

    Ok(Outcome { is_win, symbols })
}
