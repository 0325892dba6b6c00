//! Append-only analytics log of completed spins
//!
//! One line per allowed spin: `display_name trial_value`. The log never feeds
//! rate limiting or ranking; it is replayed offline into symbol frequencies.

use crate::error::{EngineError, EngineResult};
use crate::outcome::{classify, Symbol};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::PathBuf,
};

/// Symbol frequencies reconstructed from the log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PullStats {
    pub total_pulls: u64,
    pub jackpots: u64,
    /// Each pull contributes its three reel symbols
    pub symbol_counts: BTreeMap<Symbol, u64>,
}

impl PullStats {
    fn add(&mut self, trial_value: i64) -> EngineResult<()> {
        let outcome = classify(trial_value)?;
        self.total_pulls += 1;
        if outcome.is_win {
            self.jackpots += 1;
        }
        for symbol in outcome.symbols {
            *self.symbol_counts.entry(symbol).or_default() += 1;
        }
        Ok(())
    }

    /// `symbol: count` lines, alphabet order
    pub fn summary(&self) -> String {
        self.symbol_counts
            .iter()
            .map(|(symbol, count)| format!("{}: {}", symbol, count))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone)]
pub struct PullLog {
    path: PathBuf,
}

impl PullLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append one completed spin
    pub fn record_pull(&self, display_name: &str, trial_value: i64) -> EngineResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{} {}", display_name, trial_value)?;
        Ok(())
    }

    /// Rebuild symbol statistics from every logged pull
    ///
    /// A missing log is an empty report. A malformed line fails with
    /// `CorruptPullLog`; an out-of-range trial value fails with
    /// `InvalidTrialValue`.
    pub fn replay(&self) -> EngineResult<PullStats> {
        let body = match fs::read_to_string(&self.path) {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No pull log found at {}", self.path.display());
                return Ok(PullStats::default());
            }
            Err(e) => return Err(e.into()),
        };

        let mut stats = PullStats::default();
        for (idx, line) in body.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let trial_value = parse_line(line).map_err(|reason| EngineError::CorruptPullLog {
                line: idx + 1,
                reason,
            })?;
            stats.add(trial_value)?;
        }

        log::debug!("Replayed {} pulls from {}", stats.total_pulls, self.path.display());
        Ok(stats)
    }
}

fn parse_line(line: &str) -> Result<i64, String> {
    let (_name, raw) = line
        .rsplit_once(' ')
        .ok_or_else(|| format!("missing trial value: {:?}", line))?;
    raw.parse::<i64>()
        .map_err(|_| format!("trial value is not an integer: {:?}", raw))
}
