//! Rolling per-player spin window
//!
//! A player may spin `cap` times per window. The window is anchored at the
//! first spin after the previous one expired, not at fixed clock boundaries.

use crate::record::PlayerRecord;
use std::fmt;

pub const DEFAULT_SPIN_CAP: u32 = 3;
pub const DEFAULT_WINDOW_SECS: i64 = 60 * 60;

/// Time left until the window reopens, in display form
///
/// `seconds` counts to the next whole-minute boundary of the elapsed time, so
/// it reads 60 (not 0) when the elapsed time sits exactly on a minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub minutes: i64,
    pub seconds: i64,
}

impl Remaining {
    fn from_elapsed(window_secs: i64, elapsed: i64) -> Self {
        Self {
            minutes: (window_secs - elapsed) / 60,
            seconds: 60 - elapsed % 60,
        }
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min {} s", self.minutes, self.seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowDecision {
    Allowed,
    RateLimited(Remaining),
}

/// Spin cap and window length
#[derive(Debug, Clone, Copy)]
pub struct RateWindow {
    cap: u32,
    window_secs: i64,
}

impl RateWindow {
    pub fn new(cap: u32, window_secs: i64) -> Self {
        Self {
            cap: cap.max(1),
            window_secs: window_secs.max(1),
        }
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    pub fn window_secs(&self) -> i64 {
        self.window_secs
    }

    /// Decide whether a spin at `now` is allowed and advance the window.
    ///
    /// Mutates `record` on both outcomes: an expired window is reset, an
    /// in-window spin bumps the counter, and a blocked spin leaves the counter
    /// clamped at the cap.
    pub fn evaluate(&self, record: &mut PlayerRecord, now: i64) -> WindowDecision {
        let elapsed = record.elapsed(now);

        if elapsed >= self.window_secs {
            record.spins_in_window = 1;
            record.window_start = now;
            record.notified_this_window = false;
            return WindowDecision::Allowed;
        }

        record.spins_in_window = record.spins_in_window.saturating_add(1);
        if record.spins_in_window > self.cap {
            record.spins_in_window = self.cap;
            let remaining = Remaining::from_elapsed(self.window_secs, elapsed);
            log::debug!(
                "Player {} rate limited, {} until reset",
                record.id,
                remaining
            );
            return WindowDecision::RateLimited(remaining);
        }

        WindowDecision::Allowed
    }
}

impl Default for RateWindow {
    fn default() -> Self {
        Self::new(DEFAULT_SPIN_CAP, DEFAULT_WINDOW_SECS)
    }
}
