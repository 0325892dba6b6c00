//! Events exchanged with the messaging collaborator

use crate::leaderboard::LeaderboardEntry;
use crate::outcome::Symbol;
use crate::pull_log::PullStats;
use crate::window::Remaining;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct SpinEvent {
    pub id: i64,
    pub display_name: String,
    pub trial_value: i64,
    pub now: i64,
}

#[derive(Debug, Clone)]
pub struct ToggleNotifyEvent {
    pub id: i64,
    pub display_name: String,
    pub now: i64,
}

#[derive(Debug, Clone)]
pub struct LeaderboardRequest {
    pub membership: HashSet<i64>,
    pub now: i64,
}

#[derive(Debug, Clone)]
pub struct PullStatsRequest {
    pub requester: String,
}

/// Result of one spin; never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    Allowed { win: bool, symbols: [Symbol; 3] },
    RateLimited(Remaining),
}

/// Due reminder for a player whose window has elapsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderEvent {
    pub id: i64,
    pub display_name: String,
}

/// Anything the collaborator can hand to the engine
#[derive(Debug, Clone)]
pub enum IncomingEvent {
    Spin(SpinEvent),
    ToggleNotify(ToggleNotifyEvent),
    Leaderboard(LeaderboardRequest),
    PullStats(PullStatsRequest),
}

/// What the engine hands back for an `IncomingEvent`
#[derive(Debug, Clone)]
pub enum EngineReply {
    SpinResult(PullOutcome),
    NotifyToggled { new_state: bool },
    LeaderboardText { entries: Vec<LeaderboardEntry>, text: String },
    PullStats(PullStats),
}
