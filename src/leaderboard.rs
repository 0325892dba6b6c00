//! Leaderboard ranking and text rendering

use crate::record::{PlayerMap, PlayerRecord};
use std::{cmp::Ordering, collections::HashSet};

/// One ranked row, derived fresh per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub id: i64,
    pub display_name: String,
    pub wins: u64,
    pub total_spins: u64,
}

impl From<&PlayerRecord> for LeaderboardEntry {
    fn from(record: &PlayerRecord) -> Self {
        Self {
            id: record.id,
            display_name: record.display_name.clone(),
            wins: record.wins,
            total_spins: record.total_spins,
        }
    }
}

/// Ranking order between two entries
///
/// - both zero wins: fewer total spins first
/// - otherwise more wins first, then higher win rate
///
/// Win rates are compared by cross-multiplying, so a zero-spin player never
/// reaches a division.
pub fn compare(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    if a.wins == 0 && b.wins == 0 {
        return a.total_spins.cmp(&b.total_spins);
    }

    b.wins.cmp(&a.wins).then_with(|| {
        // a.wins / a.total vs b.wins / b.total, descending
        let lhs = a.wins as u128 * b.total_spins as u128;
        let rhs = b.wins as u128 * a.total_spins as u128;
        lhs.cmp(&rhs).reverse()
    })
}

/// Rank the players that belong to `membership`
///
/// Players outside the audience are dropped even if they have a record.
/// Exact ties keep id order, so the output is deterministic.
pub fn rank(records: &PlayerMap, membership: &HashSet<i64>) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = records
        .values()
        .filter(|record| membership.contains(&record.id))
        .map(LeaderboardEntry::from)
        .collect();

    entries.sort_by(compare);
    entries
}

/// Leaderboard text: a rules header followed by one line per entry
pub fn render(entries: &[LeaderboardEntry], spin_cap: u32) -> String {
    let mut text = format!("Rules: {} spins per hour\n\n🎰 TOP SPINNERS\n\n", spin_cap);
    for entry in entries {
        text.push_str(&format!(
            "{} - {} wins - {} spins\n",
            entry.display_name, entry.wins, entry.total_spins
        ));
    }
    text
}
