//! Player record and its one-line durable layout
//!
//! Layout (space-delimited, field order fixed):
//!
//! ```text
//! id spins_in_window window_start display_name wins total_spins notify_requested notified_this_window
//! ```

use crate::error::{EngineError, EngineResult};
use std::collections::BTreeMap;

/// All known players keyed by id; iteration order is the enumeration order
/// used for leaderboard tie-breaks and for the file layout.
pub type PlayerMap = BTreeMap<i64, PlayerRecord>;

const FIELD_COUNT: usize = 8;

/// Session and lifetime stats for one player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRecord {
    pub id: i64,
    pub display_name: String,
    pub spins_in_window: u32,
    /// Unix seconds anchoring the rolling window
    pub window_start: i64,
    pub wins: u64,
    pub total_spins: u64,
    pub notify_requested: bool,
    pub notified_this_window: bool,
}

impl PlayerRecord {
    /// Fresh record: zero counters, window anchored at `now`
    pub fn new(id: i64, display_name: &str, now: i64) -> Self {
        Self {
            id,
            display_name: sanitize_display_name(display_name),
            spins_in_window: 0,
            window_start: now,
            wins: 0,
            total_spins: 0,
            notify_requested: false,
            notified_this_window: false,
        }
    }

    pub fn set_display_name(&mut self, display_name: &str) {
        self.display_name = sanitize_display_name(display_name);
    }

    /// Seconds since the window was anchored (never negative)
    pub fn elapsed(&self, now: i64) -> i64 {
        (now - self.window_start).max(0)
    }

    /// Record one allowed spin in the lifetime stats
    pub fn apply_spin(&mut self, win: bool) {
        self.total_spins += 1;
        if win {
            self.wins += 1;
        }
    }

    pub fn to_line(&self) -> String {
        format!(
            "{} {} {} {} {} {} {} {}",
            self.id,
            self.spins_in_window,
            self.window_start,
            self.display_name,
            self.wins,
            self.total_spins,
            self.notify_requested,
            self.notified_this_window,
        )
    }

    /// Parse one store line. `line_no` is 1-based and only used for errors.
    pub fn from_line(line: &str, line_no: usize) -> EngineResult<Self> {
        let corrupt = |reason: String| EngineError::CorruptRecordStore {
            line: line_no,
            reason,
        };

        // Split on single spaces so an empty display name survives as an empty field
        let fields: Vec<&str> = line.split(' ').collect();
        if fields.len() != FIELD_COUNT {
            return Err(corrupt(format!(
                "expected {} fields, found {}",
                FIELD_COUNT,
                fields.len()
            )));
        }

        fn int<T: std::str::FromStr>(raw: &str, name: &str) -> Result<T, String> {
            raw.parse::<T>()
                .map_err(|_| format!("{} is not an integer: {:?}", name, raw))
        }
        fn flag(raw: &str, name: &str) -> Result<bool, String> {
            match raw {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(format!("{} is not a bool: {:?}", name, raw)),
            }
        }

        let record = Self {
            id: int(fields[0], "id").map_err(corrupt)?,
            spins_in_window: int(fields[1], "spins_in_window").map_err(corrupt)?,
            window_start: int(fields[2], "window_start").map_err(corrupt)?,
            display_name: fields[3].to_string(),
            wins: int(fields[4], "wins").map_err(corrupt)?,
            total_spins: int(fields[5], "total_spins").map_err(corrupt)?,
            notify_requested: flag(fields[6], "notify_requested").map_err(corrupt)?,
            notified_this_window: flag(fields[7], "notified_this_window").map_err(corrupt)?,
        };

        if record.wins > record.total_spins {
            return Err(corrupt(format!(
                "wins ({}) exceed total spins ({})",
                record.wins, record.total_spins
            )));
        }

        Ok(record)
    }
}

/// Collapse a display name into one whitespace-free token
pub fn sanitize_display_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Serialize every record, one per line, in id order
pub fn encode_all(records: &PlayerMap) -> String {
    let mut out = String::new();
    for record in records.values() {
        out.push_str(&record.to_line());
        out.push('\n');
    }
    out
}

/// Parse a whole store body. Blank lines are skipped; anything else malformed
/// fails the load.
pub fn decode_all(body: &str) -> EngineResult<PlayerMap> {
    let mut records = PlayerMap::new();
    for (idx, line) in body.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let record = PlayerRecord::from_line(line, idx + 1)?;
        records.insert(record.id, record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PlayerRecord {
        PlayerRecord {
            id: 42,
            display_name: "lucky".to_string(),
            spins_in_window: 2,
            window_start: 1_700_000_000,
            wins: 3,
            total_spins: 17,
            notify_requested: true,
            notified_this_window: false,
        }
    }

    #[test]
    fn test_line_layout() {
        assert_eq!(
            sample().to_line(),
            "42 2 1700000000 lucky 3 17 true false"
        );
    }

    #[test]
    fn test_parse_line() {
        let record = PlayerRecord::from_line("42 2 1700000000 lucky 3 17 true false", 1).unwrap();
        assert_eq!(record, sample());
    }

    #[test]
    fn test_empty_display_name_survives() {
        let mut record = sample();
        record.display_name = String::new();
        let line = record.to_line();
        assert_eq!(line, "42 2 1700000000  3 17 true false");
        assert_eq!(PlayerRecord::from_line(&line, 1).unwrap(), record);
    }

    #[test]
    fn test_wrong_field_count_is_corrupt() {
        let err = PlayerRecord::from_line("42 2 1700000000 lucky 3 17 true", 7).unwrap_err();
        match err {
            EngineError::CorruptRecordStore { line, .. } => assert_eq!(line, 7),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_bad_bool_is_corrupt() {
        let err = PlayerRecord::from_line("42 2 1700000000 lucky 3 17 yes false", 1).unwrap_err();
        assert!(matches!(err, EngineError::CorruptRecordStore { .. }));
    }

    #[test]
    fn test_bad_integer_is_corrupt() {
        let err = PlayerRecord::from_line("42 x 1700000000 lucky 3 17 true false", 1).unwrap_err();
        assert!(matches!(err, EngineError::CorruptRecordStore { .. }));
    }

    #[test]
    fn test_wins_above_total_is_corrupt() {
        let err = PlayerRecord::from_line("42 2 1700000000 lucky 9 3 true false", 1).unwrap_err();
        assert!(matches!(err, EngineError::CorruptRecordStore { .. }));
    }

    #[test]
    fn test_decode_rejects_whole_body_on_one_bad_line() {
        let body = "1 0 100 a 0 0 false false\n2 0 100 b 0 0 maybe false\n";
        let err = decode_all(body).unwrap_err();
        match err {
            EngineError::CorruptRecordStore { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_encode_decode_encode_is_stable() {
        let mut records = PlayerMap::new();
        records.insert(42, sample());
        let mut other = PlayerRecord::new(7, "second player", 1_700_000_500);
        other.apply_spin(true);
        records.insert(7, other);

        let encoded = encode_all(&records);
        let decoded = decode_all(&encoded).unwrap();
        assert_eq!(decoded, records);
        assert_eq!(encode_all(&decoded), encoded);
    }

    #[test]
    fn test_sanitize_display_name() {
        assert_eq!(sanitize_display_name("  big winner\t2 "), "big_winner_2");
        assert_eq!(sanitize_display_name("plain"), "plain");
    }

    #[test]
    fn test_elapsed_never_negative() {
        let record = PlayerRecord::new(1, "a", 1_000);
        assert_eq!(record.elapsed(1_060), 60);
        assert_eq!(record.elapsed(900), 0);
    }
}
