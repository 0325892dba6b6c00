//! # Gamba session engine
//!
//! Spin accounting, rate limiting, ranking and reminders for a chat slot
//! machine. The chat framework is a collaborator: it hands the engine spin,
//! toggle and leaderboard events and receives outcomes, leaderboard text and
//! reminders back.
//!
//! ## Flow
//!
//! ```text
//! IncomingEvent
//!     ↓
//! SessionEngine (one lock: load → mutate → save)
//!     ↓                       ↓
//! RateWindow + classify    leaderboard::rank
//!     ↓
//! RecordStore (flat file, atomic rename) + PullLog (append-only)
//!
//! notification_scheduler_task → sweep_once → ReminderSink
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod leaderboard;
pub mod notifier;
pub mod outcome;
pub mod pull_log;
pub mod record;
pub mod store;
pub mod window;

// Re-export commonly used types
pub use config::EngineConfig;
pub use engine::{DueReminder, SessionEngine};
pub use error::{DeliveryError, EngineError, EngineResult};
pub use events::{EngineReply, IncomingEvent, PullOutcome, ReminderEvent};
pub use leaderboard::LeaderboardEntry;
pub use notifier::{notification_scheduler_task, sweep_once, ReminderSink, SweepReport};
pub use outcome::{classify, Outcome, Symbol};
pub use pull_log::{PullLog, PullStats};
pub use record::{PlayerMap, PlayerRecord};
pub use store::{FileRecordStore, RecordStore};
pub use window::{RateWindow, Remaining, WindowDecision};
