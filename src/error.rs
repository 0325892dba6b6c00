//! Error types for the session engine

use thiserror::Error;

/// Errors surfaced by the store, the pull log and the engine facade
#[derive(Debug, Error)]
pub enum EngineError {
    /// The durable record store could not be read
    #[error("record store unavailable: {0}")]
    StoreUnavailable(#[source] std::io::Error),

    /// A record line failed to parse; the whole load is rejected
    #[error("corrupt record store at line {line}: {reason}")]
    CorruptRecordStore { line: usize, reason: String },

    /// A pull log line failed to parse; the whole replay is rejected
    #[error("corrupt pull log at line {line}: {reason}")]
    CorruptPullLog { line: usize, reason: String },

    /// Trial value outside 1..=64
    #[error("invalid trial value: {0}")]
    InvalidTrialValue(i64),

    /// Requester is not allowed to see pull statistics
    #[error("requester is not the configured admin")]
    Unauthorized,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to hand a reminder to the messaging side (e.g. the recipient blocked the bot)
#[derive(Debug, Error)]
#[error("delivery to {recipient} failed: {reason}")]
pub struct DeliveryError {
    pub recipient: String,
    pub reason: String,
}

pub type EngineResult<T> = Result<T, EngineError>;
