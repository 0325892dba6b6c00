//! Engine configuration from environment variables

use crate::window::{DEFAULT_SPIN_CAP, DEFAULT_WINDOW_SECS};
use std::env;

/// Configuration for the session engine and its reminder sweep
///
/// Loaded from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path to the player record store
    pub store_path: String,

    /// Path to the append-only pull log
    pub pull_log_path: String,

    /// Spins allowed per window
    pub spin_cap: u32,

    /// Window length in seconds
    pub window_secs: i64,

    /// Reminder sweep interval in seconds
    pub notify_interval_secs: u64,

    /// Only this name may read pull statistics
    pub admin_username: Option<String>,
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `GAMBA_STORE_PATH` (default: gamba.txt)
    /// - `GAMBA_PULL_LOG_PATH` (default: gamba_pulls.txt)
    /// - `GAMBA_SPIN_CAP` (default: 3)
    /// - `GAMBA_WINDOW_SECS` (default: 3600)
    /// - `GAMBA_NOTIFY_INTERVAL_SECS` (default: 20, at least 1)
    /// - `ADMIN_USERNAME` (optional)
    pub fn from_env() -> Self {
        Self {
            store_path: env::var("GAMBA_STORE_PATH").unwrap_or_else(|_| "gamba.txt".to_string()),

            pull_log_path: env::var("GAMBA_PULL_LOG_PATH")
                .unwrap_or_else(|_| "gamba_pulls.txt".to_string()),

            spin_cap: env::var("GAMBA_SPIN_CAP")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SPIN_CAP),

            window_secs: env::var("GAMBA_WINDOW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_WINDOW_SECS),

            notify_interval_secs: env::var("GAMBA_NOTIFY_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20)
                .max(1),

            admin_username: env::var("ADMIN_USERNAME")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store_path: "gamba.txt".to_string(),
            pull_log_path: "gamba_pulls.txt".to_string(),
            spin_cap: DEFAULT_SPIN_CAP,
            window_secs: DEFAULT_WINDOW_SECS,
            notify_interval_secs: 20,
            admin_username: None,
        }
    }
}
