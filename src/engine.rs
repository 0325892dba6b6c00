//! Session engine - facade over the store, the rate window, the classifier and
//! the ranker
//!
//! Every operation runs load -> mutate -> save on the full player collection
//! while holding the single store lock, so concurrent handlers and the reminder
//! sweep never overwrite each other's updates. A failed operation drops its
//! snapshot; the next one reloads whatever was last saved.

use crate::error::{EngineError, EngineResult};
use crate::events::{EngineReply, IncomingEvent, PullOutcome, ReminderEvent};
use crate::leaderboard::{self, LeaderboardEntry};
use crate::outcome::classify;
use crate::pull_log::{PullLog, PullStats};
use crate::record::{PlayerMap, PlayerRecord};
use crate::store::RecordStore;
use crate::window::{RateWindow, WindowDecision};
use std::collections::HashSet;
use tokio::sync::{Mutex, MutexGuard};

/// Store plus whether it has ever been read or written successfully
struct Guarded<S> {
    store: S,
    durable_seen: bool,
}

impl<S: RecordStore> Guarded<S> {
    /// Load everything. An unreadable store counts as empty until the medium
    /// has been seen once; after that it is an error.
    fn load(&mut self) -> EngineResult<PlayerMap> {
        match self.store.load_all() {
            Ok(records) => {
                self.durable_seen = true;
                Ok(records)
            }
            Err(EngineError::StoreUnavailable(e)) if !self.durable_seen => {
                log::info!(
                    "No readable {} store yet ({}), starting empty",
                    self.store.backend_type(),
                    e
                );
                Ok(PlayerMap::new())
            }
            Err(e) => Err(e),
        }
    }

    fn save(&mut self, records: &PlayerMap) -> EngineResult<()> {
        self.store.save_all(records)?;
        self.durable_seen = true;
        Ok(())
    }
}

/// Reminder found by a sweep, with the window it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueReminder {
    pub event: ReminderEvent,
    pub window_start: i64,
}

pub struct SessionEngine<S> {
    inner: Mutex<Guarded<S>>,
    /// Held for a whole reminder sweep so two sweeps never deliver the same reminder
    sweep_gate: Mutex<()>,
    pull_log: PullLog,
    window: RateWindow,
    admin_username: Option<String>,
}

impl<S: RecordStore> SessionEngine<S> {
    pub fn new(store: S, pull_log: PullLog, window: RateWindow) -> Self {
        Self {
            inner: Mutex::new(Guarded {
                store,
                durable_seen: false,
            }),
            sweep_gate: Mutex::new(()),
            pull_log,
            window,
            admin_username: None,
        }
    }

    /// Name allowed to read pull statistics
    pub fn with_admin(mut self, admin_username: Option<String>) -> Self {
        self.admin_username = admin_username;
        self
    }

    /// One spin: rate-limit, classify, update stats, persist
    ///
    /// A rate-limited spin is persisted too, so the clamped counter sticks for
    /// the rest of the window. Only allowed spins touch lifetime stats and the
    /// pull log.
    pub async fn handle_spin(
        &self,
        id: i64,
        display_name: &str,
        trial_value: i64,
        now: i64,
    ) -> EngineResult<PullOutcome> {
        // Reject bad input before a spin is consumed
        let outcome = classify(trial_value)?;

        let mut guard = self.inner.lock().await;
        let mut records = guard.load()?;

        let record = records
            .entry(id)
            .or_insert_with(|| PlayerRecord::new(id, display_name, now));
        record.set_display_name(display_name);

        let result = match self.window.evaluate(record, now) {
            WindowDecision::Allowed => {
                record.apply_spin(outcome.is_win);
                PullOutcome::Allowed {
                    win: outcome.is_win,
                    symbols: outcome.symbols,
                }
            }
            WindowDecision::RateLimited(remaining) => PullOutcome::RateLimited(remaining),
        };
        let name = record.display_name.clone();

        guard.save(&records)?;

        if let PullOutcome::Allowed { win, .. } = result {
            log::info!("🎰 {} spun {} (win={})", name, trial_value, win);
            if let Err(e) = self.pull_log.record_pull(&name, trial_value) {
                log::warn!("Failed to append to pull log: {}", e);
            }
        }

        Ok(result)
    }

    /// Flip the reminder preference and return the new state
    pub async fn handle_toggle_notify(
        &self,
        id: i64,
        display_name: &str,
        now: i64,
    ) -> EngineResult<bool> {
        let mut guard = self.inner.lock().await;
        let mut records = guard.load()?;

        let record = records
            .entry(id)
            .or_insert_with(|| PlayerRecord::new(id, display_name, now));
        record.set_display_name(display_name);
        record.notify_requested = !record.notify_requested;
        let new_state = record.notify_requested;

        guard.save(&records)?;

        log::info!("🔔 Player {} reminders {}", id, if new_state { "on" } else { "off" });
        Ok(new_state)
    }

    /// Rank freshly loaded players within `membership`
    pub async fn handle_leaderboard_request(
        &self,
        membership: &HashSet<i64>,
    ) -> EngineResult<Vec<LeaderboardEntry>> {
        let records = {
            let mut guard = self.inner.lock().await;
            guard.load()?
        };
        Ok(leaderboard::rank(&records, membership))
    }

    /// Symbol frequencies from the pull log, for the admin only
    pub async fn handle_pull_stats_request(&self, requester: &str) -> EngineResult<PullStats> {
        match &self.admin_username {
            Some(admin) if admin == requester => {}
            _ => return Err(EngineError::Unauthorized),
        }

        // Appends happen under the lock; hold it so no half-written line is read
        let _guard = self.inner.lock().await;
        self.pull_log.replay()
    }

    /// Dispatch a collaborator event to the matching handler
    pub async fn handle_event(&self, event: IncomingEvent) -> EngineResult<EngineReply> {
        match event {
            IncomingEvent::Spin(spin) => {
                let outcome = self
                    .handle_spin(spin.id, &spin.display_name, spin.trial_value, spin.now)
                    .await?;
                Ok(EngineReply::SpinResult(outcome))
            }
            IncomingEvent::ToggleNotify(toggle) => {
                let new_state = self
                    .handle_toggle_notify(toggle.id, &toggle.display_name, toggle.now)
                    .await?;
                Ok(EngineReply::NotifyToggled { new_state })
            }
            IncomingEvent::Leaderboard(request) => {
                let entries = self.handle_leaderboard_request(&request.membership).await?;
                let text = leaderboard::render(&entries, self.window.cap());
                Ok(EngineReply::LeaderboardText { entries, text })
            }
            IncomingEvent::PullStats(request) => {
                let stats = self.handle_pull_stats_request(&request.requester).await?;
                Ok(EngineReply::PullStats(stats))
            }
        }
    }

    /// Exclusive right to run a reminder sweep; does not block spins
    pub async fn begin_sweep(&self) -> MutexGuard<'_, ()> {
        self.sweep_gate.lock().await
    }

    /// Players who asked for reminders, were not reminded this window, and
    /// whose window has run out
    pub async fn due_reminders(&self, now: i64) -> EngineResult<Vec<DueReminder>> {
        let records = {
            let mut guard = self.inner.lock().await;
            guard.load()?
        };

        Ok(records
            .values()
            .filter(|r| {
                r.notify_requested
                    && !r.notified_this_window
                    && r.elapsed(now) > self.window.window_secs()
            })
            .map(|r| DueReminder {
                event: ReminderEvent {
                    id: r.id,
                    display_name: r.display_name.clone(),
                },
                window_start: r.window_start,
            })
            .collect())
    }

    /// Record a delivered reminder
    ///
    /// Returns false without writing if the player moved to a new window, turned
    /// reminders off, or was already marked since the sweep looked.
    pub async fn mark_notified(&self, due: &DueReminder) -> EngineResult<bool> {
        let mut guard = self.inner.lock().await;
        let mut records = guard.load()?;

        let Some(record) = records.get_mut(&due.event.id) else {
            return Ok(false);
        };
        if record.window_start != due.window_start
            || !record.notify_requested
            || record.notified_this_window
        {
            return Ok(false);
        }
        record.notified_this_window = true;

        guard.save(&records)?;
        Ok(true)
    }

    /// Current contents of the store
    pub async fn snapshot(&self) -> EngineResult<PlayerMap> {
        let mut guard = self.inner.lock().await;
        guard.load()
    }
}
