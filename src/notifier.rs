//! Reminder sweep - tells players their spin window has reopened
//!
//! Each tick finds players who asked for reminders and whose window elapsed,
//! delivers one reminder each, and marks the player only once delivery is
//! confirmed. Failed deliveries are retried every tick with no backoff.
//!
//! The store lock is never held across a delivery: due reminders are read
//! under the lock, delivered without it, then marked under it again. Sweeps
//! themselves are serialized by a separate gate on the engine.

use crate::engine::SessionEngine;
use crate::error::{DeliveryError, EngineResult};
use crate::events::ReminderEvent;
use crate::store::RecordStore;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::{
    sync::watch,
    time::{interval, Duration, MissedTickBehavior},
};

const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Messaging side of reminder delivery
#[async_trait]
pub trait ReminderSink: Send + Sync {
    /// Deliver one reminder. `Ok` means the recipient got it.
    async fn deliver(&self, reminder: &ReminderEvent) -> Result<(), DeliveryError>;
}

/// Counts from one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub due: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Run one sweep at `now`
pub async fn sweep_once<S, M>(
    engine: &SessionEngine<S>,
    sink: &M,
    now: i64,
) -> EngineResult<SweepReport>
where
    S: RecordStore,
    M: ReminderSink + ?Sized,
{
    let _sweep = engine.begin_sweep().await;
    let due = engine.due_reminders(now).await?;
    let mut report = SweepReport {
        due: due.len(),
        ..SweepReport::default()
    };

    for reminder in &due {
        match sink.deliver(&reminder.event).await {
            Ok(()) => {
                if engine.mark_notified(reminder).await? {
                    report.delivered += 1;
                }
            }
            Err(e) => {
                log::warn!("⚠️  Can't send reminder to {}: {}", reminder.event.display_name, e);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

/// Reminder scheduler task - sweeps every `sweep_interval` until `shutdown`
/// flips to true or its sender is dropped
pub async fn notification_scheduler_task<S, M>(
    engine: Arc<SessionEngine<S>>,
    sink: Arc<M>,
    sweep_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    S: RecordStore,
    M: ReminderSink + ?Sized,
{
    // `interval` panics on a zero period
    let sweep_interval = sweep_interval.max(MIN_SWEEP_INTERVAL);
    log::info!("⏰ Starting reminder scheduler (interval: {:?})", sweep_interval);

    let mut timer = interval(sweep_interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = timer.tick() => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
        }

        let now = chrono::Utc::now().timestamp();
        match sweep_once(engine.as_ref(), sink.as_ref(), now).await {
            Ok(report) if report.due > 0 => {
                log::info!(
                    "🔔 Reminder sweep: {} due, {} delivered, {} failed",
                    report.due,
                    report.delivered,
                    report.failed
                );
            }
            Ok(_) => {}
            Err(e) => {
                log::error!("❌ Reminder sweep failed: {}", e);
            }
        }
    }

    log::info!("Reminder scheduler stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pull_log::PullLog;
    use crate::store::FileRecordStore;
    use crate::window::RateWindow;
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    };
    use tempfile::{tempdir, TempDir};

    const T0: i64 = 1_700_000_000;

    /// Records every delivery; can be told to refuse them
    #[derive(Default)]
    struct RecordingSink {
        delivered: Mutex<Vec<ReminderEvent>>,
        blocked: AtomicBool,
    }

    #[async_trait]
    impl ReminderSink for RecordingSink {
        async fn deliver(&self, reminder: &ReminderEvent) -> Result<(), DeliveryError> {
            if self.blocked.load(Ordering::SeqCst) {
                return Err(DeliveryError {
                    recipient: reminder.display_name.clone(),
                    reason: "bot was blocked by the user".to_string(),
                });
            }
            self.delivered.lock().unwrap().push(reminder.clone());
            Ok(())
        }
    }

    fn engine(dir: &TempDir) -> SessionEngine<FileRecordStore> {
        SessionEngine::new(
            FileRecordStore::new(dir.path().join("gamba.txt")),
            PullLog::new(dir.path().join("pulls.txt")),
            RateWindow::default(),
        )
    }

    #[tokio::test]
    async fn test_one_reminder_per_window() {
        let dir = tempdir().unwrap();
        let engine = engine(&dir);
        let sink = RecordingSink::default();

        engine.handle_toggle_notify(1, "alice", T0).await.unwrap();
        engine.handle_spin(1, "alice", 2, T0 + 10).await.unwrap();

        // Nothing before the window elapses
        let report = sweep_once(&engine, &sink, T0 + 600).await.unwrap();
        assert_eq!(report.due, 0);

        for tick in 0..10 {
            sweep_once(&engine, &sink, T0 + 3601 + tick * 20).await.unwrap();
        }
        assert_eq!(sink.delivered.lock().unwrap().len(), 1);

        // Next window earns another reminder
        engine.handle_spin(1, "alice", 2, T0 + 4000).await.unwrap();
        sweep_once(&engine, &sink, T0 + 4000 + 3601).await.unwrap();
        sweep_once(&engine, &sink, T0 + 4000 + 3621).await.unwrap();

        let delivered = sink.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 2);
        assert_eq!(
            delivered[0],
            ReminderEvent {
                id: 1,
                display_name: "alice".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_players_without_reminders_are_skipped() {
        let dir = tempdir().unwrap();
        let engine = engine(&dir);
        let sink = RecordingSink::default();

        engine.handle_spin(2, "bob", 2, T0).await.unwrap();
        let report = sweep_once(&engine, &sink, T0 + 7200).await.unwrap();

        assert_eq!(report, SweepReport::default());
        assert!(sink.delivered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_delivery_is_retried() {
        let dir = tempdir().unwrap();
        let engine = engine(&dir);
        let sink = RecordingSink::default();
        sink.blocked.store(true, Ordering::SeqCst);

        engine.handle_toggle_notify(3, "carol", T0).await.unwrap();

        for tick in 0..3 {
            let report = sweep_once(&engine, &sink, T0 + 3601 + tick).await.unwrap();
            assert_eq!(report.failed, 1);
        }
        assert!(!engine.snapshot().await.unwrap()[&3].notified_this_window);

        sink.blocked.store(false, Ordering::SeqCst);
        let report = sweep_once(&engine, &sink, T0 + 3700).await.unwrap();
        assert_eq!(report.delivered, 1);
        assert!(engine.snapshot().await.unwrap()[&3].notified_this_window);
    }

    #[tokio::test]
    async fn test_scheduler_stops_on_shutdown() {
        let dir = tempdir().unwrap();
        let engine = Arc::new(engine(&dir));
        let sink = Arc::new(RecordingSink::default());
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(notification_scheduler_task(
            engine,
            sink,
            Duration::from_millis(10),
            rx,
        ));

        tokio::time::sleep(Duration::from_millis(30)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("scheduler did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_scheduler_survives_zero_interval() {
        let dir = tempdir().unwrap();
        let engine = Arc::new(engine(&dir));
        let sink = Arc::new(RecordingSink::default());
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(notification_scheduler_task(
            engine,
            sink,
            Duration::ZERO,
            rx,
        ));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_finished());
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("scheduler did not stop")
            .unwrap();
    }
}
