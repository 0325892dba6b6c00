//! Gamba Console - line-driven stand-in for the chat collaborator
//!
//! Reads one command per line from stdin and prints the engine's reply:
//!
//! ```text
//! spin <user_id> <name> [trial_value]   (trial value drawn from 1..=64 if omitted)
//! notify <user_id> <name>
//! top <user_id> [<user_id> ...]         (membership of the requesting chat)
//! pulls <name>                          (admin only)
//! ```
//!
//! Reminders are delivered to stdout by the background scheduler.
//!
//! Usage:
//!   cargo run --bin gamba_console
//!
//! Environment variables: see `EngineConfig::from_env`.

use async_trait::async_trait;
use dotenv::dotenv;
use gamba::{
    events::{LeaderboardRequest, PullStatsRequest, SpinEvent, ToggleNotifyEvent},
    notification_scheduler_task, DeliveryError, EngineConfig, EngineReply, FileRecordStore,
    IncomingEvent, PullLog, PullOutcome, RateWindow, ReminderEvent, ReminderSink, SessionEngine,
};
use log::{error, info};
use rand::Rng;
use std::{collections::HashSet, str::SplitWhitespace, sync::Arc, time::Duration};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::watch,
    task::JoinSet,
};

/// Prints reminders instead of sending chat messages
struct ConsoleSink;

#[async_trait]
impl ReminderSink for ConsoleSink {
    async fn deliver(&self, reminder: &ReminderEvent) -> Result<(), DeliveryError> {
        println!(
            "@{}, your spins are back! Send `notify {} {}` to turn reminders off.",
            reminder.display_name, reminder.id, reminder.display_name
        );
        Ok(())
    }
}

fn next_id(parts: &mut SplitWhitespace<'_>) -> Result<i64, String> {
    parts
        .next()
        .ok_or("missing user id")?
        .parse::<i64>()
        .map_err(|e| format!("bad user id: {}", e))
}

fn parse_command(line: &str, now: i64) -> Result<IncomingEvent, String> {
    let mut parts = line.split_whitespace();
    let command = parts.next().ok_or("empty command")?;

    match command {
        "spin" => {
            let id = next_id(&mut parts)?;
            let display_name = parts.next().ok_or("missing name")?.to_string();
            let trial_value = match parts.next() {
                Some(raw) => raw.parse().map_err(|e| format!("bad trial value: {}", e))?,
                None => rand::thread_rng().gen_range(1..=64),
            };
            Ok(IncomingEvent::Spin(SpinEvent {
                id,
                display_name,
                trial_value,
                now,
            }))
        }
        "notify" => {
            let id = next_id(&mut parts)?;
            let display_name = parts.next().ok_or("missing name")?.to_string();
            Ok(IncomingEvent::ToggleNotify(ToggleNotifyEvent {
                id,
                display_name,
                now,
            }))
        }
        "top" => {
            let membership = parts
                .map(|raw| raw.parse::<i64>())
                .collect::<Result<HashSet<_>, _>>()
                .map_err(|e| format!("bad user id: {}", e))?;
            Ok(IncomingEvent::Leaderboard(LeaderboardRequest { membership, now }))
        }
        "pulls" => {
            let requester = parts.next().ok_or("missing name")?.to_string();
            Ok(IncomingEvent::PullStats(PullStatsRequest { requester }))
        }
        other => Err(format!("unknown command: {}", other)),
    }
}

fn print_reply(reply: EngineReply) {
    match reply {
        EngineReply::SpinResult(PullOutcome::Allowed { win, symbols }) => {
            let reels: Vec<&str> = symbols.iter().map(|s| s.as_str()).collect();
            println!("[{}] {}", reels.join(" | "), if win { "JACKPOT!" } else { "no luck" });
        }
        EngineReply::SpinResult(PullOutcome::RateLimited(remaining)) => {
            println!(
                "Spin limit reached. Try again in {} minutes {} seconds!",
                remaining.minutes, remaining.seconds
            );
        }
        EngineReply::NotifyToggled { new_state } => {
            println!("Reminders {}", if new_state { "enabled" } else { "disabled" });
        }
        EngineReply::LeaderboardText { text, .. } => print!("{}", text),
        EngineReply::PullStats(stats) => match serde_json::to_string_pretty(&stats) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to encode pull stats: {}", e),
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = EngineConfig::from_env();

    info!("🚀 Starting Gamba console...");
    info!("   ├─ Store: {}", config.store_path);
    info!("   ├─ Pull log: {}", config.pull_log_path);
    info!("   ├─ Limit: {} spins per {}s", config.spin_cap, config.window_secs);
    info!("   └─ Reminder sweep: every {}s", config.notify_interval_secs);

    let engine = Arc::new(
        SessionEngine::new(
            FileRecordStore::new(&config.store_path),
            PullLog::new(&config.pull_log_path),
            RateWindow::new(config.spin_cap, config.window_secs),
        )
        .with_admin(config.admin_username.clone()),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = tokio::spawn(notification_scheduler_task(
        engine.clone(),
        Arc::new(ConsoleSink),
        Duration::from_secs(config.notify_interval_secs),
        shutdown_rx,
    ));

    let mut handlers = JoinSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let now = chrono::Utc::now().timestamp();
        let event = match parse_command(&line, now) {
            Ok(event) => event,
            Err(e) => {
                error!("{}", e);
                continue;
            }
        };

        let engine = engine.clone();
        handlers.spawn(async move {
            match engine.handle_event(event).await {
                Ok(reply) => print_reply(reply),
                Err(e) => error!("❌ {}", e),
            }
        });
    }

    while let Some(result) = handlers.join_next().await {
        if let Err(e) = result {
            error!("Handler task failed: {}", e);
        }
    }

    info!("Input closed, shutting down");
    shutdown_tx.send(true).ok();
    scheduler.await?;

    Ok(())
}
