// src/services/sync.rs

use std::time::Duration;

use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::db::RecordStore;

/// Polls storage and reloads any collection another process has written since
/// we last looked. Runs until the runtime shuts down.
pub fn spawn_sync_poller(store: RecordStore, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; the store was just loaded.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match store.refresh().await {
                Ok(keys) if !keys.is_empty() => {
                    tracing::info!("🔄 Reloaded from storage: {}", keys.join(", "));
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Sync poll failed: {}", e),
            }
        }
    })
}
