//! Periodic pool health checks

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::Database;

/// Ping the pool every `interval` until the returned task is aborted
///
/// Failures are logged and the loop keeps going.
pub fn spawn_health_check(db: Database, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        if interval.is_zero() {
            tracing::warn!("Health check interval is zero, checks disabled");
            return;
        }

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match db.ping().await {
                Ok(()) => tracing::trace!("Database health check passed"),
                Err(e) => tracing::warn!(error = %e, "Database health check failed"),
            }
        }
    })
}
