//! Background sweep closing sessions that were never logged out

use std::time::Duration;

use chrono::Utc;
use pm_core::config::SessionConfig;
use pm_db::{PgPool, RepositoryError, SessionRepository};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Close stale sessions across every organization once
pub async fn sweep(sessions: &SessionRepository, config: &SessionConfig) -> Result<u64, RepositoryError> {
    let now = Utc::now();
    let Some(cutoff) = config.stale_cutoff(now) else {
        warn!(
            stale_after_hours = config.stale_after_hours,
            "Stale session window out of range, skipping sweep"
        );
        return Ok(0);
    };
    sessions.close_stale(None, cutoff, now).await
}

/// Spawn the periodic sweep; `None` when the interval is zero.
pub fn spawn(pool: PgPool, config: &SessionConfig) -> Option<JoinHandle<()>> {
    if config.sweep_interval_seconds == 0 {
        info!("Stale session sweep disabled");
        return None;
    }

    let period = Duration::from_secs(config.sweep_interval_seconds);
    let config = config.clone();
    let sessions = SessionRepository::new(pool);

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            match sweep(&sessions, &config).await {
                Ok(0) => debug!("No stale sessions"),
                Ok(closed) => info!(closed, "Closed stale sessions"),
                Err(e) => warn!(error = %e, "Stale session sweep failed"),
            }
        }
    }))
}
