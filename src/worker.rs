use std::time::Duration;

use tokio::sync::watch;

use crate::db;
use crate::state::SharedState;

const SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Periodic housekeeping: drop expired password resets and stale rate limiter
/// entries. Runs until `shutdown` flips to `true`.
pub async fn run(state: SharedState, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
    tracing::info!("Maintenance worker started");

    loop {
        tokio::select! {
            _ = ticker.tick() => sweep(&state).await,
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    tracing::info!("Maintenance worker stopped");
}

pub async fn sweep(state: &SharedState) {
    match db::password_resets::delete_expired(&state.pool).await {
        Ok(0) => {}
        Ok(n) => tracing::info!("Removed {n} expired password resets"),
        Err(e) => tracing::error!("Failed to remove expired password resets: {e}"),
    }

    let pruned = state.login_limiter.cleanup();
    if pruned > 0 {
        tracing::debug!("Pruned {pruned} login limiter entries");
    }
}
