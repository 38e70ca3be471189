//! Background sweep of expired refresh tokens

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::auth::service::AuthService;

/// Spawn a task that calls [`AuthService::purge_expired_tokens`] every `period`.
///
/// The first sweep runs one full period after spawning. Failures are logged and
/// the loop keeps going; abort the returned handle to stop it.
pub fn spawn_token_cleanup(service: Arc<AuthService>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_secs = period.as_secs(), "refresh token cleanup started");

        loop {
            ticker.tick().await;
            match service.purge_expired_tokens().await {
                Ok(0) => debug!("no expired refresh tokens"),
                Ok(removed) => info!(removed, "expired refresh tokens purged"),
                Err(e) => warn!(error = %e, "refresh token cleanup failed"),
            }
        }
    })
}
