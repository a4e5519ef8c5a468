//! Background sweep of the HTTP session registry.
//!
//! Submitted sessions that no request has touched for the configured TTL are
//! dropped from the registry, which also releases their controller.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::state::AppState;

pub const REAP_INTERVAL: Duration = Duration::from_secs(60);

/// Spawn the registry sweep. Runs every `every` until `cancel` fires.
#[must_use]
pub fn spawn_session_reaper(
    state: Arc<AppState>,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!(target: "session", "session reaper shutting down");
                    break;
                }
                _ = interval.tick() => {
                    let removed = state.reap_expired().await;
                    if removed > 0 {
                        let live = state.session_count().await;
                        info!(target: "session", removed, live, "expired sessions reaped");
                    } else {
                        debug!(target: "session", "no expired sessions");
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuizConfig;

    async fn advance_secs(secs: u64) {
        for _ in 0..secs {
            tokio::time::advance(Duration::from_secs(1)).await;
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_sessions_are_cleared_within_an_hour() {
        let state = Arc::new(AppState::from_config(QuizConfig {
            duration_seconds: 2,
            ..QuizConfig::default()
        }));
        for _ in 0..100 {
            let _ = state.create_session().await;
        }
        assert_eq!(state.session_count().await, 100);

        let cancel = CancellationToken::new();
        let reaper = spawn_session_reaper(Arc::clone(&state), REAP_INTERVAL, cancel.clone());

        advance_secs(3600).await;
        assert_eq!(state.session_count().await, 0);

        cancel.cancel();
        reaper.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_reaper_stops_and_leaves_registry_alone() {
        let state = Arc::new(AppState::from_config(QuizConfig {
            duration_seconds: 2,
            session_ttl_seconds: 1,
            ..QuizConfig::default()
        }));
        let _ = state.create_session().await;

        let cancel = CancellationToken::new();
        let reaper = spawn_session_reaper(Arc::clone(&state), REAP_INTERVAL, cancel.clone());
        cancel.cancel();
        reaper.await.unwrap();

        advance_secs(120).await;
        assert_eq!(state.session_count().await, 1);
    }
}
