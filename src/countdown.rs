//! Repeating timer owned by exactly one session.
//!
//! A [`Countdown`] spawns a task that calls the supplied tick callback once per
//! period until the callback returns `ControlFlow::Break`, the countdown is
//! cancelled, or the `Countdown` value is dropped. Ticks run to completion one
//! at a time; the next tick is not awaited until the previous callback resolved.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, Instrument};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

pub struct Countdown {
    cancel: CancellationToken,
    join_handle: JoinHandle<()>,
}

impl Countdown {
    /// Start ticking. The first tick fires one full `period` after this call.
    #[must_use]
    pub fn start<F, Fut>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let first = Instant::now() + period;

        let join_handle = tokio::spawn(
            async move {
                let mut interval = interval_at(first, period);
                // Wall-clock semantics: a stalled runtime catches up on missed seconds.
                interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
                loop {
                    tokio::select! {
                        biased;
                        () = token.cancelled() => {
                            debug!(target: "session", "countdown cancelled");
                            break;
                        }
                        _ = interval.tick() => {
                            if on_tick().await.is_break() {
                                debug!(target: "session", "countdown finished");
                                break;
                            }
                        }
                    }
                }
            }
            .instrument(info_span!("countdown")),
        );

        Self { cancel, join_handle }
    }

    /// Stop ticking. A tick already in progress still runs to completion.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[allow(dead_code)]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    #[allow(dead_code)]
    pub fn is_finished(&self) -> bool {
        self.join_handle.is_finished()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn counter(limit: u32) -> (Arc<AtomicU32>, Countdown) {
        let ticks = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&ticks);
        let countdown = Countdown::start(TICK_PERIOD, move || {
            let seen = Arc::clone(&seen);
            async move {
                let n = seen.fetch_add(1, Ordering::SeqCst) + 1;
                if n >= limit {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            }
        });
        (ticks, countdown)
    }

    async fn advance_secs(secs: u64) {
        for _ in 0..secs {
            tokio::time::advance(TICK_PERIOD).await;
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_one_period() {
        let (ticks, _countdown) = counter(u32::MAX);
        tokio::task::yield_now().await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        advance_secs(1).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        advance_secs(4).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn break_stops_the_task() {
        let (ticks, countdown) = counter(3);
        advance_secs(10).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
        assert!(countdown.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_ticking() {
        let (ticks, countdown) = counter(u32::MAX);
        advance_secs(2).await;
        countdown.cancel();
        assert!(countdown.is_cancelled());
        advance_secs(5).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
        assert!(countdown.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_releases_the_timer() {
        let (ticks, countdown) = counter(u32::MAX);
        advance_secs(1).await;
        drop(countdown);
        advance_secs(5).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }
}
