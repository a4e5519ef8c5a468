//! Quiz session controller: serializes every mutation of a [`QuizSession`] behind one
//! async mutex and owns the session's [`Countdown`].
//!
//! Ownership rules:
//!   - the countdown lives inside the locked state, so arming, cancelling and
//!     replacing it happen under the same lock as the mutation that caused it
//!   - the tick task only holds a `Weak` reference; dropping the controller drops
//!     the countdown and the task stops on its next poll
//!   - each countdown is tagged with the session epoch it was armed for, so a tick
//!     that was already waiting on the lock when `restart` ran becomes a no-op
//!
//! Every state change is published on a `watch` channel for the presentation layer.

use std::ops::ControlFlow;
use std::sync::{Arc, Weak};

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::countdown::{Countdown, TICK_PERIOD};
use crate::domain::{Question, QuestionId, SubmitOrigin};
use crate::error::QuizError;
use crate::scoring;
use crate::session::{QuizSession, Selection, Tick};

struct Inner {
    session: QuizSession,
    countdown: Option<Countdown>,
}

pub struct QuizController {
    id: Uuid,
    inner: Arc<Mutex<Inner>>,
    updates: Arc<watch::Sender<QuizSession>>,
}

impl QuizController {
    /// Create a fresh session and start its countdown. Must run inside a tokio runtime.
    pub fn start(questions: Arc<[Question]>, initial_seconds: u32) -> Self {
        let id = Uuid::new_v4();
        let session = QuizSession::new(questions, initial_seconds);
        let (tx, _rx) = watch::channel(session.clone());
        let updates = Arc::new(tx);

        let inner = Arc::new_cyclic(|weak| {
            let countdown = arm(id, weak.clone(), Arc::clone(&updates), session.epoch());
            Mutex::new(Inner { session, countdown: Some(countdown) })
        });

        info!(target: "session", %id, initial_seconds, "Session started");
        Self { id, inner, updates }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current state, cloned out of the lock.
    pub async fn snapshot(&self) -> QuizSession {
        self.inner.lock().await.session.clone()
    }

    /// Receiver that observes every published change, including countdown ticks.
    pub fn subscribe(&self) -> watch::Receiver<QuizSession> {
        self.updates.subscribe()
    }

    /// Whether the countdown for the current attempt is still live.
    #[cfg(test)]
    pub async fn is_ticking(&self) -> bool {
        let guard = self.inner.lock().await;
        guard
            .countdown
            .as_ref()
            .is_some_and(|c| !c.is_cancelled() && !c.is_finished())
    }

    #[instrument(level = "debug", skip(self), fields(session = %self.id))]
    pub async fn select_answer(
        &self,
        question_id: QuestionId,
        option_index: usize,
    ) -> Result<Selection, QuizError> {
        let mut guard = self.inner.lock().await;
        let outcome = guard.session.select_answer(question_id, option_index);
        match &outcome {
            Ok(Selection::Recorded) => {
                debug!(target: "session", id = %self.id, question_id, option_index, answered = guard.session.answered_count(), "Answer recorded");
                self.updates.send_replace(guard.session.clone());
            }
            Ok(Selection::Ignored) => {
                debug!(target: "session", id = %self.id, question_id, "Selection after submission ignored");
            }
            Err(e) => {
                warn!(target: "session", id = %self.id, error = %e, "Selection rejected");
            }
        }
        outcome
    }

    /// Submit now. Returns `true` if this call ended the session.
    #[instrument(level = "debug", skip(self), fields(session = %self.id))]
    pub async fn submit(&self) -> bool {
        let mut guard = self.inner.lock().await;
        if !guard.session.submit(SubmitOrigin::Manual) {
            debug!(target: "session", id = %self.id, "Submit ignored; already submitted");
            return false;
        }
        guard.countdown = None;
        log_submitted(self.id, &guard.session);
        self.updates.send_replace(guard.session.clone());
        true
    }

    /// Discard the attempt, reset the clock and arm a new countdown.
    #[instrument(level = "debug", skip(self), fields(session = %self.id))]
    pub async fn restart(&self) {
        let mut guard = self.inner.lock().await;
        // Release the old timer before acquiring the new one.
        if let Some(old) = guard.countdown.take() {
            old.cancel();
        }
        guard.session.restart();
        let countdown = arm(
            self.id,
            Arc::downgrade(&self.inner),
            Arc::clone(&self.updates),
            guard.session.epoch(),
        );
        guard.countdown = Some(countdown);
        info!(target: "session", id = %self.id, remaining = guard.session.remaining_seconds(), "Session restarted");
        self.updates.send_replace(guard.session.clone());
    }
}

impl Drop for QuizController {
    fn drop(&mut self) {
        debug!(target: "session", id = %self.id, "Session dropped");
    }
}

fn arm(
    id: Uuid,
    inner: Weak<Mutex<Inner>>,
    updates: Arc<watch::Sender<QuizSession>>,
    epoch: u64,
) -> Countdown {
    Countdown::start(TICK_PERIOD, move || {
        let inner = inner.clone();
        let updates = Arc::clone(&updates);
        async move {
            let Some(inner) = inner.upgrade() else {
                return ControlFlow::Break(());
            };
            let mut guard = inner.lock().await;
            if guard.session.epoch() != epoch {
                return ControlFlow::Break(());
            }
            match guard.session.tick() {
                Tick::Running => {
                    updates.send_replace(guard.session.clone());
                    ControlFlow::Continue(())
                }
                Tick::Expired => {
                    guard.countdown = None;
                    log_submitted(id, &guard.session);
                    updates.send_replace(guard.session.clone());
                    ControlFlow::Break(())
                }
                Tick::Stopped => ControlFlow::Break(()),
            }
        }
    })
}

fn log_submitted(id: Uuid, session: &QuizSession) {
    let total = session.questions().len();
    let score = scoring::score(session.questions(), session.answers());
    let origin = session.submitted_by().unwrap_or(SubmitOrigin::Manual);
    info!(
        target: "session",
        %id,
        %origin,
        score,
        total,
        answered = session.answered_count(),
        remaining = session.remaining_seconds(),
        "Session submitted"
    );
}
