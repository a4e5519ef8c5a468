//! Application state: the question bank, quiz settings, and live HTTP sessions.
//!
//! WebSocket connections own their controller directly for the lifetime of the
//! socket. HTTP clients have no connection to hang a session on, so their
//! controllers live in the registry until deleted, or until `reap_expired` finds
//! them submitted and untouched for longer than `session_ttl`.

use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::{load_config, QuizConfig};
use crate::controller::QuizController;
use crate::domain::Question;
use crate::error::QuizError;

pub struct SessionEntry {
    pub controller: Arc<QuizController>,
    pub last_seen: Instant,
}

#[derive(Clone)]
pub struct AppState {
    pub title: String,
    pub duration_seconds: u32,
    pub session_ttl: Duration,
    pub questions: Arc<[Question]>,
    pub sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
}

impl AppState {
    /// Build state from env: load config, resolve the question bank.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        Self::from_config(load_config())
    }

    pub fn from_config(cfg: QuizConfig) -> Self {
        let questions: Arc<[Question]> = cfg.question_bank().into();
        info!(target: "quiz_backend", title = %cfg.title, questions = questions.len(), duration_seconds = cfg.duration_seconds, session_ttl_seconds = cfg.session_ttl_seconds, "Quiz ready");
        Self {
            title: cfg.title,
            duration_seconds: cfg.duration_seconds,
            session_ttl: Duration::from_secs(cfg.session_ttl_seconds),
            questions,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Start a session that is not tracked by the registry.
    pub fn open_session(&self) -> QuizController {
        QuizController::start(Arc::clone(&self.questions), self.duration_seconds)
    }

    /// Start a session and register it for lookup by id.
    #[instrument(level = "debug", skip(self))]
    pub async fn create_session(&self) -> Arc<QuizController> {
        let controller = Arc::new(self.open_session());
        let entry = SessionEntry {
            controller: Arc::clone(&controller),
            last_seen: Instant::now(),
        };
        self.sessions.write().await.insert(controller.id(), entry);
        controller
    }

    /// Look up a registered session and mark it as recently used.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_session(&self, id: Uuid) -> Result<Arc<QuizController>, QuizError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id).ok_or(QuizError::UnknownSession(id))?;
        entry.last_seen = Instant::now();
        Ok(Arc::clone(&entry.controller))
    }

    /// Unregister a session. Its countdown stops once the last handle is gone.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn remove_session(&self, id: Uuid) -> Result<(), QuizError> {
        let removed = self.sessions.write().await.remove(&id);
        match removed {
            Some(_) => {
                info!(target: "session", %id, "Session removed");
                Ok(())
            }
            None => Err(QuizError::UnknownSession(id)),
        }
    }

    /// Drop submitted sessions nobody has touched for `session_ttl`.
    ///
    /// In-progress sessions are kept: their countdown submits them within the
    /// configured duration, after which they become eligible.
    #[instrument(level = "debug", skip(self))]
    pub async fn reap_expired(&self) -> usize {
        let now = Instant::now();
        let stale: Vec<(Uuid, Arc<QuizController>)> = self
            .sessions
            .read()
            .await
            .iter()
            .filter(|(_, e)| now.duration_since(e.last_seen) >= self.session_ttl)
            .map(|(id, e)| (*id, Arc::clone(&e.controller)))
            .collect();

        let mut expired = Vec::new();
        for (id, controller) in stale {
            if controller.snapshot().await.is_submitted() {
                expired.push(id);
            }
        }
        if expired.is_empty() {
            return 0;
        }

        let mut sessions = self.sessions.write().await;
        let mut removed = 0;
        for id in expired {
            // A request may have touched it between the scan and now.
            let still_stale = sessions
                .get(&id)
                .is_some_and(|e| now.duration_since(e.last_seen) >= self.session_ttl);
            if still_stale {
                sessions.remove(&id);
                debug!(target: "session", %id, "Session expired");
                removed += 1;
            }
        }
        removed
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
