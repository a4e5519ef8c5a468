//! Session state for one quiz attempt.
//!
//! `QuizSession` is plain data plus the transition rules:
//!   - answers may only change while the phase is `InProgress`
//!   - `submit` is one-way and idempotent
//!   - `tick` decrements the clock and submits once it reaches zero
//!   - `restart` is the only way back to `InProgress`
//!
//! It performs no I/O and owns no timer; `controller::QuizController` serializes
//! access to it and drives `tick` from the countdown.

use std::sync::Arc;

use crate::domain::{Phase, Question, QuestionId, SubmitOrigin, UserAnswers};
use crate::error::QuizError;

/// Result of a successful `select_answer` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Answer stored (or overwritten).
    Recorded,
    /// Session already submitted; nothing changed.
    Ignored,
}

/// Result of one countdown tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// Clock decremented; more time remains.
    Running,
    /// This tick reached zero and submitted the session.
    Expired,
    /// Session was already submitted; nothing changed.
    Stopped,
}

#[derive(Clone, Debug)]
pub struct QuizSession {
    questions: Arc<[Question]>,
    initial_seconds: u32,
    phase: Phase,
    answers: UserAnswers,
    remaining_seconds: u32,
    submitted_by: Option<SubmitOrigin>,
    // Bumped on every restart so work scheduled for an older attempt can detect it.
    epoch: u64,
}

impl QuizSession {
    pub fn new(questions: Arc<[Question]>, initial_seconds: u32) -> Self {
        Self {
            questions,
            initial_seconds,
            phase: Phase::InProgress,
            answers: UserAnswers::new(),
            remaining_seconds: initial_seconds,
            submitted_by: None,
            epoch: 0,
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_submitted(&self) -> bool {
        self.phase == Phase::Submitted
    }

    pub fn answers(&self) -> &UserAnswers {
        &self.answers
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn initial_seconds(&self) -> u32 {
        self.initial_seconds
    }

    pub fn submitted_by(&self) -> Option<SubmitOrigin> {
        self.submitted_by
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Number of distinct questions with a recorded answer.
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Record `option_index` for `question_id`. Last write wins.
    ///
    /// Unknown questions and out-of-range options are rejected without touching state.
    /// After submission the call is accepted but ignored.
    pub fn select_answer(
        &mut self,
        question_id: QuestionId,
        option_index: usize,
    ) -> Result<Selection, QuizError> {
        let question = self
            .questions
            .iter()
            .find(|q| q.id == question_id)
            .ok_or(QuizError::UnknownQuestion(question_id))?;

        if option_index >= question.options.len() {
            return Err(QuizError::OptionOutOfRange {
                question_id,
                index: option_index,
                options: question.options.len(),
            });
        }

        if self.is_submitted() {
            return Ok(Selection::Ignored);
        }

        self.answers.insert(question_id, option_index);
        Ok(Selection::Recorded)
    }

    /// Move to `Submitted`. Returns `true` only for the call that performed the transition.
    pub fn submit(&mut self, origin: SubmitOrigin) -> bool {
        if self.is_submitted() {
            return false;
        }
        self.phase = Phase::Submitted;
        self.submitted_by = Some(origin);
        true
    }

    /// One second elapsed. Floors at zero and submits exactly once when zero is reached.
    pub fn tick(&mut self) -> Tick {
        if self.is_submitted() {
            return Tick::Stopped;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.submit(SubmitOrigin::Timeout);
            return Tick::Expired;
        }
        Tick::Running
    }

    /// Discard the attempt and start over with the configured duration.
    pub fn restart(&mut self) {
        self.answers.clear();
        self.remaining_seconds = self.initial_seconds;
        self.phase = Phase::InProgress;
        self.submitted_by = None;
        self.epoch = self.epoch.wrapping_add(1);
    }
}
