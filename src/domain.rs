//! Domain models: questions from the bank, recorded answers and the session phase.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Question identifier as supplied by the question bank.
pub type QuestionId = u32;

/// Recorded answers keyed by question id. A missing key means "unanswered".
pub type UserAnswers = BTreeMap<QuestionId, usize>;

/// One multiple-choice question. Read-only once loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
  pub id: QuestionId,
  pub question_text: String,
  pub options: Vec<String>,
  pub correct_answer_index: usize,
}

impl Question {
  pub fn option(&self, index: usize) -> Option<&str> {
    self.options.get(index).map(String::as_str)
  }

  pub fn correct_option(&self) -> Option<&str> {
    self.option(self.correct_answer_index)
  }
}

/// Coarse lifecycle state of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  InProgress,
  Submitted,
}

impl Default for Phase {
  fn default() -> Self { Phase::InProgress }
}

/// Why a session left `InProgress`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOrigin {
  Manual,
  Timeout,
}

impl std::fmt::Display for SubmitOrigin {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SubmitOrigin::Manual => f.write_str("manual"),
      SubmitOrigin::Timeout => f.write_str("timeout"),
    }
  }
}
