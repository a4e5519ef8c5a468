//! Error taxonomy. Every variant is an input-contract violation; none of them changes state.

use thiserror::Error;
use uuid::Uuid;

use crate::domain::QuestionId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
  #[error("unknown question id {0}")]
  UnknownQuestion(QuestionId),

  #[error("option index {index} out of range for question {question_id} ({options} options)")]
  OptionOutOfRange {
    question_id: QuestionId,
    index: usize,
    options: usize,
  },

  #[error("unknown session {0}")]
  UnknownSession(Uuid),
}
