//! Scoring and per-question review. Everything here is derived from the question set
//! and the recorded answers on demand; nothing is cached.

use serde::Serialize;

use crate::domain::{Question, QuestionId, UserAnswers};

pub const NOT_ANSWERED: &str = "Not Answered";

/// Outcome of a single question once the session is submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
  Correct,
  Incorrect,
  Unanswered,
}

/// Coarse band for the percentage shown on the results page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
  /// 80% and above.
  Excellent,
  /// 50% up to 79%.
  Fair,
  Poor,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewItem {
  pub question_id: QuestionId,
  /// 1-based position in the bank.
  pub number: usize,
  pub question_text: String,
  pub verdict: Verdict,
  pub your_answer: String,
  pub correct_answer: String,
}

/// Number of questions whose recorded answer equals the correct index.
pub fn score(questions: &[Question], answers: &UserAnswers) -> usize {
  questions
    .iter()
    .filter(|q| classify(q, answers) == Verdict::Correct)
    .count()
}

pub fn classify(question: &Question, answers: &UserAnswers) -> Verdict {
  match answers.get(&question.id) {
    None => Verdict::Unanswered,
    Some(&idx) if idx == question.correct_answer_index => Verdict::Correct,
    Some(_) => Verdict::Incorrect,
  }
}

/// `round(score / total * 100)` with halves rounded up. An empty quiz scores 0%.
pub fn percentage(score: usize, total: usize) -> u32 {
  if total == 0 {
    return 0;
  }
  let pct = (score * 200 + total) / (total * 2);
  u32::try_from(pct).unwrap_or(u32::MAX)
}

pub fn grade(percentage: u32) -> Grade {
  if percentage >= 80 {
    Grade::Excellent
  } else if percentage >= 50 {
    Grade::Fair
  } else {
    Grade::Poor
  }
}

pub fn review(questions: &[Question], answers: &UserAnswers) -> Vec<ReviewItem> {
  questions
    .iter()
    .enumerate()
    .map(|(i, q)| {
      let your_answer = answers
        .get(&q.id)
        .and_then(|&idx| q.option(idx))
        .unwrap_or(NOT_ANSWERED)
        .to_string();
      ReviewItem {
        question_id: q.id,
        number: i + 1,
        question_text: q.question_text.clone(),
        verdict: classify(q, answers),
        your_answer,
        correct_answer: q.correct_option().unwrap_or_default().to_string(),
      }
    })
    .collect()
}
