//! Loading quiz configuration (title, duration, optional question bank) from TOML.
//!
//! Schema (all keys optional):
//!
//! ```toml
//! title = "JUPEB QUESTIONS MINI QUIZ"
//! duration_seconds = 1800
//! session_ttl_seconds = 600
//!
//! [[questions]]
//! id = 1
//! question_text = "Which of the following is a scalar quantity?"
//! options = ["Velocity", "Force", "Speed", "Acceleration"]
//! correct_answer_index = 2
//! ```

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::domain::Question;
use crate::seeds::seed_questions;

pub const DEFAULT_TITLE: &str = "JUPEB QUESTIONS MINI QUIZ";
pub const DEFAULT_DURATION_SECS: u32 = 30 * 60;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 10 * 60;

#[derive(Clone, Debug, Deserialize)]
pub struct QuizConfig {
  #[serde(default = "default_title")]
  pub title: String,
  #[serde(default = "default_duration")]
  pub duration_seconds: u32,
  /// How long a submitted HTTP session is kept after its last request.
  #[serde(default = "default_session_ttl")]
  pub session_ttl_seconds: u64,
  #[serde(default)]
  pub questions: Vec<Question>,
}

fn default_title() -> String { DEFAULT_TITLE.into() }
fn default_duration() -> u32 { DEFAULT_DURATION_SECS }
fn default_session_ttl() -> u64 { DEFAULT_SESSION_TTL_SECS }

impl Default for QuizConfig {
  fn default() -> Self {
    Self {
      title: default_title(),
      duration_seconds: default_duration(),
      session_ttl_seconds: default_session_ttl(),
      questions: Vec::new(),
    }
  }
}

impl QuizConfig {
  /// Final question bank: configured entries that pass basic checks, or the
  /// built-in seeds when none are configured (or none survive).
  pub fn question_bank(&self) -> Vec<Question> {
    let mut seen = HashSet::new();
    let mut bank = Vec::with_capacity(self.questions.len());
    for q in &self.questions {
      if q.options.is_empty() {
        error!(target: "quiz_backend", id = q.id, "Skipping bank item: no options.");
        continue;
      }
      if q.correct_answer_index >= q.options.len() {
        error!(target: "quiz_backend", id = q.id, correct = q.correct_answer_index, options = q.options.len(), "Skipping bank item: correct answer out of range.");
        continue;
      }
      if !seen.insert(q.id) {
        error!(target: "quiz_backend", id = q.id, "Skipping bank item: duplicate id.");
        continue;
      }
      bank.push(q.clone());
    }

    if bank.is_empty() {
      if !self.questions.is_empty() {
        warn!(target: "quiz_backend", "No usable configured questions; falling back to built-in bank");
      }
      return seed_questions();
    }
    bank
  }
}

pub fn parse_config(s: &str) -> Result<QuizConfig, toml::de::Error> {
  toml::from_str::<QuizConfig>(s)
}

/// Attempt to load `QuizConfig` from QUIZ_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_quiz_config_from_env() -> Option<QuizConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "quiz_backend", %path, questions = cfg.questions.len(), "Loaded quiz config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "quiz_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "quiz_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

/// Config file (or defaults) with the QUIZ_DURATION_SECS override applied.
pub fn load_config() -> QuizConfig {
  let mut cfg = load_quiz_config_from_env().unwrap_or_default();
  if let Ok(raw) = std::env::var("QUIZ_DURATION_SECS") {
    match raw.parse::<u32>() {
      Ok(secs) => cfg.duration_seconds = secs,
      Err(e) => warn!(target: "quiz_backend", value = %raw, error = %e, "Ignoring invalid QUIZ_DURATION_SECS"),
    }
  }
  cfg
}
