//! Built-in question bank so the quiz is usable without any external config.

use crate::domain::Question;

fn q(id: u32, text: &str, options: [&str; 4], correct: usize) -> Question {
  Question {
    id,
    question_text: text.into(),
    options: options.iter().map(|s| s.to_string()).collect(),
    correct_answer_index: correct,
  }
}

/// Default JUPEB-style mini quiz. Order is the display order.
pub fn seed_questions() -> Vec<Question> {
  vec![
    q(1, "Which of the following is a scalar quantity?",
      ["Velocity", "Force", "Speed", "Acceleration"], 2),
    q(2, "The SI unit of electric charge is the",
      ["Ampere", "Coulomb", "Volt", "Ohm"], 1),
    q(3, "What is the pH of a neutral solution at 25°C?",
      ["0", "1", "7", "14"], 2),
    q(4, "Which organelle is known as the powerhouse of the cell?",
      ["Nucleus", "Ribosome", "Golgi apparatus", "Mitochondrion"], 3),
    q(5, "If f(x) = 2x² - 3x + 1, what is f(2)?",
      ["3", "5", "7", "1"], 0),
    q(6, "Which gas is released during photosynthesis?",
      ["Carbon dioxide", "Oxygen", "Nitrogen", "Hydrogen"], 1),
    q(7, "The derivative of sin x with respect to x is",
      ["-cos x", "cos x", "tan x", "-sin x"], 1),
    q(8, "Which of these elements is a noble gas?",
      ["Argon", "Chlorine", "Sodium", "Sulphur"], 0),
    q(9, "In economics, the opportunity cost of a choice is the",
      ["Money price paid", "Total cost of production", "Next best alternative forgone", "Cost of labour"], 2),
    q(10, "The sum of the interior angles of a hexagon is",
      ["360°", "540°", "900°", "720°"], 3),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn seed_bank_is_consistent() {
    let bank = seed_questions();
    assert!(!bank.is_empty());
    let ids: HashSet<_> = bank.iter().map(|q| q.id).collect();
    assert_eq!(ids.len(), bank.len());
    for q in &bank {
      assert!(!q.options.is_empty());
      assert!(q.correct_answer_index < q.options.len(), "question {}", q.id);
    }
  }
}
