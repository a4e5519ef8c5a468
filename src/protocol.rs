//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Phase, Question, QuestionId};
use crate::scoring::{self, Grade, ReviewItem, Verdict};
use crate::session::QuizSession;
use crate::state::AppState;
use crate::util::{format_clock, option_label};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    State,
    SelectAnswer {
        #[serde(rename = "questionId")]
        question_id: QuestionId,
        #[serde(rename = "optionIndex")]
        option_index: usize,
    },
    Submit,
    Restart,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Quiz { quiz: QuizOut },
    Session { session: SessionOut },
    Error { message: String },
}

/// Question as shown to the player: no correct answer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOut {
    pub id: QuestionId,
    pub number: usize,
    pub question_text: String,
    pub options: Vec<OptionOut>,
}

#[derive(Debug, Serialize)]
pub struct OptionOut {
    pub index: usize,
    pub label: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOut {
    pub title: String,
    pub duration_seconds: u32,
    pub questions: Vec<QuestionOut>,
}

pub fn question_out(number: usize, q: &Question) -> QuestionOut {
    QuestionOut {
        id: q.id,
        number,
        question_text: q.question_text.clone(),
        options: q
            .options
            .iter()
            .enumerate()
            .map(|(index, text)| OptionOut {
                index,
                label: option_label(index),
                text: text.clone(),
            })
            .collect(),
    }
}

pub fn quiz_out(state: &AppState) -> QuizOut {
    QuizOut {
        title: state.title.clone(),
        duration_seconds: state.duration_seconds,
        questions: state
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| question_out(i + 1, q))
            .collect(),
    }
}

/// Everything the page needs to render one session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOut {
    pub id: Uuid,
    pub phase: Phase,
    pub answers: BTreeMap<QuestionId, usize>,
    pub answered_count: usize,
    pub total_questions: usize,
    pub duration_seconds: u32,
    pub remaining_seconds: u32,
    pub clock: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<ResultsOut>,
}

#[derive(Debug, Serialize)]
pub struct ResultsOut {
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub grade: Grade,
    pub review: Vec<ReviewOut>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOut {
    pub question_id: QuestionId,
    pub number: usize,
    pub question_text: String,
    pub verdict: Verdict,
    pub your_answer: String,
    pub correct_answer: String,
}

impl From<ReviewItem> for ReviewOut {
    fn from(r: ReviewItem) -> Self {
        Self {
            question_id: r.question_id,
            number: r.number,
            question_text: r.question_text,
            verdict: r.verdict,
            your_answer: r.your_answer,
            correct_answer: r.correct_answer,
        }
    }
}

/// Build the render view. Results are derived here, only once submitted.
pub fn session_out(id: Uuid, s: &QuizSession) -> SessionOut {
    let total = s.questions().len();
    let results = s.is_submitted().then(|| {
        let score = scoring::score(s.questions(), s.answers());
        let percentage = scoring::percentage(score, total);
        ResultsOut {
            score,
            total,
            percentage,
            grade: scoring::grade(percentage),
            review: scoring::review(s.questions(), s.answers())
                .into_iter()
                .map(ReviewOut::from)
                .collect(),
        }
    });

    SessionOut {
        id,
        phase: s.phase(),
        answers: s.answers().clone(),
        answered_count: s.answered_count(),
        total_questions: total,
        duration_seconds: s.initial_seconds(),
        remaining_seconds: s.remaining_seconds(),
        clock: format_clock(s.remaining_seconds()),
        results,
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerIn {
    pub question_id: QuestionId,
    pub option_index: usize,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SubmitOrigin;
    use serde_json::json;
    use std::sync::Arc;

    fn three() -> Arc<[Question]> {
        (1..=3)
            .map(|id| Question {
                id,
                question_text: format!("Q{id}"),
                options: vec!["zero".into(), "one".into(), "two".into()],
                correct_answer_index: (id - 1) as usize,
            })
            .collect()
    }

    #[test]
    fn client_messages_parse() {
        let m: ClientWsMessage =
            serde_json::from_str(r#"{"type":"select_answer","questionId":2,"optionIndex":1}"#).unwrap();
        assert!(matches!(m, ClientWsMessage::SelectAnswer { question_id: 2, option_index: 1 }));
        let m: ClientWsMessage = serde_json::from_str(r#"{"type":"submit"}"#).unwrap();
        assert!(matches!(m, ClientWsMessage::Submit));
        assert!(serde_json::from_str::<ClientWsMessage>(r#"{"type":"select_answer"}"#).is_err());
    }

    #[test]
    fn in_progress_view_has_no_results() {
        let mut s = QuizSession::new(three(), 1800);
        s.select_answer(1, 0).unwrap();
        let v = serde_json::to_value(session_out(Uuid::nil(), &s)).unwrap();
        assert_eq!(v["phase"], "in_progress");
        assert_eq!(v["answeredCount"], 1);
        assert_eq!(v["totalQuestions"], 3);
        assert_eq!(v["clock"], "30:00");
        assert_eq!(v["answers"], json!({"1": 0}));
        assert!(v.get("results").is_none());
    }

    #[test]
    fn submitted_view_carries_score_and_review() {
        let mut s = QuizSession::new(three(), 60);
        s.select_answer(1, 0).unwrap();
        s.select_answer(3, 2).unwrap();
        s.select_answer(2, 0).unwrap();
        s.submit(SubmitOrigin::Manual);

        let out = session_out(Uuid::nil(), &s);
        let r = out.results.as_ref().unwrap();
        assert_eq!(r.score, 2);
        assert_eq!(r.percentage, 67);
        assert_eq!(r.grade, Grade::Fair);
        assert_eq!(r.review[1].verdict, Verdict::Incorrect);
        assert_eq!(r.review[1].your_answer, "zero");
        assert_eq!(r.review[1].correct_answer, "one");

        let v = serde_json::to_value(&out).unwrap();
        assert_eq!(v["results"]["review"][0]["verdict"], "correct");
        assert_eq!(v["results"]["grade"], "fair");
    }

    #[test]
    fn quiz_view_hides_correct_answers() {
        let state = AppState {
            title: "T".into(),
            duration_seconds: 10,
            session_ttl: std::time::Duration::from_secs(60),
            questions: three(),
            sessions: Default::default(),
        };
        let v = serde_json::to_value(quiz_out(&state)).unwrap();
        assert_eq!(v["questions"][0]["options"][1], json!({"index": 1, "label": "b", "text": "one"}));
        assert!(!v.to_string().contains("correct"));
    }
}
