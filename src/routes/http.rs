//! HTTP endpoint handlers. These are thin wrappers that forward to the session controller.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::QuizError;
use crate::protocol::*;
use crate::state::AppState;

impl IntoResponse for QuizError {
  fn into_response(self) -> Response {
    let status = match self {
      QuizError::UnknownSession(_) | QuizError::UnknownQuestion(_) => StatusCode::NOT_FOUND,
      QuizError::OptionOutOfRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, Json(ErrorOut { error: self.to_string() })).into_response()
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_quiz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(quiz_out(&state))
}

#[instrument(level = "info", skip(state))]
pub async fn http_create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let c = state.create_session().await;
  info!(target: "session", id = %c.id(), "HTTP session created");
  (StatusCode::CREATED, Json(session_out(c.id(), &c.snapshot().await)))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
) -> Result<Json<SessionOut>, QuizError> {
  let c = state.get_session(id).await?;
  Ok(Json(session_out(id, &c.snapshot().await)))
}

#[instrument(level = "info", skip(state, body), fields(%id, question_id = body.question_id, option_index = body.option_index))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<SessionOut>, QuizError> {
  let c = state.get_session(id).await?;
  c.select_answer(body.question_id, body.option_index).await?;
  Ok(Json(session_out(id, &c.snapshot().await)))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_post_submit(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
) -> Result<Json<SessionOut>, QuizError> {
  let c = state.get_session(id).await?;
  let first = c.submit().await;
  let view = session_out(id, &c.snapshot().await);
  info!(target: "session", %id, %first, score = ?view.results.as_ref().map(|r| r.score), "HTTP submit");
  Ok(Json(view))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_post_restart(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
) -> Result<Json<SessionOut>, QuizError> {
  let c = state.get_session(id).await?;
  c.restart().await;
  Ok(Json(session_out(id, &c.snapshot().await)))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_delete_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, QuizError> {
  state.remove_session(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::QuizConfig;
  use crate::routes::build_router;
  use axum::body::Body;
  use axum::http::{Method, Request};
  use serde_json::{json, Value};
  use tower::ServiceExt;

  fn app() -> (Arc<AppState>, axum::Router) {
    let state = Arc::new(AppState::from_config(QuizConfig::default()));
    let router = build_router(Arc::clone(&state), "./static");
    (state, router)
  }

  async fn call(router: &axum::Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let req = Request::builder().method(method).uri(uri);
    let req = match body {
      Some(b) => req
        .header("content-type", "application/json")
        .body(Body::from(b.to_string()))
        .unwrap(),
      None => req.body(Body::empty()).unwrap(),
    };
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
  }

  #[tokio::test]
  async fn health_and_quiz() {
    let (_, router) = app();
    let (status, body) = call(&router, Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    let (status, body) = call(&router, Method::GET, "/api/v1/quiz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "JUPEB QUESTIONS MINI QUIZ");
    assert_eq!(body["durationSeconds"], 1800);
  }

  #[tokio::test]
  async fn session_lifecycle_over_http() {
    let (state, router) = app();
    let (status, created) = call(&router, Method::POST, "/api/v1/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["phase"], "in_progress");
    let id = created["id"].as_str().unwrap().to_string();
    let q1 = state.questions[0].id;
    let right = state.questions[0].correct_answer_index;

    let uri = format!("/api/v1/sessions/{id}/answers");
    let (status, body) = call(&router, Method::POST, &uri, Some(json!({"questionId": q1, "optionIndex": right}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answeredCount"], 1);

    let len = state.questions[0].options.len();
    let (status, body) = call(&router, Method::POST, &uri, Some(json!({"questionId": q1, "optionIndex": len}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("out of range"));

    let (status, body) = call(&router, Method::POST, &uri, Some(json!({"questionId": 9999, "optionIndex": 0}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("unknown question"));

    let submit = format!("/api/v1/sessions/{id}/submit");
    let (status, body) = call(&router, Method::POST, &submit, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "submitted");
    assert_eq!(body["results"]["score"], 1);
    let (_, again) = call(&router, Method::POST, &submit, None).await;
    assert_eq!(again["results"], body["results"]);

    let (_, body) = call(&router, Method::POST, &format!("/api/v1/sessions/{id}/restart"), None).await;
    assert_eq!(body["phase"], "in_progress");
    assert_eq!(body["answeredCount"], 0);
    assert_eq!(body["remainingSeconds"], 1800);

    let (status, _) = call(&router, Method::DELETE, &format!("/api/v1/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&router, Method::GET, &format!("/api/v1/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
