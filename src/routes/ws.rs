//! WebSocket upgrade + message loop. Each connection owns exactly one quiz session:
//! it is started on connect and dropped (countdown included) on disconnect.
//! Client messages get a reply; countdown ticks are pushed as they happen.

use std::fmt::Display;
use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tracing::{info, error, instrument, debug};

use crate::controller::QuizController;
use crate::protocol::{quiz_out, session_out, ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "quiz_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn handle_ws(socket: WebSocket, state: Arc<AppState>) {
  let controller = state.open_session();
  let (outgoing, incoming) = socket.split();
  run_session(incoming, outgoing, state, controller).await;
}

fn encode(msg: &ServerWsMessage) -> Message {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  });
  Message::Text(out)
}

/// Drive one connection until the peer leaves or the socket fails.
/// The controller is dropped on return, which stops its countdown.
#[instrument(level = "info", skip_all, fields(session = %controller.id()))]
async fn run_session<R, W>(incoming: R, outgoing: W, state: Arc<AppState>, controller: QuizController)
where
  R: Stream<Item = Result<Message, axum::Error>>,
  W: Sink<Message>,
  W::Error: Display,
{
  tokio::pin!(incoming, outgoing);
  let id = controller.id();
  let mut updates = controller.subscribe();
  info!(target: "quiz_backend", %id, "WebSocket connected");

  let session = session_out(id, &updates.borrow_and_update());
  let hello = [
    ServerWsMessage::Quiz { quiz: quiz_out(&state) },
    ServerWsMessage::Session { session },
  ];
  for msg in &hello {
    if let Err(e) = outgoing.send(encode(msg)).await {
      error!(target: "quiz_backend", %id, error = %e, "WS send error");
      return;
    }
  }

  loop {
    let reply = tokio::select! {
      frame = incoming.next() => match frame {
        Some(Ok(Message::Text(txt))) => match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(msg) => {
            debug!(target: "quiz_backend", %id, "WS received: {:?}", &msg);
            match handle_client_ws(msg, &controller).await {
              Some(reply) => reply,
              // Marks the change just made as seen so it is not pushed a second time.
              None => {
                let session = session_out(id, &updates.borrow_and_update());
                ServerWsMessage::Session { session }
              }
            }
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        },
        Some(Ok(Message::Ping(payload))) => {
          let _ = outgoing.send(Message::Pong(payload)).await;
          continue;
        }
        Some(Ok(Message::Close(_))) | None => break,
        Some(Ok(_)) => continue,
        Some(Err(e)) => {
          error!(target: "quiz_backend", %id, error = %e, "WS receive error");
          break;
        }
      },
      changed = updates.changed() => {
        if changed.is_err() {
          break;
        }
        let session = session_out(id, &updates.borrow_and_update());
        ServerWsMessage::Session { session }
      }
    };

    if let Err(e) = outgoing.send(encode(&reply)).await {
      error!(target: "quiz_backend", %id, error = %e, "WS send error");
      break;
    }
  }

  drop(controller);
  info!(target: "quiz_backend", %id, "WebSocket disconnected; session released");
}

/// Apply one client message. `Some` is a direct reply; `None` means answer with
/// the current session view.
#[instrument(level = "info", skip(controller), fields(session = %controller.id()))]
async fn handle_client_ws(msg: ClientWsMessage, controller: &QuizController) -> Option<ServerWsMessage> {
  match msg {
    ClientWsMessage::Ping => return Some(ServerWsMessage::Pong),

    ClientWsMessage::State => {}

    ClientWsMessage::SelectAnswer { question_id, option_index } => {
      if let Err(e) = controller.select_answer(question_id, option_index).await {
        return Some(ServerWsMessage::Error { message: e.to_string() });
      }
    }

    ClientWsMessage::Submit => {
      let first = controller.submit().await;
      info!(target: "session", id = %controller.id(), %first, "WS submit");
    }

    ClientWsMessage::Restart => controller.restart().await,
  }
  None
}
