//! Timed multiple-choice quiz backend.
//!
//! - Quiz session core: answers, countdown auto-submit, scoring, restart
//! - Axum HTTP + WebSocket API
//! - Static single-page client fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   STATIC_DIR          : directory of the page client (default "./static")
//!   QUIZ_CONFIG_PATH    : path to TOML config (title, duration, question bank)
//!   QUIZ_DURATION_SECS  : overrides the configured duration
//!                         (the config file also sets session_ttl_seconds for HTTP sessions)
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod error;
mod config;
mod seeds;
mod session;
mod scoring;
mod countdown;
mod controller;
mod state;
mod reaper;
mod protocol;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::reaper::{spawn_session_reaper, REAP_INTERVAL};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Question bank, duration and the (initially empty) session registry.
  let state = Arc::new(AppState::new());

  // Sweep submitted HTTP sessions that nobody has touched for the configured TTL.
  let cancel = CancellationToken::new();
  let reaper = spawn_session_reaper(state.clone(), REAP_INTERVAL, cancel.clone());

  let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "./static".into());
  let app = build_router(state.clone(), &static_dir);

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "quiz_backend", %addr, %static_dir, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  cancel.cancel();
  if let Err(e) = reaper.await {
    warn!(target: "quiz_backend", error = %e, "Session reaper did not stop cleanly");
  }

  let live = state.session_count().await;
  info!(target: "quiz_backend", live_sessions = live, "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(target: "quiz_backend", error = %e, "Failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  info!(target: "quiz_backend", "Shutdown requested");
}
