//! Zadachnik · Math Quiz Trainer Backend
//!
//! - Axum HTTP + WebSocket API
//! - In-memory problem bank (built-in seeds + optional TOML bank)
//! - Tolerance-aware answer checking with adaptive difficulty
//!
//! Important env variables:
//!   PORT          : u16 (default 3000)
//!   QUIZ_CONFIG_PATH : path to TOML config (tolerances + optional problem bank)
//!   LOG_LEVEL     : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT    : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod checker;
mod seeds;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (problem bank, tolerances, progress).
  let state = Arc::new(AppState::new());

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "zadachnik_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
