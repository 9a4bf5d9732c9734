//! Hintladder · adaptive problem-solving tutor backend
//!
//! - Classifies programming problem statements (domain, complexity, insights)
//! - Walks learners through graduated hint ladders over WebSocket
//! - Tracks per-user progress and recommendations over HTTP
//!
//! Important env variables:
//!   PORT               : u16 (default 3000)
//!   TUTOR_CONFIG_PATH  : path to TOML config ([settings] + optional [[problems]] bank)
//!   PROBLEMS_DIR       : directory of annotated solution files to ingest
//!   LOG_LEVEL          : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT         : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod tables;
mod classifier;
mod translate;
mod progress;
mod session;
mod config;
mod seeds;
mod catalog;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Tables, catalog and an empty progress store.
  let state = Arc::new(AppState::new());

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "hintladder_backend", %addr, problems = state.catalog.len(), "HTTP server listening");
  axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
  info!(target: "hintladder_backend", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(target: "hintladder_backend", error = %e, "Cannot listen for Ctrl-C; running until killed");
    std::future::pending::<()>().await;
  }
  info!(target: "hintladder_backend", "Shutdown signal received");
}
