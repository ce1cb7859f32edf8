//! Wonderbox · Daily Puzzle Backend
//!
//! - Axum HTTP + WebSocket API
//! - Daily puzzle, practice mode, discovery box, and progression engine
//! - Optional Hugging Face inference integration (via environment variables)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT          : u16 (default 3000)
//!   HF_API_KEY    : enables remote puzzle generation if present
//!   HF_BASE_URL   : default "https://api-inference.huggingface.co/models"
//!   HF_MODEL      : default "google/flan-t5-large"
//!   WONDERBOX_CONFIG_PATH : path to TOML config (prompts + optional puzzle/fact bank)
//!   WONDERBOX_STATE_PATH  : path to the JSON state file (default: memory-only)
//!   LOG_LEVEL     : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT    : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod clock;
mod config;
mod catalog;
mod store;
mod progression;
mod selection;
mod generator;
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

  // Build shared application state (store, catalogs, generator, prompts).
  let state = Arc::new(AppState::from_env());

  // Old persisted records are wiped on schema bumps, not migrated.
  if state.store.check_and_upgrade_schema().await {
    warn!(target: "wonderbox_backend", "Persisted progress was reset by a storage schema upgrade");
  }

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "wonderbox_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
