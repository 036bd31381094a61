//! Kyozai · Teaching Material Generation Backend
//!
//! - Axum HTTP API
//! - Gemini (primary) and DeepSeek (secondary) generation backends
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT          : u16 (default 3000)
//!   GEMINI_API_KEY    : enables the Gemini backend if present
//!   GEMINI_BASE_URL    : default "https://generativelanguage.googleapis.com/v1beta"
//!   DEEPSEEK_API_KEY   : enables the DeepSeek backend if present
//!   DEEPSEEK_API_BASE_URL : default "https://api.deepseek.com/v1"
//!   MATERIAL_CONFIG_PATH  : path to TOML config (models, candidate list, limits)
//!   LOG_LEVEL    : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT      : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod sampler;
mod prompt;
mod sanitize;
mod validate;
mod providers;
mod orchestrator;
mod state;
mod protocol;
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

  // Build shared application state (config + provider adapters).
  let state = Arc::new(AppState::from_env());

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "kyozai_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
