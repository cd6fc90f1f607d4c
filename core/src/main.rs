//! Restaurant operations core — binary entry point.
//!
//! Loads `.env`, initializes logging, opens the database pool (running
//! migrations), and serves a minimal health endpoint. Request routing for
//! the actual order/session/settlement/assignment operations is a
//! presentation-layer concern this crate does not own (§1) — other
//! services in this stack mount these engines behind their own API
//! surface and talk to Postgres directly for reads.

use axum::{routing::get, Json, Router};
use restaurant_core::{AppState, Config};
use serde_json::json;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    restaurant_core::logging::init_logger(&log_level);

    tracing::info!("restaurant operations core starting");

    let config = Config::from_env();
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::initialize(config).await?);

    let app = Router::new()
        .route("/healthz", get(health))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "listening");

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown signal received");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

async fn health(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
) -> Json<serde_json::Value> {
    let db_ok = sqlx::query("SELECT 1").execute(&state.db.pool).await.is_ok();
    Json(json!({ "status": if db_ok { "ok" } else { "degraded" } }))
}
