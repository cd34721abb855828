//! Domain-focused API endpoint modules.
//!
//! Each sub-module owns a single responsibility area. Shared response
//! types and the route table live here in mod.rs.

mod feed;
mod health;
mod map;
mod reports;
mod settings;

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

// ── Shared types ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) fn bad_request(
    message: &str,
) -> (axum::http::StatusCode, axum::Json<ErrorResponse>) {
    (
        axum::http::StatusCode::BAD_REQUEST,
        axum::Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

// ── Route table ──────────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/stats", get(health::stats))
        .route("/api/reports", post(reports::create_report))
        .route("/api/reports", get(reports::list_reports))
        .route("/api/notification-settings", post(settings::create_setting))
        .route("/api/notification-settings", get(settings::list_settings))
        .route(
            "/api/notification-settings/{id}",
            delete(settings::delete_setting),
        )
        .route("/api/earthquakes/latest", get(feed::latest))
        .route("/api/earthquakes/history", get(feed::history))
        .route("/api/earthquakes/felt", get(feed::felt))
        .route("/api/earthquake-map", get(map::earthquake_map))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Test scaffolding ─────────────────────────────────────────────
