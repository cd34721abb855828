//! Health and operational stats endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use serde::Serialize;

use gempa_compute::cluster_reports;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub store_backend: &'static str,
    pub alert_channels: usize,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        store_backend: state.store.backend_name(),
        alert_channels: state.dispatcher.channel_count(),
    })
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub report_count: u64,
    pub window_report_count: usize,
    pub cluster_count: usize,
    pub verified_cluster_count: usize,
    pub setting_count: usize,
    pub radius_km: f64,
    pub lookback_hours: u64,
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let report_count = state.store.report_count().await.unwrap_or(0);
    let setting_count = state
        .store
        .list_settings()
        .await
        .map(|s| s.len())
        .unwrap_or(0);

    let cutoff = Utc::now() - Duration::hours(state.config.clustering.lookback_hours as i64);
    let window = state.store.reports_since(cutoff).await.unwrap_or_default();
    let clusters = cluster_reports(&window, state.config.clustering.radius_km);

    Json(StatsResponse {
        report_count,
        window_report_count: window.len(),
        verified_cluster_count: clusters.iter().filter(|c| c.is_verified).count(),
        cluster_count: clusters.len(),
        setting_count,
        radius_km: state.config.clustering.radius_km,
        lookback_hours: state.config.clustering.lookback_hours,
    })
}
