//! Felt-report submission and clustered listing endpoints.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use gempa_compute::cluster_reports;
use gempa_core::{Cluster, Report};

use crate::state::AppState;

use super::{bad_request, ErrorResponse};

#[derive(Deserialize)]
pub struct CreateReportRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub intensity_level: Option<i32>,
    pub description: Option<String>,
    pub location_name: Option<String>,
}

#[derive(Serialize)]
pub struct CreateReportResponse {
    pub success: bool,
    pub message: String,
    pub data: Report,
}

/// POST /api/reports: save a felt-it report.
///
/// The 1–9 intensity range is enforced here, not in the clustering
/// engine.
pub async fn create_report(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateReportRequest>,
) -> Result<(StatusCode, Json<CreateReportResponse>), (StatusCode, Json<ErrorResponse>)> {
    let (latitude, longitude, intensity_level, location_name) = match (
        body.latitude,
        body.longitude,
        body.intensity_level,
        body.location_name,
    ) {
        (Some(lat), Some(lon), Some(level), Some(name)) if !name.is_empty() => {
            (lat, lon, level, name)
        }
        _ => return Err(bad_request("Data tidak lengkap")),
    };

    if !(1..=9).contains(&intensity_level) {
        return Err(bad_request("Tingkat intensitas harus 1-9"));
    }

    let report = Report::new(
        latitude,
        longitude,
        intensity_level,
        body.description.filter(|d| !d.is_empty()),
        location_name,
    );

    state
        .store
        .insert_report(&report)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to save report");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Terjadi kesalahan pada server".to_string(),
                }),
            )
        })?;

    tracing::info!(report_id = %report.id, "Report saved");

    Ok((
        StatusCode::CREATED,
        Json(CreateReportResponse {
            success: true,
            message: "Laporan gempa berhasil disimpan".to_string(),
            data: report,
        }),
    ))
}

#[derive(Deserialize)]
pub struct ListReportsParams {
    /// Clustering radius in km (default from config, typically 50).
    pub radius: Option<f64>,
    /// Lookback window in hours (default from config, typically 24).
    pub hours: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportsData {
    pub reports: Vec<Report>,
    pub clusters: Vec<Cluster>,
    pub total: usize,
    pub verified_clusters: usize,
}

#[derive(Serialize)]
pub struct ListReportsResponse {
    pub success: bool,
    pub data: ReportsData,
}

/// GET /api/reports: reports from the lookback window plus their
/// clustering. Store failures degrade to an empty window rather than an
/// error response.
pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListReportsParams>,
) -> Json<ListReportsResponse> {
    let radius_km = params.radius.unwrap_or(state.config.clustering.radius_km);
    let hours = params
        .hours
        .unwrap_or(state.config.clustering.lookback_hours as i64);
    let cutoff = Utc::now() - Duration::hours(hours);

    let reports = match state.store.reports_since(cutoff).await {
        Ok(reports) => reports,
        Err(e) => {
            tracing::warn!(error = %e, "Report fetch failed, continuing with empty window");
            Vec::new()
        }
    };

    let clusters = cluster_reports(&reports, radius_km);
    let verified_clusters = clusters.iter().filter(|c| c.is_verified).count();

    Json(ListReportsResponse {
        success: true,
        data: ReportsData {
            total: reports.len(),
            reports,
            clusters,
            verified_clusters,
        },
    })
}
