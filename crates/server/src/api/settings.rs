//! Notification-setting CRUD endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gempa_core::NotificationSetting;

use crate::state::AppState;

use super::{bad_request, ErrorResponse};

#[derive(Deserialize)]
pub struct CreateSettingRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_km: Option<f64>,
    pub min_intensity_level: Option<i32>,
    pub notification_enabled: Option<bool>,
    pub sound_enabled: Option<bool>,
}

#[derive(Serialize)]
pub struct CreateSettingResponse {
    pub success: bool,
    pub message: String,
    pub data: NotificationSetting,
}

/// POST /api/notification-settings: create an alert subscription.
pub async fn create_setting(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateSettingRequest>,
) -> Result<(StatusCode, Json<CreateSettingResponse>), (StatusCode, Json<ErrorResponse>)> {
    let (latitude, longitude, radius_km) =
        match (body.latitude, body.longitude, body.radius_km) {
            (Some(lat), Some(lon), Some(radius)) => (lat, lon, radius),
            _ => return Err(bad_request("Data tidak lengkap")),
        };

    if !(5.0..=500.0).contains(&radius_km) {
        return Err(bad_request("Radius harus antara 5-500 km"));
    }

    let min_intensity_level = body.min_intensity_level.unwrap_or(1);
    if !(1..=9).contains(&min_intensity_level) {
        return Err(bad_request("Intensitas minimum harus 1-9"));
    }

    let setting = NotificationSetting {
        id: Uuid::new_v4().to_string(),
        latitude,
        longitude,
        radius_km,
        min_intensity_level,
        notification_enabled: body.notification_enabled.unwrap_or(true),
        sound_enabled: body.sound_enabled.unwrap_or(true),
        created_at: Utc::now(),
    };

    state.store.insert_setting(&setting).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to save notification setting");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Terjadi kesalahan pada server".to_string(),
            }),
        )
    })?;

    tracing::info!(setting_id = %setting.id, "Notification setting created");

    Ok((
        StatusCode::CREATED,
        Json(CreateSettingResponse {
            success: true,
            message: "Pengaturan notifikasi berhasil disimpan".to_string(),
            data: setting,
        }),
    ))
}

#[derive(Serialize)]
pub struct SettingsData {
    pub settings: Vec<NotificationSetting>,
    pub total: usize,
}

#[derive(Serialize)]
pub struct ListSettingsResponse {
    pub success: bool,
    pub data: SettingsData,
}

/// GET /api/notification-settings: list alert subscriptions.
pub async fn list_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListSettingsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let settings = state.store.list_settings().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to list notification settings");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Terjadi kesalahan pada server".to_string(),
            }),
        )
    })?;

    Ok(Json(ListSettingsResponse {
        success: true,
        data: SettingsData {
            total: settings.len(),
            settings,
        },
    }))
}

/// DELETE /api/notification-settings/{id}
pub async fn delete_setting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    match state.store.delete_setting(&id).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete notification setting");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
