//! BMKG feed proxy endpoints.
//!
//! The frontend talks to these instead of hitting BMKG directly; each
//! quake is annotated with the intensity estimate used for alerting.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use gempa_core::{estimate_intensity, risk_level, BmkgEarthquake, RiskLevel};

use crate::state::AppState;

const DEFAULT_FEED_LIMIT: usize = 15;

#[derive(Deserialize)]
pub struct FeedParams {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct AnnotatedQuake {
    #[serde(flatten)]
    pub quake: BmkgEarthquake,
    pub estimated_intensity: i32,
    pub risk_level: RiskLevel,
}

#[derive(Serialize)]
pub struct FeedResponse {
    pub success: bool,
    pub data: Vec<AnnotatedQuake>,
    pub total: usize,
}

fn annotate(quakes: Vec<BmkgEarthquake>) -> FeedResponse {
    let data: Vec<AnnotatedQuake> = quakes
        .into_iter()
        .map(|quake| {
            let estimated = estimate_intensity(quake.magnitude, quake.depth);
            AnnotatedQuake {
                estimated_intensity: estimated,
                risk_level: risk_level(estimated),
                quake,
            }
        })
        .collect();

    FeedResponse {
        success: true,
        total: data.len(),
        data,
    }
}

/// GET /api/earthquakes/latest
pub async fn latest(State(state): State<Arc<AppState>>) -> Json<FeedResponse> {
    Json(annotate(state.feed.latest().await))
}

/// GET /api/earthquakes/history
pub async fn history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FeedParams>,
) -> Json<FeedResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_FEED_LIMIT);
    Json(annotate(state.feed.history(limit).await))
}

/// GET /api/earthquakes/felt
pub async fn felt(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FeedParams>,
) -> Json<FeedResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_FEED_LIMIT);
    Json(annotate(state.feed.felt(limit).await))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotation_adds_intensity_estimate() {
        let quakes = vec![BmkgEarthquake {
            id: "q1".to_string(),
            earthquake_id: "q1".to_string(),
            source: "BMKG".to_string(),
            status: "confirmed".to_string(),
            region: "Jawa Barat".to_string(),
            magnitude: 5.6,
            depth: 10.0,
            datetime: "2026-08-29T01:02:03+07:00".to_string(),
            latitude: -6.2,
            longitude: 106.8,
        }];

        let response = annotate(quakes);
        assert_eq!(response.total, 1);
        // ceil(5.6 - 1) = 5, +1 for shallow depth
        assert_eq!(response.data[0].estimated_intensity, 6);
        assert_eq!(response.data[0].risk_level, RiskLevel::High);
    }
}
