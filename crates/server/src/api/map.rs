//! Static map URL endpoint for earthquake visualization.
//!
//! Computes the OpenStreetMap slippy tile covering the midpoint of the
//! epicenter and (optionally) the user's location. Pure computation; no
//! outbound request is made.

use serde::{Deserialize, Serialize};

use axum::extract::Query;
use axum::http::StatusCode;
use axum::Json;

use super::{bad_request, ErrorResponse};

const MAP_ZOOM: u32 = 6;

#[derive(Deserialize)]
pub struct MapParams {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub user_lat: Option<f64>,
    pub user_lon: Option<f64>,
}

#[derive(Serialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Serialize)]
pub struct MapResponse {
    pub url: String,
    pub earthquake: Point,
    pub user: Option<Point>,
}

/// GET /api/earthquake-map
pub async fn earthquake_map(
    Query(params): Query<MapParams>,
) -> Result<Json<MapResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (eq_lat, eq_lon) = match (params.lat, params.lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => return Err(bad_request("Missing required parameters: lat, lon")),
    };

    if !eq_lat.is_finite() || !eq_lon.is_finite() {
        return Err(bad_request("Invalid coordinate values"));
    }

    let user = match (params.user_lat, params.user_lon) {
        (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
            Some(Point { lat, lon })
        }
        _ => None,
    };

    // Center between epicenter and user when both are known.
    let (center_lat, center_lon) = match &user {
        Some(u) => ((eq_lat + u.lat) / 2.0, (eq_lon + u.lon) / 2.0),
        None => (eq_lat, eq_lon),
    };

    let (xtile, ytile) = slippy_tile(center_lat, center_lon, MAP_ZOOM);
    let url = format!("https://tile.openstreetmap.org/{MAP_ZOOM}/{xtile}/{ytile}.png");

    Ok(Json(MapResponse {
        url,
        earthquake: Point {
            lat: eq_lat,
            lon: eq_lon,
        },
        user,
    }))
}

/// Slippy-map tile coordinates for a point at a given zoom.
fn slippy_tile(lat: f64, lon: f64, zoom: u32) -> (i64, i64) {
    let n = 2f64.powi(zoom as i32);
    let xtile = ((lon + 180.0) / 360.0 * n).floor() as i64;

    let lat_rad = lat.to_radians();
    let ytile = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI)
        / 2.0
        * n)
        .floor() as i64;

    (xtile, ytile)
}
