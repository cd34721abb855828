use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Report identifier. Reports created locally get a fresh v4 UUID string;
/// reports loaded from storage keep whatever id the store assigned.
pub type ReportId = String;

/// A single user-submitted "I felt an earthquake" observation.
///
/// Immutable once read by the clustering engine. `intensity_level` is the
/// 1–9 MMI self-assessment; the submission API validates the range, the
/// engine itself does not re-check it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub latitude: f64,
    pub longitude: f64,
    pub intensity_level: i32,
    pub description: Option<String>,
    pub location_name: String,
    pub created_at: DateTime<Utc>,
}

impl Report {
    pub fn new(
        latitude: f64,
        longitude: f64,
        intensity_level: i32,
        description: Option<String>,
        location_name: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            latitude,
            longitude,
            intensity_level,
            description,
            location_name,
            created_at: Utc::now(),
        }
    }
}

/// A group of ≥3 reports within a fixed radius of a seed report, with
/// aggregate statistics. Rebuilt from scratch on every clustering call;
/// there is no cluster identity carried across calls.
///
/// Wire field names are camelCase to match the public API contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub report_count: usize,
    pub average_intensity: f64,
    pub min_intensity: i32,
    pub max_intensity: i32,
    pub reports: Vec<Report>,
    pub is_verified: bool,
}

/// Per-user alert subscription: notify when a corroborated event lands
/// within `radius_km` of the saved location at or above
/// `min_intensity_level`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSetting {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
    pub min_intensity_level: i32,
    pub notification_enabled: bool,
    pub sound_enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// An authoritative earthquake record from the BMKG TEWS feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BmkgEarthquake {
    pub id: String,
    pub earthquake_id: String,
    pub source: String,
    pub status: String,
    pub region: String,
    pub magnitude: f64,
    pub depth: f64,
    pub datetime: String,
    pub latitude: f64,
    pub longitude: f64,
}
