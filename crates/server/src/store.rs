//! Report and notification-setting persistence.
//!
//! Two backends: Postgres (when PG_URL is configured) and a bounded
//! in-memory ring used as a graceful fallback, mirroring the submission
//! API's behavior when no database is reachable. Time-window filtering
//! happens here; the clustering engine never filters by recency itself.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, Row};
use tokio::sync::RwLock;

use gempa_core::{GempaError, NotificationSetting, Report};

#[async_trait::async_trait]
pub trait ReportStore: Send + Sync {
    /// Backend name for health/stats output.
    fn backend_name(&self) -> &'static str;

    async fn insert_report(&self, report: &Report) -> Result<(), GempaError>;

    /// Reports created at or after `cutoff`, newest first.
    async fn reports_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Report>, GempaError>;

    async fn report_count(&self) -> Result<u64, GempaError>;

    async fn insert_setting(&self, setting: &NotificationSetting) -> Result<(), GempaError>;

    async fn list_settings(&self) -> Result<Vec<NotificationSetting>, GempaError>;

    /// Returns true when a setting was deleted, false when the id was
    /// unknown.
    async fn delete_setting(&self, id: &str) -> Result<bool, GempaError>;
}

// ── In-memory backend ────────────────────────────────────────────

/// Upper bound on retained reports when running without Postgres.
const MEMORY_REPORT_CAPACITY: usize = 10_000;

/// Reports older than this are dropped from the ring on insert.
const MEMORY_RETENTION_HOURS: i64 = 24;

/// Bounded ring of recent reports. Inserts evict entries that fell out
/// of the retention window and, past capacity, the oldest entries.
pub struct MemoryStore {
    capacity: usize,
    reports: RwLock<VecDeque<Report>>,
    settings: RwLock<Vec<NotificationSetting>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_capacity(MEMORY_REPORT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            reports: RwLock::new(VecDeque::new()),
            settings: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ReportStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn insert_report(&self, report: &Report) -> Result<(), GempaError> {
        let horizon = Utc::now() - Duration::hours(MEMORY_RETENTION_HOURS);
        let mut reports = self.reports.write().await;
        reports.retain(|r| r.created_at >= horizon);
        reports.push_back(report.clone());
        while reports.len() > self.capacity {
            reports.pop_front();
        }
        Ok(())
    }

    async fn reports_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Report>, GempaError> {
        let reports = self.reports.read().await;
        let mut window: Vec<Report> = reports
            .iter()
            .filter(|r| r.created_at >= cutoff)
            .cloned()
            .collect();
        window.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(window)
    }

    async fn report_count(&self) -> Result<u64, GempaError> {
        Ok(self.reports.read().await.len() as u64)
    }

    async fn insert_setting(&self, setting: &NotificationSetting) -> Result<(), GempaError> {
        self.settings.write().await.push(setting.clone());
        Ok(())
    }

    async fn list_settings(&self) -> Result<Vec<NotificationSetting>, GempaError> {
        Ok(self.settings.read().await.clone())
    }

    async fn delete_setting(&self, id: &str) -> Result<bool, GempaError> {
        let mut settings = self.settings.write().await;
        let before = settings.len();
        settings.retain(|s| s.id != id);
        Ok(settings.len() < before)
    }
}

// ── Postgres backend ─────────────────────────────────────────────

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn store_err(e: sqlx::Error) -> GempaError {
    GempaError::Store(e.to_string())
}

#[async_trait::async_trait]
impl ReportStore for PgStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn insert_report(&self, report: &Report) -> Result<(), GempaError> {
        sqlx::query(
            "INSERT INTO earthquake_reports \
             (id, latitude, longitude, intensity_level, description, location_name, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&report.id)
        .bind(report.latitude)
        .bind(report.longitude)
        .bind(report.intensity_level)
        .bind(&report.description)
        .bind(&report.location_name)
        .bind(report.created_at)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn reports_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Report>, GempaError> {
        let rows = sqlx::query(
            "SELECT id, latitude, longitude, intensity_level, description, location_name, created_at \
             FROM earthquake_reports WHERE created_at >= $1 ORDER BY created_at DESC",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(rows
            .into_iter()
            .map(|row| Report {
                id: row.get("id"),
                latitude: row.get("latitude"),
                longitude: row.get("longitude"),
                intensity_level: row.get("intensity_level"),
                description: row.get("description"),
                location_name: row.get("location_name"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn report_count(&self) -> Result<u64, GempaError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM earthquake_reports")
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)?;
        let n: i64 = row.get("n");
        Ok(n as u64)
    }

    async fn insert_setting(&self, setting: &NotificationSetting) -> Result<(), GempaError> {
        sqlx::query(
            "INSERT INTO notification_settings \
             (id, latitude, longitude, radius_km, min_intensity_level, \
              notification_enabled, sound_enabled, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&setting.id)
        .bind(setting.latitude)
        .bind(setting.longitude)
        .bind(setting.radius_km)
        .bind(setting.min_intensity_level)
        .bind(setting.notification_enabled)
        .bind(setting.sound_enabled)
        .bind(setting.created_at)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn list_settings(&self) -> Result<Vec<NotificationSetting>, GempaError> {
        let rows = sqlx::query(
            "SELECT id, latitude, longitude, radius_km, min_intensity_level, \
                    notification_enabled, sound_enabled, created_at \
             FROM notification_settings ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(rows
            .into_iter()
            .map(|row| NotificationSetting {
                id: row.get("id"),
                latitude: row.get("latitude"),
                longitude: row.get("longitude"),
                radius_km: row.get("radius_km"),
                min_intensity_level: row.get("min_intensity_level"),
                notification_enabled: row.get("notification_enabled"),
                sound_enabled: row.get("sound_enabled"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn delete_setting(&self, id: &str) -> Result<bool, GempaError> {
        let result = sqlx::query("DELETE FROM notification_settings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn report_at(id: &str, hours_ago: i64) -> Report {
        Report {
            id: id.to_string(),
            latitude: -6.2,
            longitude: 106.8,
            intensity_level: 4,
            description: None,
            location_name: "Jakarta".to_string(),
            created_at: Utc::now() - Duration::hours(hours_ago),
        }
    }

    #[tokio::test]
    async fn memory_store_filters_by_cutoff_and_sorts_newest_first() {
        let store = MemoryStore::new();
        store.insert_report(&report_at("old", 10)).await.unwrap();
        store.insert_report(&report_at("recent", 2)).await.unwrap();
        store.insert_report(&report_at("newest", 1)).await.unwrap();

        let cutoff = Utc::now() - Duration::hours(4);
        let window = store.reports_since(cutoff).await.unwrap();

        let ids: Vec<&str> = window.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["newest", "recent"]);
        assert_eq!(store.report_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn stale_reports_are_evicted_on_insert() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .insert_report(&report_at(&format!("old-{i}"), 24 * 365))
                .await
                .unwrap();
        }
        store.insert_report(&report_at("fresh", 1)).await.unwrap();

        // Everything outside the retention window is gone, not merely
        // filtered out of reads.
        assert_eq!(store.report_count().await.unwrap(), 1);

        let cutoff = Utc::now() - Duration::hours(24);
        let window = store.reports_since(cutoff).await.unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].id, "fresh");
    }

    #[tokio::test]
    async fn ring_capacity_bounds_retained_reports() {
        let store = MemoryStore::with_capacity(3);
        for i in 0..5 {
            store
                .insert_report(&report_at(&format!("r{i}"), 5 - i as i64))
                .await
                .unwrap();
        }

        assert_eq!(store.report_count().await.unwrap(), 3);

        let cutoff = Utc::now() - Duration::hours(24);
        let window = store.reports_since(cutoff).await.unwrap();
        let ids: Vec<&str> = window.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r4", "r3", "r2"]);
    }

    #[tokio::test]
    async fn memory_store_setting_lifecycle() {
        let store = MemoryStore::new();
        let setting = NotificationSetting {
            id: "s1".to_string(),
            latitude: -6.2,
            longitude: 106.8,
            radius_km: 100.0,
            min_intensity_level: 3,
            notification_enabled: true,
            sound_enabled: false,
            created_at: Utc::now(),
        };

        store.insert_setting(&setting).await.unwrap();
        assert_eq!(store.list_settings().await.unwrap().len(), 1);

        assert!(store.delete_setting("s1").await.unwrap());
        assert!(!store.delete_setting("s1").await.unwrap());
        assert!(store.list_settings().await.unwrap().is_empty());
    }
}
