//! Background alert sweep.
//!
//! Periodically re-clusters the lookback window and dispatches alerts for
//! verified clusters. With notification settings present, a cluster only
//! alerts when at least one enabled setting is in range and below the
//! cluster's average intensity; with no settings stored, every verified
//! cluster alerts (operational channels still want to hear about them).
//! De-duplication by cluster id happens inside the dispatcher.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, warn};

use gempa_compute::{cluster_reports, haversine_km};
use gempa_core::{Cluster, NotificationSetting};

use crate::state::AppState;

/// Run the sweep loop forever. Spawned once at server startup.
pub async fn run(state: Arc<AppState>) {
    let period = std::time::Duration::from_secs(state.config.clustering.sweep_interval_secs);
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        if let Err(e) = sweep_once(&state).await {
            warn!(error = %e, "Alert sweep failed");
        }
    }
}

async fn sweep_once(state: &Arc<AppState>) -> anyhow::Result<()> {
    let cutoff = Utc::now() - Duration::hours(state.config.clustering.lookback_hours as i64);
    let reports = state.store.reports_since(cutoff).await?;
    let clusters = cluster_reports(&reports, state.config.clustering.radius_km);

    let verified: Vec<&Cluster> = clusters.iter().filter(|c| c.is_verified).collect();
    if verified.is_empty() {
        debug!(clusters = clusters.len(), "Sweep: no verified clusters");
        return Ok(());
    }

    let settings = state.store.list_settings().await?;

    for cluster in verified {
        let should_alert = if settings.is_empty() {
            true
        } else {
            settings.iter().any(|s| setting_matches(s, cluster))
        };

        if should_alert {
            state.dispatcher.alert_cluster(cluster).await;
        } else {
            debug!(cluster_id = %cluster.id, "Verified cluster outside all subscriptions");
        }
    }

    Ok(())
}

/// True when a subscription should fire for a verified cluster: the
/// centroid is within the setting's radius and the cluster's average
/// intensity reaches the subscribed minimum.
pub fn setting_matches(setting: &NotificationSetting, cluster: &Cluster) -> bool {
    if !setting.notification_enabled && !setting.sound_enabled {
        return false;
    }

    let distance = haversine_km(
        setting.latitude,
        setting.longitude,
        cluster.latitude,
        cluster.longitude,
    );

    distance <= setting.radius_km && cluster.average_intensity >= setting.min_intensity_level as f64
}
