//! Minijinja template rendering for alert messages.
//!
//! Templates are arbitrary strings (not pre-registered), so a fresh
//! [`minijinja::Environment`] is created per render call.

use gempa_compute::Severity;
use gempa_core::Cluster;

use crate::traits::NotifyError;

/// Default subject template for verified-cluster alerts.
pub const DEFAULT_SUBJECT_TEMPLATE: &str =
    "Gempa terverifikasi: {{ cluster.report_count }} laporan di sekitar {{ cluster.location_hint }}";

/// Default body template for verified-cluster alerts.
pub const DEFAULT_BODY_TEMPLATE: &str = "\
{{ cluster.report_count }} laporan dalam radius klaster di \
({{ cluster.latitude | round(2) }}, {{ cluster.longitude | round(2) }}). \
Intensitas rata-rata {{ cluster.average_intensity | round(1) }} \
(min {{ cluster.min_intensity }}, max {{ cluster.max_intensity }}), \
tingkat {{ cluster.severity }}.";

/// Context data available to alert templates.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AlertContext {
    pub cluster: ClusterContext,
    /// Current timestamp in ISO 8601 format.
    pub now: String,
}

/// Cluster attributes exposed to templates.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ClusterContext {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub report_count: usize,
    pub average_intensity: f64,
    pub min_intensity: i32,
    pub max_intensity: i32,
    pub is_verified: bool,
    /// Severity band ("low" .. "critical").
    pub severity: String,
    /// Map marker color for the severity band.
    pub color: String,
    /// Location name of the first member report, for human-readable copy.
    pub location_hint: String,
}

impl ClusterContext {
    pub fn from_cluster(cluster: &Cluster) -> Self {
        let severity = Severity::of(cluster);
        Self {
            id: cluster.id.clone(),
            latitude: cluster.latitude,
            longitude: cluster.longitude,
            report_count: cluster.report_count,
            average_intensity: cluster.average_intensity,
            min_intensity: cluster.min_intensity,
            max_intensity: cluster.max_intensity,
            is_verified: cluster.is_verified,
            severity: severity.to_string(),
            color: severity.color().to_string(),
            location_hint: cluster
                .reports
                .first()
                .map(|r| r.location_name.clone())
                .unwrap_or_default(),
        }
    }
}

/// Renders alert templates using minijinja.
#[derive(Debug, Default)]
pub struct TemplateRenderer {
    _private: (),
}

impl TemplateRenderer {
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn build_env() -> minijinja::Environment<'static> {
        let mut env = minijinja::Environment::new();
        env.add_filter("round", round_filter);
        env
    }

    /// Render a template string with the given context.
    pub fn render(&self, template_str: &str, ctx: &AlertContext) -> Result<String, NotifyError> {
        let env = Self::build_env();
        env.render_str(template_str, ctx)
            .map_err(|e| NotifyError::Template(e.to_string()))
    }

    /// Validate that a template string parses (syntax only, no evaluation).
    pub fn validate(&self, template_str: &str) -> Result<(), NotifyError> {
        let env = Self::build_env();
        env.template_from_str(template_str)
            .map_err(|e| NotifyError::Template(e.to_string()))?;
        Ok(())
    }
}

/// Custom filter: round a float to N decimal places.
fn round_filter(value: f64, decimals: Option<u32>) -> String {
    let n = decimals.unwrap_or(0);
    format!("{:.prec$}", value, prec = n as usize)
}
