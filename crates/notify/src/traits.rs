//! Notifier trait definition and shared error types.

use std::collections::HashMap;

/// Errors that can occur during alert delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Template rendering failed: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}

/// A rendered alert ready for delivery.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Notification {
    /// The rendered subject/title.
    pub subject: String,
    /// The rendered body content.
    pub body: String,
    /// Additional metadata (e.g., severity, cluster id).
    pub metadata: HashMap<String, String>,
}

/// Trait for alert channel implementations.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification through this channel.
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;

    /// Test connectivity with a sample notification.
    async fn test(&self) -> Result<(), NotifyError> {
        let test_notification = Notification {
            subject: "[TEST] Earthquake Alert Test".to_string(),
            body: "This is a test notification from the gempa alert sweep.".to_string(),
            metadata: HashMap::from([("cluster_id".to_string(), "test-cluster".to_string())]),
        };
        self.send(&test_notification).await
    }

    /// Human-readable name for this channel (e.g., "webhook", "telegram").
    fn channel_name(&self) -> &str;
}

/// Result of dispatching an alert to a single channel.
#[derive(Debug)]
pub struct DispatchResult {
    pub channel: String,
    pub cluster_id: String,
    /// Severity band of the alerted cluster ("low" .. "critical").
    pub severity: String,
    pub success: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}
