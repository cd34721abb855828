//! Routes verified-cluster alerts to configured channels.
//!
//! The dispatcher renders an alert for a cluster and delivers it to every
//! configured channel. Individual channel failures don't block other
//! channels. Each cluster id is alerted at most once per process lifetime;
//! there is no cross-restart persistence of the seen-set.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use gempa_compute::Severity;
use gempa_core::config::AlertConfig;
use gempa_core::Cluster;

use crate::telegram::TelegramNotifier;
use crate::templating::{
    AlertContext, ClusterContext, TemplateRenderer, DEFAULT_BODY_TEMPLATE,
    DEFAULT_SUBJECT_TEMPLATE,
};
use crate::traits::{DispatchResult, Notification, Notifier, NotifyError};
use crate::webhook::WebhookNotifier;

/// Fans alerts out to delivery channels with in-process de-duplication.
pub struct Dispatcher {
    channels: Vec<Box<dyn Notifier>>,
    renderer: TemplateRenderer,
    subject_template: String,
    body_template: String,
    /// Cluster ids already alerted in this process. A cluster whose
    /// membership grows gets a new id and alerts again.
    seen: Mutex<HashSet<String>>,
}

impl Dispatcher {
    /// Create a dispatcher over an explicit channel list.
    pub fn new(channels: Vec<Box<dyn Notifier>>) -> Self {
        Self {
            channels,
            renderer: TemplateRenderer::new(),
            subject_template: DEFAULT_SUBJECT_TEMPLATE.to_string(),
            body_template: DEFAULT_BODY_TEMPLATE.to_string(),
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Replace the default subject/body templates.
    pub fn with_templates(mut self, subject: impl Into<String>, body: impl Into<String>) -> Self {
        self.subject_template = subject.into();
        self.body_template = body.into();
        self
    }

    /// Create a dispatcher with no channels (alerts become no-ops).
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Build channels from config. Unconfigured channels are skipped;
    /// a misconfigured one is an error.
    pub fn from_config(alerts: &AlertConfig) -> Result<Self, NotifyError> {
        let mut channels: Vec<Box<dyn Notifier>> = Vec::new();

        if let Some(url) = &alerts.webhook_url {
            channels.push(Box::new(WebhookNotifier::new(url.clone(), HashMap::new())?));
        }

        if let (Some(token), Some(chat_id)) = (&alerts.telegram_bot_token, &alerts.telegram_chat_id)
        {
            channels.push(Box::new(TelegramNotifier::new(
                token.clone(),
                chat_id.clone(),
            )?));
        }

        Ok(Self::new(channels))
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Render and deliver an alert for a verified cluster.
    ///
    /// Returns one result per channel. An empty result means either no
    /// channels are configured or this cluster id already alerted.
    pub async fn alert_cluster(&self, cluster: &Cluster) -> Vec<DispatchResult> {
        if self.channels.is_empty() {
            tracing::debug!(cluster_id = %cluster.id, "No alert channels configured");
            return Vec::new();
        }

        if self
            .seen
            .lock()
            .expect("seen-set lock poisoned")
            .contains(&cluster.id)
        {
            tracing::debug!(cluster_id = %cluster.id, "Cluster already alerted, skipping");
            return Vec::new();
        }

        let notification = match self.render(cluster) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(cluster_id = %cluster.id, error = %e, "Alert rendering failed");
                return Vec::new();
            }
        };

        // Marked seen only after rendering succeeds, so a template problem
        // does not suppress the cluster for the rest of the process.
        self.seen
            .lock()
            .expect("seen-set lock poisoned")
            .insert(cluster.id.clone());

        let severity = Severity::of(cluster).to_string();
        let mut results = Vec::with_capacity(self.channels.len());

        for channel in &self.channels {
            let start = std::time::Instant::now();
            let result = channel.send(&notification).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            let (success, error) = match result {
                Ok(()) => {
                    tracing::info!(
                        cluster_id = %cluster.id,
                        channel = channel.channel_name(),
                        duration_ms,
                        "Alert delivered"
                    );
                    (true, None)
                }
                Err(e) => {
                    tracing::warn!(
                        cluster_id = %cluster.id,
                        channel = channel.channel_name(),
                        error = %e,
                        duration_ms,
                        "Alert delivery failed"
                    );
                    (false, Some(e.to_string()))
                }
            };

            results.push(DispatchResult {
                channel: channel.channel_name().to_string(),
                cluster_id: cluster.id.clone(),
                severity: severity.clone(),
                success,
                error,
                duration_ms,
            });
        }

        results
    }

    fn render(&self, cluster: &Cluster) -> Result<Notification, NotifyError> {
        let ctx = AlertContext {
            cluster: ClusterContext::from_cluster(cluster),
            now: chrono::Utc::now().to_rfc3339(),
        };

        let subject = self.renderer.render(&self.subject_template, &ctx)?;
        let body = self.renderer.render(&self.body_template, &ctx)?;

        Ok(Notification {
            subject,
            body,
            metadata: HashMap::from([
                ("cluster_id".to_string(), cluster.id.clone()),
                ("severity".to_string(), ctx.cluster.severity.clone()),
                ("report_count".to_string(), cluster.report_count.to_string()),
            ]),
        })
    }
}
