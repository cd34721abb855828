use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_u16(key: &str, default: u16) -> u16 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub postgres: PostgresConfig,
    pub clustering: ClusteringConfig,
    pub alerts: AlertConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            postgres: PostgresConfig::from_env(),
            clustering: ClusteringConfig::from_env(),
            alerts: AlertConfig::from_env(),
        }
    }

    pub fn log_summary(&self) {
        tracing::info!(
            "Config: listen {}:{}, radius {} km, lookback {} h, sweep every {} s",
            self.server.host,
            self.server.port,
            self.clustering.radius_km,
            self.clustering.lookback_hours,
            self.clustering.sweep_interval_secs
        );
        if self.postgres.url.is_empty() {
            tracing::info!("Config: PG_URL not set, reports held in memory only");
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: env_or("GEMPA_HOST", "0.0.0.0"),
            port: env_u16("GEMPA_PORT", 8080),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    /// Full connection URL. Empty means Postgres is not configured and the
    /// server falls back to the in-memory store.
    pub url: String,
}

impl PostgresConfig {
    pub fn from_env() -> Self {
        Self {
            url: env_or("PG_URL", ""),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Default grouping radius in kilometers.
    pub radius_km: f64,
    /// Lookback window for report queries, in hours.
    pub lookback_hours: u64,
    /// Period of the background alert sweep, in seconds.
    pub sweep_interval_secs: u64,
}

impl ClusteringConfig {
    pub fn from_env() -> Self {
        Self {
            radius_km: env_f64("GEMPA_RADIUS_KM", 50.0),
            lookback_hours: env_u64("GEMPA_LOOKBACK_HOURS", 24),
            sweep_interval_secs: env_u64("GEMPA_SWEEP_INTERVAL_SECS", 30),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Webhook endpoint for verified-cluster alerts.
    pub webhook_url: Option<String>,
    /// Telegram bot credentials.
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl AlertConfig {
    pub fn from_env() -> Self {
        Self {
            webhook_url: env_opt("GEMPA_WEBHOOK_URL"),
            telegram_bot_token: env_opt("GEMPA_TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: env_opt("GEMPA_TELEGRAM_CHAT_ID"),
        }
    }

    /// True when at least one delivery channel is configured.
    pub fn any_channel(&self) -> bool {
        self.webhook_url.is_some()
            || (self.telegram_bot_token.is_some() && self.telegram_chat_id.is_some())
    }
}
