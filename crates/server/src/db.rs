use sqlx::PgPool;
use tracing::{info, warn};

/// Create a PostgreSQL connection pool and run migrations.
/// Returns None if PG_URL is not configured or unreachable; the server
/// then falls back to the in-memory report store.
pub async fn init_pg_pool(config: &gempa_core::config::PostgresConfig) -> Option<PgPool> {
    if config.url.is_empty() {
        warn!("PG_URL not configured, using in-memory report store");
        return None;
    }

    match PgPool::connect(&config.url).await {
        Ok(pool) => match sqlx::migrate!("../../migrations").run(&pool).await {
            Ok(_) => {
                info!("PostgreSQL connected, migrations applied");
                Some(pool)
            }
            Err(e) => {
                warn!("Failed to run migrations: {}, using in-memory report store", e);
                None
            }
        },
        Err(e) => {
            warn!("Failed to connect to PostgreSQL: {}, using in-memory report store", e);
            None
        }
    }
}
