mod api;
mod db;
mod state;
mod store;
mod sweep;

use std::sync::Arc;

use tracing::info;

use gempa_core::Config;
use gempa_feed::BmkgClient;
use gempa_notify::Dispatcher;

use crate::state::{AppState, SharedStore};
use crate::store::{MemoryStore, PgStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    gempa_core::config::load_dotenv();
    let config = Config::from_env();
    config.log_summary();

    let store: SharedStore = match db::init_pg_pool(&config.postgres).await {
        Some(pool) => Arc::new(PgStore::new(pool)),
        None => Arc::new(MemoryStore::new()),
    };

    let dispatcher = Arc::new(Dispatcher::from_config(&config.alerts)?);
    if dispatcher.channel_count() == 0 {
        info!("No alert channels configured, verified clusters will only be logged");
    }

    let state = Arc::new(AppState {
        store,
        feed: BmkgClient::new(),
        dispatcher,
        config: config.clone(),
    });

    tokio::spawn(sweep::run(state.clone()));

    let app = api::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
