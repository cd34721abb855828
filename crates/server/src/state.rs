use std::sync::Arc;

use gempa_core::Config;
use gempa_feed::BmkgClient;
use gempa_notify::Dispatcher;

use crate::store::ReportStore;

pub type SharedStore = Arc<dyn ReportStore>;

pub struct AppState {
    pub store: SharedStore,
    pub feed: BmkgClient,
    pub dispatcher: Arc<Dispatcher>,
    pub config: Config,
}
