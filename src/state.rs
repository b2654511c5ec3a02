use crate::config::settings::AppConfig;
use crate::modules::jobs::events::JobQueue;
use crate::modules::jobs::repository::StoreConnector;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub stores: Arc<dyn StoreConnector>,
    pub queue: Arc<dyn JobQueue>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        stores: Arc<dyn StoreConnector>,
        queue: Arc<dyn JobQueue>,
    ) -> Self {
        Self {
            config,
            stores,
            queue,
        }
    }
}
