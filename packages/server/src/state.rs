use std::sync::Arc;

use common::MediaHost;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

/// Process-scoped dependencies shared read-only by every request.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub media: Arc<dyn MediaHost>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig, media: Arc<dyn MediaHost>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            media,
        }
    }
}
