use std::sync::Arc;

use crate::config::Config;
use crate::database::Database;
use crate::services::postgres::PgStore;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Store used by the billing, payout and enrollment workflows.
    pub fn store(&self) -> PgStore {
        PgStore::new(self.db.clone(), self.config.store_timeout)
    }
}
