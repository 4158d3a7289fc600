// src/state.rs
use crate::{config::AppConfig, services::report_service::DocumentRenderer};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: Arc<AppConfig>,
    // Held for the whole delete+insert of an allotment run
    pub allotment_lock: Arc<Mutex<()>>,
    pub renderer: Arc<dyn DocumentRenderer>,
}

impl AppState {
    pub fn new(
        db_pool: SqlitePool,
        config: AppConfig,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Self {
        Self {
            db_pool,
            config: Arc::new(config),
            allotment_lock: Arc::new(Mutex::new(())),
            renderer,
        }
    }
}

// Lets handlers extract the pool directly
impl axum::extract::FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> SqlitePool {
        state.db_pool.clone()
    }
}
