pub mod antiforgery;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod router;
pub mod state;
pub mod templates;

use std::sync::Arc;

use movies_core::storage::{InMemoryStorage, Storage};
use movies_core::MovieService;
use tracing::{info, warn};

use crate::antiforgery::Antiforgery;
use crate::config::AppConfig;
use crate::state::AppState;

/// Opens the configured store, falling back to memory when no database is set.
pub async fn build_storage(config: &AppConfig, in_memory: bool) -> anyhow::Result<Arc<dyn Storage>> {
    if in_memory {
        info!("Using in-memory storage");
        return Ok(Arc::new(InMemoryStorage::new()));
    }

    match config.database_url.as_deref() {
        #[cfg(feature = "db")]
        Some(url) => {
            use movies_core::storage::DatabaseStorage;
            use movies_core::DatabaseManager;

            let manager =
                DatabaseManager::connect(url, config.database_auth_token.as_deref()).await?;
            let storage = DatabaseStorage::with_manager(Arc::new(manager)).await?;
            info!("Database storage initialized successfully");
            Ok(Arc::new(storage))
        }
        #[cfg(not(feature = "db"))]
        Some(_) => anyhow::bail!("database_url is set but movies-web was built without the `db` feature"),
        None => {
            warn!("No database configured, data will not survive a restart");
            Ok(Arc::new(InMemoryStorage::new()))
        }
    }
}

pub fn build_state(config: &AppConfig, storage: Arc<dyn Storage>) -> AppState {
    let secure_cookie = !config.environment.is_development();
    let antiforgery = match config.antiforgery_secret.as_deref() {
        Some(secret) => Antiforgery::new(secret, secure_cookie),
        None => Antiforgery::random(secure_cookie),
    };

    AppState {
        service: MovieService::new(storage),
        antiforgery,
    }
}
