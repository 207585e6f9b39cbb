use std::sync::Arc;

use authgate_common::{ProviderTag, Result};
use authgate_config::{AppConfig, ConfigLoader, DatabaseConfig};
use authgate_db::{DatabaseHandle, SessionProvider};
use tracing::info;

use crate::state::AppState;

/// Load `.env`, resolve the database provider and build the server state.
///
/// Fails when no database is configured; the server must not start then.
pub fn build_state(loader: &ConfigLoader, config: AppConfig) -> Result<AppState> {
    loader.load_env_file()?;

    let (provider, handle) = authgate_db::resolve(&loader.paths().schema_dir())?;
    state_with_sessions(loader, config, provider, Arc::new(handle))
}

/// Build the server state from an already resolved database configuration.
pub fn state_from_database_config(
    loader: &ConfigLoader,
    config: AppConfig,
    db_config: DatabaseConfig,
) -> Result<AppState> {
    let provider = db_config.provider;
    let handle = DatabaseHandle::new(db_config)?;
    state_with_sessions(loader, config, provider, Arc::new(handle))
}

fn state_with_sessions(
    loader: &ConfigLoader,
    config: AppConfig,
    provider: ProviderTag,
    sessions: Arc<dyn SessionProvider>,
) -> Result<AppState> {
    info!("session lookups use the {} store", provider.label());
    match config.auth.service_url.as_deref() {
        Some(origin) => info!("auth endpoints forwarded to {origin}"),
        None => info!("no auth service configured, sign-in and registration are disabled"),
    }

    let static_dir = loader.project_dir().join("public");
    AppState::new(config, provider, sessions, static_dir)
}
