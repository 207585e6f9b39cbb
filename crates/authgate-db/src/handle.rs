use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use authgate_common::{Error, ProviderTag, Result};
use authgate_config::DatabaseConfig;
use chrono::Utc;
use tracing::{debug, info};

use crate::embedded::EmbeddedStore;
use crate::network::NetworkStore;
use crate::session::{Session, SessionProvider};

pub enum Backend {
    Embedded(Arc<EmbeddedStore>),
    Network(NetworkStore),
}

/// Database handle bound to the resolved provider.
///
/// Every call to [`DatabaseHandle::new`] builds a fresh, unconnected handle;
/// the connection is made on first query.
pub struct DatabaseHandle {
    config: DatabaseConfig,
    backend: Backend,
}

impl DatabaseHandle {
    pub fn new(config: DatabaseConfig) -> Result<Self> {
        let backend = match config.provider {
            ProviderTag::EmbeddedFile => {
                let store = EmbeddedStore::new(config.embedded_path()?, config.log_queries);
                Backend::Embedded(Arc::new(store))
            }
            ProviderTag::RelationalNetwork => {
                Backend::Network(NetworkStore::new(&config.locator, config.log_queries))
            }
        };

        info!(
            "database handle bound to {} ({})",
            config.provider,
            config.redacted_locator()
        );
        Ok(Self { config, backend })
    }

    pub fn provider(&self) -> ProviderTag {
        self.config.provider
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub async fn find_session(&self, token: &str) -> Result<Option<Session>> {
        let found = match &self.backend {
            Backend::Embedded(store) => {
                let store = Arc::clone(store);
                let token = token.to_string();
                tokio::task::spawn_blocking(move || store.find_session_sync(&token))
                    .await
                    .map_err(|e| Error::Database(format!("session lookup task failed: {e}")))??
            }
            Backend::Network(store) => store.find_session(token).await?,
        };

        Ok(found.filter(|session| {
            let active = session.is_active_at(Utc::now());
            if !active {
                debug!("session {} expired at {}", session.id, session.expires_at);
            }
            active
        }))
    }
}

#[async_trait]
impl SessionProvider for DatabaseHandle {
    async fn find_session(&self, token: &str) -> Result<Option<Session>> {
        DatabaseHandle::find_session(self, token).await
    }
}

/// Resolve the provider from the process environment and build its handle.
///
/// `schema_dir` is where relative `file:` locators point, normally `prisma/`.
pub fn resolve(schema_dir: &Path) -> Result<(ProviderTag, DatabaseHandle)> {
    resolve_with(|key| std::env::var(key).ok(), schema_dir)
}

/// [`resolve`] over an arbitrary variable lookup instead of the process environment.
pub fn resolve_with<F>(lookup: F, schema_dir: &Path) -> Result<(ProviderTag, DatabaseHandle)>
where
    F: Fn(&str) -> Option<String>,
{
    let config = authgate_config::resolve_from(lookup, schema_dir)?;
    let provider = config.provider;
    Ok((provider, DatabaseHandle::new(config)?))
}
