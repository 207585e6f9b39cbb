use std::path::PathBuf;
use std::sync::Arc;

use authgate_common::{ProviderTag, Result};
use authgate_config::AppConfig;
use authgate_db::SessionProvider;

use crate::auth_proxy::AuthProxy;

/// Shared application state accessible from all request handlers.
pub struct AppState {
    pub config: AppConfig,
    /// Backend the session lookups go to, shown on the status endpoint.
    pub provider: ProviderTag,
    pub sessions: Arc<dyn SessionProvider>,
    pub auth_proxy: AuthProxy,
    /// Served under `/static`.
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        provider: ProviderTag,
        sessions: Arc<dyn SessionProvider>,
        static_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let auth_proxy = AuthProxy::new(config.auth.service_url.as_deref())?;
        Ok(Self {
            config,
            provider,
            sessions,
            auth_proxy,
            static_dir: static_dir.into(),
        })
    }
}

pub type SharedState = Arc<AppState>;
