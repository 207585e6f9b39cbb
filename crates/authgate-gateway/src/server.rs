use std::sync::Arc;

use authgate_common::Result;
use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// The HTTP server that binds to a port and serves the gated pages.
pub struct GatewayServer {
    state: AppState,
}

impl GatewayServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn run(self) -> Result<()> {
        let addr = format!(
            "{}:{}",
            self.state.config.gateway.host, self.state.config.gateway.port
        );
        let provider = self.state.provider;

        let app = build_router(Arc::new(self.state));

        let listener = TcpListener::bind(&addr).await?;
        info!("authgate listening on {addr} (database: {provider})");

        axum::serve(listener, app)
            .await
            .map_err(|e| authgate_common::Error::Gateway(format!("server error: {e}")))?;

        Ok(())
    }
}
