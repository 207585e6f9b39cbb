use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{any, get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth_proxy::forward_auth;
use crate::gate::require_session;
use crate::pages;
use crate::state::SharedState;

/// Build the main application router with all routes behind the session gate.
pub fn build_router(state: SharedState) -> Router {
    let auth_routes = format!("{}/{{*rest}}", state.config.auth.base_path.trim_end_matches('/'));

    Router::new()
        .route("/", get(pages::home))
        .route("/dashboard", get(pages::home))
        .route("/login", get(pages::login))
        .route("/register", get(pages::register))
        .route("/health", get(health))
        .route("/api/status", get(status))
        .route("/favicon.ico", get(favicon))
        .route(&auth_routes, any(forward_auth))
        .nest_service("/static", ServeDir::new(&state.static_dir))
        .layer(middleware::from_fn_with_state(state.clone(), require_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn status(
    axum::extract::State(state): axum::extract::State<SharedState>,
) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "running",
        "provider": state.provider.as_str(),
    }))
}
