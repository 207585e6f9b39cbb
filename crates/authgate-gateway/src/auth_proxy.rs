//! Forwards the authentication endpoints to the external auth service.
//!
//! Registration, sign-in and sign-out are owned by that service. The gateway
//! relays the request under the auth base path unchanged and hands the
//! response back, `Set-Cookie` headers included, so the session cookie lands
//! on the gateway's origin.

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use authgate_common::{Error, Result};
use tracing::{debug, warn};

use crate::state::SharedState;

/// Largest request body relayed to the auth service.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Connection-level headers that are never relayed.
const HOP_BY_HOP: [&str; 7] = [
    "connection",
    "host",
    "content-length",
    "keep-alive",
    "transfer-encoding",
    "te",
    "upgrade",
];

pub struct AuthProxy {
    origin: Option<String>,
    client: reqwest::Client,
}

impl AuthProxy {
    /// `origin` is the auth service's scheme, host and port; `None` disables forwarding.
    pub fn new(origin: Option<&str>) -> Result<Self> {
        // Redirects are the browser's to follow.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::Gateway(format!("failed to build auth service client: {e}")))?;

        Ok(Self {
            origin: origin
                .map(|o| o.trim_end_matches('/').to_string())
                .filter(|o| !o.is_empty()),
            client,
        })
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    async fn forward(&self, origin: &str, request: Request) -> Result<Response> {
        let (parts, body) = request.into_parts();
        let path = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let url = format!("{origin}{path}");
        let body = to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|e| Error::Gateway(format!("failed to read request body: {e}")))?;

        let upstream = self
            .client
            .request(parts.method, &url)
            .headers(relayed(&parts.headers))
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Gateway(format!("auth service request to {url} failed: {e}")))?;

        let status = upstream.status();
        let headers = relayed(upstream.headers());
        let bytes = upstream
            .bytes()
            .await
            .map_err(|e| Error::Gateway(format!("failed to read auth service response: {e}")))?;

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

fn relayed(headers: &HeaderMap) -> HeaderMap {
    headers
        .iter()
        .filter(|(name, _)| !HOP_BY_HOP.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Any method under the auth base path.
pub async fn forward_auth(State(state): State<SharedState>, request: Request) -> Response {
    let Some(origin) = state.auth_proxy.origin() else {
        warn!(
            "{} {} requested but no auth service is configured",
            request.method(),
            request.uri().path()
        );
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "authentication service is not configured",
        )
            .into_response();
    };

    debug!("forwarding {} {} to {origin}", request.method(), request.uri().path());
    match state.auth_proxy.forward(origin, request).await {
        Ok(response) => response,
        Err(e) => {
            warn!("{e}");
            (StatusCode::BAD_GATEWAY, "authentication service unavailable").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header};

    #[test]
    fn relayed_headers_drop_connection_level_ones() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost:3000"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("b=2"));

        let out = relayed(&headers);
        assert!(out.get(header::HOST).is_none());
        assert!(out.get(header::CONNECTION).is_none());
        assert_eq!(out.get(header::CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(out.get_all(header::SET_COOKIE).iter().count(), 2);
    }

    #[test]
    fn blank_origin_disables_forwarding() {
        assert!(AuthProxy::new(Some("")).unwrap().origin().is_none());
        assert_eq!(
            AuthProxy::new(Some("http://127.0.0.1:3001/")).unwrap().origin(),
            Some("http://127.0.0.1:3001")
        );
    }
}
