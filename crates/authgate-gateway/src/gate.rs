use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use authgate_db::Session;
use tracing::{debug, warn};

use crate::state::{AppState, SharedState};

pub const LOGIN_PATH: &str = "/login";

/// Cookie prefix browsers require for cookies set with `Secure` over HTTPS.
const SECURE_PREFIX: &str = "__Secure-";

/// Paths reachable without a session.
fn is_public(path: &str, auth_base_path: &str) -> bool {
    matches!(path, LOGIN_PATH | "/register" | "/health" | "/favicon.ico")
        || path.starts_with("/static/")
        || is_under(path, auth_base_path)
}

fn is_under(path: &str, base: &str) -> bool {
    path.strip_prefix(base)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Extract the session token from the request's cookies.
///
/// The cookie value is `<token>.<signature>`; checking the signature is the
/// authentication service's job, so only the token part is returned.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let secure_name = format!("{SECURE_PREFIX}{cookie_name}");

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name || *name == secure_name)
        .and_then(|(_, value)| {
            let token = value.split('.').next().unwrap_or_default().trim_matches('"');
            (!token.is_empty()).then(|| token.to_string())
        })
}

/// Session for the request, or `None` when there is no valid one.
///
/// Lookup failures are logged and treated as signed out.
pub async fn get_session(state: &AppState, headers: &HeaderMap) -> Option<Session> {
    let token = session_token(headers, &state.config.auth.session_cookie)?;

    match state.sessions.find_session(&token).await {
        Ok(session) => session,
        Err(e) => {
            warn!("session lookup failed: {e}");
            None
        }
    }
}

/// Middleware that redirects requests without a session to the login page.
///
/// The session is stored in the request extensions for the handlers.
pub async fn require_session(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Response {
    if is_public(request.uri().path(), &state.config.auth.base_path) {
        return next.run(request).await;
    }

    match get_session(&state, request.headers()).await {
        Some(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        None => {
            debug!("no session for {}, redirecting to login", request.uri().path());
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(cookies: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for cookie in cookies {
            headers.append(COOKIE, HeaderValue::from_str(cookie).unwrap());
        }
        headers
    }

    #[test]
    fn token_is_taken_before_the_signature() {
        let h = headers(&["theme=dark; better-auth.session_token=abc123.c2lnbmF0dXJl"]);
        assert_eq!(
            session_token(&h, "better-auth.session_token").as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn secure_prefixed_cookie_is_accepted() {
        let h = headers(&["__Secure-better-auth.session_token=tok.sig"]);
        assert_eq!(
            session_token(&h, "better-auth.session_token").as_deref(),
            Some("tok")
        );
    }

    #[test]
    fn token_is_found_across_multiple_cookie_headers() {
        let h = headers(&["a=1", "sid=xyz"]);
        assert_eq!(session_token(&h, "sid").as_deref(), Some("xyz"));
    }

    #[test]
    fn missing_or_empty_cookie_yields_none() {
        assert!(session_token(&headers(&[]), "sid").is_none());
        assert!(session_token(&headers(&["other=1"]), "sid").is_none());
        assert!(session_token(&headers(&["sid="]), "sid").is_none());
        assert!(session_token(&headers(&["sid=.sig"]), "sid").is_none());
    }

    #[test]
    fn public_paths_skip_the_gate() {
        for path in [
            "/login",
            "/register",
            "/health",
            "/favicon.ico",
            "/static/app.css",
            "/api/auth",
            "/api/auth/sign-in/email",
        ] {
            assert!(is_public(path, "/api/auth"), "{path}");
        }
        for path in ["/", "/dashboard", "/loginx", "/static", "/api/authz", "/api/auth-admin"] {
            assert!(!is_public(path, "/api/auth"), "{path}");
        }
    }
}
