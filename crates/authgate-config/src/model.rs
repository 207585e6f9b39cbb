use serde::{Deserialize, Serialize};

/// Cookie the authentication service stores its signed session token in.
pub const DEFAULT_SESSION_COOKIE: &str = "better-auth.session_token";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    /// Used when `--log-level` is not given; each command has its own default otherwise.
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            auth: AuthConfig::default(),
            log_level: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,

    /// Base path of the external authentication service's endpoints.
    #[serde(default = "default_auth_base_path")]
    pub base_path: String,

    /// Origin of the authentication service, e.g. `http://127.0.0.1:3001`.
    /// Requests under `base_path` are forwarded there.
    #[serde(default)]
    pub service_url: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie: default_session_cookie(),
            base_path: default_auth_base_path(),
            service_url: None,
        }
    }
}

fn default_session_cookie() -> String {
    DEFAULT_SESSION_COOKIE.to_string()
}

fn default_auth_base_path() -> String {
    "/api/auth".to_string()
}
