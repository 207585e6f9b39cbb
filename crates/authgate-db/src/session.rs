use async_trait::async_trait;
use authgate_common::{Result, SessionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Signed-in user attached to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// Session row issued by the authentication service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub user: SessionUser,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Looks up sessions by the token carried in the session cookie.
///
/// Implementations return `Ok(None)` for unknown or expired tokens.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn find_session(&self, token: &str) -> Result<Option<Session>>;
}
