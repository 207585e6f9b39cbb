use authgate_common::{Error, Result, SessionId, UserId};
use chrono::{DateTime, NaiveDateTime, Utc};
use tokio::sync::OnceCell;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, info, warn};

use crate::schema::SESSION_LOOKUP_POSTGRES;
use crate::session::{Session, SessionUser};

/// PostgreSQL server reached over the network.
///
/// Connects on first use and keeps that single client for the life of the
/// handle.
pub struct NetworkStore {
    locator: String,
    log_queries: bool,
    client: OnceCell<Client>,
}

impl NetworkStore {
    pub fn new(locator: impl Into<String>, log_queries: bool) -> Self {
        Self {
            locator: locator.into(),
            log_queries,
            client: OnceCell::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.client.initialized()
    }

    async fn client(&self) -> Result<&Client> {
        self.client
            .get_or_try_init(|| async {
                let dsn = connection_string(&self.locator)?;
                let (client, connection) = tokio_postgres::connect(&dsn, NoTls)
                    .await
                    .map_err(|e| Error::Database(format!("failed to connect to postgres: {e}")))?;

                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        warn!("postgres connection error: {e}");
                    }
                });

                info!("connected to postgres");
                Ok(client)
            })
            .await
    }

    pub async fn find_session(&self, token: &str) -> Result<Option<Session>> {
        if self.log_queries {
            debug!(query = SESSION_LOOKUP_POSTGRES.trim(), "postgres query");
        }

        let client = self.client().await?;
        let row = client
            .query_opt(SESSION_LOOKUP_POSTGRES, &[&token])
            .await
            .map_err(|e| Error::Database(format!("session lookup failed: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let read = |e: tokio_postgres::Error| Error::Database(format!("bad session row: {e}"));
        let expires_at: NaiveDateTime = row.try_get("expires_at").map_err(read)?;

        Ok(Some(Session {
            id: SessionId::from_str(row.try_get::<_, String>("session_id").map_err(read)?),
            user: SessionUser {
                id: UserId::from_str(row.try_get::<_, String>("user_id").map_err(read)?),
                name: row.try_get("user_name").map_err(read)?,
                email: row.try_get("user_email").map_err(read)?,
            },
            expires_at: DateTime::<Utc>::from_naive_utc_and_offset(expires_at, Utc),
        }))
    }
}

/// Drop the ORM-only `schema` query parameter, which the driver rejects.
fn connection_string(locator: &str) -> Result<String> {
    let mut url = url::Url::parse(locator)
        .map_err(|e| Error::Config(format!("invalid postgres locator: {e}")))?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "schema")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    Ok(url.to_string())
}
