use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use authgate_common::{Error, Result, SessionId, UserId};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use tracing::{debug, info};

use crate::schema::SESSION_LOOKUP_SQLITE;
use crate::session::{Session, SessionUser};

/// SQLite file written by the ORM's migrations.
///
/// The file is opened on first use and never created here: a missing file
/// means migrations have not been applied yet.
pub struct EmbeddedStore {
    path: PathBuf,
    log_queries: bool,
    conn: Mutex<Option<Connection>>,
}

impl EmbeddedStore {
    pub fn new(path: impl Into<PathBuf>, log_queries: bool) -> Self {
        Self {
            path: path.into(),
            log_queries,
            conn: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.lock().map(|conn| conn.is_some()).unwrap_or(false)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Connection>>> {
        self.conn
            .lock()
            .map_err(|_| Error::Database("embedded database lock poisoned".into()))
    }

    fn open(&self) -> Result<Connection> {
        if !self.path.exists() {
            return Err(Error::Database(format!(
                "embedded database {} does not exist; apply migrations first (npx prisma migrate dev)",
                self.path.display()
            )));
        }

        info!("opening embedded database at {}", self.path.display());
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| Error::Database(format!("failed to open database: {e}")))?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(|e| Error::Database(format!("failed to set pragmas: {e}")))?;

        Ok(conn)
    }

    fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let mut guard = self.lock()?;
        if let Some(conn) = guard.as_ref() {
            return f(conn);
        }
        let conn = guard.insert(self.open()?);
        f(conn)
    }

    pub fn find_session_sync(&self, token: &str) -> Result<Option<Session>> {
        if self.log_queries {
            debug!(query = SESSION_LOOKUP_SQLITE.trim(), "sqlite query");
        }

        self.with_connection(|conn| {
            conn.query_row(SESSION_LOOKUP_SQLITE, [token], |row| {
                let expires_at = timestamp_from_sql(row.get_ref(1)?).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        1,
                        rusqlite::types::Type::Text,
                        Box::new(std::io::Error::other(e.to_string())),
                    )
                })?;
                Ok(Session {
                    id: SessionId::from_str(row.get::<_, String>(0)?),
                    user: SessionUser {
                        id: UserId::from_str(row.get::<_, String>(2)?),
                        name: row.get(3)?,
                        email: row.get(4)?,
                    },
                    expires_at,
                })
            })
            .optional()
            .map_err(|e| Error::Database(format!("session lookup failed: {e}")))
        })
    }
}

/// The ORM stores SQLite datetimes as epoch milliseconds; text values written
/// by other tools are accepted too.
fn timestamp_from_sql(value: ValueRef<'_>) -> Result<DateTime<Utc>> {
    match value {
        ValueRef::Integer(ms) => DateTime::<Utc>::from_timestamp_millis(ms)
            .ok_or_else(|| Error::Database(format!("timestamp out of range: {ms}"))),
        ValueRef::Text(raw) => {
            let raw = std::str::from_utf8(raw)
                .map_err(|e| Error::Database(format!("invalid timestamp text: {e}")))?;
            parse_timestamp(raw)
        }
        other => Err(Error::Database(format!(
            "unsupported timestamp type: {:?}",
            other.data_type()
        ))),
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
        }
    }

    Err(Error::Database(format!("invalid timestamp format: {raw}")))
}
