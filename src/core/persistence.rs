//! Durable session snapshots.
//!
//! Every save creates a brand new session row with one child row per message;
//! sessions are never updated or merged. Child rows cascade-delete with their
//! session.

use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::debug;

use crate::core::message::{Message, Role};

const CREATE_SESSIONS: &str = "CREATE TABLE IF NOT EXISTS sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
)";

const CREATE_CONVERSATIONS: &str = "CREATE TABLE IF NOT EXISTS conversations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id INTEGER NOT NULL,
    position INTEGER NOT NULL,
    role TEXT NOT NULL CHECK(role IN ('user', 'assistant')),
    content TEXT NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE
)";

#[derive(Debug)]
pub enum PersistenceError {
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    Open {
        location: String,
        source: sqlx::Error,
    },
    Query {
        stage: &'static str,
        source: sqlx::Error,
    },
    InvalidRow {
        detail: String,
    },
    Interrupted {
        detail: String,
    },
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::CreateDirectory { path, source } => write!(
                f,
                "Failed to create database directory {}: {}",
                path.display(),
                source
            ),
            PersistenceError::Open { location, source } => {
                write!(f, "Failed to open session database {location}: {source}")
            }
            PersistenceError::Query { stage, source } => {
                write!(f, "Session database error during {stage}: {source}")
            }
            PersistenceError::InvalidRow { detail } => {
                write!(f, "Invalid row in session database: {detail}")
            }
            PersistenceError::Interrupted { detail } => {
                write!(f, "Save interrupted: {detail}")
            }
        }
    }
}

impl StdError for PersistenceError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            PersistenceError::CreateDirectory { source, .. } => Some(source),
            PersistenceError::Open { source, .. } => Some(source),
            PersistenceError::Query { source, .. } => Some(source),
            PersistenceError::InvalidRow { .. } | PersistenceError::Interrupted { .. } => None,
        }
    }
}

fn query_error(stage: &'static str) -> impl FnOnce(sqlx::Error) -> PersistenceError {
    move |source| PersistenceError::Query { stage, source }
}

#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Store `conversation` as a new session and return the session id.
    async fn save_session(&self, conversation: &[Message]) -> Result<i64, PersistenceError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: i64,
    pub created_at: String,
    pub message_count: i64,
}

#[derive(Debug, Clone)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    /// Open (creating if needed) the database file at `path` and make sure
    /// the schema exists.
    pub async fn open(path: &Path) -> Result<Self, PersistenceError> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| PersistenceError::CreateDirectory {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        Self::connect(options, path.display().to_string()).await
    }

    /// Private in-memory database, used by tests.
    pub async fn open_in_memory() -> Result<Self, PersistenceError> {
        let location = "sqlite::memory:".to_string();
        let options = SqliteConnectOptions::from_str(&location)
            .map_err(|source| PersistenceError::Open {
                location: location.clone(),
                source,
            })?
            .foreign_keys(true);
        Self::connect(options, location).await
    }

    async fn connect(
        options: SqliteConnectOptions,
        location: String,
    ) -> Result<Self, PersistenceError> {
        // One connection keeps in-memory databases alive and serializes writers.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|source| PersistenceError::Open {
                location: location.clone(),
                source,
            })?;

        for statement in [CREATE_SESSIONS, CREATE_CONVERSATIONS] {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(query_error("schema-create"))?;
        }

        debug!(%location, "session store ready");
        Ok(Self { pool })
    }

    pub async fn list_sessions(&self) -> Result<Vec<SessionSummary>, PersistenceError> {
        let rows: Vec<(i64, String, i64)> = sqlx::query_as(
            "SELECT s.id, COALESCE(s.created_at, ''), COUNT(c.id)
             FROM sessions s LEFT JOIN conversations c ON c.session_id = s.id
             GROUP BY s.id ORDER BY s.id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("list-sessions"))?;

        Ok(rows
            .into_iter()
            .map(|(id, created_at, message_count)| SessionSummary {
                id,
                created_at,
                message_count,
            })
            .collect())
    }

    pub async fn load_session(&self, session_id: i64) -> Result<Vec<Message>, PersistenceError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT role, content FROM conversations WHERE session_id = ? ORDER BY position",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("load-session"))?;

        rows.into_iter()
            .map(|(role, content)| {
                let role = Role::try_from(role.as_str())
                    .map_err(|detail| PersistenceError::InvalidRow { detail })?;
                Ok(Message::new(role, content))
            })
            .collect()
    }

    pub async fn delete_session(&self, session_id: i64) -> Result<bool, PersistenceError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(query_error("delete-session"))?;
        Ok(result.rows_affected() > 0)
    }

    #[cfg(test)]
    async fn count_message_rows(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM conversations")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

#[async_trait]
impl PersistenceGateway for SqliteSessionStore {
    async fn save_session(&self, conversation: &[Message]) -> Result<i64, PersistenceError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(query_error("save-begin"))?;

        let session_id = sqlx::query("INSERT INTO sessions DEFAULT VALUES")
            .execute(&mut *tx)
            .await
            .map_err(query_error("save-insert-session"))?
            .last_insert_rowid();

        for (position, message) in conversation.iter().enumerate() {
            sqlx::query(
                "INSERT INTO conversations (session_id, position, role, content) VALUES (?, ?, ?, ?)",
            )
            .bind(session_id)
            .bind(position as i64)
            .bind(message.role.as_str())
            .bind(&message.content)
            .execute(&mut *tx)
            .await
            .map_err(query_error("save-insert-message"))?;
        }

        tx.commit().await.map_err(query_error("save-commit"))?;
        debug!(session_id, messages = conversation.len(), "session saved");
        Ok(session_id)
    }
}
