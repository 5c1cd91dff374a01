//! SQLite connection factory and schema bootstrap for Bookshelf.
//!
//! A single connection is shared behind an async mutex; SQLite serialises
//! writers anyway, and every repository call is one short statement.

use std::path::Path;
use std::sync::Arc;

use bookshelf_kernel::settings::DatabaseSettings;
use bookshelf_kernel::SchemaStatement;
use rusqlite::{Connection, ErrorCode};
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};

const IN_MEMORY_PATH: &str = ":memory:";

#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to open database at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("schema statement {module}/{id} failed: {source}")]
    Schema {
        module: String,
        id: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Returns true when `err` is a UNIQUE (or primary key) constraint failure.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.code == ErrorCode::ConstraintViolation
                && (failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
        }
        _ => false,
    }
}

/// Shared handle to the SQLite database.
#[derive(Clone)]
pub struct Database {
    path: Option<String>,
    connection: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open the database described by `settings`.
    pub fn connect(settings: &DatabaseSettings) -> Result<Self, DbError> {
        if settings.path == IN_MEMORY_PATH {
            Self::open_in_memory()
        } else {
            Self::open(Path::new(&settings.path))
        }
    }

    pub fn open(path: &Path) -> Result<Self, DbError> {
        let path_text = path.to_string_lossy().to_string();
        let conn = Connection::open(path).map_err(|source| DbError::Open {
            path: path_text.clone(),
            source,
        })?;
        apply_pragmas(&conn)?;

        tracing::info!(target: "bookshelf-db", path = %path_text, "database opened");

        Ok(Self {
            path: Some(path_text),
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory().map_err(|source| DbError::Open {
            path: IN_MEMORY_PATH.to_string(),
            source,
        })?;
        apply_pragmas(&conn)?;

        tracing::info!(target: "bookshelf-db", "in-memory database opened");

        Ok(Self {
            path: None,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Lock the shared connection.
    pub async fn connection(&self) -> MutexGuard<'_, Connection> {
        self.connection.lock().await
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Apply module schema statements inside a single transaction.
    pub async fn apply_schema(&self, statements: &[(String, SchemaStatement)]) -> Result<(), DbError> {
        let mut conn = self.connection().await;
        let tx = conn.transaction()?;

        for (module, statement) in statements {
            tracing::debug!(
                target: "bookshelf-db",
                module = %module,
                statement = statement.id,
                "applying schema statement"
            );
            tx.execute_batch(statement.sql)
                .map_err(|source| DbError::Schema {
                    module: module.clone(),
                    id: statement.id,
                    source,
                })?;
        }

        tx.commit()?;
        tracing::info!(target: "bookshelf-db", count = statements.len(), "schema applied");
        Ok(())
    }

    /// Cheap liveness probe.
    pub async fn ping(&self) -> Result<(), DbError> {
        let conn = self.connection().await;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}

fn apply_pragmas(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        ",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statements() -> Vec<(String, SchemaStatement)> {
        vec![(
            "things".to_string(),
            SchemaStatement {
                id: "001_things",
                sql: "CREATE TABLE IF NOT EXISTS things (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE);",
            },
        )]
    }

    #[tokio::test]
    async fn ping_succeeds_on_open_database() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.path().is_none());
        db.ping().await.unwrap();
    }

    #[tokio::test]
    async fn schema_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.apply_schema(&statements()).await.unwrap();
        db.apply_schema(&statements()).await.unwrap();
    }

    #[tokio::test]
    async fn broken_schema_statement_reports_its_id() {
        let db = Database::open_in_memory().unwrap();
        let broken = vec![(
            "things".to_string(),
            SchemaStatement {
                id: "001_broken",
                sql: "CREATE TABLE things (",
            },
        )];

        let err = db.apply_schema(&broken).await.unwrap_err();
        assert!(matches!(err, DbError::Schema { id: "001_broken", .. }));
    }

    #[tokio::test]
    async fn unique_violation_is_detected() {
        let db = Database::open_in_memory().unwrap();
        db.apply_schema(&statements()).await.unwrap();

        let conn = db.connection().await;
        conn.execute("INSERT INTO things (name) VALUES ('a')", []).unwrap();
        let err = conn
            .execute("INSERT INTO things (name) VALUES ('a')", [])
            .unwrap_err();
        assert!(is_unique_violation(&err));
        assert!(!is_unique_violation(&rusqlite::Error::QueryReturnedNoRows));
    }

    #[tokio::test]
    async fn file_database_reports_its_path() {
        let file = std::env::temp_dir().join(format!("bookshelf-db-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&file);

        let db = Database::open(&file).unwrap();
        assert_eq!(db.path(), Some(file.to_string_lossy().as_ref()));
        db.ping().await.unwrap();

        drop(db);
        let _ = std::fs::remove_file(&file);
    }

    #[test]
    fn connect_honours_in_memory_path() {
        let settings = DatabaseSettings {
            path: ":memory:".to_string(),
            ..DatabaseSettings::default()
        };
        let db = Database::connect(&settings).unwrap();
        assert!(db.path().is_none());
    }
}
