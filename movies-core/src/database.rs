use crate::common::error::{MovieError, Result};
use libsql::{Builder, Connection, Database};
use std::fs;
use std::path::Path;
use tracing::info;

/// SQLite reports a broken `REFERENCES` clause with this message, locally and over Hrana.
pub(crate) fn is_foreign_key_violation(e: &libsql::Error) -> bool {
    e.to_string().contains("FOREIGN KEY constraint failed")
}

/// Maps a libSQL failure into [`MovieError::Database`] with some context.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(libsql::Error) -> MovieError {
    move |e| MovieError::Database {
        message: format!("{context}: {e}"),
    }
}

pub struct DatabaseManager {
    db: Database,
}

impl DatabaseManager {
    /// Opens a database from a connection string.
    ///
    /// `libsql://`, `https://` and `http://` urls go to a remote Turso server and
    /// need an auth token; anything else is treated as a local file path.
    pub async fn connect(url: &str, auth_token: Option<&str>) -> Result<Self> {
        let is_remote = ["libsql://", "https://", "http://"]
            .iter()
            .any(|scheme| url.starts_with(scheme));

        let db = if is_remote {
            let token = auth_token.ok_or_else(|| MovieError::Database {
                message: format!("auth token required for remote database {url}"),
            })?;
            info!("Connecting to Turso database at {}", url);
            Builder::new_remote(url.to_string(), token.to_string())
                .build()
                .await
                .map_err(db_error("Failed to connect to database"))?
        } else {
            if let Some(parent) = Path::new(url).parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            info!("Opening local database at {}", url);
            Builder::new_local(url)
                .build()
                .await
                .map_err(db_error("Failed to open local database"))?
        };

        Ok(Self { db })
    }

    /// Get a connection with foreign keys enforced
    pub async fn get_connection(&self) -> Result<Connection> {
        let conn = self
            .db
            .connect()
            .map_err(db_error("Failed to get database connection"))?;

        conn.execute("PRAGMA foreign_keys = ON", libsql::params![])
            .await
            .map_err(db_error("Failed to enable foreign keys"))?;

        Ok(conn)
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations...");

        let conn = self.get_connection().await?;

        let migration_sql_001 = include_str!("../migrations/001_create_people_and_movies.sql");
        conn.execute_batch(migration_sql_001)
            .await
            .map_err(db_error("Failed to run base migration"))?;

        let migration_sql_002 = include_str!("../migrations/002_indexes.sql");
        conn.execute_batch(migration_sql_002)
            .await
            .map_err(db_error("Failed to run index migration"))?;

        info!("Database migrations completed successfully");
        Ok(())
    }
}
