//! Database layer for the task board.

pub mod tasks;

use anyhow::{Result, anyhow};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Where the store lives, parsed from a connection URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUri {
    Memory,
    File(PathBuf),
}

impl DatabaseUri {
    /// Parse `sqlite::memory:`, `sqlite://<path>`, `sqlite:<path>` or a bare path.
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(anyhow!("database URI is empty"));
        }
        if uri == "sqlite::memory:" || uri == ":memory:" {
            return Ok(DatabaseUri::Memory);
        }
        let path = uri
            .strip_prefix("sqlite://")
            .or_else(|| uri.strip_prefix("sqlite:"))
            .unwrap_or(uri);
        if path.is_empty() {
            return Err(anyhow!("database URI has no path: {}", uri));
        }
        if let Some((scheme, _)) = path.split_once("://") {
            return Err(anyhow!("unsupported database scheme: {}", scheme));
        }
        Ok(DatabaseUri::File(PathBuf::from(path)))
    }
}

/// Database handle wrapping a SQLite connection.
///
/// Constructed once at startup and shared by cloning; `close` ends its life.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open the store named by a connection URI.
    pub fn connect(uri: &str) -> Result<Self> {
        match DatabaseUri::parse(uri)? {
            DatabaseUri::Memory => Self::open_in_memory(),
            DatabaseUri::File(path) => Self::open(path),
        }
    }

    /// Open or create the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA busy_timeout=5000;",
        )?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.run_migrations()?;
        debug!(path = %path.display(), "database opened");

        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.run_migrations()?;

        Ok(db)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection mutex poisoned"))
    }

    fn run_migrations(&self) -> Result<()> {
        let mut conn = self.lock()?;
        embedded::migrations::runner().run(&mut *conn)?;
        Ok(())
    }

    /// Execute a function with exclusive access to the connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Close the connection.
    ///
    /// Fails when other clones of the handle are still alive.
    pub fn close(self) -> Result<()> {
        let mutex = Arc::try_unwrap(self.conn)
            .map_err(|_| anyhow!("database handle is still shared"))?;
        let conn = mutex
            .into_inner()
            .map_err(|_| anyhow!("database connection mutex poisoned"))?;
        conn.close().map_err(|(_, err)| err)?;
        debug!("database closed");
        Ok(())
    }
}

/// Get the current timestamp in milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
