//! SQLite file behind the durable job store.
//!
//! One connection per process, shared through a mutex; every status table
//! is migrated when the database is opened.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

pub mod error;
pub mod job_repo;
pub mod migrations;

pub use error::DatabaseError;

const FILE_PRAGMAS: &str = "PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;";

/// Shared handle to the status database. Clones point at the same
/// connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens the file at `path`, creating missing parent directories, and
    /// brings `table` up to the latest migration.
    pub fn open(path: &Path, table: &str) -> Result<Self, DatabaseError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| DatabaseError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(FILE_PRAGMAS)?;
        let db = Self::migrated(conn, table)?;

        log::info!("Job status database ready at {} (table {})", path.display(), table);
        Ok(db)
    }

    /// Private database that disappears with the handle.
    pub fn open_in_memory(table: &str) -> Result<Self, DatabaseError> {
        Self::migrated(Connection::open_in_memory()?, table)
    }

    fn migrated(conn: Connection, table: &str) -> Result<Self, DatabaseError> {
        migrations::run_all(&conn, table)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }

    /// Runs `f` while holding the connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Connection) -> Result<T, DatabaseError>,
    {
        let guard = self.lock()?;
        f(&guard)
    }
}

/// `~/.kompare/data/profiling.db`, or `None` without a home directory.
pub fn default_database_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".kompare").join("data").join("profiling.db"))
}
