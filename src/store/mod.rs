// Persistence layer for the value table and the action log

pub mod action_log;
pub mod value_table;

pub use action_log::{ActionLog, ActionRecord};
pub use value_table::ValueTable;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tracing::debug;

use crate::error::MagpieResult;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS value_table (
    bucket TEXT NOT NULL,
    action TEXT NOT NULL,
    value  REAL NOT NULL,
    PRIMARY KEY (bucket, action)
);
CREATE TABLE IF NOT EXISTS action_log (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    recorded_at  TEXT NOT NULL,
    bucket       TEXT NOT NULL,
    action       TEXT NOT NULL,
    interactions INTEGER NOT NULL
);
";

/// Handle on the agent's SQLite database
#[derive(Debug, Clone)]
pub struct Store {
    /// Path to the database file
    path: PathBuf,
    /// Connection to the database
    connection: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open the database, creating the schema if it does not exist yet.
    /// `None` opens an in-memory database.
    ///
    /// Schema creation covers tables only; value rows are never seeded here.
    pub fn open(path: Option<impl AsRef<Path>>) -> MagpieResult<Self> {
        let (path, conn) = match path {
            Some(path) => {
                let path_buf = PathBuf::from(path.as_ref());
                debug!("Opening database connection to {}", path_buf.display());
                (path_buf.clone(), Connection::open(&path_buf)?)
            }
            None => {
                debug!("Opening in-memory database connection");
                (PathBuf::from(":memory:"), Connection::open_in_memory()?)
            }
        };

        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run a closure against the locked connection
    pub(crate) fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> MagpieResult<T>,
    ) -> MagpieResult<T> {
        let conn = self.connection.lock().unwrap();
        f(&conn)
    }
}
