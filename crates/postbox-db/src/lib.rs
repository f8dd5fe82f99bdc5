pub mod error;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod seed;

pub use error::{Error, Result};
pub use models::{Identity, Message, User};

use rusqlite::Connection;
use std::path::PathBuf;
use tracing::debug;

pub const DEFAULT_DB_PATH: &str = "postbox.db";

/// Where the database lives. Built once at startup and handed to [`Database::new`].
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

/// Connection factory. Every call hands out a fresh connection that is
/// closed when dropped.
pub struct Database {
    config: DbConfig,
}

impl Database {
    pub fn new(config: DbConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    pub fn connect(&self) -> Result<Connection> {
        let path = &self.config.path;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        configure(&conn)?;

        debug!("Database connection opened at {}", path.display());
        Ok(conn)
    }

    /// Run `f` on a connection acquired for this call only.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.connect()?;
        f(&conn)
    }

    /// Create the tables if they are missing.
    pub fn init(&self) -> Result<()> {
        self.with_conn(migrations::run)
    }
}

/// Migrated in-memory database, mostly for tests.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure(&conn)?;
    migrations::run(&conn)?;
    Ok(conn)
}

fn configure(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("test.db");
        let db = Database::new(DbConfig { path: path.clone() });

        db.init().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn data_survives_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig {
            path: dir.path().join("test.db"),
        });
        db.init().unwrap();

        let id = db
            .with_conn(|conn| {
                let mut user = User::new("carol", "pw");
                user.save(conn)?;
                Ok(user.id())
            })
            .unwrap()
            .id()
            .unwrap();

        let loaded = db.with_conn(|conn| User::load_by_id(conn, id)).unwrap();
        assert_eq!(loaded.unwrap().username, "carol");
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let conn = open_in_memory().unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn unreachable_database_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a database file.
        let db = Database::new(DbConfig {
            path: dir.path().to_path_buf(),
        });
        assert!(matches!(db.init(), Err(Error::Sqlite(_))));
    }

    #[test]
    fn closure_errors_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig {
            path: dir.path().join("test.db"),
        });

        // No tables yet: the query fails inside the closure.
        let result = db.with_conn(User::load_all);
        assert!(matches!(result, Err(Error::Sqlite(_))));
    }
}
