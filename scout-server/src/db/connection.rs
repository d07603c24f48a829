use anyhow::{Context, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use uuid::Uuid;

use super::schema::SCHEMA;

/// SQLite in-memory database identifier
const MEMORY_DB_PATH: &str = ":memory:";

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Database wrapper with connection pooling support
#[derive(Clone)]
pub struct Database {
    pub pool: DbPool,
}

impl Database {
    /// Create a new database connection pool
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let manager = Self::create_connection_manager(path)
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
        let pool = Pool::new(manager).context("Failed to create database connection pool")?;
        Ok(Self { pool })
    }

    /// Create appropriate connection manager based on path
    ///
    /// A plain `:memory:` database is private to each connection, so every
    /// pool gets its own named shared-cache database instead. All pooled
    /// connections then see the same tables.
    fn create_connection_manager<P: AsRef<Path>>(path: P) -> SqliteConnectionManager {
        let path_str = path.as_ref().to_string_lossy();
        let trimmed_path = path_str.trim();

        if trimmed_path.eq_ignore_ascii_case(MEMORY_DB_PATH) {
            let uri = format!("file:scout-{}?mode=memory&cache=shared", Uuid::new_v4());
            SqliteConnectionManager::file(uri)
        } else {
            SqliteConnectionManager::file(path)
        }
    }

    /// Create an in-memory database pool (useful for testing)
    pub fn in_memory() -> Result<Self> {
        Self::new(MEMORY_DB_PATH)
    }

    /// Initialize the database schema
    pub fn initialize(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    /// Get a connection from the pool
    pub fn connection(&self) -> Result<DbConnection> {
        self.pool
            .get()
            .context("Failed to get database connection from pool")
    }
}
