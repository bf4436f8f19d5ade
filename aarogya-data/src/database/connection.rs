//! Database connection module for the Aarogya Sahayak backend
//!
//! Manages a process-wide SQLite connection pool. The pool is created once at
//! startup from an explicit `DatabaseConfig` and shared by every repository.

use std::env;
use std::sync::Arc;
use once_cell::sync::OnceCell;
use r2d2_sqlite::SqliteConnectionManager;
use tracing::{error, info};

use super::{schema, DatabaseError};

/// SQLite connection pool type used throughout the data layer
pub type SqlitePool = r2d2::Pool<SqliteConnectionManager>;

/// Global database pool used throughout the application
static DB_POOL: OnceCell<Arc<SqlitePool>> = OnceCell::new();

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub sqlite_path: String,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Connection acquisition timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: "./data/aarogya.db".to_string(),
            max_connections: 10,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Build a database configuration from environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let sqlite_path = env::var("DB_SQLITE_PATH").unwrap_or(defaults.sqlite_path);

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults.max_connections);

        let timeout_seconds = env::var("DB_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.timeout_seconds);

        Self {
            sqlite_path,
            max_connections,
            timeout_seconds,
        }
    }
}

/// Initialize the global database pool from environment configuration.
///
/// Creates the SQLite file (and pool) if necessary and sets up the schema.
/// Calling this twice is an error.
pub fn initialize_database_pool() -> Result<(), DatabaseError> {
    let config = DatabaseConfig::from_env();
    initialize_database_pool_with_config(&config)
}

/// Initialize the global database pool from an explicit configuration
pub fn initialize_database_pool_with_config(config: &DatabaseConfig) -> Result<(), DatabaseError> {
    if DB_POOL.get().is_some() {
        return Err(DatabaseError::PoolAlreadyInitialized);
    }

    info!("Initializing SQLite pool at {}", config.sqlite_path);

    let manager = SqliteConnectionManager::file(&config.sqlite_path);
    let pool = r2d2::Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(std::time::Duration::from_secs(config.timeout_seconds))
        .build(manager)?;

    // Run schema setup on a fresh connection before publishing the pool
    {
        let conn = pool.get()?;
        schema::create_schema(&conn).map_err(DatabaseError::SchemaError)?;
    }

    DB_POOL
        .set(Arc::new(pool))
        .map_err(|_| DatabaseError::PoolAlreadyInitialized)?;

    info!("Database pool initialized");
    Ok(())
}

/// Initialize an in-memory database pool, used by tests
pub fn initialize_in_memory_pool() -> Result<(), DatabaseError> {
    if DB_POOL.get().is_some() {
        // Tests share the process; a pool from an earlier test is fine
        return Ok(());
    }

    let manager = SqliteConnectionManager::memory();
    let pool = r2d2::Pool::builder().max_size(1).build(manager)?;

    {
        let conn = pool.get()?;
        schema::create_schema(&conn).map_err(DatabaseError::SchemaError)?;
    }

    DB_POOL
        .set(Arc::new(pool))
        .map_err(|_| DatabaseError::PoolAlreadyInitialized)?;

    Ok(())
}

/// Get a handle to the global database pool
pub fn get_db_pool() -> Result<Arc<SqlitePool>, DatabaseError> {
    match DB_POOL.get() {
        Some(pool) => Ok(pool.clone()),
        None => {
            error!("Database pool requested before initialization");
            Err(DatabaseError::PoolNotInitialized)
        }
    }
}

/// Check whether the database is reachable by running a trivial query
pub fn check_database_connection() -> Result<(), DatabaseError> {
    let pool = get_db_pool()?;
    let conn = pool.get()?;
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.timeout_seconds, 30);
        assert!(config.sqlite_path.ends_with("aarogya.db"));
    }

    #[test]
    fn test_in_memory_pool_round_trip() {
        initialize_in_memory_pool().unwrap();
        let pool = get_db_pool().unwrap();
        let conn = pool.get().unwrap();
        let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0)).unwrap();
        assert_eq!(one, 1);
    }
}
