pub mod models;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::state::DbPool;

pub const MIGRATIONS: &[(&str, &str)] = &[(
    "001_initial",
    include_str!("../../migrations/001_initial.sql"),
)];

const MEMORY_URI: &str = ":memory:";

/// Open a connection pool for the configured database.
///
/// Connections are established eagerly, so an unreachable or unwritable
/// database fails here rather than on the first request.
pub fn create_pool(config: &DatabaseConfig) -> anyhow::Result<DbPool> {
    let location = config
        .uri
        .strip_prefix("sqlite://")
        .unwrap_or(&config.uri);

    let (manager, max_size) = if location == MEMORY_URI {
        // Every in-memory connection is its own database; keep exactly one.
        (SqliteConnectionManager::memory(), 1)
    } else {
        let db_path = Path::new(location);
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        (SqliteConnectionManager::file(db_path), config.pool_size.max(1))
    };

    let manager = manager.with_init(|conn| {
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
            ",
        )
    });

    let mut builder = Pool::builder()
        .max_size(max_size)
        .connection_timeout(Duration::from_secs(config.connection_timeout_secs));
    if location == MEMORY_URI {
        // Recycling the only connection would discard the database.
        builder = builder.idle_timeout(None).max_lifetime(None);
    }
    let pool = builder.build(manager)?;

    if location != MEMORY_URI {
        let conn = pool.get()?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;
    }

    tracing::info!("Database pool ready ({} connections) at {}", max_size, location);
    Ok(pool)
}

/// Apply the bundled schema. Already-applied scripts are skipped.
pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    let conn = pool.get()?;

    // Create migrations tracking table
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM schema_version WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;

        if !already_applied {
            tracing::info!("Applying migration: {}", name);
            conn.execute_batch(sql)?;
            conn.execute(
                "INSERT INTO schema_version (name) VALUES (?1)",
                params![name],
            )?;
        }
    }

    tracing::info!("Database migrations complete");
    Ok(())
}

/// Fresh in-memory database with the schema applied.
#[cfg(test)]
pub(crate) fn test_pool() -> DbPool {
    let config = DatabaseConfig {
        uri: MEMORY_URI.to_string(),
        ..DatabaseConfig::default()
    };
    let pool = create_pool(&config).unwrap();
    run_migrations(&pool).unwrap();
    pool
}
