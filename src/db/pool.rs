//! Connection pool for the review database.
//!
//! Every connection runs in WAL journal mode with foreign keys enforced, so
//! readers never block on the single writer and reviewer rows cannot point
//! at unknown users or pull requests.

use crate::config::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::time::Duration;

pub type DbPool = Pool<Sqlite>;

/// How long a request waits for a free pooled connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-connection settings derived from `config`.
fn connect_options(config: &DatabaseConfig) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(&config.path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(config.busy_timeout_secs))
        .pragma("wal_autocheckpoint", "1000")
}

/// Open a pool on `config.path`.
///
/// The parent directory must already exist; only the file itself is
/// created.
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(1)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(connect_options(config))
        .await?;

    let (mode,): (String,) = sqlx::query_as("PRAGMA journal_mode")
        .fetch_one(&pool)
        .await?;
    if !mode.eq_ignore_ascii_case("wal") {
        log::warn!("[db] Expected WAL journal mode, SQLite reports {}", mode);
    }

    log::debug!(
        "[db] Pool opened on {} (max {} connections)",
        config.path.display(),
        config.max_connections
    );

    Ok(pool)
}
