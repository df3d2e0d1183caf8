use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::info;

/// Thin wrapper around the SQLite connection pool backing the Store.
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn new(db_path: &str) -> Result<Self> {
        if db_path != ":memory:"
            && let Some(parent) = Path::new(db_path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)
                .await
                .context("failed to create database directory")?;
        }

        // SQLite's `:memory:` database is private to the connection that
        // opened it; pooling more than one connection would scatter state
        // across independent, unsynchronized databases. Pin the pool to a
        // single connection in that mode (only used by tests).
        let (options, max_connections) = if db_path == ":memory:" {
            (SqliteConnectOptions::from_str("sqlite::memory:")?, 1)
        } else {
            (
                SqliteConnectOptions::from_str(&format!("sqlite://{db_path}"))?
                    .create_if_missing(true)
                    .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal),
                5,
            )
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("failed to connect to SQLite database")?;

        info!("connected to database at {}", db_path);

        let db = Self { pool };
        db.init().await?;
        Ok(db)
    }

    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS instruments (
                symbol TEXT PRIMARY KEY,
                display_name TEXT NOT NULL,
                price TEXT NOT NULL,
                previous_price TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to create instruments table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS portfolios (
                team TEXT PRIMARY KEY,
                cash TEXT NOT NULL,
                last_updated TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to create portfolios table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS holdings (
                team TEXT NOT NULL,
                symbol TEXT NOT NULL,
                qty INTEGER NOT NULL,
                PRIMARY KEY (team, symbol)
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to create holdings table")?;

        info!("database schema initialized");
        Ok(())
    }
}
