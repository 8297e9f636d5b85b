//! SQLite cooldown persistence.
//!
//! One row per alert key. `save` replaces the whole table inside a single
//! transaction, which gives the same all-or-nothing visibility as the JSON
//! file's rename.
use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use super::{CooldownPersistence, RawCooldowns};

pub struct SqliteCooldownStore {
    pool: SqlitePool,
}

impl SqliteCooldownStore {
    pub async fn from_pool(pool: SqlitePool) -> anyhow::Result<Self> {
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Opens (creating if needed) a database file.
    pub async fn open(path: &Path) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    /// Private in-memory database. Single connection, because every
    /// connection to `:memory:` is a distinct database.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS alert_cooldowns (
                key TEXT PRIMARY KEY,
                fired_at TEXT NOT NULL
            );
        "#,
        )
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl CooldownPersistence for SqliteCooldownStore {
    async fn load(&self) -> anyhow::Result<RawCooldowns> {
        let rows = sqlx::query("SELECT key, fired_at FROM alert_cooldowns")
            .fetch_all(&self.pool)
            .await?;

        let mut records = RawCooldowns::new();
        for row in rows {
            let key: String = row.try_get("key")?;
            let fired_at: String = row.try_get("fired_at")?;
            records.insert(key, fired_at);
        }

        Ok(records)
    }

    async fn save(&self, records: &RawCooldowns) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM alert_cooldowns")
            .execute(&mut *tx)
            .await?;

        for (key, fired_at) in records {
            sqlx::query("INSERT INTO alert_cooldowns (key, fired_at) VALUES (?, ?)")
                .bind(key)
                .bind(fired_at)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
