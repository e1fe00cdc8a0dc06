// src/db/kv_repo.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::common::error::AppError;

/// Row key of the write timestamp that accompanies `key`.
pub fn version_key(key: &str) -> String {
    format!("{}Version", key)
}

// Key-value table behind the record store. Each collection lives under its
// own key as a JSON document, next to a `{key}Version` row.
#[derive(Clone)]
pub struct KvRepository {
    pool: SqlitePool,
}

impl KvRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    /// Last write timestamp (ms) of `key`; 0 when never written.
    pub async fn version(&self, key: &str) -> Result<i64, AppError> {
        let raw = self.get(&version_key(key)).await?;
        Ok(parse_version(raw.as_deref()))
    }

    pub async fn put(&self, key: &str, value: String) -> Result<i64, AppError> {
        let versions = self.put_many(&[(key, value)]).await?;
        Ok(versions.first().copied().unwrap_or_default())
    }

    // Writes every value and its version in a single transaction.
    // Versions are strictly increasing per key even if the clock is not.
    pub async fn put_many(&self, entries: &[(&str, String)]) -> Result<Vec<i64>, AppError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now().timestamp_millis();
        let mut versions = Vec::with_capacity(entries.len());

        for (key, value) in entries {
            let vkey = version_key(key);
            let previous: Option<String> =
                sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?")
                    .bind(&vkey)
                    .fetch_optional(&mut *tx)
                    .await?;
            let version = now.max(parse_version(previous.as_deref()) + 1);

            upsert(&mut *tx, key, value).await?;
            upsert(&mut *tx, &vkey, &version.to_string()).await?;
            versions.push(version);
        }

        tx.commit().await?;
        Ok(versions)
    }

    pub async fn remove(&self, key: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM kv_store WHERE key = ? OR key = ?")
            .bind(key)
            .bind(version_key(key))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

async fn upsert<'e, E>(executor: E, key: &str, value: &str) -> Result<(), AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO kv_store (key, value, updated_at)
        VALUES (?, ?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        ON CONFLICT(key) DO UPDATE
        SET value = excluded.value,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(executor)
    .await?;
    Ok(())
}

fn parse_version(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}
