pub mod kv_repo;
pub use kv_repo::KvRepository;
pub mod record_store;
pub use record_store::{Collections, RecordStore};

// In-memory SQLite pool with the schema applied. One connection, since every
// `:memory:` connection is its own database.
#[cfg(test)]
pub async fn test_pool() -> sqlx::SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    sqlx::migrate!().run(&pool).await.expect("migrations");
    pool
}
