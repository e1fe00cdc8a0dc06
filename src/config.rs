// src/config.rs

use anyhow::Context;
use chrono::{FixedOffset, NaiveDate, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use std::{env, str::FromStr, time::Duration};

use crate::{
    db::{KvRepository, RecordStore},
    services::{AuthService, BankService, FileService, InvoiceService, UserService},
};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub sync_interval: Duration,
    pub files_page_size: usize,
    pub utc_offset_minutes: i32,
    pub admin_username: String,
    pub admin_password: Option<String>,
    pub admin_full_name: String,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        Ok(Self {
            database_url: var_or("DATABASE_URL", "sqlite://valuation-desk.db?mode=rwc"),
            jwt_secret,
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:3000"),
            sync_interval: Duration::from_secs(parse_var("SYNC_INTERVAL_SECS", 5u64)?),
            files_page_size: parse_var("FILES_PAGE_SIZE", 15usize)?,
            utc_offset_minutes: parse_var("UTC_OFFSET_MINUTES", 330i32)?,
            admin_username: var_or("ADMIN_USERNAME", "admin"),
            admin_password: env::var("ADMIN_PASSWORD").ok().filter(|p| !p.is_empty()),
            admin_full_name: var_or("ADMIN_FULL_NAME", "Administrator"),
        })
    }

    /// Today's date at the configured office offset (IST by default).
    pub fn today(&self) -> NaiveDate {
        let now = Utc::now();
        match FixedOffset::east_opt(self.utc_offset_minutes * 60) {
            Some(offset) => now.with_timezone(&offset).date_naive(),
            // out of range offsets fall back to UTC
            None => now.date_naive(),
        }
    }
}

// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: RecordStore,
    pub auth_service: AuthService,
    pub file_service: FileService,
    pub invoice_service: InvoiceService,
    pub bank_service: BankService,
    pub user_service: UserService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = Config::from_env()?;

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .with_context(|| format!("Could not open {}", config.database_url))?;
        tracing::info!("✅ Database connection established");

        sqlx::migrate!().run(&pool).await?;
        tracing::info!("✅ Migrations applied");

        let store = RecordStore::load(KvRepository::new(pool)).await?;
        Ok(Self::with_store(config, store))
    }

    // --- Assemble the dependency graph ---
    pub fn with_store(config: Config, store: RecordStore) -> Self {
        Self {
            auth_service: AuthService::new(store.clone(), config.jwt_secret.clone()),
            file_service: FileService::new(store.clone()),
            invoice_service: InvoiceService::new(store.clone()),
            bank_service: BankService::new(store.clone()),
            user_service: UserService::new(store.clone()),
            store,
            config,
        }
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            jwt_secret: "test-secret".into(),
            bind_addr: "127.0.0.1:0".into(),
            sync_interval: Duration::from_secs(5),
            files_page_size: 15,
            utc_offset_minutes: 330,
            admin_username: "admin".into(),
            admin_password: Some("s3cret!".into()),
            admin_full_name: "Administrator".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn today_follows_the_configured_offset() {
        let mut config = Config::for_tests();
        config.utc_offset_minutes = 0;
        assert_eq!(config.today(), Utc::now().date_naive());
    }
}
