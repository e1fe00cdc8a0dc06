// src/services/fixtures.rs

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    db::{KvRepository, RecordStore, test_pool},
    models::auth::{Role, User},
};

pub fn user(full_name: &str, role: Role) -> User {
    let now = Utc::now();
    User {
        id: Uuid::now_v7(),
        username: full_name.to_lowercase().replace(' ', "."),
        password_hash: String::new(),
        full_name: full_name.into(),
        email: None,
        phone: None,
        address: None,
        role,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub async fn store() -> RecordStore {
    RecordStore::load(KvRepository::new(test_pool().await))
        .await
        .expect("record store")
}

// Inside FY 2025-26
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).expect("date")
}
