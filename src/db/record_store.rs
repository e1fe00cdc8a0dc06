// src/db/record_store.rs

use std::{collections::HashMap, sync::Arc};

use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::KvRepository,
    models::{
        auth::{User, UserProfile},
        bank::Bank,
        file::ValuationFile,
        invoice::Invoice,
    },
};

pub const FILES_KEY: &str = "files";
pub const INVOICES_KEY: &str = "invoices";
pub const BANKS_KEY: &str = "banks";
pub const USERS_KEY: &str = "users";
pub const CURRENT_USER_KEY: &str = "currentUser";

/// In-memory copy of every persisted collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collections {
    pub files: Vec<ValuationFile>,
    pub invoices: Vec<Invoice>,
    pub banks: Vec<Bank>,
    pub users: Vec<User>,
}

/// An entity kind stored as one JSON array under `KEY`.
pub trait Record: Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KEY: &'static str;
    const LABEL: &'static str;

    fn id(&self) -> Uuid;
    fn slot(collections: &Collections) -> &Vec<Self>;
    fn slot_mut(collections: &mut Collections) -> &mut Vec<Self>;
}

impl Record for ValuationFile {
    const KEY: &'static str = FILES_KEY;
    const LABEL: &'static str = "File";

    fn id(&self) -> Uuid {
        self.id
    }
    fn slot(collections: &Collections) -> &Vec<Self> {
        &collections.files
    }
    fn slot_mut(collections: &mut Collections) -> &mut Vec<Self> {
        &mut collections.files
    }
}

impl Record for Invoice {
    const KEY: &'static str = INVOICES_KEY;
    const LABEL: &'static str = "Invoice";

    fn id(&self) -> Uuid {
        self.id
    }
    fn slot(collections: &Collections) -> &Vec<Self> {
        &collections.invoices
    }
    fn slot_mut(collections: &mut Collections) -> &mut Vec<Self> {
        &mut collections.invoices
    }
}

impl Record for Bank {
    const KEY: &'static str = BANKS_KEY;
    const LABEL: &'static str = "Bank";

    fn id(&self) -> Uuid {
        self.id
    }
    fn slot(collections: &Collections) -> &Vec<Self> {
        &collections.banks
    }
    fn slot_mut(collections: &mut Collections) -> &mut Vec<Self> {
        &mut collections.banks
    }
}

impl Record for User {
    const KEY: &'static str = USERS_KEY;
    const LABEL: &'static str = "User";

    fn id(&self) -> Uuid {
        self.id
    }
    fn slot(collections: &Collections) -> &Vec<Self> {
        &collections.users
    }
    fn slot_mut(collections: &mut Collections) -> &mut Vec<Self> {
        &mut collections.users
    }
}

#[derive(Default)]
struct StoreState {
    collections: Collections,
    // Version of each key as last loaded or written by this process
    versions: HashMap<&'static str, i64>,
}

impl StoreState {
    fn version(&self, key: &str) -> i64 {
        self.versions.get(key).copied().unwrap_or(0)
    }
}

// Single owner of the record collections. Every mutation goes through
// `transact`, which holds the lock from read to write, so numbers derived
// inside a transaction cannot collide.
#[derive(Clone)]
pub struct RecordStore {
    repo: KvRepository,
    state: Arc<Mutex<StoreState>>,
}

impl RecordStore {
    pub async fn load(repo: KvRepository) -> Result<Self, AppError> {
        let store = Self {
            repo,
            state: Arc::new(Mutex::new(StoreState::default())),
        };

        {
            let mut state = store.state.lock().await;
            store.load_slot::<ValuationFile>(&mut state).await?;
            store.load_slot::<Invoice>(&mut state).await?;
            store.load_slot::<Bank>(&mut state).await?;
            store.load_slot::<User>(&mut state).await?;

            tracing::info!(
                "Record store loaded: {} files, {} invoices, {} banks, {} users",
                state.collections.files.len(),
                state.collections.invoices.len(),
                state.collections.banks.len(),
                state.collections.users.len(),
            );
        }

        Ok(store)
    }

    // ====================================================================
    // READS
    // ====================================================================

    pub async fn read<R>(&self, f: impl FnOnce(&Collections) -> R) -> R {
        let state = self.state.lock().await;
        f(&state.collections)
    }

    pub async fn list<T: Record>(&self) -> Vec<T> {
        self.read(|c| T::slot(c).clone()).await
    }

    pub async fn get<T: Record>(&self, id: Uuid) -> Option<T> {
        self.read(|c| T::slot(c).iter().find(|r| r.id() == id).cloned())
            .await
    }

    // ====================================================================
    // WRITES
    // ====================================================================

    /// Runs `f` against a copy of the collections and persists whatever it
    /// changed. If `f` or the write fails, nothing is applied.
    pub async fn transact<R>(
        &self,
        f: impl FnOnce(&mut Collections) -> Result<R, AppError>,
    ) -> Result<R, AppError> {
        let mut state = self.state.lock().await;

        // Pick up writes from other processes before deriving anything
        self.refresh_locked(&mut state).await?;

        let mut draft = state.collections.clone();
        let result = f(&mut draft)?;

        let mut changed: Vec<(&'static str, String)> = Vec::new();
        push_if_changed::<ValuationFile>(&state.collections, &draft, &mut changed)?;
        push_if_changed::<Invoice>(&state.collections, &draft, &mut changed)?;
        push_if_changed::<Bank>(&state.collections, &draft, &mut changed)?;
        push_if_changed::<User>(&state.collections, &draft, &mut changed)?;

        if !changed.is_empty() {
            let entries: Vec<(&str, String)> =
                changed.iter().map(|(k, v)| (*k, v.clone())).collect();
            let versions = self.repo.put_many(&entries).await?;
            for ((key, _), version) in changed.iter().zip(versions) {
                state.versions.insert(*key, version);
            }
        }

        state.collections = draft;
        Ok(result)
    }

    pub async fn add<T: Record>(&self, record: T) -> Result<T, AppError> {
        self.transact(move |c| {
            T::slot_mut(c).push(record.clone());
            Ok(record)
        })
        .await
    }

    pub async fn update<T: Record>(&self, record: T) -> Result<T, AppError> {
        self.transact(move |c| {
            let slot = T::slot_mut(c);
            let existing = slot
                .iter_mut()
                .find(|r| r.id() == record.id())
                .ok_or(AppError::NotFound(T::LABEL))?;
            *existing = record.clone();
            Ok(record)
        })
        .await
    }

    pub async fn remove<T: Record>(&self, id: Uuid) -> Result<T, AppError> {
        self.transact(move |c| {
            let slot = T::slot_mut(c);
            let index = slot
                .iter()
                .position(|r| r.id() == id)
                .ok_or(AppError::NotFound(T::LABEL))?;
            Ok(slot.remove(index))
        })
        .await
    }

    // ====================================================================
    // CROSS-PROCESS SYNC
    // ====================================================================

    /// Reloads every collection whose stored version is newer than ours.
    /// Last writer wins: the whole collection is replaced.
    pub async fn refresh(&self) -> Result<Vec<&'static str>, AppError> {
        let mut state = self.state.lock().await;
        self.refresh_locked(&mut state).await
    }

    async fn refresh_locked(&self, state: &mut StoreState) -> Result<Vec<&'static str>, AppError> {
        let mut refreshed = Vec::new();
        if self.reload_if_newer::<ValuationFile>(state).await? {
            refreshed.push(FILES_KEY);
        }
        if self.reload_if_newer::<Invoice>(state).await? {
            refreshed.push(INVOICES_KEY);
        }
        if self.reload_if_newer::<Bank>(state).await? {
            refreshed.push(BANKS_KEY);
        }
        if self.reload_if_newer::<User>(state).await? {
            refreshed.push(USERS_KEY);
        }
        Ok(refreshed)
    }

    async fn reload_if_newer<T: Record>(&self, state: &mut StoreState) -> Result<bool, AppError> {
        let stored = self.repo.version(T::KEY).await?;
        if stored <= state.version(T::KEY) {
            return Ok(false);
        }
        *T::slot_mut(&mut state.collections) = self.fetch::<T>().await?;
        state.versions.insert(T::KEY, stored);
        Ok(true)
    }

    async fn load_slot<T: Record>(&self, state: &mut StoreState) -> Result<(), AppError> {
        let version = self.repo.version(T::KEY).await?;
        *T::slot_mut(&mut state.collections) = self.fetch::<T>().await?;
        state.versions.insert(T::KEY, version);
        Ok(())
    }

    // Absent key reads as an empty collection. So does malformed JSON,
    // which is logged and left in place until the next write.
    async fn fetch<T: Record>(&self) -> Result<Vec<T>, AppError> {
        let Some(raw) = self.repo.get(T::KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                tracing::error!("Malformed data under '{}', using an empty collection: {}", T::KEY, e);
                Ok(Vec::new())
            }
        }
    }

    // ====================================================================
    // SESSION
    // ====================================================================

    pub async fn set_current_user(&self, user: Option<&UserProfile>) -> Result<(), AppError> {
        match user {
            Some(profile) => {
                self.repo
                    .put(CURRENT_USER_KEY, serde_json::to_string(profile)?)
                    .await?;
            }
            None => self.repo.remove(CURRENT_USER_KEY).await?,
        }
        Ok(())
    }

    pub async fn current_user(&self) -> Result<Option<UserProfile>, AppError> {
        let Some(raw) = self.repo.get(CURRENT_USER_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                tracing::error!("Malformed data under '{}': {}", CURRENT_USER_KEY, e);
                Ok(None)
            }
        }
    }
}

fn push_if_changed<T: Record>(
    before: &Collections,
    after: &Collections,
    out: &mut Vec<(&'static str, String)>,
) -> Result<(), AppError> {
    let records = T::slot(after);
    if T::slot(before) != records {
        out.push((T::KEY, serde_json::to_string(records)?));
    }
    Ok(())
}
