//! In-memory [`RecordStore`] for orchestrator tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use db::DbError;
use provisioning::Configuration;

use crate::store::RecordStore;

pub const GET_BY_ID: &str = "get_by_id";
pub const INSERT: &str = "insert";
pub const UPDATE: &str = "update";
pub const DELETE: &str = "delete";

/// What a failing store operation should return.
#[derive(Debug, Clone, Copy)]
pub enum StoreFailure {
    Conflict,
    Unavailable,
}

impl StoreFailure {
    fn to_error(self) -> DbError {
        match self {
            Self::Conflict => DbError::Conflict,
            Self::Unavailable => DbError::Sqlx(sqlx::Error::PoolTimedOut),
        }
    }
}

#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<HashMap<String, Configuration>>,
    calls: Mutex<Vec<&'static str>>,
    failures: Mutex<HashMap<&'static str, StoreFailure>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `cfg`.
    pub fn with_record(cfg: Configuration) -> Self {
        let store = Self::default();
        store.records.lock().unwrap().insert(cfg.id.clone(), cfg);
        store
    }

    pub fn fail_on(self, operation: &'static str, failure: StoreFailure) -> Self {
        self.failures.lock().unwrap().insert(operation, failure);
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == operation).count()
    }

    pub fn record(&self, id: &str) -> Option<Configuration> {
        self.records.lock().unwrap().get(id).cloned()
    }

    fn enter(&self, operation: &'static str) -> Result<(), DbError> {
        self.calls.lock().unwrap().push(operation);
        match self.failures.lock().unwrap().get(operation) {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get_by_id(&self, id: &str) -> Result<Option<Configuration>, DbError> {
        self.enter(GET_BY_ID)?;
        Ok(self.record(id))
    }

    async fn insert(&self, cfg: &Configuration) -> Result<Configuration, DbError> {
        self.enter(INSERT)?;
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&cfg.id) {
            return Err(DbError::Conflict);
        }
        let mut stored = cfg.clone();
        let now = Utc::now();
        stored.created_at = Some(now);
        stored.updated_at = Some(now);
        records.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn update(&self, cfg: &Configuration) -> Result<Configuration, DbError> {
        self.enter(UPDATE)?;
        let mut records = self.records.lock().unwrap();
        let existing = records.get_mut(&cfg.id).ok_or(DbError::NotFound)?;

        let created_at = existing.created_at;
        *existing = cfg.clone();
        existing.created_at = created_at;
        existing.updated_at = Some(Utc::now());
        Ok(existing.clone())
    }

    async fn delete(&self, cfg: &Configuration) -> Result<(), DbError> {
        self.enter(DELETE)?;
        self.records
            .lock()
            .unwrap()
            .remove(&cfg.id)
            .map(|_| ())
            .ok_or(DbError::NotFound)
    }
}
