//! Record collection seam
//!
//! The media store persists records through this trait so the actual
//! document database client stays outside the core. The operations mirror
//! the collaborator contract: find-one, insert-one, find-one-and-update
//! with return-after semantics, and remove.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use clipforge_core::{AppError, AppResult, MediaRecord};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Update closure applied inside `find_one_and_update`.
pub type RecordUpdate<'a> = &'a (dyn Fn(&mut MediaRecord) + Send + Sync);

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_one(&self, id: Uuid) -> AppResult<Option<MediaRecord>>;

    async fn insert_one(&self, record: MediaRecord) -> AppResult<MediaRecord>;

    /// Apply `update` to the record and return the document *after* the
    /// update, or `None` if no record matches.
    async fn find_one_and_update(
        &self,
        id: Uuid,
        update: RecordUpdate<'_>,
    ) -> AppResult<Option<MediaRecord>>;

    /// Remove the record. Removing an absent id is not an error.
    async fn remove(&self, id: Uuid) -> AppResult<()>;
}

/// In-process record collection used in tests and single-node deployments.
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<Uuid, MediaRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn find_one(&self, id: Uuid) -> AppResult<Option<MediaRecord>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn insert_one(&self, record: MediaRecord) -> AppResult<MediaRecord> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(AppError::Validation(format!(
                "Record {} already exists",
                record.id
            )));
        }
        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_one_and_update(
        &self,
        id: Uuid,
        update: RecordUpdate<'_>,
    ) -> AppResult<Option<MediaRecord>> {
        let mut records = self.records.write().await;
        match records.get_mut(&id) {
            Some(record) => {
                update(record);
                record.updated_at = Utc::now();
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, id: Uuid) -> AppResult<()> {
        self.records.write().await.remove(&id);
        Ok(())
    }
}
