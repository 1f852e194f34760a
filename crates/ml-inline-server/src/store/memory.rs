//! In-memory attachment store

use super::{AttachmentStore, RecordUpdate};
use crate::error::StoreError;
use async_trait::async_trait;
use ml_inline_model::{AttachmentId, AttachmentRecord};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Process-local store. Last write wins.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<AttachmentId, AttachmentRecord>>,
    /// When set, `update_record` is refused with this message
    write_failure: RwLock<Option<String>>,
    /// When set, every operation reports the store as unreachable
    outage: RwLock<bool>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = AttachmentRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    pub fn insert(&self, record: AttachmentRecord) {
        self.records.write().insert(record.id, record);
    }

    /// Synchronous read for inspection
    #[must_use]
    pub fn snapshot(&self, id: AttachmentId) -> Option<AttachmentRecord> {
        self.records.read().get(&id).cloned()
    }

    /// All records ordered by id
    #[must_use]
    pub fn records(&self) -> Vec<AttachmentRecord> {
        let mut all: Vec<_> = self.records.read().values().cloned().collect();
        all.sort_by_key(|r| r.id);
        all
    }

    pub fn set_write_failure(&self, message: Option<String>) {
        *self.write_failure.write() = message;
    }

    pub fn set_outage(&self, down: bool) {
        *self.outage.write() = down;
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if *self.outage.read() {
            Err(StoreError::Unavailable("Attachment store unavailable.".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AttachmentStore for MemoryStore {
    async fn fetch(&self, id: AttachmentId) -> Result<Option<AttachmentRecord>, StoreError> {
        self.check_available()?;
        Ok(self.snapshot(id))
    }

    async fn upsert_alt_text(&self, id: AttachmentId, value: &str) -> Result<(), StoreError> {
        self.check_available()?;
        let mut records = self.records.write();
        let record = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        record.alt_text = value.to_string();
        Ok(())
    }

    async fn update_record(
        &self,
        id: AttachmentId,
        update: RecordUpdate,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        if let Some(message) = self.write_failure.read().clone() {
            return Err(StoreError::Rejected(message));
        }

        let mut records = self.records.write();
        let record = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        match update {
            RecordUpdate::Title(title) => record.title = title,
            RecordUpdate::Description(description) => record.description = description,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> AttachmentId {
        AttachmentId::new(raw).unwrap()
    }

    #[tokio::test]
    async fn writes_are_visible() {
        let store = MemoryStore::from_records([AttachmentRecord::new(id(1), "image/png")]);

        store.upsert_alt_text(id(1), "barn").await.unwrap();
        store
            .update_record(id(1), RecordUpdate::Title("Barn".into()))
            .await
            .unwrap();

        let record = store.fetch(id(1)).await.unwrap().unwrap();
        assert_eq!(record.alt_text, "barn");
        assert_eq!(record.title, "Barn");
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        let store = MemoryStore::new();
        assert_eq!(store.fetch(id(4)).await.unwrap(), None);
        assert_eq!(
            store.upsert_alt_text(id(4), "x").await,
            Err(StoreError::NotFound(id(4)))
        );
    }

    #[tokio::test]
    async fn injected_write_failure_only_hits_record_updates() {
        let store = MemoryStore::from_records([AttachmentRecord::new(id(1), "image/png")]);
        store.set_write_failure(Some("Database busy.".into()));

        assert_eq!(
            store
                .update_record(id(1), RecordUpdate::Description("d".into()))
                .await,
            Err(StoreError::Rejected("Database busy.".into()))
        );
        assert!(store.upsert_alt_text(id(1), "ok").await.is_ok());
    }

    #[tokio::test]
    async fn outage_fails_everything() {
        let store = MemoryStore::from_records([AttachmentRecord::new(id(1), "image/png")]);
        store.set_outage(true);
        assert!(matches!(store.fetch(id(1)).await, Err(StoreError::Unavailable(_))));
        assert!(store.upsert_alt_text(id(1), "x").await.is_err());
    }
}
