//! Attachment store seam
//!
//! The store owns the records; the save endpoint reads a record's kind and
//! MIME type and writes its three text attributes.

mod memory;

pub use memory::MemoryStore;

use crate::error::StoreError;
use async_trait::async_trait;
use ml_inline_model::{AttachmentId, AttachmentRecord};

/// Full-record update of one post field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordUpdate {
    Title(String),
    Description(String),
}

#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Look up a record; `Ok(None)` when nothing lives under `id`
    async fn fetch(&self, id: AttachmentId) -> Result<Option<AttachmentRecord>, StoreError>;

    /// Insert or replace the alternative-text metadata entry
    async fn upsert_alt_text(&self, id: AttachmentId, value: &str) -> Result<(), StoreError>;

    /// Update the record itself; may be refused
    async fn update_record(&self, id: AttachmentId, update: RecordUpdate)
        -> Result<(), StoreError>;
}
