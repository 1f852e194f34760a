//! Persistence dispatch
//!
//! Every field maps to exactly one store operation:
//! - alt text: metadata upsert
//! - title, description: full record update, which the store may refuse

use crate::error::SaveRejection;
use crate::store::{AttachmentStore, RecordUpdate};
use ml_inline_model::{messages, AttachmentId, FieldName};
use std::sync::Arc;

/// Writes sanitised values through to the attachment store
#[derive(Clone)]
pub struct PersistenceAdapter {
    store: Arc<dyn AttachmentStore>,
}

impl PersistenceAdapter {
    pub fn new(store: Arc<dyn AttachmentStore>) -> Self {
        Self { store }
    }

    /// Persist `value` and return the field's confirmation message
    pub async fn persist(
        &self,
        id: AttachmentId,
        field: FieldName,
        value: String,
    ) -> Result<&'static str, SaveRejection> {
        let outcome = match field {
            FieldName::AltText => self
                .store
                .upsert_alt_text(id, &value)
                .await
                .map(|()| messages::ALT_TEXT_SAVED),
            FieldName::Title => self
                .store
                .update_record(id, RecordUpdate::Title(value))
                .await
                .map(|()| messages::TITLE_SAVED),
            FieldName::Description => self
                .store
                .update_record(id, RecordUpdate::Description(value))
                .await
                .map(|()| messages::DESCRIPTION_SAVED),
        };

        outcome.map_err(|e| {
            tracing::error!(attachment_id = %id, field = %field, "store write failed: {}", e);
            SaveRejection::persistence(&e)
        })
    }
}

impl std::fmt::Debug for PersistenceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceAdapter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use ml_inline_model::{AttachmentRecord, ErrorClass};

    fn id(raw: u64) -> AttachmentId {
        AttachmentId::new(raw).unwrap()
    }

    fn adapter() -> (Arc<MemoryStore>, PersistenceAdapter) {
        let store = Arc::new(MemoryStore::from_records([AttachmentRecord::new(
            id(1),
            "image/jpeg",
        )]));
        (store.clone(), PersistenceAdapter::new(store))
    }

    #[tokio::test]
    async fn each_field_hits_its_own_attribute() {
        let (store, adapter) = adapter();

        assert_eq!(
            adapter.persist(id(1), FieldName::AltText, "alt".into()).await,
            Ok("Alt text saved.")
        );
        assert_eq!(
            adapter.persist(id(1), FieldName::Title, "title".into()).await,
            Ok("Title saved.")
        );
        assert_eq!(
            adapter
                .persist(id(1), FieldName::Description, "desc".into())
                .await,
            Ok("Description saved.")
        );

        let record = store.snapshot(id(1)).unwrap();
        assert_eq!(record.alt_text, "alt");
        assert_eq!(record.title, "title");
        assert_eq!(record.description, "desc");
    }

    #[tokio::test]
    async fn refused_update_passes_message_through() {
        let (store, adapter) = adapter();
        store.set_write_failure(Some("Could not update post in the database.".into()));

        let err = adapter
            .persist(id(1), FieldName::Title, "t".into())
            .await
            .unwrap_err();
        assert_eq!(err.class, ErrorClass::Persistence);
        assert_eq!(err.message, "Could not update post in the database.");
        assert_eq!(store.snapshot(id(1)).unwrap().title, "");
    }
}
