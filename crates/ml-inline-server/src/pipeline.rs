//! Save validation pipeline
//!
//! A short-circuiting chain; the first failing gate decides the outcome.
//!
//! 1. identifier present and a positive integer
//! 2. CSRF token valid for that identifier in this session
//! 3. identifier resolves to an attachment
//! 4. actor may edit it
//! 5. MIME type on the image allow-list
//! 6. field name in the closed field set
//! 7. value sanitised for the field, then trimmed
//! 8. value persisted through the field's store operation

use crate::authz::AuthorizationService;
use crate::error::{SaveRejection, StoreError};
use crate::persistence::PersistenceAdapter;
use crate::sanitize::sanitize_field;
use crate::session::{ActorId, Session};
use crate::store::AttachmentStore;
use crate::token::CsrfIssuer;
use ml_inline_model::{AttachmentId, AttachmentRecord, FieldName};
use std::sync::Arc;
use tracing::Instrument;

/// Raw request parameters, exactly as received
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveInput {
    pub attachment_id: String,
    pub token: String,
    pub field: String,
    pub value: String,
}

/// A save that went through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveConfirmation {
    pub attachment_id: AttachmentId,
    pub field: FieldName,
    /// Value as stored, after sanitisation
    pub stored_value: String,
    pub message: &'static str,
}

pub struct ValidationPipeline {
    store: Arc<dyn AttachmentStore>,
    authz: Arc<dyn AuthorizationService>,
    issuer: Arc<CsrfIssuer>,
    persistence: PersistenceAdapter,
}

impl ValidationPipeline {
    pub fn new(
        store: Arc<dyn AttachmentStore>,
        authz: Arc<dyn AuthorizationService>,
        issuer: Arc<CsrfIssuer>,
    ) -> Self {
        let persistence = PersistenceAdapter::new(store.clone());
        Self {
            store,
            authz,
            issuer,
            persistence,
        }
    }

    #[must_use]
    pub fn issuer(&self) -> &Arc<CsrfIssuer> {
        &self.issuer
    }

    /// Run every gate for one save
    pub async fn run(
        &self,
        session: &Session,
        input: &SaveInput,
    ) -> Result<SaveConfirmation, SaveRejection> {
        let span = tracing::info_span!(
            "save_field",
            attachment_id = %input.attachment_id,
            field = %input.field,
            actor = %session.actor,
        );

        async {
            let result = self.run_gates(session, input).await;
            match &result {
                Ok(done) => tracing::info!(stored_len = done.stored_value.len(), "{}", done.message),
                Err(rejection) => tracing::warn!(
                    class = %rejection.class,
                    status = rejection.status(),
                    "save rejected: {}",
                    rejection.message
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_gates(
        &self,
        session: &Session,
        input: &SaveInput,
    ) -> Result<SaveConfirmation, SaveRejection> {
        let id = check_identifier(&input.attachment_id)?;
        self.verify_token(session, id, &input.token)?;
        let record = self.resolve_attachment(id).await?;
        self.authorize(&session.actor, id).await?;
        check_mime(&record)?;
        let field = check_field(&input.field)?;
        let value = sanitize_field(field, &input.value);

        let message = self.persistence.persist(id, field, value.clone()).await?;
        Ok(SaveConfirmation {
            attachment_id: id,
            field,
            stored_value: value,
            message,
        })
    }

    /// Gate 2
    pub fn verify_token(
        &self,
        session: &Session,
        id: AttachmentId,
        token: &str,
    ) -> Result<(), SaveRejection> {
        self.issuer.verify(session, id, token).map_err(|e| {
            tracing::debug!(attachment_id = %id, "token check failed: {}", e);
            SaveRejection::invalid_request()
        })
    }

    /// Gate 3
    pub async fn resolve_attachment(
        &self,
        id: AttachmentId,
    ) -> Result<AttachmentRecord, SaveRejection> {
        match self.store.fetch(id).await {
            Ok(Some(record)) if record.is_attachment() => Ok(record),
            Ok(_) | Err(StoreError::NotFound(_)) => Err(SaveRejection::invalid_attachment()),
            Err(e) => {
                tracing::error!(attachment_id = %id, "store lookup failed: {}", e);
                Err(SaveRejection::persistence(&e))
            }
        }
    }

    /// Gate 4
    pub async fn authorize(&self, actor: &ActorId, id: AttachmentId) -> Result<(), SaveRejection> {
        if self.authz.can_edit(actor, id).await {
            Ok(())
        } else {
            Err(SaveRejection::permission_denied())
        }
    }
}

impl std::fmt::Debug for ValidationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationPipeline")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

/// Gate 1
pub fn check_identifier(raw: &str) -> Result<AttachmentId, SaveRejection> {
    raw.parse().map_err(|_| SaveRejection::invalid_request())
}

/// Gate 5
pub fn check_mime(record: &AttachmentRecord) -> Result<(), SaveRejection> {
    if ml_inline_model::mime::is_editable(&record.mime_type) {
        Ok(())
    } else {
        Err(SaveRejection::images_only())
    }
}

/// Gate 6
pub fn check_field(raw: &str) -> Result<FieldName, SaveRejection> {
    FieldName::parse_key(raw).map_err(|_| SaveRejection::invalid_field())
}
