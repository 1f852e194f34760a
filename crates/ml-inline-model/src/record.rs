//! Stored record shape

use crate::id::AttachmentId;
use serde::{Deserialize, Serialize};

/// What kind of entity an identifier resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    #[default]
    Attachment,
    Post,
    Page,
}

/// A record as held by the attachment store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRecord {
    pub id: AttachmentId,
    #[serde(default)]
    pub kind: RecordKind,
    pub mime_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub alt_text: String,
    #[serde(default)]
    pub description: String,
}

impl AttachmentRecord {
    /// New attachment with empty text attributes
    #[must_use]
    pub fn new(id: AttachmentId, mime_type: impl Into<String>) -> Self {
        Self {
            id,
            kind: RecordKind::Attachment,
            mime_type: mime_type.into(),
            title: String::new(),
            alt_text: String::new(),
            description: String::new(),
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: RecordKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_alt_text(mut self, alt: impl Into<String>) -> Self {
        self.alt_text = alt.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn is_attachment(&self) -> bool {
        self.kind == RecordKind::Attachment
    }

    /// Attachment with an allow-listed image MIME type
    #[inline]
    #[must_use]
    pub fn is_editable_image(&self) -> bool {
        self.is_attachment() && crate::mime::is_editable(&self.mime_type)
    }

    /// Current stored value of one field
    #[must_use]
    pub fn value_of(&self, field: crate::FieldName) -> &str {
        match field {
            crate::FieldName::AltText => &self.alt_text,
            crate::FieldName::Title => &self.title,
            crate::FieldName::Description => &self.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldName;

    #[test]
    fn seed_json_defaults_to_attachment() {
        let record: AttachmentRecord =
            serde_json::from_str(r#"{"id": 5, "mime_type": "image/png", "title": "Barn"}"#).unwrap();
        assert_eq!(record.kind, RecordKind::Attachment);
        assert!(record.is_editable_image());
        assert_eq!(record.value_of(FieldName::Title), "Barn");
        assert_eq!(record.value_of(FieldName::AltText), "");
    }

    #[test]
    fn non_attachments_are_never_editable() {
        let id = AttachmentId::new(1).unwrap();
        let page = AttachmentRecord::new(id, "image/png").with_kind(RecordKind::Page);
        assert!(!page.is_editable_image());

        let pdf = AttachmentRecord::new(id, "application/pdf");
        assert!(!pdf.is_editable_image());
    }
}
