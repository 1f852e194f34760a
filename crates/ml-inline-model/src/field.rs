//! Editable field names
//!
//! The set of inline-editable attributes is closed: every consumer matches on
//! [`FieldName`] exhaustively, so adding a field is a compile-time decision.

use crate::id::AttachmentId;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Admin list column keys, in display order
pub const COLUMN_KEYS: [&str; 3] = ["ml_inline_alt", "ml_inline_title", "ml_inline_desc"];

/// One of the three text attributes that can be saved inline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldName {
    #[serde(rename = "altText")]
    AltText,
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "description")]
    Description,
}

impl FieldName {
    /// All fields in column order
    pub const ALL: [FieldName; 3] = [FieldName::AltText, FieldName::Title, FieldName::Description];

    /// Canonical name used on the wire
    #[inline]
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::AltText => "altText",
            Self::Title => "title",
            Self::Description => "description",
        }
    }

    #[inline]
    #[must_use]
    pub const fn column_key(self) -> &'static str {
        match self {
            Self::AltText => "ml_inline_alt",
            Self::Title => "ml_inline_title",
            Self::Description => "ml_inline_desc",
        }
    }

    #[inline]
    #[must_use]
    pub const fn column_label(self) -> &'static str {
        match self {
            Self::AltText => "Alt Text",
            Self::Title => "Title",
            Self::Description => "Description",
        }
    }

    /// Resolve an admin list column key back to its field
    #[must_use]
    pub fn from_column_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column_key() == key)
    }

    /// Description is edited in a multi-line control
    #[inline]
    #[must_use]
    pub const fn is_multiline(self) -> bool {
        matches!(self, Self::Description)
    }

    /// Parse a raw request value.
    ///
    /// Characters outside `[A-Za-z0-9_-]` are dropped and the comparison is
    /// case-insensitive. The short aliases `alt` and `desc` are accepted.
    pub fn parse_key(raw: &str) -> Result<Self, FieldNameError> {
        let key: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "alttext" | "alt" => Ok(Self::AltText),
            "title" => Ok(Self::Title),
            "description" | "desc" => Ok(Self::Description),
            _ => Err(FieldNameError(raw.to_string())),
        }
    }
}

impl Display for FieldName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for FieldName {
    type Err = FieldNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_key(s)
    }
}

/// Unknown field name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field: '{0}'")]
pub struct FieldNameError(pub String);

/// One independently saveable unit: a field of a specific record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EditableField {
    pub attachment_id: AttachmentId,
    pub field: FieldName,
}

impl EditableField {
    #[inline]
    #[must_use]
    pub fn new(attachment_id: AttachmentId, field: FieldName) -> Self {
        Self {
            attachment_id,
            field,
        }
    }
}

impl Display for EditableField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.attachment_id, self.field)
    }
}
