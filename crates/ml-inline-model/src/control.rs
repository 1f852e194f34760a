//! Rendered control descriptors
//!
//! Everything the in-page client needs to build a save request for one
//! field, without further lookups.

use crate::field::FieldName;
use crate::id::AttachmentId;
use crate::wire::SaveRequest;
use serde::{Deserialize, Serialize};

/// Shape of the editing control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlKind {
    SingleLine,
    MultiLine { rows: u8 },
}

/// One editable control in one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlDescriptor {
    pub attachment_id: AttachmentId,
    pub token: String,
    pub field: FieldName,
    /// Current stored value
    pub value: String,
}

impl ControlDescriptor {
    #[must_use]
    pub fn kind(&self) -> ControlKind {
        if self.field.is_multiline() {
            ControlKind::MultiLine { rows: 3 }
        } else {
            ControlKind::SingleLine
        }
    }

    #[must_use]
    pub fn placeholder(&self) -> &'static str {
        match self.field {
            FieldName::AltText => "Describe this image...",
            FieldName::Title => "Image title...",
            FieldName::Description => "Image description...",
        }
    }

    /// Fresh request carrying `value` as currently typed
    #[must_use]
    pub fn save_request(&self, value: impl Into<String>) -> SaveRequest {
        SaveRequest::new(self.attachment_id, self.field, value, self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_is_multiline() {
        let mut control = ControlDescriptor {
            attachment_id: AttachmentId::new(1).unwrap(),
            token: "t".into(),
            field: FieldName::Description,
            value: String::new(),
        };
        assert_eq!(control.kind(), ControlKind::MultiLine { rows: 3 });
        assert_eq!(control.placeholder(), "Image description...");

        control.field = FieldName::AltText;
        assert_eq!(control.kind(), ControlKind::SingleLine);

        let request = control.save_request("typed");
        assert_eq!(request.field, FieldName::AltText);
        assert_eq!(request.token, "t");
        assert_eq!(request.value, "typed");
    }
}
