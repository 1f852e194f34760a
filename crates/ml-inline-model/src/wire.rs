//! Wire shapes of a save attempt
//!
//! Request (form-encoded or JSON):
//! `{ action, attachmentId, token, field, value }`
//!
//! Response: `{ success, message }`, plus `kind` on failure. Failures travel
//! with HTTP status 400 or 403.

use crate::field::FieldName;
use crate::id::AttachmentId;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Action name the endpoint answers to unless configured otherwise
pub const DEFAULT_ACTION: &str = "save_attachment_field";

/// User-facing message texts
pub mod messages {
    pub const INVALID_REQUEST: &str = "Invalid request.";
    pub const INVALID_ATTACHMENT: &str = "Invalid attachment.";
    pub const PERMISSION_DENIED: &str = "Permission denied.";
    pub const IMAGES_ONLY: &str = "Only images can be edited.";
    pub const INVALID_FIELD: &str = "Invalid field.";

    pub const ALT_TEXT_SAVED: &str = "Alt text saved.";
    pub const TITLE_SAVED: &str = "Title saved.";
    pub const DESCRIPTION_SAVED: &str = "Description saved.";

    pub const SAVING: &str = "Saving…";
    pub const SAVE_TIMEOUT: &str = "Save timeout";
    pub const NETWORK_ERROR: &str = "Network error";
    pub const SAVE_FAILED: &str = "Save failed";
}

/// Failure classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorClass {
    /// Malformed input, bad token, wrong entity, disallowed MIME, unknown field
    Validation,
    /// Capability denied
    Authorization,
    /// Store rejected the write
    Persistence,
    /// Timeout or network failure; never produced by the server
    Transport,
}

impl ErrorClass {
    /// HTTP status the server answers with for this class
    #[inline]
    #[must_use]
    pub const fn status(self) -> u16 {
        match self {
            Self::Authorization => 403,
            Self::Validation | Self::Persistence | Self::Transport => 400,
        }
    }

    /// Best guess from a bare status when the body carries no `kind`
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            403 => Self::Authorization,
            _ => Self::Validation,
        }
    }
}

impl Display for ErrorClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validation => "validation",
            Self::Authorization => "authorization",
            Self::Persistence => "persistence",
            Self::Transport => "transport",
        };
        f.write_str(s)
    }
}

/// One save attempt, built fresh from a rendered control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub attachment_id: AttachmentId,
    pub field: FieldName,
    pub value: String,
    pub token: String,
}

impl SaveRequest {
    #[must_use]
    pub fn new(
        attachment_id: AttachmentId,
        field: FieldName,
        value: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            attachment_id,
            field,
            value: value.into(),
            token: token.into(),
        }
    }

    /// Form pairs for a POST under `action`
    #[must_use]
    pub fn form_pairs(&self, action: &str) -> Vec<(&'static str, String)> {
        vec![
            ("action", action.to_string()),
            ("attachmentId", self.attachment_id.to_string()),
            ("token", self.token.clone()),
            ("field", self.field.wire_name().to_string()),
            ("value", self.value.clone()),
        ]
    }
}

/// Response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorClass>,
}

impl SaveResponse {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            kind: None,
        }
    }

    #[must_use]
    pub fn error(kind: ErrorClass, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            kind: Some(kind),
        }
    }
}

/// Settled outcome of one save attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveResult {
    pub success: bool,
    pub message: String,
    /// `None` on success
    pub class: Option<ErrorClass>,
}

impl SaveResult {
    #[must_use]
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            class: None,
        }
    }

    #[must_use]
    pub fn failed(class: ErrorClass, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            class: Some(class),
        }
    }

    /// Interpret a decoded response body received with `status`
    #[must_use]
    pub fn from_response(status: u16, body: SaveResponse) -> Self {
        if body.success {
            return Self::succeeded(body.message);
        }
        let class = body.kind.unwrap_or_else(|| ErrorClass::from_status(status));
        let message = if body.message.trim().is_empty() {
            messages::SAVE_FAILED.to_string()
        } else {
            body.message
        };
        Self::failed(class, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_body_omits_kind() {
        let json = serde_json::to_value(SaveResponse::ok(messages::ALT_TEXT_SAVED)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "message": "Alt text saved."})
        );
    }

    #[test]
    fn failure_body_carries_kind() {
        let json = serde_json::to_value(SaveResponse::error(
            ErrorClass::Authorization,
            messages::PERMISSION_DENIED,
        ))
        .unwrap();
        assert_eq!(json["kind"], "authorization");
        assert_eq!(json["success"], false);
    }

    #[test]
    fn status_mapping() {
        assert_eq!(ErrorClass::Validation.status(), 400);
        assert_eq!(ErrorClass::Persistence.status(), 400);
        assert_eq!(ErrorClass::Authorization.status(), 403);
        assert_eq!(ErrorClass::from_status(403), ErrorClass::Authorization);
        assert_eq!(ErrorClass::from_status(400), ErrorClass::Validation);
    }

    #[test]
    fn result_from_body_without_kind_uses_status() {
        let body = SaveResponse {
            success: false,
            message: String::new(),
            kind: None,
        };
        let result = SaveResult::from_response(403, body);
        assert_eq!(result.class, Some(ErrorClass::Authorization));
        assert_eq!(result.message, messages::SAVE_FAILED);
    }

    #[test]
    fn form_pairs_use_wire_names() {
        let request = SaveRequest::new(
            AttachmentId::new(3).unwrap(),
            FieldName::AltText,
            "Red barn",
            "abc",
        );
        let pairs = request.form_pairs(DEFAULT_ACTION);
        assert_eq!(pairs[0], ("action", "save_attachment_field".to_string()));
        assert_eq!(pairs[1], ("attachmentId", "3".to_string()));
        assert_eq!(pairs[3], ("field", "altText".to_string()));
        assert_eq!(pairs[4], ("value", "Red barn".to_string()));
    }
}
