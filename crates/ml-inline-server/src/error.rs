//! Error types for the save endpoint
//!
//! - [`SaveRejection`]: the structured outcome of a failed gate or write
//! - [`StoreError`]: attachment store faults
//! - [`TokenError`]: CSRF token verification failures
//! - [`ConfigError`] / [`ServerError`]: startup and wiring failures

use ml_inline_model::{messages, AttachmentId, ErrorClass, SaveResponse};
use std::path::PathBuf;

/// A save that did not go through.
///
/// Every gate failure and every persistence failure becomes one of these;
/// nothing else leaves the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{class} rejection: {message}")]
pub struct SaveRejection {
    pub class: ErrorClass,
    pub message: String,
}

impl SaveRejection {
    #[inline]
    pub fn new(class: ErrorClass, message: impl Into<String>) -> Self {
        Self {
            class,
            message: message.into(),
        }
    }

    pub fn invalid_request() -> Self {
        Self::new(ErrorClass::Validation, messages::INVALID_REQUEST)
    }

    pub fn invalid_attachment() -> Self {
        Self::new(ErrorClass::Validation, messages::INVALID_ATTACHMENT)
    }

    pub fn permission_denied() -> Self {
        Self::new(ErrorClass::Authorization, messages::PERMISSION_DENIED)
    }

    pub fn images_only() -> Self {
        Self::new(ErrorClass::Validation, messages::IMAGES_ONLY)
    }

    pub fn invalid_field() -> Self {
        Self::new(ErrorClass::Validation, messages::INVALID_FIELD)
    }

    /// Store failure; the store's message is passed through verbatim
    pub fn persistence(err: &StoreError) -> Self {
        Self::new(ErrorClass::Persistence, err.user_message())
    }

    /// HTTP status for this rejection
    #[inline]
    #[must_use]
    pub fn status(&self) -> u16 {
        self.class.status()
    }

    #[must_use]
    pub fn to_response(&self) -> SaveResponse {
        SaveResponse::error(self.class, self.message.clone())
    }
}

/// Attachment store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No record under this identifier
    #[error("record not found: {0}")]
    NotFound(AttachmentId),

    /// Store refused the write
    #[error("write rejected: {0}")]
    Rejected(String),

    /// Store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Message shown to the editor
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(_) => "Invalid attachment ID.".to_string(),
            Self::Rejected(msg) | Self::Unavailable(msg) => msg.clone(),
        }
    }
}

/// CSRF token verification errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token missing")]
    Missing,

    #[error("token malformed")]
    Malformed,

    #[error("token does not match attachment or session")]
    Mismatch,

    #[error("session expired")]
    Expired,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("token secret must be 64 hex characters")]
    InvalidSecret,
}

/// Server wiring errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid seed file {path}: {message}")]
    Seed { path: PathBuf, message: String },

    #[error("cannot bind {addr}: {message}")]
    Bind {
        addr: std::net::SocketAddr,
        message: String,
    },

    #[error("logging already initialised: {0}")]
    Logging(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_statuses() {
        assert_eq!(SaveRejection::invalid_request().status(), 400);
        assert_eq!(SaveRejection::invalid_attachment().status(), 400);
        assert_eq!(SaveRejection::permission_denied().status(), 403);
        assert_eq!(SaveRejection::images_only().status(), 400);
        assert_eq!(SaveRejection::invalid_field().status(), 400);
    }

    #[test]
    fn persistence_message_is_verbatim() {
        let err = StoreError::Rejected("Could not update attachment in the database.".into());
        let rejection = SaveRejection::persistence(&err);
        assert_eq!(rejection.class, ErrorClass::Persistence);
        assert_eq!(rejection.message, "Could not update attachment in the database.");
        assert_eq!(rejection.status(), 400);
    }

    #[test]
    fn rejection_display() {
        let err = SaveRejection::permission_denied();
        assert_eq!(err.to_string(), "authorization rejection: Permission denied.");
    }
}
