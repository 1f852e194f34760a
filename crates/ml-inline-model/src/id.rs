//! Attachment identifiers

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Identifier of an attachment record in the store.
///
/// Always a positive integer; zero is reserved for "missing".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct AttachmentId(u64);

impl AttachmentId {
    /// Create an identifier, rejecting zero
    #[inline]
    pub fn new(raw: u64) -> Result<Self, AttachmentIdError> {
        if raw == 0 {
            Err(AttachmentIdError::Zero)
        } else {
            Ok(Self(raw))
        }
    }

    #[inline]
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for AttachmentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AttachmentId {
    type Err = AttachmentIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AttachmentIdError::Missing);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AttachmentIdError::NotAnInteger(s.to_string()));
        }
        let raw = s
            .parse::<u64>()
            .map_err(|_| AttachmentIdError::NotAnInteger(s.to_string()))?;
        Self::new(raw)
    }
}

impl TryFrom<u64> for AttachmentId {
    type Error = AttachmentIdError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AttachmentId> for u64 {
    fn from(value: AttachmentId) -> Self {
        value.0
    }
}

/// Identifier parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachmentIdError {
    #[error("attachment id is missing")]
    Missing,

    #[error("attachment id must be positive")]
    Zero,

    #[error("attachment id is not a positive integer: '{0}'")]
    NotAnInteger(String),
}
