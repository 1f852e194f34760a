//! Per-row CSRF tokens
//!
//! A token is an ed25519 signature over the save action for one attachment,
//! bound to the hosting session and its expiry. It is minted when a row is
//! rendered and shared by all three fields of that row.
//!
//! Verification performs integrity checks only:
//! - session window still open
//! - well-formed signature
//! - signature covers this attachment in this session

use crate::error::TokenError;
use crate::session::Session;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use ml_inline_model::AttachmentId;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

const ACTION_PREFIX: &str = "ml_inline_save_";

/// Hex-encoded token as it appears in rendered markup
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CsrfToken(String);

impl CsrfToken {
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for CsrfToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mints and verifies row tokens
pub struct CsrfIssuer {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl CsrfIssuer {
    pub fn new(signing_key: SigningKey) -> Self {
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Issuer with a fresh random key
    pub fn generate() -> Self {
        Self::new(SigningKey::generate(&mut OsRng))
    }

    /// Token for one row rendered in `session`
    pub fn mint(&self, session: &Session, attachment_id: AttachmentId) -> CsrfToken {
        let message = token_message(session, attachment_id);
        let sig: Signature = self.signing_key.sign(&message);
        CsrfToken(hex::encode(sig.to_bytes()))
    }

    /// Check `token` against `attachment_id` in `session`
    pub fn verify(
        &self,
        session: &Session,
        attachment_id: AttachmentId,
        token: &str,
    ) -> Result<(), TokenError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenError::Missing);
        }
        if session.is_expired() {
            return Err(TokenError::Expired);
        }

        let bytes = hex::decode(token).map_err(|_| TokenError::Malformed)?;
        let bytes: [u8; 64] = bytes.try_into().map_err(|_| TokenError::Malformed)?;
        let signature = Signature::from_bytes(&bytes);

        let message = token_message(session, attachment_id);
        self.verifying_key
            .verify(&message, &signature)
            .map_err(|_| TokenError::Mismatch)
    }
}

impl std::fmt::Debug for CsrfIssuer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrfIssuer")
            .field("verifying_key", &hex::encode(self.verifying_key.as_bytes()))
            .finish_non_exhaustive()
    }
}

fn token_message(session: &Session, attachment_id: AttachmentId) -> Vec<u8> {
    let id = attachment_id.to_string();
    let mut msg =
        Vec::with_capacity(ACTION_PREFIX.len() + id.len() + 1 + session.id.as_str().len() + 1 + 8);
    msg.extend_from_slice(ACTION_PREFIX.as_bytes());
    msg.extend_from_slice(id.as_bytes());
    msg.push(0);
    msg.extend_from_slice(session.id.as_str().as_bytes());
    msg.push(0);
    msg.extend_from_slice(&session.expires_at.to_le_bytes());
    msg
}
