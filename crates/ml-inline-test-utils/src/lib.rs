//! Testing utilities for the ML Inline workspace
//!
//! Shared fixtures: a seeded backend with one editor and one viewer
//! session, and client transports that answer from a script or from the
//! in-process routes.

#![allow(missing_docs)]

use async_trait::async_trait;
use ml_inline_client::{SaveTransport, TransportError, TransportReply};
use ml_inline_model::{
    AttachmentId, AttachmentRecord, ControlDescriptor, FieldName, RecordKind, SaveRequest,
    DEFAULT_ACTION,
};
use ml_inline_server::prelude::*;
use ml_inline_server::session::SESSION_COOKIE;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

pub const JPEG_ID: u64 = 1;
pub const PNG_ID: u64 = 2;
pub const PDF_ID: u64 = 3;
pub const SVG_ID: u64 = 4;
/// An image-typed record that is a post, not an attachment
pub const POST_ID: u64 = 5;

pub fn id(raw: u64) -> AttachmentId {
    AttachmentId::new(raw).unwrap()
}

/// Standard record set
pub fn fixture_records() -> Vec<AttachmentRecord> {
    vec![
        AttachmentRecord::new(id(JPEG_ID), "image/jpeg")
            .with_title("Barn")
            .with_alt_text("A barn"),
        AttachmentRecord::new(id(PNG_ID), "image/png").with_title("Logo"),
        AttachmentRecord::new(id(PDF_ID), "application/pdf").with_title("Invoice"),
        AttachmentRecord::new(id(SVG_ID), "image/svg+xml"),
        AttachmentRecord::new(id(POST_ID), "image/jpeg").with_kind(RecordKind::Post),
    ]
}

/// Server-side state seeded with [`fixture_records`].
///
/// `editor` may edit everything; `viewer` may edit nothing.
pub struct TestBackend {
    pub store: Arc<MemoryStore>,
    pub grants: Arc<CapabilityTable>,
    pub sessions: Arc<SessionTable>,
    pub issuer: Arc<CsrfIssuer>,
    pub editor: Session,
    pub viewer: Session,
    pub state: Arc<AppState>,
}

impl TestBackend {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        let store = Arc::new(MemoryStore::from_records(fixture_records()));
        let grants = Arc::new(CapabilityTable::new());
        let sessions = Arc::new(SessionTable::new(config.session_window_secs));
        let issuer = Arc::new(CsrfIssuer::generate());

        grants.grant_all(ActorId::new("editor"));
        let editor = sessions.open(ActorId::new("editor"));
        let viewer = sessions.open(ActorId::new("viewer"));

        let state = Arc::new(AppState::new(
            config,
            store.clone(),
            grants.clone(),
            sessions.clone(),
            issuer.clone(),
        ));
        Self {
            store,
            grants,
            sessions,
            issuer,
            editor,
            viewer,
            state,
        }
    }

    /// Token for `raw` in the editor's session
    pub fn token(&self, raw: u64) -> String {
        self.issuer.mint(&self.editor, id(raw)).into_string()
    }

    pub fn token_for(&self, session: &Session, raw: u64) -> String {
        self.issuer.mint(session, id(raw)).into_string()
    }

    /// Control as the renderer would emit it for the editor
    pub fn descriptor(&self, raw: u64, field: FieldName) -> ControlDescriptor {
        let value = self
            .store
            .snapshot(id(raw))
            .map(|r| r.value_of(field).to_string())
            .unwrap_or_default();
        ControlDescriptor {
            attachment_id: id(raw),
            token: self.token(raw),
            field,
            value,
        }
    }

    pub fn renderer(&self) -> ColumnRenderer {
        self.state.renderer()
    }
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}

pub fn cookie(session: &Session) -> String {
    format!("{SESSION_COOKIE}={}", session.id)
}

/// Form body for a save of `value` into `field`
pub fn form_body(raw_id: &str, token: &str, field: &str, value: &str) -> String {
    serde_urlencoded::to_string(&[
        ("action", DEFAULT_ACTION),
        ("attachmentId", raw_id),
        ("token", token),
        ("field", field),
        ("value", value),
    ])
    .unwrap()
}

/// Replays canned replies in order and records what it was asked to send
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<TransportReply, TransportError>>>,
    sent: Mutex<Vec<SaveRequest>>,
    delay: Duration,
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = Result<TransportReply, TransportError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            sent: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    /// Wait `delay` before answering each request
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn ok(message: &str) -> Result<TransportReply, TransportError> {
        Ok(TransportReply::new(
            200,
            format!(r#"{{"success":true,"message":"{message}"}}"#),
        ))
    }

    pub fn rejected(status: u16, kind: &str, message: &str) -> Result<TransportReply, TransportError> {
        Ok(TransportReply::new(
            status,
            format!(r#"{{"success":false,"message":"{message}","kind":"{kind}"}}"#),
        ))
    }

    pub fn sent(&self) -> Vec<SaveRequest> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl SaveTransport for ScriptedTransport {
    async fn send(&self, request: &SaveRequest) -> Result<TransportReply, TransportError> {
        self.sent.lock().push(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("script exhausted".into())))
    }
}

/// Sends through the server routes in-process
pub struct RouteTransport {
    state: Arc<AppState>,
    cookie: String,
}

impl RouteTransport {
    pub fn new(backend: &TestBackend, session: &Session) -> Self {
        Self {
            state: backend.state.clone(),
            cookie: cookie(session),
        }
    }
}

#[async_trait]
impl SaveTransport for RouteTransport {
    async fn send(&self, request: &SaveRequest) -> Result<TransportReply, TransportError> {
        let body = form_body(
            &request.attachment_id.to_string(),
            &request.token,
            request.field.wire_name(),
            &request.value,
        );
        let path = format!("/{}", self.state.config.route);
        let response = warp::test::request()
            .method("POST")
            .path(&path)
            .header("content-type", "application/x-www-form-urlencoded")
            .header("cookie", &self.cookie)
            .body(body)
            .reply(&http::routes(self.state.clone()))
            .await;
        Ok(TransportReply::new(
            response.status().as_u16(),
            String::from_utf8_lossy(response.body()).into_owned(),
        ))
    }
}
