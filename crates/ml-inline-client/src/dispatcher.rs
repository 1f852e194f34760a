//! Turns a transport call into a settled [`SaveResult`]
//!
//! Every outcome maps to a result: a reply, a transport failure, a panic in
//! the transport, or the fixed timeout elapsing. Nothing escapes to the
//! caller as an error.

use crate::error::TransportError;
use crate::transport::{SaveTransport, TransportReply};
use ml_inline_model::{messages, ErrorClass, SaveRequest, SaveResponse, SaveResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub struct RequestDispatcher {
    transport: Arc<dyn SaveTransport>,
    timeout: Duration,
}

impl RequestDispatcher {
    #[must_use]
    pub fn new(transport: Arc<dyn SaveTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn dispatch(&self, request: SaveRequest) -> SaveResult {
        let transport = Arc::clone(&self.transport);
        let mut call = tokio::spawn(async move { transport.send(&request).await });

        match tokio::time::timeout(self.timeout, &mut call).await {
            Err(_) => {
                // The request must be gone before the field's guard is released
                call.abort();
                let _ = call.await;
                let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(timeout_ms, "save request timed out");
                SaveResult::failed(ErrorClass::Transport, messages::SAVE_TIMEOUT)
            }
            Ok(Err(join)) => {
                warn!(error = %join, "save transport aborted");
                SaveResult::failed(ErrorClass::Transport, messages::NETWORK_ERROR)
            }
            Ok(Ok(Err(TransportError::Timeout))) => {
                SaveResult::failed(ErrorClass::Transport, messages::SAVE_TIMEOUT)
            }
            Ok(Ok(Err(TransportError::Network(e)))) => {
                warn!(error = %e, "save request failed");
                SaveResult::failed(ErrorClass::Transport, messages::NETWORK_ERROR)
            }
            Ok(Ok(Ok(reply))) => decode(reply),
        }
    }
}

/// Interpret a reply. A body that is not a save response is a failed save.
fn decode(reply: TransportReply) -> SaveResult {
    match serde_json::from_str::<SaveResponse>(&reply.body) {
        Ok(body) => SaveResult::from_response(reply.status, body),
        Err(e) => {
            debug!(status = reply.status, error = %e, "unreadable save response");
            SaveResult::failed(ErrorClass::from_status(reply.status), messages::SAVE_FAILED)
        }
    }
}
