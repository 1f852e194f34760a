//! Client configuration

use crate::error::ClientError;
use ml_inline_model::DEFAULT_ACTION;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Full URL of the save endpoint
    pub endpoint: String,
    pub action: String,
    /// Value sent in the `ml_inline_session` cookie
    pub session: Option<String>,
    /// Wait after a blur before deciding whether focus really left
    pub confirm_delay_ms: u64,
    pub request_timeout_ms: u64,
    pub success_display_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080/admin-ajax".to_string(),
            action: DEFAULT_ACTION.to_string(),
            session: None,
            confirm_delay_ms: 100,
            request_timeout_ms: 10_000,
            success_display_ms: 3_000,
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn with_confirm_delay(mut self, delay: Duration) -> Self {
        self.confirm_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn with_success_window(mut self, window: Duration) -> Self {
        self.success_display_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[inline]
    #[must_use]
    pub fn confirm_delay(&self) -> Duration {
        Duration::from_millis(self.confirm_delay_ms)
    }

    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    #[inline]
    #[must_use]
    pub fn success_window(&self) -> Duration {
        Duration::from_millis(self.success_display_ms)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.endpoint.trim().is_empty() {
            return Err(ClientError::InvalidConfig("endpoint must not be empty".into()));
        }
        if self.action.trim().is_empty() {
            return Err(ClientError::InvalidConfig("action must not be empty".into()));
        }
        if self.request_timeout_ms == 0 {
            return Err(ClientError::InvalidConfig("request_timeout_ms must be > 0".into()));
        }
        Ok(())
    }
}
