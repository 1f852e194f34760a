//! Request transports

use crate::config::ClientConfig;
use crate::error::{ClientError, TransportError};
use async_trait::async_trait;
use ml_inline_model::SaveRequest;
use reqwest::header::COOKIE;
use tracing::debug;

/// Raw status and body of a save response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportReply {
    pub status: u16,
    pub body: String,
}

impl TransportReply {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_success_status(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Delivers one save request to the endpoint
#[async_trait]
pub trait SaveTransport: Send + Sync {
    async fn send(&self, request: &SaveRequest) -> Result<TransportReply, TransportError>;
}

/// Form POST over HTTP, carrying the session cookie
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    action: String,
    session: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ClientError::HttpClient(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            action: config.action.clone(),
            session: config.session.clone(),
        })
    }
}

#[async_trait]
impl SaveTransport for HttpTransport {
    async fn send(&self, request: &SaveRequest) -> Result<TransportReply, TransportError> {
        let mut builder = self
            .client
            .post(&self.endpoint)
            .form(&request.form_pairs(&self.action));
        if let Some(session) = &self.session {
            builder = builder.header(COOKIE, format!("ml_inline_session={session}"));
        }

        let response = builder.send().await.map_err(map_reqwest)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest)?;
        debug!(status, key = %request.attachment_id, "save response received");
        Ok(TransportReply { status, body })
    }
}

fn map_reqwest(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(err.to_string())
    }
}
