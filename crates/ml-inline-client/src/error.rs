//! Client error types

use crate::state::FieldState;
use thiserror::Error;

/// A transport could not produce a response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("network failure: {0}")]
    Network(String),
}

/// Illegal field state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("illegal transition {from:?} -> {to:?}")]
    IllegalTransition { from: FieldState, to: FieldState },
}

/// Client configuration errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid client config: {0}")]
    InvalidConfig(String),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}
