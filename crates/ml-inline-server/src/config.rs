//! Server configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.

use crate::error::ConfigError;
use ed25519_dalek::SigningKey;
use ml_inline_model::DEFAULT_ACTION;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Save endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind: SocketAddr,
    /// Action name a save request must carry
    pub action: String,
    /// Single path segment the save endpoint is mounted on
    pub route: String,
    /// Lifetime of a hosting session, and so of every token minted in it
    pub session_window_secs: u64,
    /// Upper bound on a save request body
    pub max_body_bytes: u64,
    /// Fallback `EnvFilter` directive when `RUST_LOG` is unset
    pub log_filter: String,
    pub json_logs: bool,
    /// JSON seed for the in-memory store
    pub seed_path: Option<PathBuf>,
    /// Hex-encoded 32-byte ed25519 seed; a fresh key is generated when absent
    pub token_secret: Option<String>,
}

impl ServerConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_window_secs == 0 {
            return Err(ConfigError::Invalid("session_window_secs must be > 0".into()));
        }
        if self.action.trim().is_empty() {
            return Err(ConfigError::Invalid("action must not be empty".into()));
        }
        if self.route.trim().is_empty() || self.route.contains('/') {
            return Err(ConfigError::Invalid(
                "route must be a single non-empty path segment".into(),
            ));
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid("max_body_bytes must be > 0".into()));
        }
        if let Some(secret) = &self.token_secret {
            decode_secret(secret)?;
        }
        Ok(())
    }

    /// Key used to mint and verify CSRF tokens
    pub fn signing_key(&self) -> Result<SigningKey, ConfigError> {
        match &self.token_secret {
            Some(secret) => Ok(SigningKey::from_bytes(&decode_secret(secret)?)),
            None => Ok(SigningKey::generate(&mut OsRng)),
        }
    }

    #[must_use]
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    #[must_use]
    pub fn with_session_window(mut self, secs: u64) -> Self {
        self.session_window_secs = secs;
        self
    }

    #[must_use]
    pub fn with_seed_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.seed_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_token_secret(mut self, secret: impl Into<String>) -> Self {
        self.token_secret = Some(secret.into());
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            action: DEFAULT_ACTION.to_string(),
            route: "admin-ajax".to_string(),
            session_window_secs: 86_400,
            max_body_bytes: 64 * 1024,
            log_filter: "info".to_string(),
            json_logs: false,
            seed_path: None,
            token_secret: None,
        }
    }
}

fn decode_secret(secret: &str) -> Result<[u8; 32], ConfigError> {
    let bytes = hex::decode(secret.trim()).map_err(|_| ConfigError::InvalidSecret)?;
    bytes.try_into().map_err(|_| ConfigError::InvalidSecret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.action, "save_attachment_field");
        assert_eq!(config.session_window_secs, 86_400);
    }

    #[test]
    fn empty_file_loads_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"").unwrap();
        let config = ServerConfig::load(file.path()).unwrap();
        assert_eq!(config.route, "admin-ajax");
    }

    #[test]
    fn partial_file_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind = \"0.0.0.0:9000\"").unwrap();
        writeln!(file, "session_window_secs = 600").unwrap();
        writeln!(file, "json_logs = true").unwrap();
        let config = ServerConfig::load(file.path()).unwrap();
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.session_window_secs, 600);
        assert!(config.json_logs);
        assert_eq!(config.action, "save_attachment_field");
    }

    #[test]
    fn zero_window_is_rejected() {
        let config = ServerConfig::new().with_session_window(0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn nested_route_is_rejected() {
        let mut config = ServerConfig::new();
        config.route = "wp/admin-ajax".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn secret_must_be_32_bytes() {
        let short = ServerConfig::new().with_token_secret("abcd");
        assert!(matches!(short.validate(), Err(ConfigError::InvalidSecret)));

        let good = ServerConfig::new().with_token_secret("11".repeat(32));
        let a = good.signing_key().unwrap();
        let b = good.signing_key().unwrap();
        assert_eq!(a.to_bytes(), b.to_bytes());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ServerConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
