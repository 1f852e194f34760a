//! ML Inline Server
//!
//! Server side of inline attachment field editing:
//!
//! - [`pipeline::ValidationPipeline`]: authorize, sanitize and persist one field save
//! - [`token::CsrfIssuer`]: per-row tokens bound to an attachment and a session
//! - [`columns::ColumnRenderer`]: pre-authorized, pre-populated list-view controls
//! - [`http`]: the warp routes wrapping it all
//!
//! # Example
//!
//! ```rust,ignore
//! use ml_inline_server::prelude::*;
//!
//! let seed = SeedFile::load("seed.json")?.into_parts(config.session_window_secs);
//! let state = AppState::new(
//!     config,
//!     Arc::new(seed.store),
//!     Arc::new(seed.grants),
//!     Arc::new(seed.sessions),
//!     Arc::new(CsrfIssuer::generate()),
//! );
//! let (addr, server) = http::bind(Arc::new(state), shutdown)?;
//! server.await;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod authz;
pub mod columns;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod persistence;
pub mod pipeline;
pub mod sanitize;
pub mod seed;
pub mod session;
pub mod store;
pub mod token;

pub use error::{ConfigError, SaveRejection, ServerError, StoreError, TokenError};

/// Common imports
pub mod prelude {
    pub use crate::authz::{AuthorizationService, CapabilityTable};
    pub use crate::columns::{register_columns, ColumnRenderer, RenderedCell};
    pub use crate::config::ServerConfig;
    pub use crate::error::{SaveRejection, ServerError, StoreError};
    pub use crate::http::{self, AppState};
    pub use crate::pipeline::{SaveConfirmation, SaveInput, ValidationPipeline};
    pub use crate::seed::SeedFile;
    pub use crate::session::{ActorId, Session, SessionId, SessionResolver, SessionTable};
    pub use crate::store::{AttachmentStore, MemoryStore, RecordUpdate};
    pub use crate::token::{CsrfIssuer, CsrfToken};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
