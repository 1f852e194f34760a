//! ML Inline Client
//!
//! Page-side autosave for inline attachment fields. Each rendered control
//! saves itself when focus leaves it, with at most one request in flight
//! per field and a fixed timeout on every request.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod control;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod guard;
pub mod state;
pub mod status;
pub mod transport;

pub use config::ClientConfig;
pub use control::FieldControl;
pub use controller::{DropReason, FieldController, KeyChord, SaveAttempt};
pub use dispatcher::RequestDispatcher;
pub use error::{ClientError, StateError, TransportError};
pub use guard::{GuardSet, GuardTicket};
pub use state::{FieldState, Outcome};
pub use status::{StatusKind, StatusMessage, StatusPresenter};
pub use transport::{HttpTransport, SaveTransport, TransportReply};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
