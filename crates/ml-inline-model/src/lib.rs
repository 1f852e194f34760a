//! ML Inline Model
//!
//! Types shared by the save endpoint and the in-page client:
//!
//! - [`AttachmentId`]: positive record identifier
//! - [`FieldName`] / [`EditableField`]: the closed set of independently saved attributes
//! - [`SaveRequest`] / [`SaveResponse`]: the wire shapes of one save attempt
//! - [`SaveResult`] / [`ErrorClass`]: the settled outcome as the client sees it
//! - [`AttachmentRecord`]: what the attachment store holds for a record
//! - [`ControlDescriptor`]: one rendered editable control
//! - [`mime`]: the fixed image MIME allow-list

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod control;
mod field;
mod id;
pub mod mime;
mod record;
mod wire;

pub use control::{ControlDescriptor, ControlKind};
pub use field::{EditableField, FieldName, FieldNameError, COLUMN_KEYS};
pub use id::{AttachmentId, AttachmentIdError};
pub use record::{AttachmentRecord, RecordKind};
pub use wire::{
    messages, ErrorClass, SaveRequest, SaveResponse, SaveResult, DEFAULT_ACTION,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
