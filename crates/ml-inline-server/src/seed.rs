//! JSON seed for the in-memory deployment
//!
//! ```json
//! {
//!   "records":  [{ "id": 1, "mime_type": "image/jpeg", "title": "Barn" }],
//!   "editors":  [{ "actor": "alice" }, { "actor": "bob", "attachments": [1] }],
//!   "sessions": [{ "id": "dev-session", "actor": "alice" }]
//! }
//! ```

use crate::authz::CapabilityTable;
use crate::error::ServerError;
use crate::session::{ActorId, SessionId, SessionTable};
use crate::store::MemoryStore;
use ml_inline_model::{AttachmentId, AttachmentRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub records: Vec<AttachmentRecord>,
    #[serde(default)]
    pub editors: Vec<EditorGrant>,
    #[serde(default)]
    pub sessions: Vec<SeedSession>,
}

/// `attachments: None` grants every record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorGrant {
    pub actor: String,
    #[serde(default)]
    pub attachments: Option<Vec<AttachmentId>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedSession {
    pub id: String,
    pub actor: String,
}

/// Store, grants and sessions built from a seed
#[derive(Debug)]
pub struct SeededParts {
    pub store: MemoryStore,
    pub grants: CapabilityTable,
    pub sessions: SessionTable,
}

impl SeedFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ServerError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ServerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|e| ServerError::Seed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Materialise the seed; sessions get a window of `session_window_secs`
    #[must_use]
    pub fn into_parts(self, session_window_secs: u64) -> SeededParts {
        let store = MemoryStore::from_records(self.records);

        let grants = CapabilityTable::new();
        for editor in self.editors {
            let actor = ActorId::new(editor.actor);
            match editor.attachments {
                None => grants.grant_all(actor),
                Some(ids) => {
                    for id in ids {
                        grants.grant(actor.clone(), id);
                    }
                }
            }
        }

        let sessions = SessionTable::new(session_window_secs);
        for seeded in self.sessions {
            sessions.open_with_id(SessionId(seeded.id), ActorId::new(seeded.actor));
        }

        SeededParts {
            store,
            grants,
            sessions,
        }
    }
}
