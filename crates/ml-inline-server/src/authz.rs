//! Authorization seam
//!
//! One capability matters here: may this actor edit this record.

use crate::session::ActorId;
use async_trait::async_trait;
use dashmap::DashMap;
use ml_inline_model::AttachmentId;
use std::collections::HashSet;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorizationService: Send + Sync {
    async fn can_edit(&self, actor: &ActorId, id: AttachmentId) -> bool;
}

/// What an actor may edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grant {
    All,
    Only(HashSet<AttachmentId>),
}

/// Grant table keyed by actor; unknown actors may edit nothing
#[derive(Debug, Default)]
pub struct CapabilityTable {
    grants: DashMap<ActorId, Grant>,
}

impl CapabilityTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant_all(&self, actor: ActorId) {
        self.grants.insert(actor, Grant::All);
    }

    pub fn grant(&self, actor: ActorId, id: AttachmentId) {
        let mut entry = self
            .grants
            .entry(actor)
            .or_insert_with(|| Grant::Only(HashSet::new()));
        if let Grant::Only(ids) = entry.value_mut() {
            ids.insert(id);
        }
    }

    pub fn revoke(&self, actor: &ActorId) {
        self.grants.remove(actor);
    }
}

#[async_trait]
impl AuthorizationService for CapabilityTable {
    async fn can_edit(&self, actor: &ActorId, id: AttachmentId) -> bool {
        match self.grants.get(actor).as_deref() {
            Some(Grant::All) => true,
            Some(Grant::Only(ids)) => ids.contains(&id),
            None => false,
        }
    }
}
