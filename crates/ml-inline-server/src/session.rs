//! Hosting sessions
//!
//! Sessions belong to the host application. The save endpoint only needs to
//! resolve the session cookie to an actor and a validity window.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Cookie carrying the session identifier
pub const SESSION_COOKIE: &str = "ml_inline_session";

/// Session identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Random identifier
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The editor acting in a session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

impl ActorId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl Display for ActorId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A hosting session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub actor: ActorId,
    /// Unix timestamp
    pub started_at: u64,
    /// Unix timestamp; tokens minted in this session stop verifying after it
    pub expires_at: u64,
}

impl Session {
    /// Session starting now and lasting `window_secs`
    #[must_use]
    pub fn start(id: SessionId, actor: ActorId, window_secs: u64) -> Self {
        let started_at = unix_now();
        Self {
            id,
            actor,
            started_at,
            expires_at: started_at.saturating_add(window_secs),
        }
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        unix_now() > self.expires_at
    }
}

/// Resolves a session cookie value
pub trait SessionResolver: Send + Sync {
    fn resolve(&self, cookie: &str) -> Option<Session>;
}

/// In-process session table
#[derive(Debug)]
pub struct SessionTable {
    window_secs: u64,
    sessions: DashMap<SessionId, Session>,
}

impl SessionTable {
    #[must_use]
    pub fn new(window_secs: u64) -> Self {
        Self {
            window_secs,
            sessions: DashMap::new(),
        }
    }

    /// Open a fresh session for `actor`
    pub fn open(&self, actor: ActorId) -> Session {
        self.open_with_id(SessionId::generate(), actor)
    }

    /// Open a session under a caller-chosen id, replacing any previous one.
    /// Expired sessions are dropped first.
    pub fn open_with_id(&self, id: SessionId, actor: ActorId) -> Session {
        self.purge_expired();
        let session = Session::start(id.clone(), actor, self.window_secs);
        self.sessions.insert(id, session.clone());
        session
    }

    /// Add an existing session as-is
    pub fn insert(&self, session: Session) {
        self.sessions.insert(session.id.clone(), session);
    }

    pub fn close(&self, id: &SessionId) {
        self.sessions.remove(id);
    }

    /// Remove every session past its window; returns how many went
    pub fn purge_expired(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired());
        before.saturating_sub(self.sessions.len())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionResolver for SessionTable {
    fn resolve(&self, cookie: &str) -> Option<Session> {
        let id = SessionId(cookie.trim().to_string());
        let session = self.sessions.get(&id).map(|entry| entry.value().clone())?;
        if session.is_expired() {
            self.sessions.remove(&id);
            return None;
        }
        Some(session)
    }
}

pub(crate) fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_and_resolve() {
        let table = SessionTable::new(60);
        let session = table.open(ActorId::new("alice"));

        let resolved = table.resolve(session.id.as_str()).unwrap();
        assert_eq!(resolved.actor, ActorId::new("alice"));
        assert_eq!(resolved.expires_at, resolved.started_at + 60);
        assert!(!resolved.is_expired());
    }

    #[test]
    fn unknown_and_closed_sessions_do_not_resolve() {
        let table = SessionTable::new(60);
        assert!(table.resolve("nope").is_none());

        let session = table.open(ActorId::new("bob"));
        table.close(&session.id);
        assert!(table.resolve(session.id.as_str()).is_none());
        assert!(table.is_empty());
    }

    fn expired(actor: &str) -> Session {
        let mut session = Session::start(SessionId::generate(), ActorId::new(actor), 60);
        session.expires_at = session.started_at.saturating_sub(1);
        session
    }

    #[test]
    fn expired_sessions_are_evicted() {
        let table = SessionTable::new(60);
        let stale = expired("old");
        table.insert(stale.clone());
        table.insert(expired("older"));
        assert_eq!(table.len(), 2);

        assert!(table.resolve(stale.id.as_str()).is_none());
        assert_eq!(table.len(), 1);

        let fresh = table.open(ActorId::new("new"));
        assert_eq!(table.len(), 1);
        assert!(table.resolve(fresh.id.as_str()).is_some());
        assert_eq!(table.purge_expired(), 0);
    }

    #[test]
    fn past_window_is_expired() {
        let mut session = Session::start(SessionId::generate(), ActorId::new("a"), 60);
        session.expires_at = session.started_at.saturating_sub(1);
        assert!(session.is_expired());
    }
}
