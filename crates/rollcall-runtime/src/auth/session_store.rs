//! In-memory session store.
//!
//! Implements [`SessionResolver`] for deployments without an external
//! identity provider, and for tests.
//!
//! # Token Lifecycle
//!
//! ```text
//! login ──► token ──resolve──► Some(session)
//!             │
//!             ├── logout ─────► None
//!             └── expiry ─────► None (evicted on resolve)
//! ```

use async_trait::async_trait;
use chrono::Duration;
use parking_lot::RwLock;
use rollcall_auth::{Role, Session, SessionResolver, SessionToken};
use rollcall_types::UserId;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// Thread-safe token → session map.
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use rollcall_auth::{Role, SessionResolver};
/// use rollcall_runtime::auth::MemorySessionStore;
/// use rollcall_types::UserId;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let store = MemorySessionStore::new();
/// let token = store.login(UserId::new("alice"), Role::ADMIN, Duration::hours(8));
///
/// let session = store.resolve(&token).await.unwrap();
/// assert_eq!(session.user().as_str(), "alice");
///
/// assert!(store.logout(&token));
/// assert!(store.resolve(&token).await.is_none());
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionToken, Session>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session valid for `ttl` and returns its fresh random token.
    pub fn login(&self, user: UserId, roles: Role, ttl: Duration) -> SessionToken {
        let token = SessionToken::new(Uuid::new_v4().to_string());
        let session = Session::new(user, roles).expires_in(ttl);
        debug!(user = %session.user(), roles = %roles, "session opened");
        self.sessions.write().insert(token.clone(), session);
        token
    }

    /// Registers a session under a caller-chosen token, replacing any
    /// previous session for that token.
    pub fn insert(&self, token: SessionToken, session: Session) {
        self.sessions.write().insert(token, session);
    }

    /// Closes a session. Returns `false` if the token was unknown.
    pub fn logout(&self, token: &SessionToken) -> bool {
        let removed = self.sessions.write().remove(token);
        if let Some(session) = &removed {
            debug!(user = %session.user(), "session closed");
        }
        removed.is_some()
    }

    /// Drops every expired session and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired());
        before - sessions.len()
    }

    /// Number of stored sessions, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Returns `true` if no sessions are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, token: &SessionToken) -> Option<Session> {
        let session = self.sessions.read().get(token).cloned()?;
        if session.is_expired() {
            self.evict_expired(token);
            return None;
        }
        Some(session)
    }

    /// Removes the session under `token` if it is expired at the time of
    /// removal. A fresh session inserted since the caller's read survives.
    fn evict_expired(&self, token: &SessionToken) {
        let mut sessions = self.sessions.write();
        if sessions.get(token).is_some_and(Session::is_expired) {
            if let Some(session) = sessions.remove(token) {
                debug!(user = %session.user(), "expired session evicted");
            }
        }
    }
}

#[async_trait]
impl SessionResolver for MemorySessionStore {
    async fn resolve(&self, token: &SessionToken) -> Option<Session> {
        self.lookup(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn login_tokens_are_unique() {
        let store = MemorySessionStore::new();
        let a = store.login(UserId::new("a"), Role::READER, Duration::hours(1));
        let b = store.login(UserId::new("a"), Role::READER, Duration::hours(1));
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn resolve_returns_roles() {
        let store = MemorySessionStore::new();
        let token = store.login(UserId::new("op"), Role::OPERATOR, Duration::hours(1));
        let session = store.resolve(&token).await.unwrap();
        assert_eq!(session.roles(), Role::OPERATOR);
    }

    #[tokio::test]
    async fn unknown_token_resolves_to_none() {
        let store = MemorySessionStore::new();
        assert!(store.resolve(&SessionToken::new("nope")).await.is_none());
    }

    #[tokio::test]
    async fn expired_session_is_evicted_on_resolve() {
        let store = MemorySessionStore::new();
        let token = SessionToken::new("stale");
        store.insert(
            token.clone(),
            Session::new(UserId::new("old"), Role::ADMIN)
                .valid_until(Utc::now() - Duration::seconds(1)),
        );
        assert_eq!(store.len(), 1);

        assert!(store.resolve(&token).await.is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn eviction_spares_session_replaced_after_read() {
        let store = MemorySessionStore::new();
        let token = SessionToken::new("shared");
        store.insert(
            token.clone(),
            Session::new(UserId::new("old"), Role::READER)
                .valid_until(Utc::now() - Duration::seconds(1)),
        );

        // A resolve read the expired entry; a fresh login lands before the
        // eviction runs.
        store.insert(
            token.clone(),
            Session::new(UserId::new("new"), Role::ADMIN).expires_in(Duration::hours(1)),
        );
        store.evict_expired(&token);

        let session = store.resolve(&token).await.unwrap();
        assert_eq!(session.user().as_str(), "new");
    }

    #[test]
    fn logout_unknown_is_false() {
        let store = MemorySessionStore::new();
        assert!(!store.logout(&SessionToken::new("ghost")));
    }

    #[test]
    fn purge_expired_keeps_live_sessions() {
        let store = MemorySessionStore::new();
        store.login(UserId::new("live"), Role::READER, Duration::hours(1));
        store.insert(
            SessionToken::new("dead"),
            Session::new(UserId::new("dead"), Role::READER)
                .valid_until(Utc::now() - Duration::seconds(5)),
        );
        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
    }
}
