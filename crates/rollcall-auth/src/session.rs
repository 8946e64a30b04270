//! Session types (identity + roles).

use crate::Role;
use chrono::{DateTime, Duration, Utc};
use rollcall_types::UserId;
use serde::{Deserialize, Serialize};

/// An authenticated caller.
///
/// A Session is the runtime view of a logged-in staff member:
///
/// - **Who**: the opaque [`UserId`]
/// - **What**: the granted [`Role`] set
/// - **Until when**: an optional expiry instant
///
/// Sessions are immutable values owned by the request-handling layer and
/// read-only to procedures.
///
/// # Why No Default?
///
/// **DO NOT implement `Default` for Session.**
///
/// A session without an identity is not a session. The absence of a caller
/// is modelled as `Option<Session>::None`, never as an empty session.
///
/// # Example
///
/// ```
/// use rollcall_auth::{Role, Session};
/// use rollcall_types::UserId;
/// use chrono::Duration;
///
/// let session = Session::new(UserId::new("alice"), Role::OPERATOR)
///     .expires_in(Duration::hours(8));
///
/// assert!(session.has_any(Role::ADMIN | Role::OPERATOR));
/// assert!(!session.has_any(Role::ADMIN));
/// assert!(!session.is_expired());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    user: UserId,
    roles: Role,
    issued_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Creates a non-expiring session issued now.
    #[must_use]
    pub fn new(user: UserId, roles: Role) -> Self {
        Self {
            user,
            roles,
            issued_at: Utc::now(),
            expires_at: None,
        }
    }

    /// Returns a copy that expires `ttl` after issuance.
    #[must_use]
    pub fn expires_in(mut self, ttl: Duration) -> Self {
        self.expires_at = Some(self.issued_at + ttl);
        self
    }

    /// Returns a copy that expires at `at`.
    #[must_use]
    pub fn valid_until(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    /// Returns the caller's identity.
    #[must_use]
    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// Returns the caller's roles.
    #[must_use]
    pub fn roles(&self) -> Role {
        self.roles
    }

    /// Returns when the session was issued.
    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Returns the expiry instant, if any.
    #[must_use]
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns `true` if the session holds at least one of `roles`.
    #[must_use]
    pub fn has_any(&self, roles: Role) -> bool {
        self.roles.intersects(roles)
    }

    /// Returns `true` if the session has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }

    /// Returns `true` if the session has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl std::fmt::Display for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.user, self.roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(roles: Role) -> Session {
        Session::new(UserId::new("tester"), roles)
    }

    #[test]
    fn new_session_never_expires() {
        let s = session(Role::READER);
        assert!(s.expiry().is_none());
        assert!(!s.is_expired());
    }

    #[test]
    fn expires_in_is_relative_to_issuance() {
        let s = session(Role::READER).expires_in(Duration::minutes(5));
        assert_eq!(s.expiry(), Some(s.issued_at() + Duration::minutes(5)));
        assert!(!s.is_expired_at(s.issued_at() + Duration::minutes(4)));
        assert!(s.is_expired_at(s.issued_at() + Duration::minutes(5)));
    }

    #[test]
    fn expired_in_the_past() {
        let s = session(Role::ADMIN).valid_until(Utc::now() - Duration::seconds(1));
        assert!(s.is_expired());
    }

    #[test]
    fn has_any_is_intersection() {
        let s = session(Role::ADMIN | Role::READER);
        assert!(s.has_any(Role::ADMIN));
        assert!(s.has_any(Role::READER | Role::OPERATOR));
        assert!(!s.has_any(Role::OPERATOR));
        assert!(!s.has_any(Role::empty()));
    }

    #[test]
    fn display_shows_user_and_roles() {
        let s = session(Role::OPERATOR);
        assert_eq!(s.to_string(), "user:tester[OPERATOR]");
    }
}
