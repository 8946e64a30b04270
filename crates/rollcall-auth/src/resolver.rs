//! Session resolution.
//!
//! Turning a bearer token into a [`Session`] is the one step of a request
//! that may need I/O before the role check. [`SessionResolver`] abstracts
//! the identity collaborator; the runtime ships an in-memory implementation.

use crate::Session;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Bearer token presented by a client.
///
/// `Debug` redacts the value so tokens never reach logs.
///
/// ```
/// use rollcall_auth::SessionToken;
///
/// let token = SessionToken::new("secret-value");
/// assert_eq!(token.expose(), "secret-value");
/// assert_eq!(format!("{token:?}"), "SessionToken(***)");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionToken(***)")
    }
}

/// Identity collaborator: resolves tokens to sessions.
///
/// Returns `None` for unknown, revoked or expired tokens. The dispatcher
/// treats `None` exactly like an absent token.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use rollcall_auth::{Role, Session, SessionResolver, SessionToken};
/// use rollcall_types::UserId;
///
/// struct SingleToken;
///
/// #[async_trait]
/// impl SessionResolver for SingleToken {
///     async fn resolve(&self, token: &SessionToken) -> Option<Session> {
///         (token.expose() == "letmein")
///             .then(|| Session::new(UserId::new("alice"), Role::ADMIN))
///     }
/// }
/// ```
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// Resolves `token` to an active session.
    async fn resolve(&self, token: &SessionToken) -> Option<Session>;
}
