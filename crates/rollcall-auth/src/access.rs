//! Declarative access rules and the single authorization function.
//!
//! Every procedure carries an [`Access`] value. [`authorize`] is the only
//! place that interprets it, so the whole policy can be audited as data and
//! tested without any transport or storage.
//!
//! # Decision Table
//!
//! | Access | Session | Result |
//! |--------|---------|--------|
//! | `Public` | any / none | granted |
//! | `AnyOf(R)` | none | `Unauthenticated` |
//! | `AnyOf(R)` | roles ∩ R ≠ ∅ | granted |
//! | `AnyOf(R)` | roles ∩ R = ∅ | `Forbidden` |
//!
//! Matching is **any-of**: holding one accepted role is enough.

use crate::{AccessDenied, Role, Session};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Access rule attached to a procedure.
///
/// # Example
///
/// ```
/// use rollcall_auth::{authorize, Access, Role, Session};
/// use rollcall_types::UserId;
///
/// let rule = Access::any_of(Role::ADMIN | Role::OPERATOR);
/// let operator = Session::new(UserId::new("op"), Role::OPERATOR);
///
/// assert!(authorize(rule, Some(&operator)).is_ok());
/// assert!(authorize(rule, None).is_err());
/// assert!(authorize(Access::Public, None).is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "access", content = "roles", rename_all = "snake_case")]
pub enum Access {
    /// Callable without a session. Must be chosen explicitly.
    Public,
    /// Callable by a session holding at least one of the roles.
    AnyOf(Role),
}

impl Access {
    /// Shorthand for [`Access::AnyOf`].
    #[must_use]
    pub fn any_of(roles: Role) -> Self {
        Self::AnyOf(roles)
    }

    /// Returns `true` for [`Access::Public`].
    #[must_use]
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Public)
    }

    /// Returns the accepted roles (empty for public procedures).
    #[must_use]
    pub fn required_roles(&self) -> Role {
        match self {
            Self::Public => Role::empty(),
            Self::AnyOf(roles) => *roles,
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "PUBLIC"),
            Self::AnyOf(roles) => write!(f, "{roles}"),
        }
    }
}

/// Successful authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// The procedure is public; no role was consulted.
    Public,
    /// The session matched these roles of the requirement.
    Matched(Role),
}

/// Decides whether `session` may call a procedure guarded by `access`.
///
/// Pure and synchronous: no I/O, no clock. Session expiry is handled when
/// the session is resolved, before this function is reached.
///
/// # Errors
///
/// - [`AccessDenied::Unauthenticated`] if the rule is protected and there
///   is no session.
/// - [`AccessDenied::Forbidden`] if the session holds none of the roles.
pub fn authorize(access: Access, session: Option<&Session>) -> Result<Grant, AccessDenied> {
    let required = match access {
        Access::Public => return Ok(Grant::Public),
        Access::AnyOf(required) => required,
    };

    let Some(session) = session else {
        return Err(AccessDenied::Unauthenticated);
    };

    let matched = session.roles() & required;
    if matched.is_empty() {
        Err(AccessDenied::Forbidden {
            required,
            held: session.roles(),
        })
    } else {
        Ok(Grant::Matched(matched))
    }
}
