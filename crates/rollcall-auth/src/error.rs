//! Authorization failures.
//!
//! The two variants are deliberately distinct so clients can tell
//! "log in first" apart from "logged in, but not allowed".
//!
//! | Variant | Code | Recoverable |
//! |---------|------|-------------|
//! | [`Unauthenticated`](AccessDenied::Unauthenticated) | `AUTH_UNAUTHENTICATED` | No |
//! | [`Forbidden`](AccessDenied::Forbidden) | `AUTH_FORBIDDEN` | No |

use crate::Role;
use rollcall_types::ErrorCode;
use thiserror::Error;

/// Result of a failed authorization decision.
///
/// # Example
///
/// ```
/// use rollcall_auth::{AccessDenied, Role};
/// use rollcall_types::ErrorCode;
///
/// let err = AccessDenied::Forbidden {
///     required: Role::ADMIN,
///     held: Role::READER,
/// };
/// assert_eq!(err.code(), "AUTH_FORBIDDEN");
/// assert!(err.to_string().contains("ADMIN"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    /// No session, or the session could not be resolved.
    #[error("authentication required")]
    Unauthenticated,

    /// The session holds none of the required roles.
    #[error("forbidden: requires any of {required}, session holds {held}")]
    Forbidden {
        /// Roles the procedure accepts.
        required: Role,
        /// Roles the session holds.
        held: Role,
    },
}

impl ErrorCode for AccessDenied {
    fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "AUTH_UNAUTHENTICATED",
            Self::Forbidden { .. } => "AUTH_FORBIDDEN",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_types::assert_error_codes;

    #[test]
    fn all_error_codes_valid() {
        assert_error_codes(
            &[
                AccessDenied::Unauthenticated,
                AccessDenied::Forbidden {
                    required: Role::ADMIN,
                    held: Role::empty(),
                },
            ],
            "AUTH_",
        );
    }

    #[test]
    fn never_recoverable() {
        assert!(!AccessDenied::Unauthenticated.is_recoverable());
        assert!(!AccessDenied::Forbidden {
            required: Role::ADMIN,
            held: Role::READER,
        }
        .is_recoverable());
    }

    #[test]
    fn forbidden_display_names_both_sets() {
        let err = AccessDenied::Forbidden {
            required: Role::ADMIN | Role::OPERATOR,
            held: Role::READER,
        };
        let msg = err.to_string();
        assert!(msg.contains("ADMIN | OPERATOR"), "got: {msg}");
        assert!(msg.contains("READER"), "got: {msg}");
    }
}
