//! Client-facing procedure errors.
//!
//! Every rejected request yields exactly one [`RpcError`]. The variant is
//! chosen by the first pipeline stage that fails:
//!
//! ```text
//! resolve ──► NotFound
//! authorize ─► Unauthenticated | Forbidden
//! validate ──► Validation
//! handler ───► NotFound | Validation | Storage
//! ```
//!
//! | Variant | Code | Recoverable |
//! |---------|------|-------------|
//! | [`Unauthenticated`](RpcError::Unauthenticated) | `RPC_UNAUTHENTICATED` | No |
//! | [`Forbidden`](RpcError::Forbidden) | `RPC_FORBIDDEN` | No |
//! | [`Validation`](RpcError::Validation) | `RPC_VALIDATION_FAILED` | No |
//! | [`NotFound`](RpcError::NotFound) | `RPC_NOT_FOUND` | No |
//! | [`Storage`](RpcError::Storage) | `RPC_STORAGE` | Yes |

use crate::{FieldIssue, ValidationErrors};
use rollcall_auth::{AccessDenied, Role};
use rollcall_store::StoreError;
use rollcall_types::{ErrorCode, ProcedurePath, RecordId};
use thiserror::Error;

/// Public message for storage failures. The real cause is only logged.
pub const STORAGE_FAILURE_MESSAGE: &str = "the data store is unavailable, try again later";

/// Error returned by [`Dispatcher::invoke`](crate::Dispatcher::invoke).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RpcError {
    /// No valid session for a protected procedure.
    #[error("you must log in to call this procedure")]
    Unauthenticated,

    /// The session holds none of the accepted roles.
    #[error("not permitted: requires any of {required}")]
    Forbidden {
        /// Roles the procedure accepts.
        required: Role,
        /// Roles the session holds.
        held: Role,
    },

    /// The payload failed deserialization or business rules.
    #[error("invalid input: {0}")]
    Validation(ValidationErrors),

    /// Unknown procedure or missing record.
    #[error("{target} not found")]
    NotFound {
        /// What was looked for, e.g. `procedure activity.nope` or `volunteer 3`.
        target: String,
    },

    /// The store failed or timed out. `detail` never reaches clients.
    #[error("{}", STORAGE_FAILURE_MESSAGE)]
    Storage {
        /// Backend detail for logs.
        detail: String,
    },
}

impl RpcError {
    /// Unknown procedure.
    pub fn procedure_not_found(path: impl std::fmt::Display) -> Self {
        Self::NotFound {
            target: format!("procedure {path}"),
        }
    }

    /// Missing record.
    pub fn record_not_found(resource: &str, id: RecordId) -> Self {
        Self::NotFound {
            target: format!("{resource} {id}"),
        }
    }

    /// Single-field validation failure.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(ValidationErrors::single(field, message))
    }

    /// Storage failure with a hidden detail.
    pub fn storage(detail: impl Into<String>) -> Self {
        Self::Storage {
            detail: detail.into(),
        }
    }

    /// Field-level detail, present only for validation failures.
    #[must_use]
    pub fn fields(&self) -> Option<&[FieldIssue]> {
        match self {
            Self::Validation(errors) => Some(errors.issues()),
            _ => None,
        }
    }

    /// Returns `true` for the two authorization denials.
    #[must_use]
    pub fn is_denial(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::Forbidden { .. })
    }

    pub(crate) fn timed_out(path: &ProcedurePath, after: std::time::Duration) -> Self {
        Self::storage(format!("{path} exceeded handler timeout of {after:?}"))
    }
}

impl ErrorCode for RpcError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "RPC_UNAUTHENTICATED",
            Self::Forbidden { .. } => "RPC_FORBIDDEN",
            Self::Validation(_) => "RPC_VALIDATION_FAILED",
            Self::NotFound { .. } => "RPC_NOT_FOUND",
            Self::Storage { .. } => "RPC_STORAGE",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}

impl From<AccessDenied> for RpcError {
    fn from(denied: AccessDenied) -> Self {
        match denied {
            AccessDenied::Unauthenticated => Self::Unauthenticated,
            AccessDenied::Forbidden { required, held } => Self::Forbidden { required, held },
        }
    }
}

impl From<ValidationErrors> for RpcError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<StoreError> for RpcError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { resource, id } => Self::record_not_found(resource, id),
            StoreError::Conflict { reason, .. } => Self::invalid("input", reason),
            StoreError::Constraint { field, reason, .. } => Self::invalid(field, reason),
            StoreError::CapacityReached { resource, limit } => {
                Self::invalid("input", format!("{resource} limit of {limit} reached"))
            }
            StoreError::Backend(detail) => Self::Storage { detail },
        }
    }
}
