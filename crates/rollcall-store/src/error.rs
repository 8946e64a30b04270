//! Store error types.

use rollcall_types::{ErrorCode, RecordId};
use thiserror::Error;

/// Errors returned by a [`Repository`](crate::Repository).
///
/// # Example
///
/// ```
/// use rollcall_store::StoreError;
/// use rollcall_types::{ErrorCode, RecordId};
///
/// let err = StoreError::not_found("activity", RecordId(7));
/// assert_eq!(err.code(), "STORE_NOT_FOUND");
/// assert_eq!(err.to_string(), "activity 7 not found");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No record with this id.
    #[error("{resource} {id} not found")]
    NotFound {
        /// Resource name (`activity`, `volunteer`, `attendance`).
        resource: &'static str,
        /// Requested id.
        id: RecordId,
    },

    /// The write would violate a uniqueness constraint.
    #[error("{resource} conflict: {reason}")]
    Conflict {
        /// Resource name.
        resource: &'static str,
        /// What collided.
        reason: String,
    },

    /// The write would leave a row breaking a record invariant.
    #[error("{resource} {field}: {reason}")]
    Constraint {
        /// Resource name.
        resource: &'static str,
        /// Wire name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A capped insert found the scope already full.
    #[error("{resource} capacity of {limit} reached")]
    CapacityReached {
        /// Resource name.
        resource: &'static str,
        /// Rows allowed in the scope.
        limit: usize,
    },

    /// The backend failed. The message is for logs, not for clients.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// Creates a NotFound error.
    pub fn not_found(resource: &'static str, id: RecordId) -> Self {
        Self::NotFound { resource, id }
    }

    /// Creates a Conflict error.
    pub fn conflict(resource: &'static str, reason: impl Into<String>) -> Self {
        Self::Conflict {
            resource,
            reason: reason.into(),
        }
    }

    /// Creates a Constraint error.
    pub fn constraint(
        resource: &'static str,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::Constraint {
            resource,
            field,
            reason: reason.into(),
        }
    }

    /// Creates a Backend error.
    pub fn backend(detail: impl Into<String>) -> Self {
        Self::Backend(detail.into())
    }
}

impl ErrorCode for StoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "STORE_NOT_FOUND",
            Self::Conflict { .. } => "STORE_CONFLICT",
            Self::Constraint { .. } => "STORE_CONSTRAINT",
            Self::CapacityReached { .. } => "STORE_CAPACITY_REACHED",
            Self::Backend(_) => "STORE_BACKEND",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}
