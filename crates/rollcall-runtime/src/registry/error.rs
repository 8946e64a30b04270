//! Registry construction errors.
//!
//! These are startup configuration mistakes. They abort construction of the
//! registry and are never surfaced to RPC clients.

use rollcall_types::{ErrorCode, InvalidPath, ProcedurePath};
use thiserror::Error;

/// Error returned by [`RegistryBuilder::register`](crate::RegistryBuilder::register).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The address is already taken. The first registration is kept.
    #[error("procedure {path} is already registered")]
    DuplicateProcedure {
        /// The contested address.
        path: ProcedurePath,
    },

    /// A protected procedure declared no roles, or no access rule at all.
    #[error("procedure {path} declares no roles; use .requires(..) or .public()")]
    MissingRoles {
        /// The offending procedure.
        path: ProcedurePath,
    },

    /// The group or procedure name is malformed.
    #[error(transparent)]
    InvalidName(#[from] InvalidPath),
}

impl ErrorCode for RegistryError {
    fn code(&self) -> &'static str {
        match self {
            Self::DuplicateProcedure { .. } => "REGISTRY_DUPLICATE_PROCEDURE",
            Self::MissingRoles { .. } => "REGISTRY_MISSING_ROLES",
            Self::InvalidName(_) => "REGISTRY_INVALID_NAME",
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

    fn path() -> ProcedurePath {
        ProcedurePath::new("activity", "create").unwrap()
    }

    #[test]
    fn all_error_codes_valid() {
        assert_error_codes(
            &[
                RegistryError::DuplicateProcedure { path: path() },
                RegistryError::MissingRoles { path: path() },
                RegistryError::InvalidName(ProcedurePath::new("", "x").unwrap_err()),
            ],
            "REGISTRY_",
        );
    }

    #[test]
    fn display_names_the_procedure() {
        let err = RegistryError::DuplicateProcedure { path: path() };
        assert_eq!(err.to_string(), "procedure activity.create is already registered");
    }
}
