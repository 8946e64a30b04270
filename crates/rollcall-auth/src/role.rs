//! Staff roles.
//!
//! Roles form a closed set. A single [`Role`] value is also a role *set*:
//! sessions hold several roles and procedures accept several roles, and both
//! are expressed with the same bitflags type so that the authorization check
//! is one intersection.
//!
//! Roles are not ordered. `ADMIN` does not imply `READER`; a procedure that
//! should be readable by administrators lists `ADMIN` explicitly.
//!
//! # Example
//!
//! ```
//! use rollcall_auth::Role;
//!
//! let held = Role::ADMIN | Role::READER;
//! let required = Role::ADMIN | Role::OPERATOR;
//!
//! assert!(held.intersects(required));
//! assert_eq!(held & required, Role::ADMIN);
//! assert_eq!(held.to_string(), "ADMIN | READER");
//! ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Role labels granted to a session.
    ///
    /// | Role | Typical grants |
    /// |------|----------------|
    /// | [`ADMIN`](Self::ADMIN) | every read and write, deletes |
    /// | [`OPERATOR`](Self::OPERATOR) | volunteer and attendance writes |
    /// | [`READER`](Self::READER) | read-only queries |
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Role: u8 {
        /// Full administrative access.
        const ADMIN    = 0b0000_0001;
        /// Day-to-day volunteer management.
        const OPERATOR = 0b0000_0010;
        /// Read-only dashboard access.
        const READER   = 0b0000_0100;
    }
}

impl Role {
    /// Every role. Used by read procedures that any staff member may call.
    pub const STAFF: Self = Self::ADMIN.union(Self::OPERATOR).union(Self::READER);

    /// Returns the names of the contained roles in declaration order.
    ///
    /// ```
    /// use rollcall_auth::Role;
    ///
    /// assert_eq!(Role::STAFF.names(), vec!["ADMIN", "OPERATOR", "READER"]);
    /// assert!(Role::empty().names().is_empty());
    /// ```
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }

    /// Parses a single role name (case-insensitive).
    ///
    /// ```
    /// use rollcall_auth::Role;
    ///
    /// assert_eq!(Role::parse("admin"), Some(Role::ADMIN));
    /// assert_eq!(Role::parse("Operator"), Some(Role::OPERATOR));
    /// assert_eq!(Role::parse("owner"), None);
    /// ```
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_uppercase().as_str() {
            "ADMIN" => Some(Self::ADMIN),
            "OPERATOR" => Some(Self::OPERATOR),
            "READER" => Some(Self::READER),
            _ => None,
        }
    }

    /// Parses a list of role names into a combined set.
    ///
    /// Returns the combined roles and the names that were not recognized.
    /// The caller decides whether unknown names are fatal.
    ///
    /// ```
    /// use rollcall_auth::Role;
    ///
    /// let (roles, unknown) = Role::parse_list(&["ADMIN", "reader", "owner"]);
    /// assert_eq!(roles, Role::ADMIN | Role::READER);
    /// assert_eq!(unknown, vec!["owner"]);
    /// ```
    #[must_use]
    pub fn parse_list<'a, S: AsRef<str>>(names: &'a [S]) -> (Self, Vec<&'a str>) {
        let mut roles = Self::empty();
        let mut unknown = Vec::new();
        for name in names {
            match Self::parse(name.as_ref()) {
                Some(role) => roles |= role,
                None => unknown.push(name.as_ref()),
            }
        }
        (roles, unknown)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = self.names();
        if names.is_empty() {
            write!(f, "(none)")
        } else {
            write!(f, "{}", names.join(" | "))
        }
    }
}
