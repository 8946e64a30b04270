//! Procedure registry.
//!
//! # Lifecycle
//!
//! ```text
//! RegistryBuilder ──register()*──► build() ──► ProcedureRegistry
//!   (mutable, startup only)                     (immutable, Arc-shared)
//! ```
//!
//! The builder rejects duplicates and procedures without an access rule.
//! Once built, the registry is a sorted map read without locks from any
//! number of tasks.
//!
//! # Example
//!
//! ```
//! use rollcall_auth::Role;
//! use rollcall_runtime::{NoInput, ProcedureContext, ProcedureSpec, RegistryBuilder, RpcError};
//!
//! async fn ping(_ctx: ProcedureContext, _input: NoInput) -> Result<&'static str, RpcError> {
//!     Ok("pong")
//! }
//!
//! let mut builder = RegistryBuilder::new();
//! builder
//!     .register("health", "ping", ProcedureSpec::query(ping).public())
//!     .unwrap();
//! let registry = builder.build();
//!
//! assert!(registry.resolve("health", "ping").is_ok());
//! assert!(registry.resolve("health", "pong").is_err());
//! ```

mod error;
mod procedure;

pub use error::RegistryError;
pub use procedure::{BoxFuture, Job, NoInput, Procedure, ProcedureKind, ProcedureSpec};

use crate::RpcError;
use rollcall_auth::{Access, Role};
use rollcall_types::ProcedurePath;
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::debug;

/// Mutable registry under construction.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    procedures: BTreeMap<ProcedurePath, Procedure>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a procedure under `group.name`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidName`] for malformed segments.
    /// - [`RegistryError::MissingRoles`] if the spec has no access rule or
    ///   an empty role set.
    /// - [`RegistryError::DuplicateProcedure`] if the address is taken; the
    ///   existing entry is left untouched.
    pub fn register(
        &mut self,
        group: &str,
        name: &str,
        spec: ProcedureSpec,
    ) -> Result<&mut Self, RegistryError> {
        let path = ProcedurePath::new(group, name)?;

        let access = match spec.access() {
            Some(Access::AnyOf(roles)) if roles.is_empty() => {
                return Err(RegistryError::MissingRoles { path });
            }
            Some(access) => access,
            None => return Err(RegistryError::MissingRoles { path }),
        };

        match self.procedures.entry(path) {
            Entry::Occupied(entry) => Err(RegistryError::DuplicateProcedure {
                path: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                debug!(
                    procedure = %entry.key(),
                    kind = %spec.kind(),
                    access = %access,
                    "registered procedure"
                );
                let path = entry.key().clone();
                entry.insert(spec.into_procedure(path, access));
                Ok(self)
            }
        }
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> ProcedureRegistry {
        ProcedureRegistry {
            procedures: self.procedures,
        }
    }
}

/// Immutable set of procedures.
///
/// Share it with `Arc`; all methods take `&self`.
#[derive(Debug)]
pub struct ProcedureRegistry {
    procedures: BTreeMap<ProcedurePath, Procedure>,
}

impl ProcedureRegistry {
    /// Looks up `group.name`.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::NotFound`] naming the procedure if it does not
    /// exist.
    pub fn resolve(&self, group: &str, name: &str) -> Result<&Procedure, RpcError> {
        ProcedurePath::new(group, name)
            .ok()
            .and_then(|path| self.procedures.get(&path))
            .ok_or_else(|| RpcError::procedure_not_found(format_args!("{group}.{name}")))
    }

    /// Looks up a parsed path.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::NotFound`] if the procedure does not exist.
    pub fn resolve_path(&self, path: &ProcedurePath) -> Result<&Procedure, RpcError> {
        self.procedures
            .get(path)
            .ok_or_else(|| RpcError::procedure_not_found(path))
    }

    /// Iterates procedures in address order.
    pub fn iter(&self) -> impl Iterator<Item = &Procedure> {
        self.procedures.values()
    }

    /// Number of registered procedures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }

    /// Dumps the access policy for audit.
    #[must_use]
    pub fn policy_table(&self) -> Vec<PolicyEntry> {
        self.iter().map(PolicyEntry::from).collect()
    }
}

/// One row of the policy table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyEntry {
    /// `group.name`.
    pub procedure: String,
    /// Query or mutation.
    pub kind: ProcedureKind,
    /// `true` if callable without a session.
    pub public: bool,
    /// Accepted role names, empty for public procedures.
    pub roles: Vec<&'static str>,
}

impl PolicyEntry {
    /// Accepted roles as a set.
    #[must_use]
    pub fn role_set(&self) -> Role {
        self.roles
            .iter()
            .filter_map(|name| Role::parse(name))
            .fold(Role::empty(), |acc, r| acc | r)
    }
}

impl From<&Procedure> for PolicyEntry {
    fn from(procedure: &Procedure) -> Self {
        let access = procedure.access();
        Self {
            procedure: procedure.path().to_string(),
            kind: procedure.kind(),
            public: access.is_public(),
            roles: access.required_roles().names(),
        }
    }
}
