//! Procedure descriptors.
//!
//! A procedure is declared with a [`ProcedureSpec`] and stored in the
//! registry as a [`Procedure`]. The typed handler is erased at registration
//! into a two-step closure:
//!
//! ```text
//! raw JSON ──prepare──► Job ──run(ctx)──► JSON result
//!            (validate)      (handler)
//! ```
//!
//! The split lets the dispatcher validate input before committing to run
//! anything, and keeps the access rule outside the handler.

use crate::validate::{parse_input, Validate, ValidationErrors};
use crate::{ProcedureContext, RpcError};
use rollcall_auth::{Access, Role};
use rollcall_types::ProcedurePath;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed, sendable future returned by erased handlers.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Validated input bound to its handler, ready to run.
pub type Job = Box<dyn FnOnce(ProcedureContext) -> BoxFuture<Result<Value, RpcError>> + Send>;

type Prepare = Arc<dyn Fn(Value) -> Result<Job, ValidationErrors> + Send + Sync>;

/// Whether a procedure reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcedureKind {
    /// Read-only.
    Query,
    /// Changes stored records.
    Mutation,
}

impl fmt::Display for ProcedureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "query"),
            Self::Mutation => write!(f, "mutation"),
        }
    }
}

/// Input of procedures that take no payload.
///
/// Accepts an absent payload or `{}`; anything else is a validation error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoInput {}

impl Validate for NoInput {
    fn validate(&self, _errors: &mut ValidationErrors) {}
}

/// Declaration of a procedure, before registration.
///
/// The access rule is mandatory: a spec with neither
/// [`requires`](Self::requires) nor [`public`](Self::public) is rejected by
/// the registry.
///
/// # Example
///
/// ```
/// use rollcall_auth::Role;
/// use rollcall_runtime::{NoInput, ProcedureContext, ProcedureSpec, RpcError};
///
/// let spec = ProcedureSpec::query(|_ctx: ProcedureContext, _input: NoInput| async {
///     Ok::<_, RpcError>("pong")
/// })
/// .requires(Role::STAFF);
/// ```
pub struct ProcedureSpec {
    kind: ProcedureKind,
    access: Option<Access>,
    prepare: Prepare,
}

impl ProcedureSpec {
    /// Declares a read-only procedure.
    pub fn query<I, O, F, Fut>(handler: F) -> Self
    where
        I: DeserializeOwned + Validate + Send + 'static,
        O: Serialize + Send + 'static,
        F: Fn(ProcedureContext, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, RpcError>> + Send + 'static,
    {
        Self::with_kind(ProcedureKind::Query, handler)
    }

    /// Declares a procedure that changes stored records.
    pub fn mutation<I, O, F, Fut>(handler: F) -> Self
    where
        I: DeserializeOwned + Validate + Send + 'static,
        O: Serialize + Send + 'static,
        F: Fn(ProcedureContext, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, RpcError>> + Send + 'static,
    {
        Self::with_kind(ProcedureKind::Mutation, handler)
    }

    fn with_kind<I, O, F, Fut>(kind: ProcedureKind, handler: F) -> Self
    where
        I: DeserializeOwned + Validate + Send + 'static,
        O: Serialize + Send + 'static,
        F: Fn(ProcedureContext, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, RpcError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let prepare: Prepare = Arc::new(move |raw: Value| -> Result<Job, ValidationErrors> {
            let input: I = parse_input(raw)?;
            let handler = Arc::clone(&handler);
            let job: Job = Box::new(move |ctx: ProcedureContext| -> BoxFuture<_> {
                let fut = (*handler)(ctx, input);
                Box::pin(async move {
                    let output = fut.await?;
                    serde_json::to_value(output)
                        .map_err(|e| RpcError::storage(format!("result serialization: {e}")))
                })
            });
            Ok(job)
        });

        Self {
            kind,
            access: None,
            prepare,
        }
    }

    /// Restricts the procedure to sessions holding any of `roles`.
    #[must_use]
    pub fn requires(mut self, roles: Role) -> Self {
        self.access = Some(Access::any_of(roles));
        self
    }

    /// Opens the procedure to unauthenticated callers.
    #[must_use]
    pub fn public(mut self) -> Self {
        self.access = Some(Access::Public);
        self
    }

    pub(crate) fn kind(&self) -> ProcedureKind {
        self.kind
    }

    pub(crate) fn access(&self) -> Option<Access> {
        self.access
    }

    pub(crate) fn into_procedure(self, path: ProcedurePath, access: Access) -> Procedure {
        Procedure {
            path,
            kind: self.kind,
            access,
            prepare: self.prepare,
        }
    }
}

impl fmt::Debug for ProcedureSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcedureSpec")
            .field("kind", &self.kind)
            .field("access", &self.access)
            .finish_non_exhaustive()
    }
}

/// A registered procedure.
///
/// Cheap to clone; the handler is shared.
#[derive(Clone)]
pub struct Procedure {
    path: ProcedurePath,
    kind: ProcedureKind,
    access: Access,
    prepare: Prepare,
}

impl Procedure {
    /// Returns the procedure's address.
    #[must_use]
    pub fn path(&self) -> &ProcedurePath {
        &self.path
    }

    /// Returns query or mutation.
    #[must_use]
    pub fn kind(&self) -> ProcedureKind {
        self.kind
    }

    /// Returns the access rule.
    #[must_use]
    pub fn access(&self) -> Access {
        self.access
    }

    /// Validates `raw` and binds it to the handler.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] if the payload is malformed or breaks a
    /// business rule. Nothing has run at that point.
    pub fn prepare(&self, raw: Value) -> Result<Job, ValidationErrors> {
        (self.prepare)(raw)
    }
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Procedure")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("access", &self.access)
            .finish_non_exhaustive()
    }
}
