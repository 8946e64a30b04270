//! Authorization middleware and dispatcher.
//!
//! # Pipeline
//!
//! ```text
//! invoke(group, name, input, session?)
//!   │
//!   ├─ 1. resolve procedure ───────────── NotFound
//!   ├─ 2. drop expired session
//!   ├─ 3. authorize(access, session) ──── Unauthenticated | Forbidden
//!   ├─ 4. prepare(input) ──────────────── Validation
//!   └─ 5. run handler (with timeout) ──── handler error | Storage
//! ```
//!
//! Each stage either passes to the next or returns exactly one error. The
//! handler and the store are only reached after stages 1-4 passed.
//!
//! # Audit Logging
//!
//! | Event | Level |
//! |-------|-------|
//! | access granted | `debug` |
//! | access denied | `warn` |
//! | mutation executed | `info` |
//! | storage failure, timeout | `error` |

use crate::{
    ProcedureContext, ProcedureKind, ProcedureRegistry, RpcError, RpcRequest, RpcResponse,
};
use rollcall_auth::{authorize, Grant, Session, SessionResolver};
use rollcall_store::Database;
use rollcall_types::{ErrorCode, ProcedurePath, RequestId};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default upper bound on handler execution.
pub const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Routes calls through the authorization pipeline to handlers.
///
/// Cheap to share behind `Arc`; every method takes `&self` and requests are
/// independent.
pub struct Dispatcher {
    registry: Arc<ProcedureRegistry>,
    db: Database,
    sessions: Arc<dyn SessionResolver>,
    handler_timeout: Duration,
}

impl Dispatcher {
    /// Creates a dispatcher with [`DEFAULT_HANDLER_TIMEOUT`].
    pub fn new(
        registry: Arc<ProcedureRegistry>,
        db: Database,
        sessions: Arc<dyn SessionResolver>,
    ) -> Self {
        Self {
            registry,
            db,
            sessions,
            handler_timeout: DEFAULT_HANDLER_TIMEOUT,
        }
    }

    /// Overrides the handler timeout.
    #[must_use]
    pub fn with_handler_timeout(mut self, timeout: Duration) -> Self {
        self.handler_timeout = timeout;
        self
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &ProcedureRegistry {
        &self.registry
    }

    /// Returns the configured handler timeout.
    #[must_use]
    pub fn handler_timeout(&self) -> Duration {
        self.handler_timeout
    }

    /// Runs `group.name` for `session` with the raw payload `input`.
    ///
    /// Pass `Value::Null` for procedures without input. An expired session
    /// is treated as no session.
    ///
    /// # Errors
    ///
    /// Returns the [`RpcError`] of the first failing pipeline stage.
    pub async fn invoke(
        &self,
        group: &str,
        name: &str,
        input: Value,
        session: Option<Session>,
    ) -> Result<Value, RpcError> {
        let procedure = self.registry.resolve(group, name)?;
        let path = procedure.path();
        let request_id = RequestId::new();

        let session = session.filter(|s| {
            let expired = s.is_expired();
            if expired {
                debug!(
                    request = %request_id,
                    procedure = %path,
                    user = %s.user(),
                    "session expired"
                );
            }
            !expired
        });

        match authorize(procedure.access(), session.as_ref()) {
            Ok(Grant::Public) => {
                debug!(request = %request_id, procedure = %path, "public procedure");
            }
            Ok(Grant::Matched(matched)) => {
                debug!(
                    request = %request_id,
                    procedure = %path,
                    user = %display_user(session.as_ref()),
                    roles = %matched,
                    "access granted"
                );
            }
            Err(denied) => {
                warn!(
                    request = %request_id,
                    procedure = %path,
                    user = %display_user(session.as_ref()),
                    code = denied.code(),
                    reason = %denied,
                    "access denied"
                );
                return Err(denied.into());
            }
        }

        let job = procedure.prepare(input).map_err(|errors| {
            debug!(request = %request_id, procedure = %path, issues = %errors, "invalid input");
            RpcError::from(errors)
        })?;

        let ctx = ProcedureContext::new(request_id, session, self.db.clone());
        let user = display_user(ctx.session());
        let result = match tokio::time::timeout(self.handler_timeout, job(ctx)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(RpcError::timed_out(path, self.handler_timeout)),
        };

        match &result {
            Ok(_) if procedure.kind() == ProcedureKind::Mutation => {
                info!(request = %request_id, procedure = %path, user = %user, "mutation executed");
            }
            Ok(_) => {}
            Err(RpcError::Storage { detail }) => {
                error!(
                    request = %request_id,
                    procedure = %path,
                    user = %user,
                    detail = %detail,
                    "storage failure"
                );
            }
            Err(err) => {
                debug!(
                    request = %request_id,
                    procedure = %path,
                    code = err.code(),
                    "handler rejected request"
                );
            }
        }

        result
    }

    /// Handles a wire request: resolves the token, then [`invoke`](Self::invoke)s.
    ///
    /// An unknown or expired token behaves like no token. Never fails; errors
    /// are folded into the response.
    pub async fn call(&self, request: RpcRequest) -> RpcResponse {
        let RpcRequest {
            id,
            procedure,
            token,
            input,
        } = request;

        let path = match procedure.parse::<ProcedurePath>() {
            Ok(path) => path,
            Err(_) => {
                debug!(procedure = %procedure, "malformed procedure name");
                return RpcResponse::failure(id, &RpcError::procedure_not_found(&procedure));
            }
        };

        // Unknown procedures never reach the identity collaborator.
        if let Err(err) = self.registry.resolve_path(&path) {
            return RpcResponse::failure(id, &err);
        }

        let session = match token {
            Some(token) => self.sessions.resolve(&token).await,
            None => None,
        };

        let result = self
            .invoke(path.group(), path.name(), input, session)
            .await;
        RpcResponse::from_result(id, result)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("procedures", &self.registry.len())
            .field("handler_timeout", &self.handler_timeout)
            .finish_non_exhaustive()
    }
}

fn display_user(session: Option<&Session>) -> String {
    session.map_or_else(|| "anonymous".to_string(), ToString::to_string)
}
