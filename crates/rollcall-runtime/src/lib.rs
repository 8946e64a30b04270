//! Rollcall Runtime - procedure registry and authorization middleware.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  rollcall-types : ids, ProcedurePath, ErrorCode             │
//! │  rollcall-auth  : Role, Session, Access, authorize          │
//! │  rollcall-store : records, Repository, MemoryStore          │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Runtime Layer (THIS CRATE)                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  registry   : ProcedureSpec, RegistryBuilder, Registry      │
//! │  dispatch   : Dispatcher (authorize → validate → handle)    │
//! │  procedures : activity / volunteer / attendance handlers    │
//! │  auth/      : MemorySessionStore                            │
//! │  config/    : layered TOML configuration                    │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Frontend Layer                            │
//! │  (rollcall-cli: policy dump, JSON-lines transport)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Request Flow
//!
//! ```text
//! RpcRequest ─► Dispatcher::call
//!                 │ token ─► SessionResolver
//!                 ▼
//!               Dispatcher::invoke
//!                 ├─ ProcedureRegistry::resolve
//!                 ├─ rollcall_auth::authorize
//!                 ├─ Procedure::prepare (deserialize + Validate)
//!                 └─ handler(ProcedureContext, input) ─► Database
//!                 ▼
//!               RpcResponse
//! ```
//!
//! # Example
//!
//! ```
//! use rollcall_auth::{Role, Session};
//! use rollcall_runtime::{procedures, Dispatcher, RpcError};
//! use rollcall_runtime::auth::MemorySessionStore;
//! use rollcall_store::Database;
//! use rollcall_types::UserId;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let registry = Arc::new(procedures::default_registry().unwrap());
//! let dispatcher = Dispatcher::new(
//!     registry,
//!     Database::in_memory(),
//!     Arc::new(MemorySessionStore::new()),
//! );
//!
//! let reader = Session::new(UserId::new("bob"), Role::READER);
//! let err = dispatcher
//!     .invoke("volunteer", "delete", json!({"id": 1}), Some(reader))
//!     .await
//!     .unwrap_err();
//! assert!(matches!(err, RpcError::Forbidden { .. }));
//! # });
//! ```

pub mod auth;
pub mod config;
mod context;
mod dispatch;
mod error;
pub mod procedures;
mod registry;
mod rpc;
mod validate;

pub use context::ProcedureContext;
pub use dispatch::{Dispatcher, DEFAULT_HANDLER_TIMEOUT};
pub use error::{RpcError, STORAGE_FAILURE_MESSAGE};
pub use registry::{
    BoxFuture, Job, NoInput, PolicyEntry, Procedure, ProcedureKind, ProcedureRegistry,
    ProcedureSpec, RegistryBuilder, RegistryError,
};
pub use rpc::{ErrorBody, RpcRequest, RpcResponse};
pub use validate::{parse_input, FieldIssue, Validate, ValidationErrors};
