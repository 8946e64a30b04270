//! Identity implementations for the runtime.
//!
//! Core types ([`Session`](rollcall_auth::Session), [`Role`](rollcall_auth::Role),
//! [`SessionResolver`](rollcall_auth::SessionResolver)) are defined in
//! `rollcall-auth`. This module provides the concrete resolver:
//!
//! ```text
//! rollcall-auth (traits + data types)
//!     Session, Role, Access, SessionResolver
//!         ↓
//! rollcall-runtime/auth (implementations)
//!     MemorySessionStore
//! ```

mod session_store;

pub use session_store::MemorySessionStore;
