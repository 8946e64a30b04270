//! Access-control primitives for rollcall.
//!
//! # Model
//!
//! ```text
//! Session.roles ∩ Procedure.access ≠ ∅   =>   handler may run
//! ```
//!
//! | Type | Role |
//! |------|------|
//! | [`Role`] | Closed bitflags set: ADMIN, OPERATOR, READER |
//! | [`Session`] | Authenticated caller: user + roles + expiry |
//! | [`Access`] | Declarative rule on a procedure: public or any-of roles |
//! | [`authorize`] | The single, pure authorization decision |
//! | [`AccessDenied`] | Unauthenticated vs forbidden |
//! | [`SessionResolver`] | Token → session lookup (identity collaborator) |
//!
//! # Design Principles
//!
//! - **Rules are data**: a procedure never carries its own check closure;
//!   it carries an [`Access`] value interpreted by [`authorize`].
//! - **No hierarchy**: roles match by membership only.
//! - **Traits here, implementations in the runtime**: the in-memory session
//!   store lives in `rollcall-runtime`.

mod access;
mod error;
mod resolver;
mod role;
mod session;

pub use access::{authorize, Access, Grant};
pub use error::AccessDenied;
pub use resolver::{SessionResolver, SessionToken};
pub use role::Role;
pub use session::Session;
