//! Core types for rollcall.
//!
//! Foundational types shared by every layer of the workspace:
//!
//! ```text
//! rollcall-types    ids, ProcedurePath, ErrorCode   <- HERE
//!     ↑
//! rollcall-auth     Role, Session, AccessDenied
//! rollcall-store    records, Repository, MemoryStore
//!     ↑
//! rollcall-runtime  registry, dispatcher, procedures
//!     ↑
//! rollcall-cli      policy dump, JSON-lines transport
//! ```
//!
//! # Example
//!
//! ```
//! use rollcall_types::{ProcedurePath, RecordId, UserId};
//!
//! let path: ProcedurePath = "volunteer.delete".parse().unwrap();
//! assert_eq!(path.group(), "volunteer");
//!
//! let id = RecordId(12);
//! assert_eq!(id.get(), 12);
//!
//! let user = UserId::new("alice");
//! assert_eq!(user.as_str(), "alice");
//! ```

mod error;
mod id;
mod path;

pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::{RecordId, RequestId, UserId};
pub use path::{InvalidPath, ProcedurePath};
