//! Record store for rollcall resources.
//!
//! This crate is the outbound CRUD collaborator of the procedure layer. It
//! knows nothing about sessions or roles; every call that reaches it has
//! already been authorized and validated.
//!
//! # Crate Architecture
//!
//! ```text
//! rollcall-runtime (procedures)
//!         │  Arc<dyn Repository<R>>
//!         ▼
//! ┌───────────────────────────────────┐
//! │ Repository<R: Record>             │  create / find_by_id / find_many
//! │                                   │  update / delete
//! └───────────────────────────────────┘
//!         │
//!         ▼
//! MemoryRepository<R>  (parking_lot RwLock + BTreeMap)
//! ```
//!
//! # Resources
//!
//! | Record | Create | Patch | Filter |
//! |--------|--------|-------|--------|
//! | [`Activity`] | [`ActivityCreate`] | [`ActivityPatch`] | `()` |
//! | [`Volunteer`] | [`VolunteerCreate`] | [`VolunteerPatch`] | `()` |
//! | [`Attendance`] | [`AttendanceCreate`] | none | [`AttendanceFilter`] |

mod error;
mod memory;
mod model;
mod repository;
pub mod testing;

pub use error::StoreError;
pub use memory::{MemoryRepository, MemoryStore};
pub use model::{
    Activity, ActivityCreate, ActivityPatch, Attendance, AttendanceCreate, AttendanceFilter,
    Record, Volunteer, VolunteerCreate, VolunteerPatch,
};
pub use repository::{Database, OrderBy, Repository};
