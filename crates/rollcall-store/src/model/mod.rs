//! Resource records and their input shapes.
//!
//! Each resource has three shapes:
//!
//! | Shape | Purpose |
//! |-------|---------|
//! | record (`Activity`, ...) | stored row, returned to clients |
//! | `*Create` | input of a create procedure |
//! | `*Patch` | `data` part of an update procedure |
//!
//! Input shapes reject unknown fields. All wire names are camelCase.

mod activity;
mod attendance;
mod volunteer;

pub use activity::{Activity, ActivityCreate, ActivityPatch};
pub use attendance::{Attendance, AttendanceCreate, AttendanceFilter};
pub use volunteer::{Volunteer, VolunteerCreate, VolunteerPatch};

use chrono::{DateTime, Utc};
use rollcall_types::RecordId;
use serde::{Deserialize, Deserializer, Serialize};

/// A record kind managed by a [`Repository`](crate::Repository).
///
/// Implementors describe how inputs become rows; the repository owns ids
/// and timestamps.
pub trait Record: Clone + Send + Sync + Serialize + 'static {
    /// Resource name used in errors and logs.
    const RESOURCE: &'static str;

    /// Input accepted by `create`.
    type Create: Send + 'static;
    /// Input accepted by `update`.
    type Patch: Send + 'static;
    /// Criteria accepted by `find_many`.
    type Filter: Default + Send + Sync + 'static;

    /// Builds a new row.
    fn from_create(id: RecordId, input: Self::Create, now: DateTime<Utc>) -> Self;

    /// Applies a partial update in place.
    fn apply_patch(&mut self, patch: Self::Patch, now: DateTime<Utc>);

    /// Returns `true` if this row satisfies `filter`.
    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Primary key.
    fn id(&self) -> RecordId;

    /// Creation instant.
    fn created_at(&self) -> DateTime<Utc>;

    /// Returns `true` if `self` and `other` may not both be stored.
    fn conflicts_with(&self, _other: &Self) -> bool {
        false
    }

    /// Invariant every stored row satisfies.
    ///
    /// Repositories evaluate it on the final row, under the same lock (or
    /// transaction) as the write, so a patch cannot combine with a
    /// concurrent one into an invalid row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Constraint`](crate::StoreError::Constraint)
    /// naming the offending field.
    fn check(&self) -> Result<(), crate::StoreError> {
        Ok(())
    }
}

/// Deserializes a nullable patch field.
///
/// Absent (via `#[serde(default)]`) → `None`, `null` → `Some(None)`,
/// value → `Some(Some(v))`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
