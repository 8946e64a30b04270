//! Repository abstraction.
//!
//! [`Repository`] is the outbound CRUD interface the procedures call. It is
//! object-safe so the runtime can hold `Arc<dyn Repository<R>>` and swap
//! the in-memory backend for a real one without touching handlers.

use crate::{Activity, Attendance, MemoryStore, Record, StoreError, Volunteer};
use async_trait::async_trait;
use rollcall_types::RecordId;
use std::sync::Arc;

/// Result ordering for [`Repository::find_many`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderBy {
    /// Ascending primary key.
    #[default]
    IdAsc,
    /// Newest first.
    CreatedAtDesc,
}

/// CRUD access to one resource, keyed by [`RecordId`].
///
/// Implementations must be thread-safe (`Send + Sync`) for use across async tasks.
///
/// # Errors
///
/// Every method may fail with [`StoreError::Backend`]. Methods addressing a
/// single existing record fail with [`StoreError::NotFound`] when it is
/// missing; `find_by_id` returns `Ok(None)` instead. Writes that would
/// break [`Record::check`] fail with [`StoreError::Constraint`].
#[async_trait]
pub trait Repository<R: Record>: Send + Sync {
    /// Stores a new record and returns it with id and timestamps assigned.
    async fn create(&self, input: R::Create) -> Result<R, StoreError>;

    /// Stores a new record only while fewer than `limit` rows match
    /// `scope`.
    ///
    /// Counting and inserting are one atomic step, so concurrent callers
    /// cannot overfill the scope. Uniqueness conflicts are reported before
    /// capacity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CapacityReached`] when the scope is full.
    async fn create_capped(
        &self,
        input: R::Create,
        scope: &R::Filter,
        limit: usize,
    ) -> Result<R, StoreError>;

    /// Looks up a record.
    async fn find_by_id(&self, id: RecordId) -> Result<Option<R>, StoreError>;

    /// Lists records matching `filter`.
    async fn find_many(&self, filter: &R::Filter, order_by: OrderBy) -> Result<Vec<R>, StoreError>;

    /// Applies a partial update and returns the updated record.
    async fn update(&self, id: RecordId, patch: R::Patch) -> Result<R, StoreError>;

    /// Removes a record and returns it.
    async fn delete(&self, id: RecordId) -> Result<R, StoreError>;
}

/// The full set of repositories handed to procedures.
#[derive(Clone)]
pub struct Database {
    pub activities: Arc<dyn Repository<Activity>>,
    pub volunteers: Arc<dyn Repository<Volunteer>>,
    pub attendances: Arc<dyn Repository<Attendance>>,
}

impl Database {
    /// Bundles three repositories.
    pub fn new(
        activities: Arc<dyn Repository<Activity>>,
        volunteers: Arc<dyn Repository<Volunteer>>,
        attendances: Arc<dyn Repository<Attendance>>,
    ) -> Self {
        Self {
            activities,
            volunteers,
            attendances,
        }
    }

    /// Creates a database backed by a fresh [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        MemoryStore::new().into_database()
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}
