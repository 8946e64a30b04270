//! Repository doubles for tests.
//!
//! [`RecordingRepository`] wraps another repository, counts every call and
//! can be switched into a failing mode. Tests use it to prove that a
//! rejected request never reached storage, and to exercise backend-failure
//! paths.
//!
//! # Example
//!
//! ```
//! use rollcall_store::testing::RecordingRepository;
//! use rollcall_store::{MemoryRepository, OrderBy, Repository, Volunteer};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let repo = RecordingRepository::<Volunteer>::new(MemoryRepository::new());
//! repo.find_many(&(), OrderBy::IdAsc).await.unwrap();
//! assert_eq!(repo.calls(), 1);
//!
//! repo.fail_with("connection reset");
//! assert!(repo.find_by_id(1.into()).await.is_err());
//! assert_eq!(repo.calls(), 2);
//! # });
//! ```

use crate::{
    Activity, Attendance, Database, MemoryRepository, OrderBy, Record, Repository, StoreError,
    Volunteer,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use rollcall_types::RecordId;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counting, optionally failing, repository wrapper.
pub struct RecordingRepository<R: Record> {
    inner: Arc<dyn Repository<R>>,
    calls: AtomicUsize,
    failure: Mutex<Option<String>>,
}

impl<R: Record> RecordingRepository<R> {
    /// Wraps `inner`.
    pub fn new(inner: impl Repository<R> + 'static) -> Self {
        Self {
            inner: Arc::new(inner),
            calls: AtomicUsize::new(0),
            failure: Mutex::new(None),
        }
    }

    /// Number of calls received so far, successful or not.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Makes every subsequent call fail with [`StoreError::Backend`].
    pub fn fail_with(&self, detail: impl Into<String>) {
        *self.failure.lock() = Some(detail.into());
    }

    /// Restores pass-through behavior.
    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().as_ref() {
            Some(detail) => Err(StoreError::backend(detail.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<R: Record> Repository<R> for RecordingRepository<R> {
    async fn create(&self, input: R::Create) -> Result<R, StoreError> {
        self.enter()?;
        self.inner.create(input).await
    }

    async fn create_capped(
        &self,
        input: R::Create,
        scope: &R::Filter,
        limit: usize,
    ) -> Result<R, StoreError> {
        self.enter()?;
        self.inner.create_capped(input, scope, limit).await
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<R>, StoreError> {
        self.enter()?;
        self.inner.find_by_id(id).await
    }

    async fn find_many(&self, filter: &R::Filter, order_by: OrderBy) -> Result<Vec<R>, StoreError> {
        self.enter()?;
        self.inner.find_many(filter, order_by).await
    }

    async fn update(&self, id: RecordId, patch: R::Patch) -> Result<R, StoreError> {
        self.enter()?;
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: RecordId) -> Result<R, StoreError> {
        self.enter()?;
        self.inner.delete(id).await
    }
}

/// A [`Database`] whose repositories are all [`RecordingRepository`]
/// wrappers over fresh in-memory tables.
pub struct RecordingDatabase {
    pub activities: Arc<RecordingRepository<Activity>>,
    pub volunteers: Arc<RecordingRepository<Volunteer>>,
    pub attendances: Arc<RecordingRepository<Attendance>>,
}

impl RecordingDatabase {
    /// Creates empty recording tables.
    pub fn new() -> Self {
        Self {
            activities: Arc::new(RecordingRepository::new(MemoryRepository::new())),
            volunteers: Arc::new(RecordingRepository::new(MemoryRepository::new())),
            attendances: Arc::new(RecordingRepository::new(MemoryRepository::new())),
        }
    }

    /// Total calls across all repositories.
    pub fn calls(&self) -> usize {
        self.activities.calls() + self.volunteers.calls() + self.attendances.calls()
    }

    /// Makes every repository fail.
    pub fn fail_with(&self, detail: &str) {
        self.activities.fail_with(detail);
        self.volunteers.fail_with(detail);
        self.attendances.fail_with(detail);
    }

    /// Returns a [`Database`] view sharing these wrappers.
    pub fn database(&self) -> Database {
        Database::new(
            Arc::clone(&self.activities) as Arc<dyn Repository<Activity>>,
            Arc::clone(&self.volunteers) as Arc<dyn Repository<Volunteer>>,
            Arc::clone(&self.attendances) as Arc<dyn Repository<Attendance>>,
        )
    }
}

impl Default for RecordingDatabase {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VolunteerCreate;

    #[tokio::test]
    async fn recover_restores_pass_through() {
        let repo = RecordingRepository::<Volunteer>::new(MemoryRepository::new());
        repo.fail_with("down");
        let err = repo
            .create(VolunteerCreate {
                name: "Ana".into(),
                unique_id: "V-1".into(),
                phone: None,
                email: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::backend("down"));

        repo.recover();
        assert!(repo.find_many(&(), OrderBy::IdAsc).await.unwrap().is_empty());
        assert_eq!(repo.calls(), 2);
    }

    #[tokio::test]
    async fn recording_database_counts_across_tables() {
        let db = RecordingDatabase::new();
        let view = db.database();
        view.activities.find_many(&(), OrderBy::IdAsc).await.unwrap();
        view.volunteers.find_by_id(RecordId(1)).await.unwrap();
        assert_eq!(db.calls(), 2);
    }
}
