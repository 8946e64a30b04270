//! In-memory repositories.
//!
//! Rows live in a `BTreeMap` keyed by id behind a `parking_lot::RwLock`,
//! so id order is the natural iteration order. Ids start at 1 and are never
//! reused, even after deletes.
//!
//! No lock is held across an `.await`: every method does its work
//! synchronously inside the lock and returns a ready future.

use crate::{
    Activity, Attendance, Database, OrderBy, Record, Repository, StoreError, Volunteer,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use rollcall_types::RecordId;
use std::collections::BTreeMap;
use std::sync::Arc;

struct Table<R> {
    rows: BTreeMap<RecordId, R>,
    next_id: i64,
}

impl<R: Record> Table<R> {
    /// Builds, checks and stores a row. With a cap, the scope is counted
    /// under the same lock as the insert.
    fn insert(
        &mut self,
        input: R::Create,
        cap: Option<(&R::Filter, usize)>,
    ) -> Result<R, StoreError> {
        let id = RecordId(self.next_id);
        let row = R::from_create(id, input, Utc::now());
        row.check()?;

        if self.rows.values().any(|existing| existing.conflicts_with(&row)) {
            return Err(StoreError::conflict(R::RESOURCE, "record already exists"));
        }
        if let Some((scope, limit)) = cap {
            if self.rows.values().filter(|r| r.matches(scope)).count() >= limit {
                return Err(StoreError::CapacityReached {
                    resource: R::RESOURCE,
                    limit,
                });
            }
        }

        self.next_id += 1;
        self.rows.insert(id, row.clone());
        Ok(row)
    }
}

/// Thread-safe in-memory [`Repository`] for one record kind.
///
/// # Example
///
/// ```
/// use rollcall_store::{MemoryRepository, OrderBy, Repository, Volunteer, VolunteerCreate};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let repo = MemoryRepository::<Volunteer>::new();
/// let v = repo
///     .create(VolunteerCreate {
///         name: "Ana".into(),
///         unique_id: "V-1".into(),
///         phone: None,
///         email: None,
///     })
///     .await
///     .unwrap();
/// assert_eq!(v.id.get(), 1);
/// assert_eq!(repo.find_many(&(), OrderBy::IdAsc).await.unwrap().len(), 1);
/// # });
/// ```
pub struct MemoryRepository<R> {
    table: RwLock<Table<R>>,
}

impl<R: Record> MemoryRepository<R> {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Returns the number of stored rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.read().rows.len()
    }

    /// Returns `true` if no rows are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R: Record> Default for MemoryRepository<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> Repository<R> for MemoryRepository<R> {
    async fn create(&self, input: R::Create) -> Result<R, StoreError> {
        self.table.write().insert(input, None)
    }

    async fn create_capped(
        &self,
        input: R::Create,
        scope: &R::Filter,
        limit: usize,
    ) -> Result<R, StoreError> {
        self.table.write().insert(input, Some((scope, limit)))
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<R>, StoreError> {
        Ok(self.table.read().rows.get(&id).cloned())
    }

    async fn find_many(&self, filter: &R::Filter, order_by: OrderBy) -> Result<Vec<R>, StoreError> {
        let table = self.table.read();
        let mut rows: Vec<R> = table
            .rows
            .values()
            .filter(|row| row.matches(filter))
            .cloned()
            .collect();
        drop(table);

        if order_by == OrderBy::CreatedAtDesc {
            // Stable sort keeps id order among equal timestamps; reverse it
            // so the newest id wins ties too.
            rows.reverse();
            rows.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        }
        Ok(rows)
    }

    async fn update(&self, id: RecordId, patch: R::Patch) -> Result<R, StoreError> {
        let mut table = self.table.write();
        let row = table
            .rows
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(R::RESOURCE, id))?;

        let mut updated = row.clone();
        updated.apply_patch(patch, Utc::now());
        updated.check()?;
        *row = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: RecordId) -> Result<R, StoreError> {
        self.table
            .write()
            .rows
            .remove(&id)
            .ok_or_else(|| StoreError::not_found(R::RESOURCE, id))
    }
}

/// In-memory backing for every resource.
#[derive(Default)]
pub struct MemoryStore {
    pub activities: Arc<MemoryRepository<Activity>>,
    pub volunteers: Arc<MemoryRepository<Volunteer>>,
    pub attendances: Arc<MemoryRepository<Attendance>>,
}

impl MemoryStore {
    /// Creates empty tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a [`Database`] view sharing these tables.
    #[must_use]
    pub fn database(&self) -> Database {
        Database::new(
            Arc::clone(&self.activities) as Arc<dyn Repository<Activity>>,
            Arc::clone(&self.volunteers) as Arc<dyn Repository<Volunteer>>,
            Arc::clone(&self.attendances) as Arc<dyn Repository<Attendance>>,
        )
    }

    /// Consumes the store into a [`Database`].
    #[must_use]
    pub fn into_database(self) -> Database {
        Database::new(self.activities, self.volunteers, self.attendances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActivityCreate, ActivityPatch, AttendanceCreate, AttendanceFilter};
    use rollcall_types::ErrorCode;

    fn activity(name: &str) -> ActivityCreate {
        ActivityCreate {
            name: name.into(),
            description: None,
            max_volunteers: 20,
            duration_hours: 1.0,
            date_start: Utc::now(),
            date_end: None,
        }
    }

    fn attendance(activity: i64, volunteer: i64) -> AttendanceCreate {
        AttendanceCreate {
            activity_id: RecordId(activity),
            volunteer_id: RecordId(volunteer),
            date_time: None,
            hours_value: Some(1.0),
        }
    }

    #[tokio::test]
    async fn ids_are_monotonic_and_not_reused() {
        let repo = MemoryRepository::<Activity>::new();
        let a = repo.create(activity("a")).await.unwrap();
        let b = repo.create(activity("b")).await.unwrap();
        repo.delete(b.id).await.unwrap();
        let c = repo.create(activity("c")).await.unwrap();

        assert_eq!(a.id, RecordId(1));
        assert_eq!(b.id, RecordId(2));
        assert_eq!(c.id, RecordId(3));
    }

    #[tokio::test]
    async fn find_many_orders() {
        let repo = MemoryRepository::<Activity>::new();
        for name in ["first", "second", "third"] {
            repo.create(activity(name)).await.unwrap();
        }

        let by_id = repo.find_many(&(), OrderBy::IdAsc).await.unwrap();
        let names: Vec<_> = by_id.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["first", "second", "third"]);

        let latest = repo.find_many(&(), OrderBy::CreatedAtDesc).await.unwrap();
        let names: Vec<_> = latest.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["third", "second", "first"]);
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let repo = MemoryRepository::<Activity>::new();
        let err = repo
            .update(RecordId(9), ActivityPatch::default())
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::not_found("activity", RecordId(9)));
    }

    #[tokio::test]
    async fn update_bumps_updated_at() {
        let repo = MemoryRepository::<Activity>::new();
        let created = repo.create(activity("a")).await.unwrap();
        let updated = repo
            .update(
                created.id,
                ActivityPatch {
                    name: Some(Some("renamed".into())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "renamed");
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let repo = MemoryRepository::<Volunteer>::new();
        let err = repo.delete(RecordId(1)).await.unwrap_err();
        assert_eq!(err.code(), "STORE_NOT_FOUND");
    }

    #[tokio::test]
    async fn duplicate_attendance_conflicts() {
        let repo = MemoryRepository::<Attendance>::new();
        repo.create(attendance(1, 1)).await.unwrap();
        let err = repo.create(attendance(1, 1)).await.unwrap_err();
        assert_eq!(err.code(), "STORE_CONFLICT");
        assert_eq!(repo.len(), 1);

        // Failed create does not burn an id.
        let next = repo.create(attendance(1, 2)).await.unwrap();
        assert_eq!(next.id, RecordId(2));
    }

    #[tokio::test]
    async fn capped_create_stops_at_limit() {
        let repo = MemoryRepository::<Attendance>::new();
        let scope = AttendanceFilter::activity(RecordId(1));
        repo.create_capped(attendance(1, 1), &scope, 2).await.unwrap();
        repo.create_capped(attendance(2, 1), &scope, 2).await.unwrap();
        repo.create_capped(attendance(1, 2), &scope, 2).await.unwrap();

        let err = repo
            .create_capped(attendance(1, 3), &scope, 2)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "STORE_CAPACITY_REACHED");
        assert_eq!(repo.len(), 3);

        // Duplicates are reported as such even when the scope is full.
        let err = repo
            .create_capped(attendance(1, 1), &scope, 2)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "STORE_CONFLICT");
    }

    #[tokio::test]
    async fn update_rejects_row_breaking_invariant() {
        let repo = MemoryRepository::<Activity>::new();
        let created = repo.create(activity("a")).await.unwrap();

        let err = repo
            .update(
                created.id,
                ActivityPatch {
                    date_end: Some(Some(created.date_start - chrono::Duration::hours(1))),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::constraint("activity", "dateEnd", "must not be before dateStart")
        );

        let stored = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn attendance_filter() {
        let repo = MemoryRepository::<Attendance>::new();
        repo.create(attendance(1, 1)).await.unwrap();
        repo.create(attendance(1, 2)).await.unwrap();
        repo.create(attendance(2, 1)).await.unwrap();

        let of_activity = repo
            .find_many(&AttendanceFilter::activity(RecordId(1)), OrderBy::IdAsc)
            .await
            .unwrap();
        assert_eq!(of_activity.len(), 2);

        let of_volunteer = repo
            .find_many(&AttendanceFilter::volunteer(RecordId(1)), OrderBy::IdAsc)
            .await
            .unwrap();
        assert_eq!(of_volunteer.len(), 2);
    }

    #[tokio::test]
    async fn database_view_shares_tables() {
        let store = MemoryStore::new();
        let db = store.database();
        db.activities.create(activity("shared")).await.unwrap();
        assert_eq!(store.activities.len(), 1);
    }
}
