//! Repository that yields to the scheduler before every call.
//!
//! Two handlers joined on one task interleave between each of their
//! storage calls, which is how a remote backend behaves under load.

use async_trait::async_trait;
use rollcall_store::{
    Activity, Attendance, Database, MemoryRepository, OrderBy, Record, Repository, StoreError,
    Volunteer,
};
use rollcall_types::RecordId;
use std::sync::Arc;
use tokio::task::yield_now;

pub(super) struct YieldingRepository<R> {
    inner: MemoryRepository<R>,
}

impl<R: Record> YieldingRepository<R> {
    pub(super) fn new() -> Self {
        Self {
            inner: MemoryRepository::new(),
        }
    }
}

#[async_trait]
impl<R: Record> Repository<R> for YieldingRepository<R> {
    async fn create(&self, input: R::Create) -> Result<R, StoreError> {
        yield_now().await;
        self.inner.create(input).await
    }

    async fn create_capped(
        &self,
        input: R::Create,
        scope: &R::Filter,
        limit: usize,
    ) -> Result<R, StoreError> {
        yield_now().await;
        self.inner.create_capped(input, scope, limit).await
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<R>, StoreError> {
        yield_now().await;
        self.inner.find_by_id(id).await
    }

    async fn find_many(&self, filter: &R::Filter, order_by: OrderBy) -> Result<Vec<R>, StoreError> {
        yield_now().await;
        let rows = self.inner.find_many(filter, order_by).await;
        yield_now().await;
        rows
    }

    async fn update(&self, id: RecordId, patch: R::Patch) -> Result<R, StoreError> {
        yield_now().await;
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: RecordId) -> Result<R, StoreError> {
        yield_now().await;
        self.inner.delete(id).await
    }
}

/// A [`Database`] whose every table yields before each call.
pub(super) fn yielding_database() -> Database {
    Database::new(
        Arc::new(YieldingRepository::<Activity>::new()),
        Arc::new(YieldingRepository::<Volunteer>::new()),
        Arc::new(YieldingRepository::<Attendance>::new()),
    )
}
