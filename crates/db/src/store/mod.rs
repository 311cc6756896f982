//! The persistence seam used by the concert lifecycle service.
//!
//! [`ConcertStore`] abstracts the handful of operations the service needs so
//! that the Postgres implementation can be swapped for
//! [`InMemoryConcertStore`] in tests.

use async_trait::async_trait;
use concert_core::types::{DbId, Timestamp};

use crate::models::concert::{Concert, CreateConcert, UpdateConcert};
use crate::repositories::ConcertRepo;
use crate::DbPool;

#[cfg(any(test, feature = "testing"))]
mod memory;

#[cfg(any(test, feature = "testing"))]
pub use memory::InMemoryConcertStore;

/// Failure reported by a [`ConcertStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write. Carries the constraint name.
    #[error("Duplicate value violates unique constraint: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                tracing::debug!(%constraint, "Unique constraint violation");
                return StoreError::Duplicate(constraint);
            }
        }
        StoreError::Database(err)
    }
}

/// Storage operations over concerts.
#[async_trait]
pub trait ConcertStore: Send + Sync {
    /// Any concert, deleted or not, holding the `(location, date)` slot.
    async fn find_by_location_and_date(
        &self,
        location: &str,
        date: Timestamp,
    ) -> Result<Option<Concert>, StoreError>;

    /// Insert a concert. A taken `(location, date)` slot yields
    /// [`StoreError::Duplicate`].
    async fn insert(&self, input: &CreateConcert) -> Result<Concert, StoreError>;

    /// Lookup by id, including soft-deleted rows.
    async fn find_by_id(&self, id: DbId) -> Result<Option<Concert>, StoreError>;

    /// Active concerts ordered by ascending date.
    async fn list_active(&self) -> Result<Vec<Concert>, StoreError>;

    /// Merge the present fields of `input`. `None` when the id is unknown.
    async fn update(&self, id: DbId, input: &UpdateConcert)
        -> Result<Option<Concert>, StoreError>;

    /// Stamp `deleted_at` with the current time. `None` when the id is unknown.
    async fn soft_delete(&self, id: DbId) -> Result<Option<Concert>, StoreError>;

    /// Verify the backing store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// PgConcertStore
// ---------------------------------------------------------------------------

/// [`ConcertStore`] backed by [`ConcertRepo`] on a shared pool.
#[derive(Clone)]
pub struct PgConcertStore {
    pool: DbPool,
}

impl PgConcertStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConcertStore for PgConcertStore {
    async fn find_by_location_and_date(
        &self,
        location: &str,
        date: Timestamp,
    ) -> Result<Option<Concert>, StoreError> {
        Ok(ConcertRepo::find_by_location_and_date(&self.pool, location, date).await?)
    }

    async fn insert(&self, input: &CreateConcert) -> Result<Concert, StoreError> {
        Ok(ConcertRepo::create(&self.pool, input).await?)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Concert>, StoreError> {
        Ok(ConcertRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_active(&self) -> Result<Vec<Concert>, StoreError> {
        Ok(ConcertRepo::list_active(&self.pool).await?)
    }

    async fn update(
        &self,
        id: DbId,
        input: &UpdateConcert,
    ) -> Result<Option<Concert>, StoreError> {
        Ok(ConcertRepo::update(&self.pool, id, input).await?)
    }

    async fn soft_delete(&self, id: DbId) -> Result<Option<Concert>, StoreError> {
        Ok(ConcertRepo::soft_delete(&self.pool, id).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
