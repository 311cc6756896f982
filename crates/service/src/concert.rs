//! [`ConcertService`]: create, list, fetch, soft-delete and update concerts.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use concert_core::concert::{
    validate_max_seats, validate_text, DUPLICATE_MESSAGE, ENTITY, TOPIC_CREATED, TOPIC_DELETED,
};
use concert_core::error::CoreError;
use concert_core::types::DbId;
use concert_db::models::concert::{Concert, CreateConcert, UpdateConcert};
use concert_db::store::{ConcertStore, StoreError};
use concert_events::{ConnectionStatus, DomainEvent, NotificationPublisher};
use serde::Serialize;

/// Upper bound on any single store or broker call.
pub const DEFAULT_DEPENDENCY_TIMEOUT: Duration = Duration::from_secs(5);

const STORE: &str = "store";
const PUBLISHER: &str = "publisher";

/// Reachability of the service's dependencies.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub store_healthy: bool,
    pub publisher: ConnectionStatus,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.store_healthy && self.publisher == ConnectionStatus::Connected
    }
}

/// Business logic for the concert lifecycle.
///
/// State per concert: `Active` (`deleted_at` null) → `Deleted`. Nothing
/// leaves `Deleted`, but updates are still accepted there.
pub struct ConcertService {
    store: Arc<dyn ConcertStore>,
    publisher: Arc<dyn NotificationPublisher>,
    dependency_timeout: Duration,
}

impl ConcertService {
    pub fn new(store: Arc<dyn ConcertStore>, publisher: Arc<dyn NotificationPublisher>) -> Self {
        Self {
            store,
            publisher,
            dependency_timeout: DEFAULT_DEPENDENCY_TIMEOUT,
        }
    }

    pub fn with_dependency_timeout(mut self, timeout: Duration) -> Self {
        self.dependency_timeout = timeout;
        self
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Create a concert and announce it on `concert.created`.
    ///
    /// A `(location, date)` slot that is already taken, by an active or a
    /// soft-deleted concert, yields [`CoreError::Conflict`]. The pre-check
    /// gives the common case a clean answer; the store's unique index
    /// settles concurrent creates.
    ///
    /// If the notification cannot be sent the concert stays stored and the
    /// call fails with [`CoreError::Dependency`].
    pub async fn create(&self, input: CreateConcert) -> Result<Concert, CoreError> {
        validate_new(&input)?;

        let existing = self
            .store_call(self.store.find_by_location_and_date(&input.location, input.date))
            .await?;
        if existing.is_some() {
            return Err(CoreError::Conflict(DUPLICATE_MESSAGE.to_string()));
        }

        let concert = self.store_call(self.store.insert(&input)).await?;
        tracing::info!(concert_id = %concert.id, title = %concert.title, "Concert created");

        self.notify(TOPIC_CREATED, &concert).await?;
        Ok(concert)
    }

    /// All active concerts, earliest date first.
    pub async fn list(&self) -> Result<Vec<Concert>, CoreError> {
        self.store_call(self.store.list_active()).await
    }

    /// Fetch a concert by id, soft-deleted or not.
    pub async fn get_by_id(&self, id: DbId) -> Result<Concert, CoreError> {
        self.store_call(self.store.find_by_id(id))
            .await?
            .ok_or_else(|| CoreError::not_found(ENTITY, id))
    }

    /// Soft-delete a concert and announce it on `concert.deleted`.
    ///
    /// Deleting an already deleted concert refreshes `deleted_at`.
    pub async fn delete_by_id(&self, id: DbId) -> Result<Concert, CoreError> {
        let concert = self
            .store_call(self.store.soft_delete(id))
            .await?
            .ok_or_else(|| CoreError::not_found(ENTITY, id))?;
        tracing::info!(concert_id = %concert.id, "Concert soft-deleted");

        self.notify(TOPIC_DELETED, &concert).await?;
        Ok(concert)
    }

    /// Merge the present fields of `input` into the stored concert.
    ///
    /// Absent fields keep their value. No notification is sent.
    pub async fn update_by_id(&self, id: DbId, input: UpdateConcert) -> Result<Concert, CoreError> {
        validate_changes(&input)?;
        if input.is_empty() {
            tracing::debug!(concert_id = %id, "Update carries no changes");
        }

        let concert = self
            .store_call(self.store.update(id, &input))
            .await?
            .ok_or_else(|| CoreError::not_found(ENTITY, id))?;
        tracing::info!(
            concert_id = %concert.id,
            deleted = concert.is_deleted(),
            "Concert updated"
        );
        Ok(concert)
    }

    /// Probe the store and report the publisher's connection state.
    pub async fn health(&self) -> HealthReport {
        let store_healthy = self.store_call(self.store.ping()).await.is_ok();
        HealthReport {
            store_healthy,
            publisher: self.publisher.status(),
        }
    }

    // -----------------------------------------------------------------------
    // Dependency calls
    // -----------------------------------------------------------------------

    async fn store_call<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, CoreError> {
        match tokio::time::timeout(self.dependency_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(StoreError::Duplicate(constraint))) => {
                tracing::debug!(%constraint, "Unique constraint rejected concert write");
                Err(CoreError::Conflict(DUPLICATE_MESSAGE.to_string()))
            }
            Ok(Err(err)) => {
                tracing::error!(error = %err, "Concert store call failed");
                Err(CoreError::dependency(STORE, err.to_string()))
            }
            Err(_) => {
                tracing::error!(timeout = ?self.dependency_timeout, "Concert store call timed out");
                Err(CoreError::dependency(
                    STORE,
                    format!("timed out after {:?}", self.dependency_timeout),
                ))
            }
        }
    }

    async fn notify(&self, topic: &str, concert: &Concert) -> Result<(), CoreError> {
        let payload =
            serde_json::to_value(concert).map_err(|e| CoreError::Internal(e.to_string()))?;
        let event = DomainEvent::new(topic)
            .with_source(ENTITY, concert.id)
            .with_payload(payload);

        match tokio::time::timeout(self.dependency_timeout, self.publisher.publish(&event)).await {
            Ok(Ok(())) => {
                tracing::debug!(%topic, concert_id = %concert.id, "Notification published");
                Ok(())
            }
            Ok(Err(err)) => {
                tracing::error!(error = %err, %topic, concert_id = %concert.id, "Notification failed");
                Err(CoreError::dependency(PUBLISHER, err.to_string()))
            }
            Err(_) => {
                tracing::error!(%topic, concert_id = %concert.id, "Notification timed out");
                Err(CoreError::dependency(
                    PUBLISHER,
                    format!("timed out after {:?}", self.dependency_timeout),
                ))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_new(input: &CreateConcert) -> Result<(), CoreError> {
    validate_text("title", &input.title)?;
    validate_text("location", &input.location)?;
    validate_text("status", &input.status)?;
    validate_max_seats(i64::from(input.max_seats))?;
    Ok(())
}

fn validate_changes(input: &UpdateConcert) -> Result<(), CoreError> {
    if let Some(title) = &input.title {
        validate_text("title", title)?;
    }
    if let Some(location) = &input.location {
        validate_text("location", location)?;
    }
    if let Some(status) = &input.status {
        validate_text("status", status)?;
    }
    if let Some(max_seats) = input.max_seats {
        validate_max_seats(i64::from(max_seats))?;
    }
    Ok(())
}
