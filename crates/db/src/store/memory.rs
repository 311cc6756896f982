//! In-memory [`ConcertStore`] with the same observable rules as the
//! Postgres schema, including the `(location, date)` unique index.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use concert_core::types::{DbId, Timestamp};

use super::{ConcertStore, StoreError};
use crate::models::concert::{Concert, CreateConcert, UpdateConcert};
use crate::repositories::concert_repo::LOCATION_DATE_CONSTRAINT;

/// Vector-backed store. Every operation runs under one lock, so the
/// uniqueness check and the insert are atomic.
#[derive(Default)]
pub struct InMemoryConcertStore {
    rows: Mutex<Vec<Concert>>,
}

impl InMemoryConcertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, soft-deleted ones included.
    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn rows(&self) -> std::sync::MutexGuard<'_, Vec<Concert>> {
        // A poisoned lock only means another test thread panicked.
        self.rows.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn slot_taken(rows: &[Concert], location: &str, date: Timestamp, except: Option<DbId>) -> bool {
    rows.iter()
        .any(|c| c.location == location && c.date == date && Some(c.id) != except)
}

#[async_trait]
impl ConcertStore for InMemoryConcertStore {
    async fn find_by_location_and_date(
        &self,
        location: &str,
        date: Timestamp,
    ) -> Result<Option<Concert>, StoreError> {
        Ok(self
            .rows()
            .iter()
            .find(|c| c.location == location && c.date == date)
            .cloned())
    }

    async fn insert(&self, input: &CreateConcert) -> Result<Concert, StoreError> {
        let mut rows = self.rows();
        if slot_taken(&rows, &input.location, input.date, None) {
            return Err(StoreError::Duplicate(LOCATION_DATE_CONSTRAINT.to_string()));
        }

        let now = Utc::now();
        let concert = Concert {
            id: uuid::Uuid::new_v4(),
            title: input.title.clone(),
            location: input.location.clone(),
            date: input.date,
            max_seats: input.max_seats,
            status: input.status.clone(),
            image: input.image.clone(),
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        rows.push(concert.clone());
        Ok(concert)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Concert>, StoreError> {
        Ok(self.rows().iter().find(|c| c.id == id).cloned())
    }

    async fn list_active(&self) -> Result<Vec<Concert>, StoreError> {
        let mut active: Vec<Concert> = self
            .rows()
            .iter()
            .filter(|c| c.deleted_at.is_none())
            .cloned()
            .collect();
        active.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        Ok(active)
    }

    async fn update(
        &self,
        id: DbId,
        input: &UpdateConcert,
    ) -> Result<Option<Concert>, StoreError> {
        let mut rows = self.rows();
        let Some(index) = rows.iter().position(|c| c.id == id) else {
            return Ok(None);
        };

        let location = input
            .location
            .clone()
            .unwrap_or_else(|| rows[index].location.clone());
        let date = input.date.unwrap_or(rows[index].date);
        if slot_taken(&rows, &location, date, Some(id)) {
            return Err(StoreError::Duplicate(LOCATION_DATE_CONSTRAINT.to_string()));
        }

        let concert = &mut rows[index];
        if let Some(title) = &input.title {
            concert.title = title.clone();
        }
        concert.location = location;
        concert.date = date;
        if let Some(max_seats) = input.max_seats {
            concert.max_seats = max_seats;
        }
        if let Some(status) = &input.status {
            concert.status = status.clone();
        }
        if let Some(image) = &input.image {
            concert.image = Some(image.clone());
        }
        concert.updated_at = Utc::now();
        Ok(Some(concert.clone()))
    }

    async fn soft_delete(&self, id: DbId) -> Result<Option<Concert>, StoreError> {
        let mut rows = self.rows();
        Ok(rows.iter_mut().find(|c| c.id == id).map(|concert| {
            let now = Utc::now();
            concert.deleted_at = Some(now);
            concert.updated_at = now;
            concert.clone()
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone};

    use super::*;

    fn input(location: &str, hour: u32) -> CreateConcert {
        CreateConcert {
            title: "Night Show".into(),
            location: location.into(),
            date: Utc.with_ymd_and_hms(2025, 6, 15, hour, 0, 0).unwrap(),
            max_seats: 100,
            status: "scheduled".into(),
            image: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamps() {
        let store = InMemoryConcertStore::new();
        let concert = store.insert(&input("Paris", 20)).await.unwrap();

        assert_eq!(concert.created_at, concert.updated_at);
        assert!(concert.deleted_at.is_none());
        assert_eq!(store.find_by_id(concert.id).await.unwrap(), Some(concert));
    }

    #[tokio::test]
    async fn duplicate_slot_is_rejected() {
        let store = InMemoryConcertStore::new();
        store.insert(&input("Paris", 20)).await.unwrap();

        let err = store.insert(&input("Paris", 20)).await.unwrap_err();
        assert_matches!(err, StoreError::Duplicate(name) if name == LOCATION_DATE_CONSTRAINT);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn list_hides_deleted_and_orders_by_date() {
        let store = InMemoryConcertStore::new();
        let late = store.insert(&input("Paris", 22)).await.unwrap();
        let early = store.insert(&input("Paris", 18)).await.unwrap();
        let gone = store.insert(&input("Lyon", 20)).await.unwrap();
        store.soft_delete(gone.id).await.unwrap();

        let ids: Vec<_> = store
            .list_active()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![early.id, late.id]);
    }

    #[tokio::test]
    async fn update_keeps_unset_fields() {
        let store = InMemoryConcertStore::new();
        let created = store.insert(&input("Paris", 20)).await.unwrap();

        let updated = store
            .update(
                created.id,
                &UpdateConcert {
                    max_seats: Some(42),
                    date: Some(created.date + Duration::hours(1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.max_seats, 42);
        assert_eq!(updated.date, created.date + Duration::hours(1));
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.location, created.location);
        assert_eq!(updated.status, created.status);
    }

    #[tokio::test]
    async fn update_into_taken_slot_is_rejected() {
        let store = InMemoryConcertStore::new();
        let paris = store.insert(&input("Paris", 20)).await.unwrap();
        let lyon = store.insert(&input("Lyon", 20)).await.unwrap();

        let err = store
            .update(
                lyon.id,
                &UpdateConcert {
                    location: Some(paris.location.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_matches!(err, StoreError::Duplicate(_));
    }

    #[tokio::test]
    async fn unknown_ids_return_none() {
        let store = InMemoryConcertStore::new();
        let id = uuid::Uuid::new_v4();
        assert!(store.find_by_id(id).await.unwrap().is_none());
        assert!(store.soft_delete(id).await.unwrap().is_none());
        assert!(store
            .update(id, &UpdateConcert::default())
            .await
            .unwrap()
            .is_none());
    }
}
