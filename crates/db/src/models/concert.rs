//! Concert entity model and DTOs.

use concert_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A concert row from the `concerts` table.
///
/// Serialises with camelCase keys (`maxSeats`, `deletedAt`, ...) and the
/// image as a base64 string.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concert {
    pub id: DbId,
    pub title: String,
    pub location: String,
    pub date: Timestamp,
    pub max_seats: i32,
    pub status: String,
    #[serde(with = "image_base64", default)]
    pub image: Option<Vec<u8>>,
    /// `None` while the concert is active.
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Concert {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// DTO for inserting a new concert. Validated by the lifecycle service.
#[derive(Debug, Clone)]
pub struct CreateConcert {
    pub title: String,
    pub location: String,
    pub date: Timestamp,
    pub max_seats: i32,
    pub status: String,
    pub image: Option<Vec<u8>>,
}

/// DTO for a partial update. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateConcert {
    pub title: Option<String>,
    pub location: Option<String>,
    pub date: Option<Timestamp>,
    pub max_seats: Option<i32>,
    pub status: Option<String>,
    pub image: Option<Vec<u8>>,
}

impl UpdateConcert {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.location.is_none()
            && self.date.is_none()
            && self.max_seats.is_none()
            && self.status.is_none()
            && self.image.is_none()
    }
}

mod image_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(image: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match image {
            Some(bytes) => s.serialize_some(&STANDARD.encode(bytes)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|encoded| STANDARD.decode(encoded).map_err(serde::de::Error::custom))
            .transpose()
    }
}
