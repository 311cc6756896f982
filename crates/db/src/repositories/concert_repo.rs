//! Repository for the `concerts` table.

use concert_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::concert::{Concert, CreateConcert, UpdateConcert};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, location, date, max_seats, status, image, \
                       deleted_at, created_at, updated_at";

/// Name of the unique index over `(location, date)`.
pub const LOCATION_DATE_CONSTRAINT: &str = "uq_concerts_location_date";

/// Provides CRUD operations for concerts.
///
/// Lookups by id deliberately include soft-deleted rows; only [`list_active`]
/// hides them.
///
/// [`list_active`]: ConcertRepo::list_active
pub struct ConcertRepo;

impl ConcertRepo {
    /// Insert a new concert, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateConcert) -> Result<Concert, sqlx::Error> {
        let query = format!(
            "INSERT INTO concerts (title, location, date, max_seats, status, image)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Concert>(&query)
            .bind(&input.title)
            .bind(&input.location)
            .bind(input.date)
            .bind(input.max_seats)
            .bind(&input.status)
            .bind(&input.image)
            .fetch_one(pool)
            .await
    }

    /// Find any concert (deleted or not) occupying a `(location, date)` slot.
    pub async fn find_by_location_and_date(
        pool: &PgPool,
        location: &str,
        date: Timestamp,
    ) -> Result<Option<Concert>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM concerts WHERE location = $1 AND date = $2 LIMIT 1");
        sqlx::query_as::<_, Concert>(&query)
            .bind(location)
            .bind(date)
            .fetch_optional(pool)
            .await
    }

    /// Find a concert by id, including soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Concert>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM concerts WHERE id = $1");
        sqlx::query_as::<_, Concert>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List active concerts, earliest first.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Concert>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM concerts
             WHERE deleted_at IS NULL
             ORDER BY date ASC, created_at ASC"
        );
        sqlx::query_as::<_, Concert>(&query).fetch_all(pool).await
    }

    /// Update a concert. Only non-`None` fields in `input` are applied;
    /// `updated_at` is always bumped.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateConcert,
    ) -> Result<Option<Concert>, sqlx::Error> {
        let query = format!(
            "UPDATE concerts SET
                title = COALESCE($2, title),
                location = COALESCE($3, location),
                date = COALESCE($4, date),
                max_seats = COALESCE($5, max_seats),
                status = COALESCE($6, status),
                image = COALESCE($7, image),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Concert>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.location)
            .bind(input.date)
            .bind(input.max_seats)
            .bind(&input.status)
            .bind(&input.image)
            .fetch_optional(pool)
            .await
    }

    /// Stamp `deleted_at` with the current time, whether or not the row was
    /// already deleted. Returns the updated row, or `None` if it does not exist.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<Option<Concert>, sqlx::Error> {
        let query = format!(
            "UPDATE concerts SET deleted_at = NOW(), updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Concert>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
