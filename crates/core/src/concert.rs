//! Concert domain rules: notification topics, field validation and the
//! sanitisation applied to raw form input.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Entity name used in `NotFound` errors and event sources.
pub const ENTITY: &str = "Concert";

/// Topic published after a concert is created.
pub const TOPIC_CREATED: &str = "concert.created";

/// Topic published after a concert is soft-deleted.
pub const TOPIC_DELETED: &str = "concert.deleted";

/// Message returned when `(location, date)` is already taken.
pub const DUPLICATE_MESSAGE: &str = "A concert at this location and time already exists";

// ---------------------------------------------------------------------------
// Sanitisation
// ---------------------------------------------------------------------------

/// Treat an empty (or whitespace-only) string as an omitted field.
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Unwrap a required text field, rejecting both omission and blank input.
pub fn require_text(field: &str, value: Option<String>) -> Result<String, CoreError> {
    let value = blank_to_none(value)
        .ok_or_else(|| CoreError::Validation(format!("'{field}' is required")))?;
    Ok(value)
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Reject empty text for `title`, `location` and `status`.
pub fn validate_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("'{field}' must not be empty")));
    }
    Ok(())
}

/// Validate a seat capacity and narrow it to the stored column type.
pub fn validate_max_seats(value: i64) -> Result<i32, CoreError> {
    if value < 0 {
        return Err(CoreError::Validation(
            "'maxSeats' must be a non-negative integer".to_string(),
        ));
    }
    i32::try_from(value).map_err(|_| {
        CoreError::Validation(format!("'maxSeats' must not exceed {}", i32::MAX))
    })
}

/// Parse `maxSeats` as submitted in a form field.
pub fn parse_max_seats(raw: &str) -> Result<i32, CoreError> {
    let value: i64 = raw.trim().parse().map_err(|_| {
        CoreError::Validation(format!("'maxSeats' must be an integer, got '{raw}'"))
    })?;
    validate_max_seats(value)
}

/// Parse an event date.
///
/// Accepts RFC 3339 (`2025-06-15T20:00:00Z`), a naive date-time which is
/// taken as UTC (`2025-06-15T20:00:00`), or a bare date at midnight UTC.
pub fn parse_event_date(raw: &str) -> Result<Timestamp, CoreError> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }

    Err(CoreError::Validation(format!(
        "'date' must be an ISO 8601 date-time, got '{raw}'"
    )))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
