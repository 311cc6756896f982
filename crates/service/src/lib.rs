//! Concert lifecycle service.
//!
//! Owns the business rules around concerts: input validation, the
//! `(location, date)` duplicate check, soft delete, partial-update merge and
//! the notifications sent after create and delete. Persistence and
//! publishing are injected as trait objects.

pub mod concert;

pub use concert::{ConcertService, HealthReport, DEFAULT_DEPENDENCY_TIMEOUT};
