//! Domain types, errors and pure validation rules for the concert service.
//!
//! Nothing in this crate touches the database or the message broker; the
//! `db`, `events` and `service` crates build on these definitions.

pub mod concert;
pub mod error;
pub mod types;
