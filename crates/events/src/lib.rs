//! Concert lifecycle notifications.
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`] — the notification envelope sent for every topic.
//! - [`NotificationPublisher`] — the seam the lifecycle service publishes
//!   through, implemented by [`RedisPublisher`] (one Redis list per topic)
//!   and [`BusPublisher`] (in-process bus).
//! - [`EventLogger`] — background consumer that logs bus traffic.

pub mod bus;
pub mod logger;
pub mod publisher;

pub use bus::{DomainEvent, EventBus};
pub use logger::EventLogger;
pub use publisher::bus::BusPublisher;
pub use publisher::redis::RedisPublisher;
pub use publisher::{ConnectionStatus, NotificationPublisher, PublishError};
