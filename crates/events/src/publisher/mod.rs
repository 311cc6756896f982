//! The notification publishing seam.

use async_trait::async_trait;
use serde::Serialize;

use crate::bus::DomainEvent;

pub mod bus;
pub mod redis;

/// Failure reported by a [`NotificationPublisher`]. Connection and send
/// failures are both surfaced; neither is swallowed.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Invalid broker URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to connect to notification broker: {0}")]
    Connect(String),

    #[error("Failed to send notification on '{topic}': {message}")]
    Send { topic: String, message: String },

    #[error("Failed to encode notification: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Connection state of a publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

/// Sends lifecycle notifications to other systems.
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    /// Establish the broker connection if it is not already up.
    /// Idempotent.
    async fn connect(&self) -> Result<(), PublishError>;

    /// Send `event` on `event.topic`, connecting first when disconnected.
    async fn publish(&self, event: &DomainEvent) -> Result<(), PublishError>;

    fn status(&self) -> ConnectionStatus;

    /// Drop the broker connection. A later `publish` reconnects.
    async fn shutdown(&self);
}
