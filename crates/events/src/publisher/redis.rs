//! Redis-backed publisher: every topic is a Redis list used as a work queue.
//!
//! Messages are JSON-encoded [`DomainEvent`]s appended with `RPUSH` to
//! `{queue_prefix}{topic}`, so consumers pop them with `BLPOP`.
//!
//! The connection is a single multiplexed connection with an explicit state
//! machine:
//!
//! ```text
//! Disconnected --connect()--> Connecting --ok--> Connected
//!       ^                         |                  |
//!       +---------- error --------+---- send error --+
//! ```
//!
//! `publish` connects when disconnected, waits for the attempt to finish and
//! then sends once. Each connect is a single attempt; failures are returned.

use std::fmt;
use std::sync::Mutex;

use ::redis::aio::MultiplexedConnection;
use ::redis::{AsyncCommands, Client};
use async_trait::async_trait;

use super::{ConnectionStatus, NotificationPublisher, PublishError};
use crate::bus::DomainEvent;

enum ConnectionState {
    Disconnected,
    Connecting,
    Connected(MultiplexedConnection),
}

impl ConnectionState {
    fn status(&self) -> ConnectionStatus {
        match self {
            ConnectionState::Disconnected => ConnectionStatus::Disconnected,
            ConnectionState::Connecting => ConnectionStatus::Connecting,
            ConnectionState::Connected(_) => ConnectionStatus::Connected,
        }
    }
}

/// Publisher that pushes notifications onto Redis lists.
pub struct RedisPublisher {
    client: Client,
    queue_prefix: String,
    /// Never held across an `.await`.
    state: Mutex<ConnectionState>,
    /// Serialises connection attempts so concurrent publishers share one.
    connect_gate: tokio::sync::Mutex<()>,
}

impl fmt::Debug for RedisPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisPublisher")
            .field("queue_prefix", &self.queue_prefix)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

/// Puts the state back to `Disconnected` if a connect attempt is dropped
/// before it finishes (e.g. by a caller's timeout).
struct ConnectAttempt<'a> {
    publisher: &'a RedisPublisher,
    finished: bool,
}

impl Drop for ConnectAttempt<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.publisher.set_state(ConnectionState::Disconnected);
        }
    }
}

impl RedisPublisher {
    /// Create a disconnected publisher.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::InvalidUrl`] if `redis_url` cannot be parsed.
    pub fn new(redis_url: &str, queue_prefix: impl Into<String>) -> Result<Self, PublishError> {
        let client = Client::open(redis_url).map_err(|e| PublishError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            client,
            queue_prefix: queue_prefix.into(),
            state: Mutex::new(ConnectionState::Disconnected),
            connect_gate: tokio::sync::Mutex::new(()),
        })
    }

    /// Redis key of the list backing `topic`.
    pub fn queue_key(&self, topic: &str) -> String {
        format!("{}{topic}", self.queue_prefix)
    }

    fn state(&self) -> std::sync::MutexGuard<'_, ConnectionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn current_connection(&self) -> Option<MultiplexedConnection> {
        match &*self.state() {
            ConnectionState::Connected(conn) => Some(conn.clone()),
            _ => None,
        }
    }

    fn set_state(&self, next: ConnectionState) {
        *self.state() = next;
    }

    /// Return the live connection, establishing it first if needed.
    async fn connection(&self) -> Result<MultiplexedConnection, PublishError> {
        if let Some(conn) = self.current_connection() {
            return Ok(conn);
        }

        let _gate = self.connect_gate.lock().await;
        // Another task may have connected while we waited on the gate.
        if let Some(conn) = self.current_connection() {
            return Ok(conn);
        }

        self.set_state(ConnectionState::Connecting);
        let mut attempt = ConnectAttempt {
            publisher: self,
            finished: false,
        };
        tracing::info!("Connecting to notification broker");

        let result = self.client.get_multiplexed_async_connection().await;
        attempt.finished = true;

        match result {
            Ok(conn) => {
                self.set_state(ConnectionState::Connected(conn.clone()));
                tracing::info!("Notification broker connection is ready");
                Ok(conn)
            }
            Err(e) => {
                self.set_state(ConnectionState::Disconnected);
                tracing::error!(error = %e, "Failed to connect to notification broker");
                Err(PublishError::Connect(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl NotificationPublisher for RedisPublisher {
    async fn connect(&self) -> Result<(), PublishError> {
        self.connection().await.map(|_| ())
    }

    async fn publish(&self, event: &DomainEvent) -> Result<(), PublishError> {
        let body = serde_json::to_string(event)?;
        let key = self.queue_key(&event.topic);
        let mut conn = self.connection().await?;

        if let Err(e) = conn.rpush::<_, _, ()>(&key, body).await {
            self.set_state(ConnectionState::Disconnected);
            tracing::error!(error = %e, topic = %event.topic, "Failed to send notification");
            return Err(PublishError::Send {
                topic: event.topic.clone(),
                message: e.to_string(),
            });
        }

        tracing::debug!(topic = %event.topic, queue = %key, "Notification sent");
        Ok(())
    }

    fn status(&self) -> ConnectionStatus {
        self.state().status()
    }

    async fn shutdown(&self) {
        let _gate = self.connect_gate.lock().await;
        self.set_state(ConnectionState::Disconnected);
        tracing::info!("Notification broker connection closed");
    }
}
