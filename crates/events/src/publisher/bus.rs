//! Publisher that delivers notifications to the in-process [`EventBus`].

use std::sync::Arc;

use async_trait::async_trait;

use super::{ConnectionStatus, NotificationPublisher, PublishError};
use crate::bus::{DomainEvent, EventBus};

/// Forwards every notification to an [`EventBus`]. Always connected.
///
/// Used when no broker is configured and as the observable publisher in
/// tests.
#[derive(Clone)]
pub struct BusPublisher {
    bus: Arc<EventBus>,
}

impl BusPublisher {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl NotificationPublisher for BusPublisher {
    async fn connect(&self) -> Result<(), PublishError> {
        Ok(())
    }

    async fn publish(&self, event: &DomainEvent) -> Result<(), PublishError> {
        self.bus.publish(event.clone());
        tracing::debug!(
            topic = %event.topic,
            receivers = self.bus.subscriber_count(),
            "Notification forwarded to event bus"
        );
        Ok(())
    }

    fn status(&self) -> ConnectionStatus {
        ConnectionStatus::Connected
    }

    async fn shutdown(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn forwards_to_bus_subscribers() {
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();
        let publisher = BusPublisher::new(Arc::clone(&bus));

        publisher.connect().await.unwrap();
        publisher
            .publish(&DomainEvent::new("concert.created"))
            .await
            .unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.topic, "concert.created");
        assert_eq!(publisher.status(), ConnectionStatus::Connected);
    }

    #[tokio::test]
    async fn publishing_without_subscribers_succeeds() {
        let bus = Arc::new(EventBus::default());
        let publisher = BusPublisher::new(Arc::clone(&bus));

        assert_eq!(bus.subscriber_count(), 0);
        publisher
            .publish(&DomainEvent::new("concert.deleted"))
            .await
            .unwrap();
    }
}
