//! Background consumer that logs every event seen on the bus.
//!
//! Runs when no broker is configured so that notifications remain visible
//! in the service log.

use tokio::sync::broadcast;

use crate::bus::DomainEvent;

/// Long-lived task that writes each [`DomainEvent`] to the tracing log.
pub struct EventLogger;

impl EventLogger {
    /// Run the logging loop.
    ///
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](crate::bus::EventBus) is dropped).
    pub async fn run(mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    tracing::info!(
                        topic = %event.topic,
                        entity_type = event.source_entity_type.as_deref().unwrap_or("-"),
                        entity_id = ?event.source_entity_id,
                        "Notification"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event logger lagged, some events were not logged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, event logger shutting down");
                    break;
                }
            }
        }
    }
}
