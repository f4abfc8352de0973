use crate::domain::events::DispatchEvent;
use crate::domain::ports::event_bus::{EventBus, EventStream};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

/// In-process broadcast implementation of the event bus
#[derive(Clone)]
pub struct LocalEventBus {
    tx: broadcast::Sender<DispatchEvent>,
}

impl LocalEventBus {
    /// Create a new event bus with specified capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl EventBus for LocalEventBus {
    fn publish(&self, event: DispatchEvent) {
        // Nobody listening is not an error for the publisher
        if let Err(e) = self.tx.send(event) {
            tracing::debug!("No active subscribers for event: {}", e.0.name());
        }
    }

    fn subscribe(&self) -> EventStream {
        Box::pin(BroadcastStream::new(self.tx.subscribe()))
    }
}

impl Default for LocalEventBus {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    fn availability_event(online: bool) -> DispatchEvent {
        DispatchEvent::TechnicianAvailabilityChanged {
            technician_id: "tech_001".to_string(),
            online,
            timestamp: "2026-01-12T10:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_event_bus_creation() {
        let bus = LocalEventBus::new(100);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let bus = LocalEventBus::new(4);
        bus.publish(availability_event(true));
    }

    #[tokio::test]
    async fn test_event_publish_subscribe() {
        let bus = LocalEventBus::new(100);
        let mut rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.publish(availability_event(false));

        let received = rx.next().await.unwrap().unwrap();
        match received {
            DispatchEvent::TechnicianAvailabilityChanged {
                technician_id,
                online,
                ..
            } => {
                assert_eq!(technician_id, "tech_001");
                assert!(!online);
            }
            other => panic!("Unexpected event type: {}", other.name()),
        }
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let json = serde_json::to_value(availability_event(true)).unwrap();
        assert_eq!(json["type"], "technician_availability_changed");
        assert_eq!(json["online"], true);
    }
}
