use crate::domain::events::DispatchEvent;
use futures::Stream;
use std::pin::Pin;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

pub type EventStream =
    Pin<Box<dyn Stream<Item = Result<DispatchEvent, BroadcastStreamRecvError>> + Send>>;

pub trait EventBus: Send + Sync {
    /// Publish an event to all subscribers. Never blocks and never fails the
    /// caller; undelivered events are dropped.
    fn publish(&self, event: DispatchEvent);

    /// Subscribe to events published from now on
    fn subscribe(&self) -> EventStream;
}
