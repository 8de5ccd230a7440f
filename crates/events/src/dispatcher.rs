//! Best-effort delivery of domain events to observers.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::bus::{EventBus, Subscription};
use crate::envelope::EventEnvelope;
use crate::event::Event;
use crate::in_memory_bus::InMemoryEventBus;

/// Fans a produced event out to zero or more observers.
///
/// Delivery is decoupled from the mutation that produced the event: a
/// dispatch failure is logged and swallowed, never surfaced to the caller,
/// and the ledger never retries. Observers consume on their own threads via
/// [`Subscription`], so `dispatch` never blocks on a slow consumer.
#[derive(Debug, Clone)]
pub struct EventDispatcher<E: Event> {
    bus: Arc<InMemoryEventBus<EventEnvelope<E>>>,
}

impl<E: Event> EventDispatcher<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer for every subsequently dispatched event.
    pub fn subscribe(&self) -> Subscription<EventEnvelope<E>> {
        self.bus.subscribe()
    }

    /// Deliver `event`, best-effort.
    pub fn dispatch(&self, event: E) {
        let event_type = event.event_type();
        let envelope = EventEnvelope::new(Uuid::now_v7(), event);

        if let Err(err) = self.bus.publish(envelope) {
            // Notification only; the mutation has already committed.
            warn!(event_type, error = ?err, "event dispatch failed, dropping event");
        }
    }
}

impl<E: Event> Default for EventDispatcher<E> {
    fn default() -> Self {
        Self {
            bus: Arc::new(InMemoryEventBus::new()),
        }
    }
}
