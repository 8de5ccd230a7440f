use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope around an event payload as it travels through the bus.
///
/// The `event_id` (UUIDv7, time-ordered) identifies one dispatch of one
/// event; observers that may see redeliveries can use it to deduplicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(event_id: Uuid, payload: E) -> Self {
        Self { event_id, payload }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
