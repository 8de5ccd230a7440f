//! `loyalty-events` — domain event plumbing.
//!
//! Events here are *notifications*, not the source of truth: the ledger
//! commits its mutation first, then hands the resulting events to a
//! best-effort [`EventDispatcher`]. A delivery failure is logged and
//! swallowed; it can never roll back or block the mutation that produced
//! the event.

pub mod bus;
pub mod dispatcher;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use dispatcher::EventDispatcher;
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
