//! Domain events and their distribution.
//!
//! Domain crates describe what happened with types implementing [`Event`]; the
//! service layer wraps committed events in an [`EventEnvelope`] and hands them to
//! an [`EventBus`].

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
