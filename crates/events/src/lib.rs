//! Client-side signals and the bus that distributes them.

pub mod bus;
pub mod in_memory_bus;
pub mod signal;

pub use bus::{EventBus, EventListener, Subscription};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use signal::{ClientSignal, SessionEndReason};
