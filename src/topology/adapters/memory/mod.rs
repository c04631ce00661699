//! In-memory adapters used by the app host process and by tests.

mod eventing;
mod registry;

pub use eventing::InMemoryEventBus;
pub use registry::InMemoryResourceRegistry;
