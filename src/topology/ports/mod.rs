//! Port contracts for the orchestration substrate.

mod allocator;
mod eventing;
mod registry;

pub use allocator::{AllocationError, AllocationResult, EndpointAllocator};
pub use eventing::{
    Delivery, EventError, EventResult, Eventing, LifecycleEventHandler, SubscriptionId,
};
pub use registry::{RegistryError, RegistryResult, ResourceRegistry};

#[cfg(test)]
pub use registry::MockResourceRegistry;
