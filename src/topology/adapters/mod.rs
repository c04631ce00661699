//! Adapter implementations for the orchestration substrate ports.

pub mod memory;

mod allocator;

pub use allocator::{DYNAMIC_PORT_START, LocalhostEndpointAllocator};
