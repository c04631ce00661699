//! Localhost endpoint allocator.

use crate::topology::{
    domain::{Endpoint, EndpointAllocation, ResourceName},
    ports::{AllocationError, AllocationResult, EndpointAllocator},
};
use std::collections::HashSet;
use std::sync::Mutex;

/// First port handed out to proxied endpoints without a fixed host port.
pub const DYNAMIC_PORT_START: u16 = 49152;

const LOCALHOST: &str = "localhost";

#[derive(Debug)]
struct AllocatorState {
    next_dynamic: Option<u16>,
    taken: HashSet<u16>,
}

/// Allocates every endpoint on `localhost`.
///
/// Port selection, in order: the requested fixed host port; the target
/// port for endpoints that bypass the proxy; otherwise the next free port
/// counting up from [`DYNAMIC_PORT_START`]. Allocation is deterministic for
/// a given registration order.
#[derive(Debug)]
pub struct LocalhostEndpointAllocator {
    state: Mutex<AllocatorState>,
}

impl LocalhostEndpointAllocator {
    /// Creates an allocator with the default dynamic range.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(DYNAMIC_PORT_START)
    }

    /// Creates an allocator whose dynamic range starts at `first_port`.
    #[must_use]
    pub fn starting_at(first_port: u16) -> Self {
        Self {
            state: Mutex::new(AllocatorState {
                next_dynamic: Some(first_port),
                taken: HashSet::new(),
            }),
        }
    }
}

impl Default for LocalhostEndpointAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl EndpointAllocator for LocalhostEndpointAllocator {
    fn allocate(
        &self,
        resource: &ResourceName,
        endpoint: &Endpoint,
    ) -> AllocationResult<EndpointAllocation> {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let fixed_port = if endpoint.is_proxied() {
            endpoint.port()
        } else {
            Some(endpoint.port().or(endpoint.target_port()).ok_or_else(|| {
                AllocationError::MissingTargetPort {
                    resource: resource.clone(),
                    endpoint: endpoint.name().to_owned(),
                }
            })?)
        };

        let port = match fixed_port {
            Some(port) => {
                if !state.taken.insert(port) {
                    return Err(AllocationError::PortInUse {
                        resource: resource.clone(),
                        port,
                    });
                }
                port
            }
            None => loop {
                let candidate =
                    state
                        .next_dynamic
                        .ok_or_else(|| AllocationError::PortsExhausted {
                            resource: resource.clone(),
                            endpoint: endpoint.name().to_owned(),
                        })?;
                state.next_dynamic = candidate.checked_add(1);
                if state.taken.insert(candidate) {
                    break candidate;
                }
            },
        };

        Ok(EndpointAllocation::new(LOCALHOST, port))
    }
}
