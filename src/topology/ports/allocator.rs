//! Endpoint allocation port.

use crate::topology::domain::{Endpoint, EndpointAllocation, ResourceName};
use thiserror::Error;

/// Result type for endpoint allocation.
pub type AllocationResult<T> = Result<T, AllocationError>;

/// Assigns host-visible addresses to endpoints.
pub trait EndpointAllocator: Send + Sync {
    /// Allocates an address and port for one endpoint of `resource`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError`] when no port can be assigned.
    fn allocate(
        &self,
        resource: &ResourceName,
        endpoint: &Endpoint,
    ) -> AllocationResult<EndpointAllocation>;
}

/// Errors returned by endpoint allocators.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AllocationError {
    /// The dynamic port range is used up.
    #[error("no dynamic port left for endpoint '{endpoint}' of '{resource}'")]
    PortsExhausted {
        /// Owning resource.
        resource: ResourceName,
        /// Endpoint name.
        endpoint: String,
    },

    /// A fixed host port is already taken by another endpoint.
    #[error("port {port} requested by '{resource}' is already allocated")]
    PortInUse {
        /// Requesting resource.
        resource: ResourceName,
        /// Contested port.
        port: u16,
    },

    /// A non-proxied endpoint declares no port to listen on.
    #[error("endpoint '{endpoint}' of '{resource}' is not proxied and has no target port")]
    MissingTargetPort {
        /// Owning resource.
        resource: ResourceName,
        /// Endpoint name.
        endpoint: String,
    },
}
