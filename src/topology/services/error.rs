//! Service-level errors for building and running the app host.

use crate::config::ConfigError;
use crate::topology::{
    domain::{ResourceName, TopologyDomainError},
    ports::{AllocationError, EventError, RegistryError},
};
use thiserror::Error;

/// Errors returned by the topology builder and the app host.
#[derive(Debug, Error)]
pub enum AppHostError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TopologyDomainError),
    /// Registry operation failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Endpoint allocation failed.
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    /// A lifecycle handler or the event bus failed.
    #[error(transparent)]
    Event(#[from] EventError),
    /// Configuration could not be read.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A referenced endpoint has not been allocated yet.
    #[error("endpoint '{endpoint}' of '{resource}' is not allocated")]
    EndpointNotAllocated {
        /// Owning resource.
        resource: ResourceName,
        /// Endpoint name.
        endpoint: String,
    },
    /// The referenced resource does not expose a connection string.
    #[error("resource '{0}' does not provide a connection string")]
    NoConnectionString(ResourceName),
}

/// Result type for app host services.
pub type AppHostResult<T> = Result<T, AppHostError>;
