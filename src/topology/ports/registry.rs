//! Registry port for resource lookup, enumeration and parameter resolution.

use crate::topology::domain::{
    BindMount, DatabaseServer, EndpointAllocation, Resource, ResourceName, TopologyDomainError,
};
use std::sync::Arc;
use thiserror::Error;

/// Result type for resource registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Live view of the resources registered with the app host.
///
/// Enumeration methods return resources in registration order. Every call
/// reflects the registry at the time of the call, never an earlier snapshot.
#[cfg_attr(test, mockall::automock)]
pub trait ResourceRegistry: Send + Sync {
    /// Stores a new resource.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateResource`] when a resource with the
    /// same name (ignoring ASCII case) exists.
    fn register(&self, resource: Resource) -> RegistryResult<()>;

    /// Finds a resource by name.
    fn find(&self, name: &ResourceName) -> RegistryResult<Option<Resource>>;

    /// Returns every registered resource.
    fn resources(&self) -> RegistryResult<Vec<Resource>>;

    /// Returns every registered PostgreSQL server.
    fn database_servers(&self) -> RegistryResult<Vec<DatabaseServer>>;

    /// Returns the bind mounts declared on a resource.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownResource`] when no resource has that
    /// name.
    fn bind_mounts(&self, name: &ResourceName) -> RegistryResult<Vec<BindMount>>;

    /// Resolves a parameter resource to its current value.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnresolvedParameter`] when neither
    /// configuration nor the declared default supplies a value.
    fn resolve_parameter(&self, name: &ResourceName) -> RegistryResult<String>;

    /// Records the allocation of one endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownResource`] or a domain error when the
    /// endpoint does not exist.
    fn record_allocation(
        &self,
        resource: &ResourceName,
        endpoint: &str,
        allocation: EndpointAllocation,
    ) -> RegistryResult<()>;
}

/// Errors returned by resource registry implementations.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// A resource with the same name already exists.
    #[error("duplicate resource name: {0}")]
    DuplicateResource(ResourceName),

    /// No resource has the given name.
    #[error("resource not found: {0}")]
    UnknownResource(ResourceName),

    /// The named resource is not a parameter.
    #[error("resource '{0}' is not a parameter")]
    NotAParameter(ResourceName),

    /// The parameter has neither a configured value nor a default.
    #[error("parameter '{0}' has no configured value and no default")]
    UnresolvedParameter(ResourceName),

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TopologyDomainError),

    /// Registry state could not be accessed.
    #[error("registry state unavailable: {0}")]
    State(Arc<dyn std::error::Error + Send + Sync>),
}

impl RegistryError {
    /// Wraps a failure to access registry state.
    pub fn state(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::State(Arc::new(err))
    }
}
