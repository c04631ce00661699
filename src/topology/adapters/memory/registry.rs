//! In-memory resource registry.

use crate::config::AppHostConfig;
use crate::topology::{
    domain::{
        BindMount, DatabaseServer, EndpointAllocation, Resource, ResourceKind, ResourceName,
        TopologyDomainError,
    },
    ports::{RegistryError, RegistryResult, ResourceRegistry},
};
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory resource registry.
///
/// Resources keep their registration order, which is the enumeration order
/// of [`ResourceRegistry::resources`] and
/// [`ResourceRegistry::database_servers`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryResourceRegistry {
    state: Arc<RwLock<Vec<Resource>>>,
    configuration: Arc<AppHostConfig>,
}

impl InMemoryResourceRegistry {
    /// Creates an empty registry with no configured parameter values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry resolving parameters from `configuration`.
    #[must_use]
    pub fn with_configuration(configuration: Arc<AppHostConfig>) -> Self {
        Self {
            state: Arc::default(),
            configuration,
        }
    }

    /// Applies `change` to a registered resource in place.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownResource`] when no resource has that
    /// name, or the domain error raised by `change`.
    pub fn update<F>(&self, name: &ResourceName, change: F) -> RegistryResult<()>
    where
        F: FnOnce(&mut Resource) -> Result<(), TopologyDomainError>,
    {
        let mut state = self.state.write().map_err(|err| {
            RegistryError::state(std::io::Error::other(err.to_string()))
        })?;
        let resource = state
            .iter_mut()
            .find(|resource| resource.name().matches(name))
            .ok_or_else(|| RegistryError::UnknownResource(name.clone()))?;
        change(resource)?;
        Ok(())
    }

    /// Returns the first resource matching `predicate`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::State`] when registry state is unavailable.
    pub fn find_first(
        &self,
        predicate: impl Fn(&Resource) -> bool,
    ) -> RegistryResult<Option<Resource>> {
        let state = self.read_state()?;
        Ok(state.iter().find(|resource| predicate(resource)).cloned())
    }

    fn read_state(&self) -> RegistryResult<std::sync::RwLockReadGuard<'_, Vec<Resource>>> {
        self.state
            .read()
            .map_err(|err| RegistryError::state(std::io::Error::other(err.to_string())))
    }
}

impl ResourceRegistry for InMemoryResourceRegistry {
    fn register(&self, resource: Resource) -> RegistryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            RegistryError::state(std::io::Error::other(err.to_string()))
        })?;

        if state
            .iter()
            .any(|existing| existing.name().matches(resource.name()))
        {
            return Err(RegistryError::DuplicateResource(resource.name().clone()));
        }

        state.push(resource);
        Ok(())
    }

    fn find(&self, name: &ResourceName) -> RegistryResult<Option<Resource>> {
        self.find_first(|resource| resource.name().matches(name))
    }

    fn resources(&self) -> RegistryResult<Vec<Resource>> {
        Ok(self.read_state()?.clone())
    }

    fn database_servers(&self) -> RegistryResult<Vec<DatabaseServer>> {
        let state = self.read_state()?;
        state
            .iter()
            .filter(|resource| matches!(resource.kind(), ResourceKind::PostgresServer { .. }))
            .map(|resource| DatabaseServer::from_resource(resource).map_err(RegistryError::from))
            .collect()
    }

    fn bind_mounts(&self, name: &ResourceName) -> RegistryResult<Vec<BindMount>> {
        self.find(name)?
            .map(|resource| resource.bind_mounts().to_vec())
            .ok_or_else(|| RegistryError::UnknownResource(name.clone()))
    }

    fn resolve_parameter(&self, name: &ResourceName) -> RegistryResult<String> {
        let resource = self
            .find(name)?
            .ok_or_else(|| RegistryError::UnknownResource(name.clone()))?;

        let ResourceKind::Parameter { default, .. } = resource.kind() else {
            return Err(RegistryError::NotAParameter(name.clone()));
        };

        self.configuration
            .parameter(resource.name().as_str())
            .map(str::to_owned)
            .or_else(|| default.clone())
            .ok_or_else(|| RegistryError::UnresolvedParameter(name.clone()))
    }

    fn record_allocation(
        &self,
        resource: &ResourceName,
        endpoint: &str,
        allocation: EndpointAllocation,
    ) -> RegistryResult<()> {
        self.update(resource, |entry| {
            entry.endpoint_mut(endpoint)?.allocate(allocation);
            Ok(())
        })
    }
}
