//! App host run: endpoint allocation, lifecycle events and environment
//! resolution.

use super::{AppHostError, AppHostResult};
use crate::topology::{
    domain::{
        DEFAULT_SUPERUSER, EndpointAllocation, EnvironmentValue, LifecycleEvent,
        PRIMARY_ENDPOINT_NAME, Resource, ResourceKind, ResourceName,
    },
    ports::{EndpointAllocator, Eventing, RegistryError, ResourceRegistry},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info};

/// Logged in place of values derived from a secret parameter.
pub const REDACTED_VALUE: &str = "********";

/// Endpoint allocated during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatedEndpoint {
    /// Owning resource.
    pub resource: ResourceName,
    /// Endpoint name.
    pub endpoint: String,
    /// Assigned address and port.
    pub allocation: EndpointAllocation,
}

/// Outcome of [`AppHost::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Endpoints allocated by this run, in registration order.
    pub allocations: Vec<AllocatedEndpoint>,
    /// Number of handlers that ran for `AfterEndpointsAllocated`.
    pub allocation_handlers: usize,
}

/// Runs the allocation phase of a topology and publishes lifecycle events.
#[derive(Clone)]
pub struct AppHost<R, E, A, C>
where
    R: ResourceRegistry,
    E: Eventing,
    A: EndpointAllocator,
    C: Clock + Send + Sync,
{
    registry: Arc<R>,
    eventing: Arc<E>,
    allocator: Arc<A>,
    clock: Arc<C>,
}

impl<R, E, A, C> AppHost<R, E, A, C>
where
    R: ResourceRegistry,
    E: Eventing,
    A: EndpointAllocator,
    C: Clock + Send + Sync,
{
    /// Creates an app host over the given ports.
    #[must_use]
    pub const fn new(registry: Arc<R>, eventing: Arc<E>, allocator: Arc<A>, clock: Arc<C>) -> Self {
        Self {
            registry,
            eventing,
            allocator,
            clock,
        }
    }

    /// Returns the resource registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<R> {
        &self.registry
    }

    /// Returns the event bus.
    #[must_use]
    pub const fn eventing(&self) -> &Arc<E> {
        &self.eventing
    }

    /// Publishes `BeforeStart`, allocates every unallocated endpoint and
    /// publishes `AfterEndpointsAllocated`.
    ///
    /// Endpoints allocated by an earlier run keep their allocation.
    ///
    /// # Errors
    ///
    /// Returns allocation and registry failures, or the first failing
    /// lifecycle handler. Any error aborts the run.
    pub async fn run(&self) -> AppHostResult<RunSummary> {
        self.eventing
            .publish(LifecycleEvent::BeforeStart {
                at: self.clock.utc(),
            })
            .await?;

        let allocations = self.allocate_endpoints()?;
        info!(allocated = allocations.len(), "endpoint allocation complete");

        let allocation_handlers = self
            .eventing
            .publish(LifecycleEvent::AfterEndpointsAllocated {
                allocated_at: self.clock.utc(),
            })
            .await?;

        Ok(RunSummary {
            allocations,
            allocation_handlers,
        })
    }

    fn allocate_endpoints(&self) -> AppHostResult<Vec<AllocatedEndpoint>> {
        let mut allocated = Vec::new();
        for resource in self.registry.resources()? {
            for endpoint in resource.endpoints() {
                if endpoint.is_allocated() {
                    continue;
                }

                let allocation = self.allocator.allocate(resource.name(), endpoint)?;
                debug!(
                    resource = %resource.name(),
                    endpoint = endpoint.name(),
                    address = allocation.address(),
                    port = allocation.port(),
                    "allocated endpoint"
                );
                self.registry.record_allocation(
                    resource.name(),
                    endpoint.name(),
                    allocation.clone(),
                )?;
                allocated.push(AllocatedEndpoint {
                    resource: resource.name().clone(),
                    endpoint: endpoint.name().to_owned(),
                    allocation,
                });
            }
        }
        Ok(allocated)
    }

    /// Resolves the environment of a resource to plain strings.
    ///
    /// # Errors
    ///
    /// Returns registry errors for unknown resources or unresolved
    /// parameters, and connection-string errors for references whose
    /// endpoints are not allocated.
    pub fn environment_for(&self, name: &ResourceName) -> AppHostResult<Vec<(String, String)>> {
        let resource = self.find_resource(name)?;
        resource
            .environment()
            .iter()
            .map(|(variable, value)| Ok((variable.clone(), self.resolve_value(value)?)))
            .collect()
    }

    /// Resolves the environment like [`Self::environment_for`] but replaces
    /// every value carrying a secret parameter with [`REDACTED_VALUE`].
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Self::environment_for`].
    pub fn redacted_environment_for(
        &self,
        name: &ResourceName,
    ) -> AppHostResult<Vec<(String, String)>> {
        let resource = self.find_resource(name)?;
        resource
            .environment()
            .iter()
            .map(|(variable, value)| {
                let text = if self.carries_secret(value)? {
                    REDACTED_VALUE.to_owned()
                } else {
                    self.resolve_value(value)?
                };
                Ok((variable.clone(), text))
            })
            .collect()
    }

    /// Builds the connection string clients use to reach a PostgreSQL
    /// server or database from the host.
    ///
    /// # Errors
    ///
    /// Returns [`AppHostError::NoConnectionString`] for other resource
    /// kinds and [`AppHostError::EndpointNotAllocated`] before the run has
    /// allocated the server endpoint.
    pub fn connection_string(&self, name: &ResourceName) -> AppHostResult<String> {
        let resource = self.find_resource(name)?;
        match resource.kind() {
            ResourceKind::PostgresServer {
                user_name,
                password,
            } => self.server_connection_string(&resource, user_name.as_ref(), password),
            ResourceKind::PostgresDatabase {
                server,
                database_name,
            } => {
                let base = self.connection_string(server)?;
                Ok(format!("{base};Database={database_name}"))
            }
            _ => Err(AppHostError::NoConnectionString(name.clone())),
        }
    }

    fn server_connection_string(
        &self,
        server: &Resource,
        user_name: Option<&ResourceName>,
        password: &ResourceName,
    ) -> AppHostResult<String> {
        let allocation = server
            .endpoint(PRIMARY_ENDPOINT_NAME)
            .and_then(|endpoint| endpoint.allocation())
            .ok_or_else(|| AppHostError::EndpointNotAllocated {
                resource: server.name().clone(),
                endpoint: PRIMARY_ENDPOINT_NAME.to_owned(),
            })?;
        let user = match user_name {
            Some(parameter) => self.registry.resolve_parameter(parameter)?,
            None => DEFAULT_SUPERUSER.to_owned(),
        };
        let secret = self.registry.resolve_parameter(password)?;

        Ok(format!(
            "Host={};Port={};Username={user};Password={secret}",
            allocation.address(),
            allocation.port()
        ))
    }

    fn resolve_value(&self, value: &EnvironmentValue) -> AppHostResult<String> {
        match value {
            EnvironmentValue::Literal(text) => Ok(text.clone()),
            EnvironmentValue::Parameter(parameter) => {
                Ok(self.registry.resolve_parameter(parameter)?)
            }
            EnvironmentValue::ConnectionString(target) => self.connection_string(target),
        }
    }

    fn carries_secret(&self, value: &EnvironmentValue) -> AppHostResult<bool> {
        match value {
            EnvironmentValue::Literal(_) => Ok(false),
            EnvironmentValue::Parameter(parameter) => {
                Ok(self.find_resource(parameter)?.is_secret_parameter())
            }
            EnvironmentValue::ConnectionString(target) => {
                let resource = self.find_resource(target)?;
                match resource.kind() {
                    ResourceKind::PostgresServer {
                        user_name,
                        password,
                    } => user_name.iter().chain([password]).try_fold(false, |found, parameter| {
                        Ok(found || self.find_resource(parameter)?.is_secret_parameter())
                    }),
                    ResourceKind::PostgresDatabase { server, .. } => {
                        self.carries_secret(&EnvironmentValue::ConnectionString(server.clone()))
                    }
                    _ => Ok(false),
                }
            }
        }
    }

    fn find_resource(&self, name: &ResourceName) -> AppHostResult<Resource> {
        self.registry
            .find(name)?
            .ok_or_else(|| RegistryError::UnknownResource(name.clone()).into())
    }
}
