//! Declarative registration of resources with the app host.

use super::{AppHost, AppHostError, AppHostResult};
use crate::config::AppHostConfig;
use crate::topology::{
    adapters::{
        LocalhostEndpointAllocator,
        memory::{InMemoryEventBus, InMemoryResourceRegistry},
    },
    domain::{
        BindMount, ContainerImage, ContainerLifetime, DEFAULT_SUPERUSER, Endpoint, EndpointScheme,
        EnvironmentValue, HealthCheck, PRIMARY_ENDPOINT_NAME, Relationship, Resource, ResourceKind,
        ResourceName, TopologyDomainError, Volume,
    },
    ports::{EndpointAllocator, RegistryError, ResourceRegistry},
};
use camino::{Utf8Path, Utf8PathBuf};
use mockable::{Clock, DefaultClock};
use std::sync::Arc;

/// Configuration key naming the directory relative bind-mount sources
/// resolve against.
pub const APP_HOST_DIRECTORY_KEY: &str = "AppHost:Directory";

const POSTGRES_REGISTRY: &str = "docker.io";
const POSTGRES_IMAGE: &str = "library/postgres";
const POSTGRES_TAG: &str = "17.0";
const POSTGRES_PORT: u16 = 5432;
const POSTGRES_DATA_PATH: &str = "/var/lib/postgresql/data";

/// Settings for [`AppHostBuilder::add_postgres`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresServerOptions {
    port: Option<u16>,
    user_name: Option<ResourceName>,
    password: ResourceName,
}

impl PostgresServerOptions {
    /// Creates options using `password` as the superuser password parameter.
    #[must_use]
    pub const fn new(password: ResourceName) -> Self {
        Self {
            port: None,
            user_name: None,
            password,
        }
    }

    /// Publishes the server on a fixed host port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Uses a parameter for the superuser name.
    #[must_use]
    pub fn with_user_name(mut self, user_name: ResourceName) -> Self {
        self.user_name = Some(user_name);
        self
    }
}

/// App host over the in-memory adapters, the localhost allocator and the
/// system clock.
pub type LocalAppHost =
    AppHost<InMemoryResourceRegistry, InMemoryEventBus, LocalhostEndpointAllocator, DefaultClock>;

/// Collects resources before the app host runs.
#[derive(Debug)]
pub struct AppHostBuilder {
    configuration: Arc<AppHostConfig>,
    registry: Arc<InMemoryResourceRegistry>,
    eventing: Arc<InMemoryEventBus>,
    directory: Utf8PathBuf,
}

impl AppHostBuilder {
    /// Creates a builder whose parameters resolve from `configuration`.
    #[must_use]
    pub fn new(configuration: AppHostConfig) -> Self {
        let directory = configuration
            .get(APP_HOST_DIRECTORY_KEY)
            .map_or_else(|| Utf8PathBuf::from("."), Utf8PathBuf::from);
        let shared_configuration = Arc::new(configuration);
        Self {
            registry: Arc::new(InMemoryResourceRegistry::with_configuration(Arc::clone(
                &shared_configuration,
            ))),
            eventing: Arc::new(InMemoryEventBus::new()),
            configuration: shared_configuration,
            directory,
        }
    }

    /// Returns the configuration the builder was created with.
    #[must_use]
    pub fn configuration(&self) -> &AppHostConfig {
        &self.configuration
    }

    /// Returns the live resource registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<InMemoryResourceRegistry> {
        &self.registry
    }

    /// Returns the lifecycle event bus.
    #[must_use]
    pub const fn eventing(&self) -> &Arc<InMemoryEventBus> {
        &self.eventing
    }

    /// Returns the directory relative bind-mount sources resolve against.
    #[must_use]
    pub fn directory(&self) -> &Utf8Path {
        &self.directory
    }

    /// Registers a prepared resource.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateResource`] when the name is taken.
    pub fn add_resource(&self, resource: Resource) -> AppHostResult<ResourceBuilder<'_>> {
        let name = resource.name().clone();
        self.registry.register(resource)?;
        Ok(ResourceBuilder { host: self, name })
    }

    /// Returns a builder for an already registered resource.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownResource`] when no resource has that
    /// name.
    pub fn resource(&self, name: &ResourceName) -> AppHostResult<ResourceBuilder<'_>> {
        let resource = self
            .registry
            .find(name)?
            .ok_or_else(|| RegistryError::UnknownResource(name.clone()))?;
        Ok(ResourceBuilder {
            host: self,
            name: resource.name().clone(),
        })
    }

    /// Registers a parameter resource.
    ///
    /// The value is read from configuration key `Parameters:<name>` when
    /// present, otherwise `default` applies.
    ///
    /// # Errors
    ///
    /// Returns domain errors for invalid names or registry errors for
    /// duplicates.
    pub fn add_parameter(
        &self,
        name: &str,
        default: Option<&str>,
        secret: bool,
    ) -> AppHostResult<ResourceBuilder<'_>> {
        let kind = ResourceKind::Parameter {
            default: default.map(str::to_owned),
            secret,
        };
        self.add_resource(Resource::new(ResourceName::new(name)?, kind))
    }

    /// Registers a PostgreSQL server container.
    ///
    /// # Errors
    ///
    /// Returns registry errors when a referenced parameter does not exist
    /// or is not a parameter, and domain or registry errors for the server
    /// itself.
    pub fn add_postgres(
        &self,
        name: &str,
        options: PostgresServerOptions,
    ) -> AppHostResult<ResourceBuilder<'_>> {
        let server_name = ResourceName::new(name)?;
        self.ensure_parameter(&options.password)?;
        if let Some(user_name) = &options.user_name {
            self.ensure_parameter(user_name)?;
        }

        let mut resource = Resource::new(
            server_name,
            ResourceKind::PostgresServer {
                user_name: options.user_name.clone(),
                password: options.password.clone(),
            },
        );
        resource.set_image(
            ContainerImage::new(POSTGRES_IMAGE, POSTGRES_TAG).with_registry(POSTGRES_REGISTRY),
        );
        resource.add_endpoint(
            Endpoint::new(PRIMARY_ENDPOINT_NAME, EndpointScheme::Tcp)?
                .with_target_port(POSTGRES_PORT)
                .with_port(options.port),
        )?;
        resource.set_environment(
            "POSTGRES_HOST_AUTH_METHOD",
            EnvironmentValue::literal("scram-sha-256"),
        )?;
        resource.set_environment(
            "POSTGRES_INITDB_ARGS",
            EnvironmentValue::literal("--auth-host=scram-sha-256 --auth-local=scram-sha-256"),
        )?;
        resource.set_environment(
            "POSTGRES_USER",
            options.user_name.map_or_else(
                || EnvironmentValue::literal(DEFAULT_SUPERUSER),
                EnvironmentValue::Parameter,
            ),
        )?;
        resource.set_environment(
            "POSTGRES_PASSWORD",
            EnvironmentValue::Parameter(options.password),
        )?;

        self.add_resource(resource)
    }

    /// Registers a generic container.
    ///
    /// # Errors
    ///
    /// Returns domain errors for invalid names or registry errors for
    /// duplicates.
    pub fn add_container(
        &self,
        name: &str,
        image: ContainerImage,
    ) -> AppHostResult<ResourceBuilder<'_>> {
        let mut resource = Resource::new(ResourceName::new(name)?, ResourceKind::Container);
        resource.set_image(image);
        self.add_resource(resource)
    }

    /// Registers an application project.
    ///
    /// # Errors
    ///
    /// Returns domain errors for invalid names or registry errors for
    /// duplicates.
    pub fn add_project(&self, name: &str) -> AppHostResult<ResourceBuilder<'_>> {
        self.add_resource(Resource::new(ResourceName::new(name)?, ResourceKind::Project))
    }

    /// Finishes building with the localhost allocator and the system clock.
    #[must_use]
    pub fn build(self) -> LocalAppHost {
        self.build_with(
            Arc::new(LocalhostEndpointAllocator::new()),
            Arc::new(DefaultClock),
        )
    }

    /// Finishes building with a custom allocator and clock.
    #[must_use]
    pub fn build_with<A, C>(
        self,
        allocator: Arc<A>,
        clock: Arc<C>,
    ) -> AppHost<InMemoryResourceRegistry, InMemoryEventBus, A, C>
    where
        A: EndpointAllocator,
        C: Clock + Send + Sync,
    {
        AppHost::new(self.registry, self.eventing, allocator, clock)
    }

    fn ensure_parameter(&self, name: &ResourceName) -> AppHostResult<()> {
        let resource = self
            .registry
            .find(name)?
            .ok_or_else(|| RegistryError::UnknownResource(name.clone()))?;
        if !matches!(resource.kind(), ResourceKind::Parameter { .. }) {
            return Err(RegistryError::NotAParameter(name.clone()).into());
        }
        Ok(())
    }

    fn resolve_source(&self, source: &str) -> Utf8PathBuf {
        let path = Utf8Path::new(source);
        if path.is_absolute() {
            return path.to_path_buf();
        }
        let relative = path.strip_prefix("./").unwrap_or(path);
        self.directory.join(relative)
    }
}

/// Fluent handle for annotating one registered resource.
#[derive(Debug, Clone)]
pub struct ResourceBuilder<'a> {
    host: &'a AppHostBuilder,
    name: ResourceName,
}

impl<'a> ResourceBuilder<'a> {
    /// Returns the resource name.
    #[must_use]
    pub const fn name(&self) -> &ResourceName {
        &self.name
    }

    /// Returns the builder the resource belongs to.
    #[must_use]
    pub const fn app_host(&self) -> &'a AppHostBuilder {
        self.host
    }

    /// Returns a copy of the resource as currently registered.
    ///
    /// # Errors
    ///
    /// Returns registry errors when the resource cannot be read.
    pub fn resource(&self) -> AppHostResult<Resource> {
        self.host
            .registry
            .find(&self.name)?
            .ok_or_else(|| RegistryError::UnknownResource(self.name.clone()).into())
    }

    fn apply<F>(self, change: F) -> AppHostResult<Self>
    where
        F: FnOnce(&mut Resource) -> Result<(), TopologyDomainError>,
    {
        self.host.registry.update(&self.name, change)?;
        Ok(self)
    }

    /// Adds an endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyDomainError::DuplicateEndpoint`] when the name is
    /// taken on this resource.
    pub fn with_endpoint(self, endpoint: Endpoint) -> AppHostResult<Self> {
        self.apply(|resource| resource.add_endpoint(endpoint))
    }

    /// Adds a proxied HTTP endpoint.
    ///
    /// # Errors
    ///
    /// See [`Self::with_endpoint`].
    pub fn with_http_endpoint(
        self,
        name: &str,
        target_port: Option<u16>,
        port: Option<u16>,
    ) -> AppHostResult<Self> {
        let endpoint = proxied_endpoint(name, EndpointScheme::Http, target_port, port)?;
        self.with_endpoint(endpoint)
    }

    /// Adds a proxied HTTPS endpoint.
    ///
    /// # Errors
    ///
    /// See [`Self::with_endpoint`].
    pub fn with_https_endpoint(
        self,
        name: &str,
        target_port: Option<u16>,
        port: Option<u16>,
    ) -> AppHostResult<Self> {
        let endpoint = proxied_endpoint(name, EndpointScheme::Https, target_port, port)?;
        self.with_endpoint(endpoint)
    }

    /// Sets a literal environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyDomainError::EmptyEnvironmentName`] for blank
    /// names.
    pub fn with_environment(self, name: &str, value: impl Into<String>) -> AppHostResult<Self> {
        self.with_environment_value(name, EnvironmentValue::literal(value))
    }

    /// Sets an environment variable resolved at run time.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyDomainError::EmptyEnvironmentName`] for blank
    /// names.
    pub fn with_environment_value(
        self,
        name: &str,
        value: EnvironmentValue,
    ) -> AppHostResult<Self> {
        self.apply(|resource| resource.set_environment(name, value))
    }

    /// Appends command-line arguments.
    ///
    /// # Errors
    ///
    /// Returns registry errors when the resource cannot be updated.
    pub fn with_args<I, S>(self, args: I) -> AppHostResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let collected_args: Vec<String> = args.into_iter().map(Into::into).collect();
        self.apply(|resource| {
            resource.add_args(collected_args);
            Ok(())
        })
    }

    /// Maps a host path into the container.
    ///
    /// Relative sources resolve against the app host directory.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyDomainError::RelativeMountTarget`] when `target` is
    /// not absolute.
    pub fn with_bind_mount(self, source: &str, target: &str) -> AppHostResult<Self> {
        let mount = BindMount::new(self.host.resolve_source(source), target)?;
        self.apply(|resource| {
            resource.add_bind_mount(mount);
            Ok(())
        })
    }

    /// Persists the PostgreSQL data directory in a named volume.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyDomainError::UnexpectedResourceKind`] unless the
    /// resource is a PostgreSQL server.
    pub fn with_data_volume(self) -> AppHostResult<Self> {
        let volume = Volume::new(format!("{}-data", self.name), POSTGRES_DATA_PATH)?;
        self.apply(|resource| {
            ensure_postgres_server(resource)?;
            resource.add_volume(volume);
            Ok(())
        })
    }

    /// Sets the container lifetime.
    ///
    /// # Errors
    ///
    /// Returns registry errors when the resource cannot be updated.
    pub fn with_lifetime(self, lifetime: ContainerLifetime) -> AppHostResult<Self> {
        self.apply(|resource| {
            resource.set_lifetime(lifetime);
            Ok(())
        })
    }

    /// Injects the connection string of `target` as
    /// `ConnectionStrings__<name>`.
    ///
    /// # Errors
    ///
    /// Returns [`AppHostError::NoConnectionString`] when `target` is neither
    /// a PostgreSQL server nor a database.
    pub fn with_reference(self, target: &ResourceBuilder<'_>) -> AppHostResult<Self> {
        let referenced = target.resource()?;
        if !matches!(
            referenced.kind(),
            ResourceKind::PostgresServer { .. } | ResourceKind::PostgresDatabase { .. }
        ) {
            return Err(AppHostError::NoConnectionString(referenced.name().clone()));
        }

        let variable = format!("ConnectionStrings__{}", referenced.name());
        let relationship = Relationship {
            resource: referenced.name().clone(),
            label: "Reference".to_owned(),
        };
        self.apply(|resource| {
            resource.set_environment(
                &variable,
                EnvironmentValue::ConnectionString(referenced.name().clone()),
            )?;
            resource.add_relationship(relationship);
            Ok(())
        })
    }

    /// Records that this resource waits for `dependency` to be ready.
    ///
    /// # Errors
    ///
    /// Returns registry errors when the resource cannot be updated.
    pub fn wait_for(self, dependency: &ResourceBuilder<'_>) -> AppHostResult<Self> {
        let dependency_name = dependency.name().clone();
        self.apply(|resource| {
            resource.add_wait_for(dependency_name);
            Ok(())
        })
    }

    /// Adds a labelled relationship to another resource.
    ///
    /// # Errors
    ///
    /// Returns registry errors when the resource cannot be updated.
    pub fn with_relationship(self, target: &ResourceName, label: &str) -> AppHostResult<Self> {
        let relationship = Relationship {
            resource: target.clone(),
            label: label.to_owned(),
        };
        self.apply(|resource| {
            resource.add_relationship(relationship);
            Ok(())
        })
    }

    /// Probes `path` on the `http` endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyDomainError::UnknownEndpoint`] when the resource
    /// has no `http` endpoint.
    pub fn with_http_health_check(self, path: &str) -> AppHostResult<Self> {
        let check = HealthCheck::HttpGet {
            endpoint: "http".to_owned(),
            path: path.to_owned(),
        };
        self.apply(|resource| {
            resource.endpoint_mut("http")?;
            resource.add_health_check(check);
            Ok(())
        })
    }

    /// Leaves the resource out of deployment manifests.
    ///
    /// # Errors
    ///
    /// Returns registry errors when the resource cannot be updated.
    pub fn exclude_from_manifest(self) -> AppHostResult<Self> {
        self.apply(|resource| {
            resource.exclude_from_manifest();
            Ok(())
        })
    }

    /// Registers a database hosted by this PostgreSQL server.
    ///
    /// `database_name` defaults to the resource name.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyDomainError::UnexpectedResourceKind`] unless this
    /// resource is a PostgreSQL server, plus domain and registry errors for
    /// the new resource.
    pub fn add_database(
        &self,
        name: &str,
        database_name: Option<&str>,
    ) -> AppHostResult<ResourceBuilder<'a>> {
        ensure_postgres_server(&self.resource()?)?;
        let resource_name = ResourceName::new(name)?;
        let resolved_database_name =
            database_name.map_or_else(|| resource_name.to_string(), str::to_owned);
        let mut resource = Resource::new(
            resource_name,
            ResourceKind::PostgresDatabase {
                server: self.name.clone(),
                database_name: resolved_database_name,
            },
        );
        resource.add_relationship(Relationship {
            resource: self.name.clone(),
            label: "Parent".to_owned(),
        });
        self.host.add_resource(resource)
    }
}

fn proxied_endpoint(
    name: &str,
    scheme: EndpointScheme,
    target_port: Option<u16>,
    port: Option<u16>,
) -> Result<Endpoint, TopologyDomainError> {
    let endpoint = Endpoint::new(name, scheme)?.with_port(port);
    Ok(match target_port {
        Some(target) => endpoint.with_target_port(target),
        None => endpoint,
    })
}

fn ensure_postgres_server(resource: &Resource) -> Result<(), TopologyDomainError> {
    if matches!(resource.kind(), ResourceKind::PostgresServer { .. }) {
        return Ok(());
    }
    Err(TopologyDomainError::UnexpectedResourceKind {
        resource: resource.name().clone(),
        expected: "postgres server",
        actual: resource.kind().as_str(),
    })
}
