//! Registered resources and the database server view.

use super::{
    BindMount, Endpoint, EnvironmentValue, ResourceName, TopologyDomainError, Volume,
};
use std::fmt;

/// Name of the endpoint a database server is reached through.
pub const PRIMARY_ENDPOINT_NAME: &str = "tcp";

/// Superuser name assumed when a server declares no user-name parameter.
pub const DEFAULT_SUPERUSER: &str = "postgres";

/// Fully qualified container image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerImage {
    registry: Option<String>,
    image: String,
    tag: String,
}

impl ContainerImage {
    /// Creates an image reference without an explicit registry.
    #[must_use]
    pub fn new(image: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            registry: None,
            image: image.into(),
            tag: tag.into(),
        }
    }

    /// Pins the image to a registry host.
    #[must_use]
    pub fn with_registry(mut self, registry: impl Into<String>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    /// Returns the registry host, if pinned.
    #[must_use]
    pub fn registry(&self) -> Option<&str> {
        self.registry.as_deref()
    }

    /// Returns the image path.
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Returns the image tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl fmt::Display for ContainerImage {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(registry) = &self.registry {
            write!(formatter, "{registry}/")?;
        }
        write!(formatter, "{}:{}", self.image, self.tag)
    }
}

/// How long a container outlives the app host session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerLifetime {
    /// Removed when the session ends.
    #[default]
    Session,
    /// Kept running across sessions.
    Persistent,
}

/// Health probe declared for a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthCheck {
    /// HTTP GET against one of the resource's endpoints.
    HttpGet {
        /// Endpoint to probe.
        endpoint: String,
        /// Request path.
        path: String,
    },
}

/// Directed, labelled link from one resource to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Related resource.
    pub resource: ResourceName,
    /// Relationship label.
    pub label: String,
}

/// Kind-specific settings of a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    /// Externally supplied value, optionally secret.
    Parameter {
        /// Value used when configuration supplies none.
        default: Option<String>,
        /// Whether the value must be kept out of logs.
        secret: bool,
    },
    /// PostgreSQL server container.
    PostgresServer {
        /// Parameter holding the superuser name, if not the default.
        user_name: Option<ResourceName>,
        /// Parameter holding the superuser password.
        password: ResourceName,
    },
    /// Logical database hosted by a PostgreSQL server resource.
    PostgresDatabase {
        /// Hosting server.
        server: ResourceName,
        /// Database name inside the server.
        database_name: String,
    },
    /// pgAdmin administration container.
    PgAdmin,
    /// Generic container.
    Container,
    /// Application process built from source.
    Project,
}

impl ResourceKind {
    /// Returns a human-readable kind label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Parameter { .. } => "parameter",
            Self::PostgresServer { .. } => "postgres server",
            Self::PostgresDatabase { .. } => "postgres database",
            Self::PgAdmin => "pgadmin container",
            Self::Container => "container",
            Self::Project => "project",
        }
    }
}

/// Resource registered with the app host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    name: ResourceName,
    kind: ResourceKind,
    image: Option<ContainerImage>,
    lifetime: ContainerLifetime,
    endpoints: Vec<Endpoint>,
    environment: Vec<(String, EnvironmentValue)>,
    args: Vec<String>,
    bind_mounts: Vec<BindMount>,
    volumes: Vec<Volume>,
    relationships: Vec<Relationship>,
    wait_for: Vec<ResourceName>,
    health_checks: Vec<HealthCheck>,
    excluded_from_manifest: bool,
}

impl Resource {
    /// Creates a resource with no annotations.
    #[must_use]
    pub const fn new(name: ResourceName, kind: ResourceKind) -> Self {
        Self {
            name,
            kind,
            image: None,
            lifetime: ContainerLifetime::Session,
            endpoints: Vec::new(),
            environment: Vec::new(),
            args: Vec::new(),
            bind_mounts: Vec::new(),
            volumes: Vec::new(),
            relationships: Vec::new(),
            wait_for: Vec::new(),
            health_checks: Vec::new(),
            excluded_from_manifest: false,
        }
    }

    /// Returns the resource name.
    #[must_use]
    pub const fn name(&self) -> &ResourceName {
        &self.name
    }

    /// Returns the kind-specific settings.
    #[must_use]
    pub const fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    /// Returns the container image, if the resource runs as a container.
    #[must_use]
    pub const fn image(&self) -> Option<&ContainerImage> {
        self.image.as_ref()
    }

    /// Returns the container lifetime.
    #[must_use]
    pub const fn lifetime(&self) -> ContainerLifetime {
        self.lifetime
    }

    /// Returns all endpoints in declaration order.
    #[must_use]
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Looks up an endpoint by name.
    #[must_use]
    pub fn endpoint(&self, name: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|endpoint| endpoint.name() == name)
    }

    /// Returns environment variables in declaration order.
    #[must_use]
    pub fn environment(&self) -> &[(String, EnvironmentValue)] {
        &self.environment
    }

    /// Returns command-line arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns declared bind mounts.
    #[must_use]
    pub fn bind_mounts(&self) -> &[BindMount] {
        &self.bind_mounts
    }

    /// Returns whether this is a parameter declared secret.
    #[must_use]
    pub const fn is_secret_parameter(&self) -> bool {
        matches!(self.kind, ResourceKind::Parameter { secret: true, .. })
    }

    /// Returns declared named volumes.
    #[must_use]
    pub fn volumes(&self) -> &[Volume] {
        &self.volumes
    }

    /// Returns outgoing relationships.
    #[must_use]
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Returns the resources this one waits for before starting.
    #[must_use]
    pub fn wait_for(&self) -> &[ResourceName] {
        &self.wait_for
    }

    /// Returns declared health checks.
    #[must_use]
    pub fn health_checks(&self) -> &[HealthCheck] {
        &self.health_checks
    }

    /// Returns whether the resource is left out of deployment manifests.
    #[must_use]
    pub const fn is_excluded_from_manifest(&self) -> bool {
        self.excluded_from_manifest
    }

    /// Sets the container image.
    pub fn set_image(&mut self, image: ContainerImage) {
        self.image = Some(image);
    }

    /// Sets the container lifetime.
    pub const fn set_lifetime(&mut self, lifetime: ContainerLifetime) {
        self.lifetime = lifetime;
    }

    /// Adds an endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyDomainError::DuplicateEndpoint`] when an endpoint
    /// with the same name exists.
    pub fn add_endpoint(&mut self, endpoint: Endpoint) -> Result<(), TopologyDomainError> {
        if self.endpoint(endpoint.name()).is_some() {
            return Err(TopologyDomainError::DuplicateEndpoint {
                resource: self.name.clone(),
                endpoint: endpoint.name().to_owned(),
            });
        }
        self.endpoints.push(endpoint);
        Ok(())
    }

    /// Returns a mutable endpoint by name.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyDomainError::UnknownEndpoint`] when no endpoint has
    /// that name.
    pub fn endpoint_mut(&mut self, name: &str) -> Result<&mut Endpoint, TopologyDomainError> {
        let resource = self.name.clone();
        self.endpoints
            .iter_mut()
            .find(|endpoint| endpoint.name() == name)
            .ok_or_else(|| TopologyDomainError::UnknownEndpoint {
                resource,
                endpoint: name.to_owned(),
            })
    }

    /// Sets an environment variable, replacing an earlier value of the same
    /// name in place.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyDomainError::EmptyEnvironmentName`] when the name is
    /// blank.
    pub fn set_environment(
        &mut self,
        name: &str,
        value: EnvironmentValue,
    ) -> Result<(), TopologyDomainError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(TopologyDomainError::EmptyEnvironmentName);
        }

        match self
            .environment
            .iter_mut()
            .find(|(existing, _)| existing == trimmed)
        {
            Some(entry) => entry.1 = value,
            None => self.environment.push((trimmed.to_owned(), value)),
        }
        Ok(())
    }

    /// Appends command-line arguments.
    pub fn add_args(&mut self, args: impl IntoIterator<Item = String>) {
        self.args.extend(args);
    }

    /// Adds a bind mount, replacing an earlier mount of the same target.
    pub fn add_bind_mount(&mut self, mount: BindMount) {
        self.bind_mounts
            .retain(|existing| existing.target() != mount.target());
        self.bind_mounts.push(mount);
    }

    /// Adds a named volume.
    pub fn add_volume(&mut self, volume: Volume) {
        self.volumes.push(volume);
    }

    /// Adds a relationship unless an identical one exists.
    pub fn add_relationship(&mut self, relationship: Relationship) {
        if !self.relationships.contains(&relationship) {
            self.relationships.push(relationship);
        }
    }

    /// Records that this resource waits for `dependency`.
    pub fn add_wait_for(&mut self, dependency: ResourceName) {
        if !self.wait_for.iter().any(|existing| existing.matches(&dependency)) {
            self.wait_for.push(dependency);
        }
    }

    /// Adds a health check.
    pub fn add_health_check(&mut self, check: HealthCheck) {
        self.health_checks.push(check);
    }

    /// Leaves the resource out of deployment manifests.
    pub const fn exclude_from_manifest(&mut self) {
        self.excluded_from_manifest = true;
    }
}

/// Snapshot of a PostgreSQL server resource as seen by configuration
/// generators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseServer {
    name: ResourceName,
    primary_endpoint: Option<Endpoint>,
    user_name: Option<ResourceName>,
    password: ResourceName,
}

impl DatabaseServer {
    /// Builds the view for a PostgreSQL server resource.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyDomainError::UnexpectedResourceKind`] for any other
    /// kind of resource.
    pub fn from_resource(resource: &Resource) -> Result<Self, TopologyDomainError> {
        let ResourceKind::PostgresServer {
            user_name,
            password,
        } = resource.kind()
        else {
            return Err(TopologyDomainError::UnexpectedResourceKind {
                resource: resource.name().clone(),
                expected: "postgres server",
                actual: resource.kind().as_str(),
            });
        };

        Ok(Self {
            name: resource.name().clone(),
            primary_endpoint: resource.endpoint(PRIMARY_ENDPOINT_NAME).cloned(),
            user_name: user_name.clone(),
            password: password.clone(),
        })
    }

    /// Returns the server resource name.
    #[must_use]
    pub const fn name(&self) -> &ResourceName {
        &self.name
    }

    /// Returns the primary endpoint, if declared.
    #[must_use]
    pub const fn primary_endpoint(&self) -> Option<&Endpoint> {
        self.primary_endpoint.as_ref()
    }

    /// Returns the primary endpoint only when it has been allocated.
    #[must_use]
    pub fn allocated_endpoint(&self) -> Option<&Endpoint> {
        self.primary_endpoint
            .as_ref()
            .filter(|endpoint| endpoint.is_allocated())
    }

    /// Returns the user-name parameter, if one was supplied.
    #[must_use]
    pub const fn user_name(&self) -> Option<&ResourceName> {
        self.user_name.as_ref()
    }

    /// Returns the password parameter.
    #[must_use]
    pub const fn password(&self) -> &ResourceName {
        &self.password
    }
}
