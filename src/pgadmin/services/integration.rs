//! Adds a pgAdmin container next to a PostgreSQL server.

use super::{REGISTRY_MOUNT_TARGET, ServerRegistryEventHandler, ServerRegistryGenerator};
use crate::config::{AppHostConfig, ConfigError};
use crate::pgadmin::{
    adapters::{CapStdRegistryFileSink, EchoPasswordCommand},
    domain::KeyNumbering,
    ports::CredentialDelivery,
};
use crate::topology::{
    domain::{
        ContainerImage, ContainerLifetime, LifecycleEventKind, Resource, ResourceKind,
        ResourceName, TopologyDomainError,
    },
    ports::{Delivery, Eventing},
    services::{AppHostResult, ResourceBuilder},
};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Configuration key for the pgAdmin host port.
pub const PGADMIN_PORT_KEY: &str = "PgAdmin:Port";

const PGADMIN_REGISTRY: &str = "docker.io";
const PGADMIN_IMAGE: &str = "dpage/pgadmin4";
const PGADMIN_TAG: &str = "8.12";
const PGADMIN_HTTP_PORT: u16 = 80;
const REGISTRY_FILE_SOURCE: &str = "./Properties/pgadmin.tmp.json";
const PGADMIN_ENVIRONMENT: [(&str, &str); 4] = [
    ("PGADMIN_CONFIG_MASTER_PASSWORD_REQUIRED", "False"),
    ("PGADMIN_CONFIG_SERVER_MODE", "False"),
    ("PGADMIN_DEFAULT_EMAIL", "admin@domain.com"),
    ("PGADMIN_DEFAULT_PASSWORD", "admin"),
];

/// Settings for [`PgAdminResourceBuilderExt::with_pgadmin`].
#[derive(Clone)]
pub struct PgAdminOptions {
    name: Option<String>,
    host_port: Option<u16>,
    lifetime: Option<ContainerLifetime>,
    credentials: Arc<dyn CredentialDelivery>,
    numbering: KeyNumbering,
}

impl Default for PgAdminOptions {
    fn default() -> Self {
        Self {
            name: None,
            host_port: None,
            lifetime: None,
            credentials: Arc::new(EchoPasswordCommand),
            numbering: KeyNumbering::default(),
        }
    }
}

impl fmt::Debug for PgAdminOptions {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("PgAdminOptions")
            .field("name", &self.name)
            .field("host_port", &self.host_port)
            .field("lifetime", &self.lifetime)
            .field("numbering", &self.numbering)
            .finish_non_exhaustive()
    }
}

impl PgAdminOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the host port from `PgAdmin:Port`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the value is not a port.
    pub fn from_config(config: &AppHostConfig) -> Result<Self, ConfigError> {
        let mut options = Self::new();
        options.host_port = config.get_port(PGADMIN_PORT_KEY)?;
        Ok(options)
    }

    /// Names the container instead of `<postgres>-pgadmin`.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Publishes the UI on a fixed host port.
    #[must_use]
    pub const fn with_host_port(mut self, port: u16) -> Self {
        self.host_port = Some(port);
        self
    }

    /// Sets the container lifetime.
    #[must_use]
    pub const fn with_lifetime(mut self, lifetime: ContainerLifetime) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// Replaces how passwords reach pgAdmin.
    #[must_use]
    pub fn with_credential_delivery(mut self, credentials: Arc<dyn CredentialDelivery>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Replaces the server key numbering policy.
    #[must_use]
    pub const fn with_numbering(mut self, numbering: KeyNumbering) -> Self {
        self.numbering = numbering;
        self
    }

    /// Returns the configured host port.
    #[must_use]
    pub const fn host_port(&self) -> Option<u16> {
        self.host_port
    }
}

/// pgAdmin support for PostgreSQL server builders.
pub trait PgAdminResourceBuilderExt: Sized {
    /// Adds a pgAdmin container that lists every PostgreSQL server.
    ///
    /// Only one pgAdmin container exists per app host. When one is already
    /// registered, only the lifetime override is applied to it; otherwise
    /// the container is registered and the server registry generator is
    /// subscribed once to `AfterEndpointsAllocated`.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyDomainError::UnexpectedResourceKind`] unless this
    /// builder is for a PostgreSQL server, plus domain, registry and event
    /// errors while registering the container.
    fn with_pgadmin(self, options: PgAdminOptions) -> AppHostResult<Self>;
}

impl PgAdminResourceBuilderExt for ResourceBuilder<'_> {
    fn with_pgadmin(self, options: PgAdminOptions) -> AppHostResult<Self> {
        let server = self.resource()?;
        if !matches!(server.kind(), ResourceKind::PostgresServer { .. }) {
            return Err(TopologyDomainError::UnexpectedResourceKind {
                resource: server.name().clone(),
                expected: "postgres server",
                actual: server.kind().as_str(),
            }
            .into());
        }

        let host = self.app_host();
        let registered = host
            .registry()
            .find_first(|resource| matches!(resource.kind(), ResourceKind::PgAdmin))?;
        if let Some(existing) = registered {
            debug!(admin = %existing.name(), "pgAdmin already registered");
            if let Some(lifetime) = options.lifetime {
                host.resource(existing.name())?.with_lifetime(lifetime)?;
            }
            return Ok(self);
        }

        let admin_name = ResourceName::new(
            options
                .name
                .unwrap_or_else(|| format!("{}-pgadmin", self.name())),
        )?;
        let mut resource = Resource::new(admin_name, ResourceKind::PgAdmin);
        resource.set_image(
            ContainerImage::new(PGADMIN_IMAGE, PGADMIN_TAG).with_registry(PGADMIN_REGISTRY),
        );
        if let Some(lifetime) = options.lifetime {
            resource.set_lifetime(lifetime);
        }

        let mut admin_builder = host.add_resource(resource)?.with_http_endpoint(
            "http",
            Some(PGADMIN_HTTP_PORT),
            options.host_port,
        )?;
        for (name, value) in PGADMIN_ENVIRONMENT {
            admin_builder = admin_builder.with_environment(name, value)?;
        }
        let admin = admin_builder
            .with_bind_mount(REGISTRY_FILE_SOURCE, REGISTRY_MOUNT_TARGET)?
            .with_http_health_check("/browser")?
            .exclude_from_manifest()?
            .with_relationship(self.name(), "PgAdmin")?;

        let generator = ServerRegistryGenerator::new(
            Arc::clone(host.registry()),
            Arc::new(CapStdRegistryFileSink::new()),
            admin.name().clone(),
        )
        .with_credential_delivery(options.credentials)
        .with_numbering(options.numbering);
        let subscription = host.eventing().subscribe(
            LifecycleEventKind::AfterEndpointsAllocated,
            Delivery::Once,
            Arc::new(ServerRegistryEventHandler::new(generator)),
        )?;
        debug!(admin = %admin.name(), %subscription, "pgAdmin registered");

        Ok(self)
    }
}
