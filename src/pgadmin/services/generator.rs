//! Builds and writes pgAdmin's `servers.json`.

use super::{ServerRegistryError, ServerRegistryResult};
use crate::pgadmin::{
    adapters::EchoPasswordCommand,
    domain::{
        KeyCounter, KeyNumbering, ServerConnection, ServerKey, ServerRegistryDocument,
        TopologyConfigurationError,
    },
    ports::{CredentialDelivery, RegistryFileSink},
};
use crate::topology::{
    domain::{DEFAULT_SUPERUSER, DatabaseServer, ResourceName},
    ports::{RegistryError, ResourceRegistry},
};
use camino::Utf8PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Container path pgAdmin reads its server registry from.
pub const REGISTRY_MOUNT_TARGET: &str = "/pgadmin4/servers.json";

/// Outcome of one generation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// Host path the document was written to.
    pub path: Utf8PathBuf,
    /// Servers listed in the document, with their keys.
    pub written: Vec<(ServerKey, ResourceName)>,
    /// Servers left out because their primary endpoint is not allocated.
    pub skipped: Vec<ResourceName>,
}

#[derive(Default)]
struct Assembly {
    document: ServerRegistryDocument,
    written: Vec<(ServerKey, ResourceName)>,
    skipped: Vec<ResourceName>,
}

/// Generates the server registry from the live resource registry.
///
/// The registry is queried on every call, so servers registered after the
/// generator was created are included.
pub struct ServerRegistryGenerator<R, S> {
    registry: Arc<R>,
    sink: Arc<S>,
    credentials: Arc<dyn CredentialDelivery>,
    admin: ResourceName,
    numbering: KeyNumbering,
}

impl<R, S> ServerRegistryGenerator<R, S>
where
    R: ResourceRegistry,
    S: RegistryFileSink,
{
    /// Creates a generator for the pgAdmin resource named `admin`.
    ///
    /// Passwords are delivered with [`EchoPasswordCommand`] and keys use
    /// [`KeyNumbering::Positional`] until overridden.
    #[must_use]
    pub fn new(registry: Arc<R>, sink: Arc<S>, admin: ResourceName) -> Self {
        Self {
            registry,
            sink,
            credentials: Arc::new(EchoPasswordCommand),
            admin,
            numbering: KeyNumbering::default(),
        }
    }

    /// Replaces the credential delivery mechanism.
    #[must_use]
    pub fn with_credential_delivery(mut self, credentials: Arc<dyn CredentialDelivery>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Replaces the key numbering policy.
    #[must_use]
    pub const fn with_numbering(mut self, numbering: KeyNumbering) -> Self {
        self.numbering = numbering;
        self
    }

    /// Returns the pgAdmin resource name.
    #[must_use]
    pub const fn admin(&self) -> &ResourceName {
        &self.admin
    }

    /// Returns the host path bound to [`REGISTRY_MOUNT_TARGET`].
    ///
    /// # Errors
    ///
    /// Returns [`TopologyConfigurationError::AdminResourceMissing`] or
    /// [`TopologyConfigurationError::RegistryMountMissing`] when the admin
    /// resource or its mount is absent.
    pub fn registry_file_path(&self) -> ServerRegistryResult<Utf8PathBuf> {
        let mounts = match self.registry.bind_mounts(&self.admin) {
            Ok(mounts) => mounts,
            Err(RegistryError::UnknownResource(_)) => {
                return Err(
                    TopologyConfigurationError::AdminResourceMissing(self.admin.clone()).into(),
                );
            }
            Err(err) => return Err(err.into()),
        };

        mounts
            .iter()
            .find(|mount| mount.target() == REGISTRY_MOUNT_TARGET)
            .map(|mount| mount.source().to_path_buf())
            .ok_or_else(|| {
                TopologyConfigurationError::RegistryMountMissing {
                    resource: self.admin.clone(),
                    target: REGISTRY_MOUNT_TARGET.to_owned(),
                }
                .into()
            })
    }

    /// Builds the document for the current topology without writing it.
    ///
    /// # Errors
    ///
    /// Returns parameter, credential or topology errors for the first
    /// server that cannot be described.
    pub fn build_document(&self) -> ServerRegistryResult<ServerRegistryDocument> {
        self.assemble().map(|assembly| assembly.document)
    }

    /// Builds the document and writes it over the registry file.
    ///
    /// Everything that can fail before the write happens first, so an
    /// error leaves any previous file untouched. Only a failure inside the
    /// write itself can leave a truncated file.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRegistryError`] for the first failure.
    pub fn generate(&self) -> ServerRegistryResult<GenerationReport> {
        let path = self.registry_file_path()?;
        let assembly = self.assemble()?;
        let contents = assembly.document.to_json()?;

        self.sink
            .write(&path, &contents)
            .map_err(|source| ServerRegistryError::Io {
                path: path.clone(),
                source,
            })?;

        info!(
            path = %path,
            admin = %self.admin,
            servers = assembly.written.len(),
            skipped = assembly.skipped.len(),
            "wrote pgAdmin server registry"
        );
        Ok(GenerationReport {
            path,
            written: assembly.written,
            skipped: assembly.skipped,
        })
    }

    fn assemble(&self) -> ServerRegistryResult<Assembly> {
        let mut assembly = Assembly::default();
        let mut counter = KeyCounter::new(self.numbering);

        for server in self.registry.database_servers()? {
            if let Some(connection) = self.describe(&server)? {
                let key = counter.claim();
                assembly.document.insert(key, connection);
                assembly.written.push((key, server.name().clone()));
            } else {
                debug!(server = %server.name(), "primary endpoint not allocated; skipping");
                counter.skip();
                assembly.skipped.push(server.name().clone());
            }
        }

        Ok(assembly)
    }

    fn describe(&self, server: &DatabaseServer) -> ServerRegistryResult<Option<ServerConnection>> {
        let Some(endpoint) = server.allocated_endpoint() else {
            return Ok(None);
        };
        let target_port =
            endpoint
                .target_port()
                .ok_or_else(|| TopologyConfigurationError::MissingTargetPort {
                    server: server.name().clone(),
                    endpoint: endpoint.name().to_owned(),
                })?;

        let username = match server.user_name() {
            Some(parameter) => self.resolve(server, parameter)?,
            None => DEFAULT_SUPERUSER.to_owned(),
        };
        let password = self.resolve(server, server.password())?;
        let credential = self.credentials.deliver(server.name(), &password)?;

        Ok(Some(ServerConnection::new(
            server.name(),
            target_port,
            username,
            credential,
        )))
    }

    fn resolve(
        &self,
        server: &DatabaseServer,
        parameter: &ResourceName,
    ) -> ServerRegistryResult<String> {
        self.registry
            .resolve_parameter(parameter)
            .map_err(|source| ServerRegistryError::ParameterResolution {
                server: server.name().clone(),
                parameter: parameter.clone(),
                source,
            })
    }
}
