//! Errors raised while generating the server registry.

use crate::pgadmin::domain::{CredentialDeliveryError, TopologyConfigurationError};
use crate::topology::{domain::ResourceName, ports::RegistryError};
use camino::Utf8PathBuf;
use std::io;
use thiserror::Error;

/// Result type for server registry generation.
pub type ServerRegistryResult<T> = Result<T, ServerRegistryError>;

/// Failures of one generation pass.
///
/// None of these are retried; the pass aborts on the first one.
#[derive(Debug, Error)]
pub enum ServerRegistryError {
    /// The topology is missing the admin resource or its registry mount.
    #[error(transparent)]
    TopologyConfiguration(#[from] TopologyConfigurationError),

    /// A user-name or password parameter has no value.
    #[error("cannot resolve parameter '{parameter}' for server '{server}': {source}")]
    ParameterResolution {
        /// Database server being described.
        server: ResourceName,
        /// Parameter that failed to resolve.
        parameter: ResourceName,
        /// Registry failure.
        source: RegistryError,
    },

    /// The password cannot be delivered.
    #[error(transparent)]
    Credential(#[from] CredentialDeliveryError),

    /// The document could not be rendered.
    #[error("failed to serialize server registry: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The registry file could not be written.
    #[error("failed to write server registry to {path}: {source}")]
    Io {
        /// Host path of the registry file.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },

    /// The resource registry could not be read.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
