//! Domain errors for server registry generation.

use crate::topology::domain::ResourceName;
use thiserror::Error;

/// The topology does not contain what the generator needs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TopologyConfigurationError {
    /// The pgAdmin resource is not registered.
    #[error("pgAdmin resource '{0}' is not registered")]
    AdminResourceMissing(ResourceName),

    /// The pgAdmin resource has no bind mount for the registry file.
    #[error("resource '{resource}' has no bind mount targeting '{target}'")]
    RegistryMountMissing {
        /// pgAdmin resource.
        resource: ResourceName,
        /// Expected container path.
        target: String,
    },

    /// A database server endpoint has no container-side port.
    #[error("endpoint '{endpoint}' of server '{server}' has no target port")]
    MissingTargetPort {
        /// Database server.
        server: ResourceName,
        /// Endpoint name.
        endpoint: String,
    },
}

/// A password cannot be delivered to pgAdmin.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialDeliveryError {
    /// The password contains a character the delivery mechanism cannot
    /// carry.
    #[error("password for server '{server}' contains an unsupported {character}")]
    UnsupportedCharacter {
        /// Database server.
        server: ResourceName,
        /// Description of the offending character.
        character: &'static str,
    },
}
