//! Error types for topology domain validation.

use super::ResourceName;
use thiserror::Error;

/// Errors returned while constructing or mutating topology domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TopologyDomainError {
    /// The resource name is empty after trimming.
    #[error("resource name must not be empty")]
    EmptyResourceName,

    /// The resource name does not follow the naming rules.
    #[error(
        "resource name '{0}' is invalid (must start with a letter and contain only ASCII letters, digits and single hyphens)"
    )]
    InvalidResourceName(String),

    /// The resource name exceeds the 64-character limit.
    #[error("resource name exceeds 64 character limit: {0}")]
    ResourceNameTooLong(String),

    /// An endpoint name is empty after trimming.
    #[error("endpoint name must not be empty")]
    EmptyEndpointName,

    /// The resource already exposes an endpoint with the same name.
    #[error("resource '{resource}' already has an endpoint named '{endpoint}'")]
    DuplicateEndpoint {
        /// Owning resource.
        resource: ResourceName,
        /// Endpoint name.
        endpoint: String,
    },

    /// The resource exposes no endpoint with the requested name.
    #[error("resource '{resource}' has no endpoint named '{endpoint}'")]
    UnknownEndpoint {
        /// Owning resource.
        resource: ResourceName,
        /// Endpoint name.
        endpoint: String,
    },

    /// A bind mount or volume target is not an absolute container path.
    #[error("mount target '{0}' must be an absolute path")]
    RelativeMountTarget(String),

    /// An environment variable name is empty after trimming.
    #[error("environment variable name must not be empty")]
    EmptyEnvironmentName,

    /// The operation only applies to a different kind of resource.
    #[error("resource '{resource}' is a {actual}, expected {expected}")]
    UnexpectedResourceKind {
        /// Resource name.
        resource: ResourceName,
        /// Kind required by the operation.
        expected: &'static str,
        /// Kind of the resource.
        actual: &'static str,
    },
}
