//! Password delivery port.

use crate::pgadmin::domain::{CredentialDeliveryError, ServerCredential};
use crate::topology::domain::ResourceName;

/// Result type for credential delivery.
pub type CredentialResult<T> = Result<T, CredentialDeliveryError>;

/// Turns a resolved password into the credential member of a connection
/// record.
pub trait CredentialDelivery: Send + Sync {
    /// Builds the credential for `server`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialDeliveryError`] when the password cannot be
    /// carried by this mechanism.
    fn deliver(&self, server: &ResourceName, password: &str) -> CredentialResult<ServerCredential>;
}
