//! Domain model for the pgAdmin server registry document.

mod connection;
mod document;
mod error;
mod key;

pub use connection::{
    DEFAULT_MAINTENANCE_DB, DEFAULT_SSL_MODE, SERVER_GROUP, ServerConnection, ServerCredential,
};
pub use document::ServerRegistryDocument;
pub use error::{CredentialDeliveryError, TopologyConfigurationError};
pub use key::{KeyCounter, KeyNumbering, ParseServerKeyError, ServerKey};
